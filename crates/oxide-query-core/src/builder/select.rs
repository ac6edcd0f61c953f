//! SELECT statements, built with the typestate pattern.
//!
//! `where_clause()`, grouping and ordering only exist once a from clause is
//! set, and every join must be completed with `on()` before anything else.

use std::collections::HashSet;

use super::from::{FromClause, JoinType};
use super::value::SqlValue;
use super::{Rendered, Statement};
use crate::ast::{BooleanExpression, ColumnRef, Expr, Expression};
use crate::database::Database;
use crate::error::Result;
use crate::schema::{column_label, RowType};
use crate::scope::{Alias, AliasRef, Scope};

// Typestate markers

/// Marker: no from clause yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFrom;

/// Marker: from clause set.
#[derive(Debug, Clone)]
pub struct HasFrom {
    from: FromClause,
}

/// Marker: a join waiting for its `on` condition.
#[derive(Debug, Clone)]
pub struct AwaitingOn {
    left: FromClause,
    join_type: JoinType,
    target: AliasRef,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl OrderDirection {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// One `order by` item.
#[derive(Debug, Clone)]
pub struct Ordering {
    /// Sort key.
    pub expression: Expression,
    /// Direction.
    pub direction: OrderDirection,
}

#[derive(Debug, Clone)]
struct ProjectionItem {
    expression: Expression,
    label: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct Clauses {
    distinct: bool,
    projection: Vec<ProjectionItem>,
    where_clause: Option<BooleanExpression>,
    group_by: Vec<Expression>,
    having: Option<BooleanExpression>,
    order_by: Vec<Ordering>,
    fetch_first: Option<u64>,
}

/// A SELECT statement builder.
#[derive(Debug, Clone)]
pub struct Select<S = HasFrom> {
    clauses: Clauses,
    state: S,
}

impl Select<NoFrom> {
    /// Creates a new SELECT builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            clauses: Clauses::default(),
            state: NoFrom,
        }
    }

    /// Sets the first table.
    #[must_use]
    pub fn from<R: RowType>(self, alias: &Alias<R>) -> Select<HasFrom> {
        Select {
            clauses: self.clauses,
            state: HasFrom {
                from: FromClause::Alias(alias.alias_ref().clone()),
            },
        }
    }
}

impl Default for Select<NoFrom> {
    fn default() -> Self {
        Self::new()
    }
}

// Projection, available in every state
impl<S> Select<S> {
    /// `select distinct`
    #[must_use]
    pub fn distinct(mut self) -> Self {
        self.clauses.distinct = true;
        self
    }

    /// Adds a result column labelled by the expression.
    #[must_use]
    pub fn column<T>(mut self, expr: Expr<T>) -> Self {
        self.clauses.projection.push(ProjectionItem {
            expression: expr.into_expression(),
            label: None,
        });
        self
    }

    /// Adds a result column with an explicit label.
    #[must_use]
    pub fn column_as<T>(mut self, expr: Expr<T>, label: &str) -> Self {
        self.clauses.projection.push(ProjectionItem {
            expression: expr.into_expression(),
            label: Some(label.to_string()),
        });
        self
    }

    /// Adds every column of an alias, labelled `<alias>_<COLUMN>` so that
    /// [`RowType::from_row`] can read them back with the alias as prefix.
    #[must_use]
    pub fn columns_of<R: RowType>(mut self, alias: &Alias<R>) -> Self {
        let alias = alias.alias_ref();
        self.clauses
            .projection
            .extend(alias_columns(alias).into_iter().map(|(expression, label)| {
                ProjectionItem {
                    expression,
                    label: Some(label),
                }
            }));
        self
    }
}

impl Select<HasFrom> {
    fn join_with<R: RowType>(self, join_type: JoinType, alias: &Alias<R>) -> Select<AwaitingOn> {
        Select {
            clauses: self.clauses,
            state: AwaitingOn {
                left: self.state.from,
                join_type,
                target: alias.alias_ref().clone(),
            },
        }
    }

    /// `join`
    #[must_use]
    pub fn join<R: RowType>(self, alias: &Alias<R>) -> Select<AwaitingOn> {
        self.join_with(JoinType::Inner, alias)
    }

    /// `left join`
    #[must_use]
    pub fn left_join<R: RowType>(self, alias: &Alias<R>) -> Select<AwaitingOn> {
        self.join_with(JoinType::Left, alias)
    }

    /// `right join`
    #[must_use]
    pub fn right_join<R: RowType>(self, alias: &Alias<R>) -> Select<AwaitingOn> {
        self.join_with(JoinType::Right, alias)
    }

    /// `full outer join`
    #[must_use]
    pub fn full_outer_join<R: RowType>(self, alias: &Alias<R>) -> Select<AwaitingOn> {
        self.join_with(JoinType::Full, alias)
    }

    /// Adds a where condition, combined with any earlier one by `and`.
    #[must_use]
    pub fn where_clause(mut self, condition: BooleanExpression) -> Self {
        self.clauses.where_clause = Some(match self.clauses.where_clause.take() {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }

    /// Adds a `group by` expression.
    #[must_use]
    pub fn group_by<T>(mut self, expr: Expr<T>) -> Self {
        self.clauses.group_by.push(expr.into_expression());
        self
    }

    /// Sets the `having` condition.
    #[must_use]
    pub fn having(mut self, condition: BooleanExpression) -> Self {
        self.clauses.having = Some(condition);
        self
    }

    /// Adds an `order by` key.
    #[must_use]
    pub fn order_by<T>(mut self, expr: Expr<T>, direction: OrderDirection) -> Self {
        self.clauses.order_by.push(Ordering {
            expression: expr.into_expression(),
            direction,
        });
        self
    }

    /// Limits the result to the first `rows` rows.
    #[must_use]
    pub fn fetch_first(mut self, rows: u64) -> Self {
        self.clauses.fetch_first = Some(rows);
        self
    }

    /// The finished statement.
    #[must_use]
    pub fn into_statement(self) -> SelectStatement {
        SelectStatement {
            from: self.state.from,
            clauses: self.clauses,
        }
    }

    fn view(&self) -> View<'_> {
        View {
            from: &self.state.from,
            clauses: &self.clauses,
        }
    }
}

impl Select<AwaitingOn> {
    /// Completes the pending join.
    #[must_use]
    pub fn on(self, condition: BooleanExpression) -> Select<HasFrom> {
        let AwaitingOn {
            left,
            join_type,
            target,
        } = self.state;
        Select {
            clauses: self.clauses,
            state: HasFrom {
                from: FromClause::Join {
                    left: Box::new(left),
                    join_type,
                    target,
                    on: condition,
                },
            },
        }
    }
}

impl Statement for Select<HasFrom> {
    fn render(&self, database: &Database) -> Result<Rendered> {
        self.view().render(database)
    }
}

/// A finished SELECT, usable as a statement or a subquery.
#[derive(Debug, Clone)]
pub struct SelectStatement {
    from: FromClause,
    clauses: Clauses,
}

impl SelectStatement {
    /// The from clause.
    #[must_use]
    pub const fn from_clause(&self) -> &FromClause {
        &self.from
    }

    /// Renders as a subquery of `scope`.
    ///
    /// # Errors
    ///
    /// Fails on resolution errors and unsupported functions.
    pub fn sql(&self, scope: &Scope<'_>) -> Result<String> {
        let nested = scope.nested(self.from.aliases());
        self.view().sql(&nested)
    }

    /// Bind arguments as a subquery of `scope`.
    ///
    /// # Errors
    ///
    /// Fails on resolution errors and unsupported functions.
    pub fn args(&self, scope: &Scope<'_>) -> Result<Vec<SqlValue>> {
        let nested = scope.nested(self.from.aliases());
        self.view().args(&nested)
    }

    /// Result-column labels, in projection order.
    ///
    /// # Errors
    ///
    /// Fails on resolution errors.
    pub fn labels(&self, database: &Database) -> Result<Vec<String>> {
        let scope = Scope::new(database, self.from.aliases());
        self.view().labels(&scope)
    }

    fn view(&self) -> View<'_> {
        View {
            from: &self.from,
            clauses: &self.clauses,
        }
    }
}

impl Statement for SelectStatement {
    fn render(&self, database: &Database) -> Result<Rendered> {
        self.view().render(database)
    }
}

struct View<'a> {
    from: &'a FromClause,
    clauses: &'a Clauses,
}

impl View<'_> {
    fn render(&self, database: &Database) -> Result<Rendered> {
        let scope = Scope::new(database, self.from.aliases());
        Ok(Rendered::new(self.sql(&scope)?, self.args(&scope)?))
    }

    fn projection(&self) -> Vec<(Expression, Option<String>)> {
        if self.clauses.projection.is_empty() {
            self.from
                .aliases()
                .iter()
                .flat_map(alias_columns)
                .map(|(expression, label)| (expression, Some(label)))
                .collect()
        } else {
            self.clauses
                .projection
                .iter()
                .map(|item| (item.expression.clone(), item.label.clone()))
                .collect()
        }
    }

    fn labels(&self, scope: &Scope<'_>) -> Result<Vec<String>> {
        let labels = self
            .projection()
            .into_iter()
            .map(|(expression, label)| match label {
                Some(label) => Ok(label),
                None => expression.label(scope),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(unique_labels(labels))
    }

    fn sql(&self, scope: &Scope<'_>) -> Result<String> {
        let dialect = scope.dialect();
        let mut sql = String::from("select ");
        if self.clauses.distinct {
            sql.push_str("distinct ");
        }

        let columns = self
            .projection()
            .iter()
            .zip(self.labels(scope)?)
            .map(|((expression, _), label)| Ok(format!("{} as {label}", expression.sql(scope)?)))
            .collect::<Result<Vec<_>>>()?;
        sql.push_str(&columns.join(", "));

        sql.push_str(" from ");
        sql.push_str(&self.from.sql(scope)?);

        if let Some(ref condition) = self.clauses.where_clause {
            sql.push_str(" where ");
            sql.push_str(&condition.sql(scope)?);
        }

        if !self.clauses.group_by.is_empty() {
            let keys = self
                .clauses
                .group_by
                .iter()
                .map(|e| e.sql(scope))
                .collect::<Result<Vec<_>>>()?;
            sql.push_str(" group by ");
            sql.push_str(&keys.join(", "));
        }

        if let Some(ref condition) = self.clauses.having {
            sql.push_str(" having ");
            sql.push_str(&condition.sql(scope)?);
        }

        if !self.clauses.order_by.is_empty() {
            let keys = self
                .clauses
                .order_by
                .iter()
                .map(|o| Ok(format!("{} {}", o.expression.sql(scope)?, o.direction.as_sql())))
                .collect::<Result<Vec<_>>>()?;
            sql.push_str(" order by ");
            sql.push_str(&keys.join(", "));
        }

        if let Some(rows) = self.clauses.fetch_first {
            sql = dialect.fetch_first(&sql, rows);
        }
        Ok(sql)
    }

    fn args(&self, scope: &Scope<'_>) -> Result<Vec<SqlValue>> {
        let mut args = Vec::new();
        for (expression, _) in self.projection() {
            args.extend(expression.args(scope)?);
        }
        args.extend(self.from.args(scope)?);
        if let Some(ref condition) = self.clauses.where_clause {
            args.extend(condition.args(scope)?);
        }
        for expression in &self.clauses.group_by {
            args.extend(expression.args(scope)?);
        }
        if let Some(ref condition) = self.clauses.having {
            args.extend(condition.args(scope)?);
        }
        for ordering in &self.clauses.order_by {
            args.extend(ordering.expression.args(scope)?);
        }
        Ok(args)
    }
}

fn alias_columns(alias: &AliasRef) -> Vec<(Expression, String)> {
    alias
        .table()
        .column_names()
        .map(|column| {
            let expression = Expression::Column(ColumnRef {
                row: alias.row(),
                table: alias.table(),
                alias: Some(alias.name().to_string()),
                column,
            });
            (expression, column_label(alias.name(), column))
        })
        .collect()
}

/// Appends `_2`, `_3`, ... to repeated labels.
fn unique_labels(labels: Vec<String>) -> Vec<String> {
    let mut used = HashSet::new();
    labels
        .into_iter()
        .map(|label| {
            let mut candidate = label.clone();
            let mut n = 1;
            while !used.insert(candidate.clone()) {
                n += 1;
                candidate = format!("{label}_{n}");
            }
            candidate
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_labels() {
        let labels = vec![
            String::from("max_W_QTY"),
            String::from("count"),
            String::from("max_W_QTY"),
            String::from("max_W_QTY"),
        ];
        assert_eq!(
            unique_labels(labels),
            ["max_W_QTY", "count", "max_W_QTY_2", "max_W_QTY_3"]
        );
    }

    #[test]
    fn test_order_direction() {
        assert_eq!(OrderDirection::default().as_sql(), "asc");
        assert_eq!(OrderDirection::Desc.as_sql(), "desc");
    }
}
