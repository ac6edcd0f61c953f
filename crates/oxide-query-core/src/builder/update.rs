//! UPDATE statements.

use super::value::SqlValue;
use super::{Rendered, Statement};
use crate::ast::{BooleanExpression, Expression, Operand};
use crate::database::Database;
use crate::error::Result;
use crate::schema::{Column, RowType};
use crate::scope::{Alias, AliasRef, Scope};

/// An UPDATE of the table behind one alias.
#[derive(Debug, Clone)]
pub struct Update<R> {
    alias: Alias<R>,
    assignments: Vec<(&'static str, Expression)>,
    where_clause: Option<BooleanExpression>,
}

impl<R: RowType> Update<R> {
    /// Creates an UPDATE of the aliased table.
    #[must_use]
    pub fn new(alias: &Alias<R>) -> Self {
        Self {
            alias: alias.clone(),
            assignments: Vec::new(),
            where_clause: None,
        }
    }

    /// Adds `COLUMN = value`.
    #[must_use]
    pub fn set<C>(mut self, _column: C, value: impl Operand<C::Type>) -> Self
    where
        C: Column<Row = R>,
    {
        self.assignments.push((C::NAME, value.into_operand()));
        self
    }

    /// Adds a where condition, combined with any earlier one by `and`.
    #[must_use]
    pub fn where_clause(mut self, condition: BooleanExpression) -> Self {
        self.where_clause = Some(match self.where_clause.take() {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }

    fn alias(&self) -> &AliasRef {
        self.alias.alias_ref()
    }
}

impl<R: RowType> Statement for Update<R> {
    fn render(&self, database: &Database) -> Result<Rendered> {
        let alias = self.alias();
        let scope = Scope::new(database, vec![alias.clone()]);
        let table = database.qualified_table_name(alias.table());

        let mut sql = format!(
            "update {} set ",
            database.dialect().table_with_alias(&table, alias.name())
        );
        let mut args: Vec<SqlValue> = Vec::new();
        let assignments = self
            .assignments
            .iter()
            .map(|(column, value)| {
                args.extend(value.args(&scope)?);
                Ok(format!("{column} = {}", value.sql(&scope)?))
            })
            .collect::<Result<Vec<_>>>()?;
        sql.push_str(&assignments.join(", "));

        if let Some(ref condition) = self.where_clause {
            sql.push_str(" where ");
            sql.push_str(&condition.sql(&scope)?);
            args.extend(condition.args(&scope)?);
        }
        Ok(Rendered::new(sql, args))
    }
}
