//! From clauses.

use crate::ast::BooleanExpression;
use crate::builder::value::SqlValue;
use crate::error::Result;
use crate::scope::{AliasRef, Scope};

/// Join types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    /// `join`
    Inner,
    /// `left join`
    Left,
    /// `right join`
    Right,
    /// `full outer join`
    Full,
}

impl JoinType {
    /// Returns the SQL keyword(s).
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Inner => "join",
            Self::Left => "left join",
            Self::Right => "right join",
            Self::Full => "full outer join",
        }
    }
}

/// A left-deep chain of joins over table aliases.
#[derive(Debug, Clone)]
pub enum FromClause {
    /// A single aliased table.
    Alias(AliasRef),
    /// `left <join type> target on condition`
    Join {
        /// Everything joined so far.
        left: Box<FromClause>,
        /// Join type.
        join_type: JoinType,
        /// The joined alias.
        target: AliasRef,
        /// Join condition.
        on: BooleanExpression,
    },
}

impl FromClause {
    /// Every alias introduced, left to right.
    #[must_use]
    pub fn aliases(&self) -> Vec<AliasRef> {
        let mut out = Vec::new();
        self.collect_aliases(&mut out);
        out
    }

    fn collect_aliases(&self, out: &mut Vec<AliasRef>) {
        match self {
            Self::Alias(alias) => out.push(alias.clone()),
            Self::Join { left, target, .. } => {
                left.collect_aliases(out);
                out.push(target.clone());
            }
        }
    }

    /// Renders the clause without the `from` keyword.
    ///
    /// # Errors
    ///
    /// Fails when a join condition cannot be rendered.
    pub fn sql(&self, scope: &Scope<'_>) -> Result<String> {
        match self {
            Self::Alias(alias) => Ok(table_sql(alias, scope)),
            Self::Join {
                left,
                join_type,
                target,
                on,
            } => Ok(format!(
                "{} {} {} on {}",
                left.sql(scope)?,
                join_type.as_sql(),
                table_sql(target, scope),
                on.sql(scope)?
            )),
        }
    }

    /// Bind arguments of the join conditions, left to right.
    ///
    /// # Errors
    ///
    /// Fails when a join condition cannot be rendered.
    pub fn args(&self, scope: &Scope<'_>) -> Result<Vec<SqlValue>> {
        match self {
            Self::Alias(_) => Ok(Vec::new()),
            Self::Join { left, on, .. } => {
                let mut out = left.args(scope)?;
                out.extend(on.args(scope)?);
                Ok(out)
            }
        }
    }
}

fn table_sql(alias: &AliasRef, scope: &Scope<'_>) -> String {
    let table = scope.database().qualified_table_name(alias.table());
    scope.dialect().table_with_alias(&table, alias.name())
}
