//! DELETE statements.

use super::{Rendered, Statement};
use crate::ast::BooleanExpression;
use crate::database::Database;
use crate::error::Result;
use crate::schema::RowType;
use crate::scope::{Alias, Scope};

/// A DELETE from the table behind one alias.
///
/// Without a where clause every row is deleted.
#[derive(Debug, Clone)]
pub struct Delete<R> {
    alias: Alias<R>,
    where_clause: Option<BooleanExpression>,
}

impl<R: RowType> Delete<R> {
    /// Creates a DELETE from the aliased table.
    #[must_use]
    pub fn new(alias: &Alias<R>) -> Self {
        Self {
            alias: alias.clone(),
            where_clause: None,
        }
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
}

impl<R: RowType> Statement for Delete<R> {
    fn render(&self, database: &Database) -> Result<Rendered> {
        let alias = self.alias.alias_ref();
        let scope = Scope::new(database, vec![alias.clone()]);
        let table = database.qualified_table_name(alias.table());
        let mut sql = format!(
            "delete from {}",
            database.dialect().table_with_alias(&table, alias.name())
        );
        let mut args = Vec::new();
        if let Some(ref condition) = self.where_clause {
            sql.push_str(" where ");
            sql.push_str(&condition.sql(&scope)?);
            args = condition.args(&scope)?;
        }
        Ok(Rendered::new(sql, args))
    }
}
