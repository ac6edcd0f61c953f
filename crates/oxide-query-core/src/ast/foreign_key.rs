//! Join predicates derived from foreign-key metadata.

use super::condition::BooleanExpression;
use crate::error::{ForeignKeyError, Result};
use crate::schema::{ForeignKeyDef, RowType, TableDef};
use crate::scope::{Alias, AliasRef, Scope};

/// Column equality between a child alias and a parent alias along a foreign
/// key declared by the child table.
#[derive(Debug, Clone)]
pub struct ForeignKeyJoin {
    child: AliasRef,
    parent: AliasRef,
    foreign_key: &'static ForeignKeyDef,
}

impl ForeignKeyJoin {
    /// Looks up the foreign key from `child` to `parent`, optionally by
    /// constraint name.
    ///
    /// # Errors
    ///
    /// Fails when no foreign key matches, or when several match and no name
    /// was given.
    pub fn resolve(
        child: &AliasRef,
        parent: &AliasRef,
        name: Option<&str>,
    ) -> std::result::Result<Self, ForeignKeyError> {
        let child_table = child.table();
        let parent_table = parent.table();
        let candidates: Vec<&'static ForeignKeyDef> = child_table
            .foreign_keys
            .iter()
            .filter(|fk| references(fk, child_table, parent_table))
            .filter(|fk| name.map_or(true, |n| fk.name.eq_ignore_ascii_case(n)))
            .collect();

        match (candidates.as_slice(), name) {
            ([single], _) => Ok(Self {
                child: child.clone(),
                parent: parent.clone(),
                foreign_key: single,
            }),
            ([], None) => Err(ForeignKeyError::Missing {
                child: child_table.name,
                parent: parent_table.name,
            }),
            ([], Some(name)) => Err(ForeignKeyError::MissingNamed {
                child: child_table.name,
                parent: parent_table.name,
                name: name.to_string(),
            }),
            (many, _) => Err(ForeignKeyError::Ambiguous {
                child: child_table.name,
                parent: parent_table.name,
                candidates: many.iter().map(|fk| fk.name).collect(),
            }),
        }
    }

    /// The resolved constraint.
    #[must_use]
    pub const fn definition(&self) -> &'static ForeignKeyDef {
        self.foreign_key
    }

    /// Renders `child.COL = parent.REF [and ...]`.
    ///
    /// # Errors
    ///
    /// Fails when either alias is not in scope.
    pub fn sql(&self, scope: &Scope<'_>) -> Result<String> {
        let child = scope.find_alias(self.child.row(), self.child.table(), Some(self.child.name()))?;
        let parent =
            scope.find_alias(self.parent.row(), self.parent.table(), Some(self.parent.name()))?;
        Ok(self
            .foreign_key
            .columns
            .iter()
            .zip(self.foreign_key.referenced_columns)
            .map(|(col, referenced)| {
                format!("{} = {}", child.column_sql(col), parent.column_sql(referenced))
            })
            .collect::<Vec<_>>()
            .join(" and "))
    }
}

fn references(fk: &ForeignKeyDef, child: &TableDef, parent: &TableDef) -> bool {
    if !fk.referenced_table.eq_ignore_ascii_case(parent.name) {
        return false;
    }
    let referenced_schema = fk.referenced_schema.or(child.schema);
    match (referenced_schema, parent.schema) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => true,
    }
}

/// Joins `child` to `parent` along the only foreign key between them.
///
/// # Errors
///
/// Fails when the child declares no foreign key to the parent, or several.
pub fn foreign_key<C: RowType, P: RowType>(
    child: &Alias<C>,
    parent: &Alias<P>,
) -> std::result::Result<BooleanExpression, ForeignKeyError> {
    ForeignKeyJoin::resolve(child.alias_ref(), parent.alias_ref(), None)
        .map(BooleanExpression::ForeignKey)
}

/// Joins `child` to `parent` along the foreign key with the given name.
///
/// # Errors
///
/// Fails when no foreign key of that name links the tables.
pub fn named_foreign_key<C: RowType, P: RowType>(
    child: &Alias<C>,
    parent: &Alias<P>,
    name: &str,
) -> std::result::Result<BooleanExpression, ForeignKeyError> {
    ForeignKeyJoin::resolve(child.alias_ref(), parent.alias_ref(), Some(name))
        .map(BooleanExpression::ForeignKey)
}
