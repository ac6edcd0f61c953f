//! Aliases and the per-statement resolution scope.

use std::any::TypeId;
use std::fmt;
use std::marker::PhantomData;

use crate::ast::{ColumnRef, Expr, Expression};
use crate::database::Database;
use crate::dialect::Dialect;
use crate::error::ResolutionError;
use crate::schema::{Column, RowType, TableDef};

/// A named occurrence of a row type's table within one statement.
pub struct Alias<R> {
    inner: AliasRef,
    _row: PhantomData<fn() -> R>,
}

impl<R: RowType> Alias<R> {
    /// Creates an alias named after the table.
    #[must_use]
    pub fn new() -> Self {
        Self::named(R::table().name)
    }

    /// Creates an alias with an explicit name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            inner: AliasRef {
                row: R::row_id(),
                table: R::table(),
                name: name.into(),
            },
            _row: PhantomData,
        }
    }

    /// The alias name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// A column reference qualified by this alias.
    #[must_use]
    pub fn column<C: Column<Row = R>>(&self, _column: C) -> Expr<C::Type> {
        Expr::from_node(Expression::Column(ColumnRef {
            row: R::row_id(),
            table: R::table(),
            alias: Some(self.inner.name.clone()),
            column: C::NAME,
        }))
    }

    /// The untyped alias.
    #[must_use]
    pub const fn alias_ref(&self) -> &AliasRef {
        &self.inner
    }
}

impl<R: RowType> Default for Alias<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for Alias<R> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _row: PhantomData,
        }
    }
}

impl<R> fmt::Debug for Alias<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Alias").field(&self.inner).finish()
    }
}

/// An alias with its row type erased.
#[derive(Debug, Clone)]
pub struct AliasRef {
    row: TypeId,
    table: &'static TableDef,
    name: String,
}

impl AliasRef {
    /// The alias name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The aliased table.
    #[must_use]
    pub const fn table(&self) -> &'static TableDef {
        self.table
    }

    pub(crate) const fn row(&self) -> TypeId {
        self.row
    }

    /// Whether this alias stands for the given row type.
    #[must_use]
    pub fn is_row(&self, row: TypeId) -> bool {
        self.row == row
    }

    /// `<alias>.<column>`.
    #[must_use]
    pub fn column_sql(&self, column: &str) -> String {
        format!("{}.{column}", self.name)
    }
}

/// Resolution context for one statement or subquery.
///
/// A nested scope sees every alias of its enclosing scopes, which is what lets
/// a subquery correlate with the outer query. Sibling subqueries each get
/// their own nested scope and never see one another.
#[derive(Debug)]
pub struct Scope<'a> {
    database: &'a Database,
    aliases: Vec<AliasRef>,
    outer: Option<&'a Scope<'a>>,
}

impl<'a> Scope<'a> {
    /// Creates a top-level scope.
    #[must_use]
    pub const fn new(database: &'a Database, aliases: Vec<AliasRef>) -> Self {
        Self {
            database,
            aliases,
            outer: None,
        }
    }

    /// Creates a scope for a subquery of this one.
    #[must_use]
    pub fn nested<'s>(&'s self, aliases: Vec<AliasRef>) -> Scope<'s>
    where
        'a: 's,
    {
        Scope {
            database: self.database,
            aliases,
            outer: Some(self),
        }
    }

    /// The database being rendered for.
    #[must_use]
    pub const fn database(&self) -> &'a Database {
        self.database
    }

    /// The active dialect.
    #[must_use]
    pub fn dialect(&self) -> &'a dyn Dialect {
        self.database.dialect()
    }

    /// Aliases registered directly in this scope.
    #[must_use]
    pub fn aliases(&self) -> &[AliasRef] {
        &self.aliases
    }

    /// Finds the alias a column of `table` refers to.
    ///
    /// With a name, exactly one alias of the row type must carry it. Without
    /// one, exactly one alias of the row type must be in scope. The innermost
    /// scope holding any candidate wins.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolutionError`] when nothing matches or more than one
    /// alias matches.
    pub fn find_alias(
        &self,
        row: TypeId,
        table: &'static TableDef,
        alias: Option<&str>,
    ) -> Result<&AliasRef, ResolutionError> {
        let candidates: Vec<&AliasRef> = self
            .aliases
            .iter()
            .filter(|a| a.is_row(row) && alias.map_or(true, |name| a.name == name))
            .collect();

        match candidates.as_slice() {
            [single] => Ok(*single),
            [] => match self.outer {
                Some(outer) => outer.find_alias(row, table, alias),
                None => Err(alias.map_or(
                    ResolutionError::NoAlias { row: table.name },
                    |name| ResolutionError::UnknownAlias {
                        row: table.name,
                        alias: name.to_string(),
                    },
                )),
            },
            many => Err(ResolutionError::AmbiguousAlias {
                row: table.name,
                candidates: many.iter().map(|a| a.name.clone()).collect(),
            }),
        }
    }
}
