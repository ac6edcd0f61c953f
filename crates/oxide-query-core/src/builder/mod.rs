//! Statement builders.
//!
//! Statements are assembled from typed expressions and rendered against a
//! [`Database`], which supplies the dialect and the default schema.
//!
//! # Example
//!
//! ```rust,ignore
//! use oxide_query_core::ast::column;
//! use oxide_query_core::builder::{Delete, Statement};
//! use oxide_query_core::scope::Alias;
//!
//! let widget = Alias::<Widget>::new();
//! let rendered = Delete::new(&widget)
//!     .where_clause(column(Widget::widget_id()).eq(2))
//!     .render(&database)?;
//!
//! assert_eq!(rendered.sql, "delete from TEST.WIDGET as WIDGET where WIDGET.WIDGET_ID = ?");
//! ```

mod delete;
mod from;
mod insert;
pub mod select;
mod update;
pub mod value;

pub use delete::Delete;
pub use from::{FromClause, JoinType};
pub use insert::Insert;
pub use select::{AwaitingOn, HasFrom, NoFrom, OrderDirection, Ordering, Select, SelectStatement};
pub use update::Update;
pub use value::{FromSqlValue, SqlValue, ToSqlValue};

use crate::database::Database;
use crate::error::Result;

/// SQL text with its bind arguments in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    /// Statement text with `?` placeholders.
    pub sql: String,
    /// One value per placeholder.
    pub args: Vec<SqlValue>,
}

impl Rendered {
    /// Creates a rendered statement.
    pub fn new(sql: impl Into<String>, args: Vec<SqlValue>) -> Self {
        Self {
            sql: sql.into(),
            args,
        }
    }

    /// Creates a rendered statement without arguments.
    pub fn sql(sql: impl Into<String>) -> Self {
        Self::new(sql, Vec::new())
    }

    /// Whether there is nothing to execute.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.sql.trim().is_empty()
    }
}

/// A complete statement.
pub trait Statement {
    /// Renders the statement for a database.
    ///
    /// # Errors
    ///
    /// Fails on resolution errors, unsupported functions and missing foreign
    /// keys.
    fn render(&self, database: &Database) -> Result<Rendered>;

    /// Renders the statements to execute, in order. Usually just one.
    ///
    /// # Errors
    ///
    /// Same as [`Statement::render`].
    fn render_batch(&self, database: &Database) -> Result<Vec<Rendered>> {
        Ok(vec![self.render(database)?])
    }
}
