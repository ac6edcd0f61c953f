//! # oxide-query-core
//!
//! Typed SQL construction with pluggable dialects.
//!
//! This crate provides:
//! - Compile-time column descriptors per row type (see `oxide-query-derive`)
//! - Expression and predicate trees that render SQL text together with their
//!   bind arguments in placeholder order
//! - Per-statement alias scopes with nested subquery resolution
//! - Dialects owning a function registry, so a new database product only
//!   overrides what it spells differently
//! - An executor seam for running the rendered statements
//!
//! ## Example
//!
//! ```rust,ignore
//! use oxide_query_core::ast::column;
//! use oxide_query_core::builder::{Delete, Statement};
//! use oxide_query_core::database::Database;
//! use oxide_query_core::dialect::AnsiDialect;
//! use oxide_query_core::scope::Alias;
//!
//! let db = Database::new(AnsiDialect::new()).with_default_schema("TEST");
//! let widget = Alias::<Widget>::new();
//!
//! let rendered = Delete::new(&widget)
//!     .where_clause(
//!         column(Widget::widget_id()).eq(2).and(
//!             column(Widget::description())
//!                 .between("C", column(Widget::name()))
//!                 .or(column(Widget::description()).is_null()),
//!         ),
//!     )
//!     .render(&db)?;
//!
//! // delete from TEST.WIDGET as WIDGET where WIDGET.WIDGET_ID = ? and
//! //   (WIDGET.DESCRIPTION between ? and WIDGET.NAME or WIDGET.DESCRIPTION is null)
//! // args: [2, "C"]
//! ```

pub mod ast;
pub mod builder;
pub mod concurrent;
pub mod database;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod function;
pub mod json;
pub mod schema;
pub mod scope;

pub use ast::{column, column_of, literal, value, BooleanExpression, Expr, Expression};
pub use builder::{Delete, Insert, Rendered, Select, SqlValue, Statement, Update};
pub use database::Database;
pub use dialect::Dialect;
pub use error::{QueryError, Result};
pub use executor::{SqlExecutor, SqlRow};
pub use schema::{Column, RowType, TableDef};
pub use scope::{Alias, Scope};
