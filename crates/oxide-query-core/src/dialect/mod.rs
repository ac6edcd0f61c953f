//! SQL dialect support.
//!
//! A [`Dialect`] varies the SQL text per database product: how functions are
//! spelled (through its [`FunctionRegistry`]), whether `in` lists need a
//! `values` keyword, planner hints, row limiting and DDL. Dialects are built
//! once at startup and shared read-only.

mod ansi;
mod db2;
mod postgres;
mod sqlite;

use std::fmt;
use std::sync::Arc;

pub use ansi::AnsiDialect;
pub use db2::Db2Dialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;

use crate::builder::value::SqlValue;
use crate::builder::Rendered;
use crate::error::{QueryError, Result};
use crate::function::{FunctionName, FunctionRegistry, FunctionSpec};
use crate::schema::{
    ColumnDefinition, DataType, ForeignKeyDefinition, IndexDefinition, TableDefinition, TableName,
};

/// Trait for SQL dialect-specific behavior.
///
/// Table names handed to the DDL methods are already qualified with the
/// database's default schema where one applies.
pub trait Dialect: Send + Sync + fmt::Debug {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// The function renderers of this dialect.
    fn functions(&self) -> &FunctionRegistry;

    /// Looks up a function renderer.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnsupportedFunction`] for unregistered names.
    fn function(&self, name: &FunctionName) -> Result<&Arc<dyn FunctionSpec>> {
        self.functions()
            .get(name)
            .ok_or_else(|| QueryError::UnsupportedFunction {
                function: name.to_string(),
                dialect: self.name(),
            })
    }

    /// Whether `in` lists must be written `in (values ...)`.
    fn requires_in_values(&self) -> bool {
        false
    }

    /// Whether one `insert` may carry several rows.
    fn supports_multi_insert(&self) -> bool {
        true
    }

    /// Planner hint appended to a query, empty when unsupported.
    fn selectivity(&self, _selectivity: f64) -> String {
        String::new()
    }

    /// Limits a query to its first `rows` rows.
    fn fetch_first(&self, sql: &str, rows: u64) -> String {
        format!("{sql} fetch first {rows} rows only")
    }

    /// Joins already rendered operands into a string concatenation.
    fn concat(&self, parts: &[String]) -> String {
        parts.join(" || ")
    }

    /// `schema.name`, or `name` without a schema.
    fn qualified_table_name(&self, table: &TableName) -> String {
        match &table.schema {
            Some(schema) => format!("{schema}.{}", table.name),
            None => table.name.clone(),
        }
    }

    /// A table reference carrying an alias.
    fn table_with_alias(&self, table: &str, alias: &str) -> String {
        format!("{table} as {alias}")
    }

    /// Spelling of a column type.
    fn data_type(&self, data_type: &DataType) -> String {
        ansi_data_type(data_type)
    }

    /// `NAME type [not null]`
    fn column_definition_sql(&self, column: &ColumnDefinition) -> String {
        let mut sql = format!("{} {}", column.name, self.data_type(&column.data_type));
        if !column.nullable {
            sql.push_str(" not null");
        }
        sql
    }

    /// `constraint NAME foreign key (COLS) references TABLE (COLS)`
    fn foreign_key_constraint_sql(&self, foreign_key: &ForeignKeyDefinition) -> String {
        format!(
            "constraint {} foreign key ({}) references {} ({})",
            foreign_key.name,
            foreign_key.columns.join(", "),
            self.qualified_table_name(&foreign_key.references),
            foreign_key.referenced_columns.join(", ")
        )
    }

    /// `create table` with columns, primary key and foreign keys.
    fn create_table_sql(&self, table: &TableDefinition) -> String {
        let mut parts: Vec<String> = table
            .columns
            .iter()
            .map(|c| self.column_definition_sql(c))
            .collect();
        if !table.primary_key.is_empty() {
            parts.push(format!("primary key ({})", table.primary_key.join(", ")));
        }
        parts.extend(
            table
                .foreign_keys
                .iter()
                .map(|fk| self.foreign_key_constraint_sql(fk)),
        );
        format!(
            "create table {} ({})",
            self.qualified_table_name(&table.name),
            parts.join(", ")
        )
    }

    /// Adds a foreign key to an existing table.
    ///
    /// A blank result means the product cannot do this and the action is
    /// skipped.
    fn add_foreign_key_sql(&self, table: &TableName, foreign_key: &ForeignKeyDefinition) -> String {
        format!(
            "alter table {} add {}",
            self.qualified_table_name(table),
            self.foreign_key_constraint_sql(foreign_key)
        )
    }

    /// `create [unique] index NAME on TABLE (COLS)`
    fn create_index_sql(&self, index: &IndexDefinition) -> String {
        format!(
            "create {}index {} on {} ({})",
            if index.unique { "unique " } else { "" },
            index.name,
            self.qualified_table_name(&index.table),
            index.columns.join(", ")
        )
    }

    /// `drop table NAME`
    fn drop_table_sql(&self, table: &TableName) -> String {
        format!("drop table {}", self.qualified_table_name(table))
    }

    /// A query returning a single count, non-zero when the table exists.
    fn table_exists(&self, table: &TableName) -> Rendered {
        match &table.schema {
            Some(schema) => Rendered::new(
                "select count(*) from information_schema.tables \
                 where upper(table_schema) = upper(?) and upper(table_name) = upper(?)",
                vec![
                    SqlValue::Text(schema.clone()),
                    SqlValue::Text(table.name.clone()),
                ],
            ),
            None => Rendered::new(
                "select count(*) from information_schema.tables where upper(table_name) = upper(?)",
                vec![SqlValue::Text(table.name.clone())],
            ),
        }
    }
}

/// Standard spelling of a column type.
#[must_use]
pub fn ansi_data_type(data_type: &DataType) -> String {
    match data_type {
        DataType::SmallInt => "smallint".to_string(),
        DataType::Integer => "integer".to_string(),
        DataType::BigInt => "bigint".to_string(),
        DataType::Real => "real".to_string(),
        DataType::Double => "double precision".to_string(),
        DataType::Decimal { precision, scale } => format!("decimal({precision}, {scale})"),
        DataType::Char(len) => format!("char({len})"),
        DataType::Varchar(len) => format!("varchar({len})"),
        DataType::Text => "clob".to_string(),
        DataType::Blob => "blob".to_string(),
        DataType::Date => "date".to_string(),
        DataType::Time => "time".to_string(),
        DataType::Timestamp => "timestamp".to_string(),
        DataType::TimestampWithTimeZone => "timestamp with time zone".to_string(),
        DataType::Boolean => "boolean".to_string(),
        DataType::Custom(name) => name.to_string(),
    }
}
