//! SQLite dialect.

use super::Dialect;
use crate::builder::value::SqlValue;
use crate::builder::Rendered;
use crate::function::{
    DistinctFunction, FunctionName, FunctionRegistry, KeyValueFunction, SimpleFunction,
};
use crate::schema::{DataType, ForeignKeyDefinition, TableName};

/// SQLite.
///
/// SQLite has no schemas beyond attached databases, so table names are never
/// qualified.
#[derive(Debug, Clone)]
pub struct SqliteDialect {
    functions: FunctionRegistry,
}

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub fn new() -> Self {
        let functions = FunctionRegistry::ansi()
            .with(FunctionName::COUNT_BIG, SimpleFunction::new("count"))
            .with(
                FunctionName::COUNT_BIG_DISTINCT,
                DistinctFunction::new(SimpleFunction::new("count")),
            )
            .with(FunctionName::JSON_OBJECT, KeyValueFunction::new("json_object"));
        Self { functions }
    }
}

impl Default for SqliteDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    fn fetch_first(&self, sql: &str, rows: u64) -> String {
        format!("{sql} limit {rows}")
    }

    fn qualified_table_name(&self, table: &TableName) -> String {
        table.name.clone()
    }

    fn data_type(&self, data_type: &DataType) -> String {
        // Type affinities.
        match data_type {
            DataType::SmallInt | DataType::Integer | DataType::BigInt | DataType::Boolean => {
                "INTEGER".to_string()
            }
            DataType::Real | DataType::Double | DataType::Decimal { .. } => "REAL".to_string(),
            DataType::Char(_)
            | DataType::Varchar(_)
            | DataType::Text
            | DataType::Date
            | DataType::Time
            | DataType::Timestamp
            | DataType::TimestampWithTimeZone => "TEXT".to_string(),
            DataType::Blob => "BLOB".to_string(),
            DataType::Custom(name) => name.to_string(),
        }
    }

    fn add_foreign_key_sql(&self, _table: &TableName, _foreign_key: &ForeignKeyDefinition) -> String {
        // No `alter table ... add constraint`.
        String::new()
    }

    fn table_exists(&self, table: &TableName) -> Rendered {
        Rendered::new(
            "select count(*) from sqlite_master where type = 'table' and upper(name) = upper(?)",
            vec![SqlValue::Text(table.name.clone())],
        )
    }
}
