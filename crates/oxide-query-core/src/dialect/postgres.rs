//! PostgreSQL dialect.

use super::{ansi_data_type, Dialect};
use crate::function::{
    DistinctFunction, FunctionName, FunctionRegistry, KeyValueFunction, SimpleFunction,
};
use crate::schema::DataType;

/// PostgreSQL.
#[derive(Debug, Clone)]
pub struct PostgresDialect {
    functions: FunctionRegistry,
}

impl PostgresDialect {
    /// Creates a new PostgreSQL dialect.
    #[must_use]
    pub fn new() -> Self {
        let functions = FunctionRegistry::ansi()
            .with(FunctionName::COUNT_BIG, SimpleFunction::new("count"))
            .with(
                FunctionName::COUNT_BIG_DISTINCT,
                DistinctFunction::new(SimpleFunction::new("count")),
            )
            .with(FunctionName::INSTR, SimpleFunction::new("strpos"))
            .with(FunctionName::JSON_OBJECT, KeyValueFunction::new("jsonb_build_object"));
        Self { functions }
    }
}

impl Default for PostgresDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    fn fetch_first(&self, sql: &str, rows: u64) -> String {
        format!("{sql} limit {rows}")
    }

    fn data_type(&self, data_type: &DataType) -> String {
        match data_type {
            DataType::Decimal { precision, scale } => format!("numeric({precision}, {scale})"),
            DataType::Text => "text".to_string(),
            DataType::Blob => "bytea".to_string(),
            DataType::TimestampWithTimeZone => "timestamptz".to_string(),
            other => ansi_data_type(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(dialect: &PostgresDialect, name: &FunctionName, args: &[&str]) -> String {
        let args: Vec<String> = args.iter().map(|a| (*a).to_string()).collect();
        dialect.function(name).unwrap().sql(&args).unwrap()
    }

    #[test]
    fn test_postgres_overrides() {
        let dialect = PostgresDialect::new();
        assert_eq!(render(&dialect, &FunctionName::COUNT_BIG, &["*"]), "count(*)");
        assert_eq!(
            render(&dialect, &FunctionName::COUNT_BIG_DISTINCT, &["W.NAME"]),
            "count(distinct W.NAME)"
        );
        assert_eq!(render(&dialect, &FunctionName::INSTR, &["W.NAME", "?"]), "strpos(W.NAME, ?)");
        assert_eq!(
            render(&dialect, &FunctionName::JSON_OBJECT, &["'a'", "W.NAME"]),
            "jsonb_build_object('a', W.NAME)"
        );
        assert_eq!(dialect.fetch_first("select 1", 5), "select 1 limit 5");
    }
}
