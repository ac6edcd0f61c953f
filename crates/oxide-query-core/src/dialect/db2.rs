//! Db2 dialect.

use super::{ansi_data_type, Dialect};
use crate::builder::value::SqlValue;
use crate::builder::Rendered;
use crate::function::FunctionRegistry;
use crate::schema::{DataType, TableName};

/// IBM Db2.
///
/// Db2 refuses a bare value list after `in` in some positions, so lists are
/// written `in (values ...)`. Comparisons may carry a selectivity hint.
#[derive(Debug, Clone)]
pub struct Db2Dialect {
    functions: FunctionRegistry,
}

impl Db2Dialect {
    /// Creates a new Db2 dialect.
    #[must_use]
    pub fn new() -> Self {
        Self {
            functions: FunctionRegistry::ansi(),
        }
    }
}

impl Default for Db2Dialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for Db2Dialect {
    fn name(&self) -> &'static str {
        "db2"
    }

    fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    fn requires_in_values(&self) -> bool {
        true
    }

    fn selectivity(&self, selectivity: f64) -> String {
        format!(" selectivity {selectivity:.6}")
    }

    fn data_type(&self, data_type: &DataType) -> String {
        match data_type {
            DataType::Double => "double".to_string(),
            DataType::TimestampWithTimeZone => "timestamp".to_string(),
            DataType::Boolean => "smallint".to_string(),
            other => ansi_data_type(other),
        }
    }

    fn table_exists(&self, table: &TableName) -> Rendered {
        match &table.schema {
            Some(schema) => Rendered::new(
                "select count(*) from syscat.tables where tabschema = upper(?) and tabname = upper(?)",
                vec![
                    SqlValue::Text(schema.clone()),
                    SqlValue::Text(table.name.clone()),
                ],
            ),
            None => Rendered::new(
                "select count(*) from syscat.tables where tabschema = current schema and tabname = upper(?)",
                vec![SqlValue::Text(table.name.clone())],
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db2_dialect() {
        let dialect = Db2Dialect::new();
        assert!(dialect.requires_in_values());
        assert_eq!(dialect.selectivity(0.25), " selectivity 0.250000");
        assert_eq!(dialect.data_type(&DataType::TimestampWithTimeZone), "timestamp");
    }

    #[test]
    fn test_table_exists() {
        let dialect = Db2Dialect::new();
        let probe = dialect.table_exists(&TableName::new("WIDGET").in_schema("TEST"));
        assert!(probe.sql.contains("syscat.tables"));
        assert_eq!(probe.args.len(), 2);
    }
}
