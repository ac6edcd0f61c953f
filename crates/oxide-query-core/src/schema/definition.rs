//! Owned table definitions used for DDL.
//!
//! Unlike [`TableDef`], these are built at runtime (or deserialised from a
//! schema definition file) and can describe any table.

use serde::{Deserialize, Serialize};

use super::{DataType, ForeignKeyDef, TableDef};

/// A possibly schema-qualified table name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableName {
    /// Schema, falling back to the database default when `None`.
    #[serde(default)]
    pub schema: Option<String>,
    /// Table name.
    pub name: String,
}

impl TableName {
    /// Creates an unqualified table name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
        }
    }

    /// Sets the schema.
    #[must_use]
    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }
}

impl From<&TableDef> for TableName {
    fn from(table: &TableDef) -> Self {
        Self {
            schema: table.schema.map(str::to_string),
            name: table.name.to_string(),
        }
    }
}

/// A column in a `create table` statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Column name.
    pub name: String,
    /// SQL type.
    pub data_type: DataType,
    /// Whether NULL is allowed.
    #[serde(default)]
    pub nullable: bool,
}

impl ColumnDefinition {
    /// Creates a NOT NULL column.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: false,
        }
    }

    /// Allows NULL.
    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// A foreign-key constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyDefinition {
    /// Constraint name.
    pub name: String,
    /// Referencing columns.
    pub columns: Vec<String>,
    /// Referenced table.
    pub references: TableName,
    /// Referenced columns, paired with `columns`.
    pub referenced_columns: Vec<String>,
}

impl From<&ForeignKeyDef> for ForeignKeyDefinition {
    fn from(fk: &ForeignKeyDef) -> Self {
        Self {
            name: fk.name.to_string(),
            columns: fk.columns.iter().map(|c| (*c).to_string()).collect(),
            references: TableName {
                schema: fk.referenced_schema.map(str::to_string),
                name: fk.referenced_table.to_string(),
            },
            referenced_columns: fk
                .referenced_columns
                .iter()
                .map(|c| (*c).to_string())
                .collect(),
        }
    }
}

/// A table to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
    /// Table name.
    #[serde(flatten)]
    pub name: TableName,
    /// Columns in order.
    pub columns: Vec<ColumnDefinition>,
    /// Primary key columns.
    #[serde(default)]
    pub primary_key: Vec<String>,
    /// Foreign keys created with the table.
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyDefinition>,
}

impl TableDefinition {
    /// Creates a table definition with no columns.
    #[must_use]
    pub const fn new(name: TableName) -> Self {
        Self {
            name,
            columns: Vec::new(),
            primary_key: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    /// Adds a column.
    #[must_use]
    pub fn column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    /// Sets the primary key.
    #[must_use]
    pub fn primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a foreign key.
    #[must_use]
    pub fn foreign_key(mut self, foreign_key: ForeignKeyDefinition) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }
}

impl From<&TableDef> for TableDefinition {
    fn from(table: &TableDef) -> Self {
        Self {
            name: TableName::from(table),
            columns: table
                .columns
                .iter()
                .map(|c| ColumnDefinition {
                    name: c.name.to_string(),
                    data_type: c.data_type.clone(),
                    nullable: c.nullable,
                })
                .collect(),
            primary_key: table.primary_key.iter().map(|c| (*c).to_string()).collect(),
            foreign_keys: table.foreign_keys.iter().map(ForeignKeyDefinition::from).collect(),
        }
    }
}

/// An index to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDefinition {
    /// Index name.
    pub name: String,
    /// Indexed table.
    pub table: TableName,
    /// Indexed columns.
    pub columns: Vec<String>,
    /// Whether the index is unique.
    #[serde(default)]
    pub unique: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_definition_json() {
        let json = r#"{
            "schema": "TEST",
            "name": "WIDGET",
            "columns": [
                {"name": "WIDGET_ID", "data_type": "big_int"},
                {"name": "DESCRIPTION", "data_type": {"varchar": 200}, "nullable": true}
            ],
            "primary_key": ["WIDGET_ID"]
        }"#;
        let table: TableDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(table.name, TableName::new("WIDGET").in_schema("TEST"));
        assert_eq!(table.columns.len(), 2);
        assert!(table.columns[1].nullable);
        assert!(table.foreign_keys.is_empty());
    }
}
