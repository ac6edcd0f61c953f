//! Row and column metadata.
//!
//! Row types describe their table with a static [`TableDef`], normally
//! generated by `#[derive(Row)]`. Each column is a zero-sized type
//! implementing [`Column`], so a column reference is checked against its row
//! type and value type at compile time.

mod definition;
mod types;

use std::any::TypeId;

pub use definition::{ColumnDefinition, ForeignKeyDefinition, IndexDefinition, TableDefinition, TableName};
pub use types::{DataType, SqlType};

use crate::builder::value::SqlValue;
use crate::error::Result;
use crate::executor::SqlRow;

/// A struct mapped onto one table.
pub trait RowType: Sized + 'static {
    /// Static table metadata.
    fn table() -> &'static TableDef;

    /// Column values in table column order.
    fn values(&self) -> Vec<SqlValue>;

    /// Builds a row from result columns labelled `<prefix>_<COLUMN>`.
    ///
    /// # Errors
    ///
    /// Fails when a column is missing or has an incompatible value.
    fn from_row(row: &SqlRow, prefix: &str) -> Result<Self>;

    /// Identity used when matching aliases against row types.
    #[must_use]
    fn row_id() -> TypeId {
        TypeId::of::<Self>()
    }
}

/// A column of a row type.
pub trait Column: Copy + 'static {
    /// The row type this column belongs to.
    type Row: RowType;

    /// The Rust type of this column.
    type Type: SqlType;

    /// The SQL column name.
    const NAME: &'static str;
}

/// Static table metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDef {
    /// Schema, falling back to the database default when `None`.
    pub schema: Option<&'static str>,
    /// Table name.
    pub name: &'static str,
    /// Columns in declaration order.
    pub columns: &'static [ColumnDef],
    /// Primary key columns.
    pub primary_key: &'static [&'static str],
    /// Foreign keys declared by this table.
    pub foreign_keys: &'static [ForeignKeyDef],
}

impl TableDef {
    /// Returns the column with the given name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column names in declaration order.
    pub fn column_names(&self) -> impl Iterator<Item = &'static str> {
        self.columns.iter().map(|c| c.name)
    }
}

/// Static column metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Column name.
    pub name: &'static str,
    /// SQL type.
    pub data_type: DataType,
    /// Whether NULL is allowed.
    pub nullable: bool,
}

/// Static foreign-key metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyDef {
    /// Constraint name.
    pub name: &'static str,
    /// Referencing columns of the declaring table.
    pub columns: &'static [&'static str],
    /// Schema of the referenced table.
    pub referenced_schema: Option<&'static str>,
    /// Referenced table name.
    pub referenced_table: &'static str,
    /// Referenced columns, paired with `columns`.
    pub referenced_columns: &'static [&'static str],
}

/// Label of a projected column: `<prefix>_<column>`, or the bare column name
/// for an empty prefix.
#[must_use]
pub fn column_label(prefix: &str, column: &str) -> String {
    if prefix.is_empty() {
        column.to_string()
    } else {
        format!("{prefix}_{column}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static WIDGET: TableDef = TableDef {
        schema: Some("TEST"),
        name: "WIDGET",
        columns: &[
            ColumnDef {
                name: "WIDGET_ID",
                data_type: DataType::BigInt,
                nullable: false,
            },
            ColumnDef {
                name: "NAME",
                data_type: DataType::Varchar(100),
                nullable: false,
            },
        ],
        primary_key: &["WIDGET_ID"],
        foreign_keys: &[],
    };

    #[test]
    fn test_table_def_lookup() {
        assert_eq!(WIDGET.column("NAME").map(|c| &c.data_type), Some(&DataType::Varchar(100)));
        assert!(WIDGET.column("MISSING").is_none());
        assert_eq!(WIDGET.column_names().collect::<Vec<_>>(), ["WIDGET_ID", "NAME"]);
    }

    #[test]
    fn test_column_label() {
        assert_eq!(column_label("w", "NAME"), "w_NAME");
        assert_eq!(column_label("", "NAME"), "NAME");
    }
}
