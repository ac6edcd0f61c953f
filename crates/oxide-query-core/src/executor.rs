//! The seam to a database driver.
//!
//! The core never opens connections. Callers supply a [`SqlExecutor`] that
//! runs rendered SQL and hands back labelled rows.

use futures::future::BoxFuture;

use crate::builder::value::{FromSqlValue, SqlValue};
use crate::error::{QueryError, Result};

/// Runs rendered statements.
pub trait SqlExecutor: Send + Sync {
    /// Runs a query and returns every row.
    fn query<'a>(&'a self, sql: &'a str, args: &'a [SqlValue]) -> BoxFuture<'a, Result<Vec<SqlRow>>>;

    /// Runs a statement and returns the affected row count.
    fn update<'a>(&'a self, sql: &'a str, args: &'a [SqlValue]) -> BoxFuture<'a, Result<u64>>;
}

/// Runs a query and maps each row.
///
/// # Errors
///
/// Fails when the executor or the mapper fails.
pub async fn query_as<T, F>(
    executor: &dyn SqlExecutor,
    sql: &str,
    args: &[SqlValue],
    mapper: F,
) -> Result<Vec<T>>
where
    F: FnMut(&SqlRow) -> Result<T>,
{
    executor.query(sql, args).await?.iter().map(mapper).collect()
}

/// One result row: values keyed by their column label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlRow {
    columns: Vec<(String, SqlValue)>,
}

impl SqlRow {
    /// Creates an empty row.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    /// Appends a column.
    pub fn push(&mut self, label: impl Into<String>, value: SqlValue) {
        self.columns.push((label.into(), value));
    }

    /// Appends a column, builder style.
    #[must_use]
    pub fn with(mut self, label: impl Into<String>, value: SqlValue) -> Self {
        self.push(label, value);
        self
    }

    /// The raw value under a label, compared case-insensitively.
    #[must_use]
    pub fn value(&self, label: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .find(|(l, _)| l.eq_ignore_ascii_case(label))
            .map(|(_, v)| v)
    }

    /// Reads the value under a label.
    ///
    /// # Errors
    ///
    /// Fails when the label is missing or the value does not convert.
    pub fn get<T: FromSqlValue>(&self, label: &str) -> Result<T> {
        let value = self.value(label).ok_or_else(|| QueryError::Conversion {
            label: label.to_string(),
            reason: String::from("no such column"),
        })?;
        convert(label, value)
    }

    /// Reads the value at a position.
    ///
    /// # Errors
    ///
    /// Fails when the index is out of range or the value does not convert.
    pub fn get_index<T: FromSqlValue>(&self, index: usize) -> Result<T> {
        let (label, value) = self.columns.get(index).ok_or_else(|| QueryError::Conversion {
            label: format!("#{index}"),
            reason: format!("row has {} columns", self.columns.len()),
        })?;
        convert(label, value)
    }

    /// Labels in column order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(l, _)| l.as_str())
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

fn convert<T: FromSqlValue>(label: &str, value: &SqlValue) -> Result<T> {
    T::from_sql_value(value).ok_or_else(|| QueryError::Conversion {
        label: label.to_string(),
        reason: format!(
            "cannot convert {} value to {}",
            value.kind(),
            std::any::type_name::<T>()
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_lookup() {
        let row = SqlRow::new()
            .with("w_WIDGET_ID", SqlValue::Int(7))
            .with("w_DESCRIPTION", SqlValue::Null);
        assert_eq!(row.get::<i64>("W_WIDGET_ID").unwrap(), 7);
        assert_eq!(row.get::<Option<String>>("w_DESCRIPTION").unwrap(), None);
        assert_eq!(row.get_index::<i64>(0).unwrap(), 7);
        assert_eq!(row.labels().collect::<Vec<_>>(), ["w_WIDGET_ID", "w_DESCRIPTION"]);
    }

    #[test]
    fn test_row_conversion_errors() {
        let row = SqlRow::new().with("NAME", SqlValue::Text(String::from("bolt")));
        let err = row.get::<i64>("NAME").unwrap_err();
        assert!(err.to_string().starts_with("cannot read column `NAME`"));
        assert!(row.get::<String>("MISSING").is_err());
        assert!(row.get_index::<String>(3).is_err());
    }
}
