//! [`SqlExecutor`] over a `sqlx` SQLite pool.

use futures::future::BoxFuture;
use oxide_query_core::error::ExecutionError;
use oxide_query_core::{SqlExecutor, SqlRow, SqlValue};
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqlitePool, SqliteRow};
use sqlx::{Column, Row, Sqlite, TypeInfo, ValueRef};

/// Runs statements on a SQLite pool.
#[derive(Debug, Clone)]
pub struct SqliteExecutor {
    pool: SqlitePool,
}

impl SqliteExecutor {
    /// Wraps a pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl SqliteExecutor {
    async fn fetch_rows(&self, sql: &str, args: &[SqlValue]) -> oxide_query_core::Result<Vec<SqlRow>> {
        let rows = bind_all(sqlx::query(sql), args)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ExecutionError::new(sql, e))?;
        let mut decoded = Vec::with_capacity(rows.len());
        for row in &rows {
            decoded.push(decode_row(row).map_err(|e| ExecutionError::new(sql, e))?);
        }
        Ok(decoded)
    }

    async fn execute_update(&self, sql: &str, args: &[SqlValue]) -> oxide_query_core::Result<u64> {
        let result = bind_all(sqlx::query(sql), args)
            .execute(&self.pool)
            .await
            .map_err(|e| ExecutionError::new(sql, e))?;
        Ok(result.rows_affected())
    }
}

impl SqlExecutor for SqliteExecutor {
    fn query<'a>(
        &'a self,
        sql: &'a str,
        args: &'a [SqlValue],
    ) -> BoxFuture<'a, oxide_query_core::Result<Vec<SqlRow>>> {
        Box::pin(self.fetch_rows(sql, args))
    }

    fn update<'a>(&'a self, sql: &'a str, args: &'a [SqlValue]) -> BoxFuture<'a, oxide_query_core::Result<u64>> {
        Box::pin(self.execute_update(sql, args))
    }
}

fn bind_all<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    args: &[SqlValue],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for arg in args {
        query = match arg.clone() {
            SqlValue::Null => query.bind(Option::<i64>::None),
            SqlValue::Bool(b) => query.bind(b),
            SqlValue::Int(i) => query.bind(i),
            SqlValue::Float(f) => query.bind(f),
            SqlValue::Text(s) => query.bind(s),
            SqlValue::Blob(b) => query.bind(b),
            // Stored as text so the column reads back with the same format.
            SqlValue::Timestamp(ts) => query.bind(ts.to_rfc3339()),
        };
    }
    query
}

/// Reads a row by storage class; SQLite values carry no declared type.
fn decode_row(row: &SqliteRow) -> Result<SqlRow, sqlx::Error> {
    let mut decoded = SqlRow::new();
    for (index, column) in row.columns().iter().enumerate() {
        let raw = row.try_get_raw(index)?;
        let value = if raw.is_null() {
            SqlValue::Null
        } else {
            let storage = raw.type_info().name().to_string();
            match storage.as_str() {
                "INTEGER" | "BOOLEAN" => SqlValue::Int(row.try_get_unchecked::<i64, _>(index)?),
                "REAL" => SqlValue::Float(row.try_get_unchecked::<f64, _>(index)?),
                "BLOB" => SqlValue::Blob(row.try_get_unchecked::<Vec<u8>, _>(index)?),
                _ => SqlValue::Text(row.try_get_unchecked::<String, _>(index)?),
            }
        };
        decoded.push(column.name(), value);
    }
    Ok(decoded)
}
