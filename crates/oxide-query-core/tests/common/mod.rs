#![allow(dead_code)]

use std::sync::Mutex;

use futures::future::BoxFuture;
use oxide_query_core::dialect::{AnsiDialect, Db2Dialect, SqliteDialect};
use oxide_query_core::{Database, Rendered, Result, SqlExecutor, SqlRow, SqlValue};
use oxide_query_derive::Row;

#[derive(Debug, Clone, PartialEq, Row)]
pub struct Widget {
    #[column(primary_key)]
    pub widget_id: i64,
    #[column(length = 100)]
    pub name: String,
    #[column(length = 200)]
    pub description: Option<String>,
    #[column(references = "MANUFACTURER(MANUFACTURER_ID)")]
    pub manufacturer_id: i64,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Row)]
pub struct Manufacturer {
    #[column(primary_key)]
    pub manufacturer_id: i64,
    #[column(length = 100)]
    pub name: String,
}

/// Two foreign keys to the same parent.
#[derive(Debug, Clone, PartialEq, Row)]
pub struct Shipment {
    #[column(primary_key)]
    pub shipment_id: i64,
    #[column(
        references = "MANUFACTURER(MANUFACTURER_ID)",
        foreign_key = "FK_SHIPMENT_SENDER"
    )]
    pub sender_id: i64,
    #[column(
        references = "MANUFACTURER(MANUFACTURER_ID)",
        foreign_key = "FK_SHIPMENT_RECEIVER"
    )]
    pub receiver_id: Option<i64>,
}

pub fn widget(id: i64, name: &str) -> Widget {
    Widget {
        widget_id: id,
        name: name.to_string(),
        description: None,
        manufacturer_id: 7,
        quantity: 10,
    }
}

pub fn ansi() -> Database {
    Database::new(AnsiDialect::new()).with_default_schema("TEST")
}

pub fn db2() -> Database {
    Database::new(Db2Dialect::new()).with_default_schema("TEST")
}

pub fn sqlite() -> Database {
    Database::new(SqliteDialect::new())
}

pub fn placeholder_count(rendered: &Rendered) -> usize {
    rendered.sql.matches('?').count()
}

/// Records every call and answers queries with canned rows.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    rows: Vec<SqlRow>,
    affected: u64,
    calls: Mutex<Vec<(String, Vec<SqlValue>)>>,
}

impl RecordingExecutor {
    pub fn with_rows(rows: Vec<SqlRow>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn with_affected(affected: u64) -> Self {
        Self {
            affected,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(String, Vec<SqlValue>)> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, sql: &str, args: &[SqlValue]) {
        self.calls
            .lock()
            .unwrap()
            .push((sql.to_string(), args.to_vec()));
    }
}

impl SqlExecutor for RecordingExecutor {
    fn query<'a>(
        &'a self,
        sql: &'a str,
        args: &'a [SqlValue],
    ) -> BoxFuture<'a, Result<Vec<SqlRow>>> {
        self.record(sql, args);
        let rows = self.rows.clone();
        Box::pin(async move { Ok(rows) })
    }

    fn update<'a>(&'a self, sql: &'a str, args: &'a [SqlValue]) -> BoxFuture<'a, Result<u64>> {
        self.record(sql, args);
        let affected = self.affected;
        Box::pin(async move { Ok(affected) })
    }
}
