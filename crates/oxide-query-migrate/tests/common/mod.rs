#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use oxide_query_core::dialect::SqliteDialect;
use oxide_query_core::schema::{ForeignKeyDefinition, IndexDefinition, TableName};
use oxide_query_core::{Database, SqlExecutor, SqlRow, SqlValue};
use oxide_query_derive::Row;
use oxide_query_migrate::prelude::*;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

#[derive(Debug, Clone, PartialEq, Row)]
pub struct Part {
    #[column(primary_key)]
    pub part_id: i64,
    #[column(length = 100)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Row)]
pub struct Bin {
    #[column(primary_key)]
    pub bin_id: i64,
    #[column(references = "PART(PART_ID)")]
    pub part_id: i64,
    pub label: Option<String>,
}

/// One in-memory database; a single connection keeps it alive and shared.
pub async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap()
}

/// Counts statements passed to `update` before delegating.
#[derive(Debug)]
pub struct CountingExecutor {
    inner: SqliteExecutor,
    updates: AtomicUsize,
    statements: Mutex<Vec<String>>,
}

impl CountingExecutor {
    pub fn new(pool: SqlitePool) -> Arc<Self> {
        Arc::new(Self {
            inner: SqliteExecutor::new(pool),
            updates: AtomicUsize::new(0),
            statements: Mutex::new(Vec::new()),
        })
    }

    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn statements(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }

    pub fn reset(&self) {
        self.updates.store(0, Ordering::SeqCst);
        self.statements.lock().unwrap().clear();
    }
}

impl SqlExecutor for CountingExecutor {
    fn query<'a>(
        &'a self,
        sql: &'a str,
        args: &'a [SqlValue],
    ) -> BoxFuture<'a, oxide_query_core::Result<Vec<SqlRow>>> {
        self.inner.query(sql, args)
    }

    fn update<'a>(
        &'a self,
        sql: &'a str,
        args: &'a [SqlValue],
    ) -> BoxFuture<'a, oxide_query_core::Result<u64>> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.statements.lock().unwrap().push(sql.to_string());
        self.inner.update(sql, args)
    }
}

pub fn database() -> Database {
    Database::new(SqliteDialect::new())
}

pub fn context(executor: &Arc<CountingExecutor>) -> PipelineContext {
    PipelineContext::new(database(), executor.clone()).with_executed_by("ci")
}

/// Two tables, an index, a foreign key and seed data.
pub fn inventory() -> SchemaDefinition {
    SchemaDefinition::builder("inventory", "dba")
        .create_table_for::<Part>("part-table")
        .create_table_for::<Bin>("bin-table")
        .create_index(
            "bin-part-index",
            IndexDefinition {
                name: String::from("IX_BIN_PART"),
                table: TableName::new("BIN"),
                columns: vec![String::from("PART_ID")],
                unique: false,
            },
        )
        .add_foreign_key(
            "bin-part-fk",
            TableName::new("BIN"),
            ForeignKeyDefinition {
                name: String::from("FK_BIN_PART_CHECK"),
                columns: vec![String::from("PART_ID")],
                references: TableName::new("PART"),
                referenced_columns: vec![String::from("PART_ID")],
            },
        )
        .run_sql(
            "seed",
            "insert into PART (PART_ID, NAME) values (?, ?)",
            vec![SqlValue::Int(1), SqlValue::Text(String::from("bolt"))],
        )
        .build()
        .unwrap()
}

pub async fn table_exists(executor: &Arc<CountingExecutor>, table: &str) -> bool {
    database()
        .table_exists(executor.as_ref(), &TableName::new(table))
        .await
        .unwrap()
}

pub async fn row_count(pool: &SqlitePool, table: &str) -> i64 {
    let (count,): (i64,) = sqlx::query_as(&format!("select count(*) from {table}"))
        .fetch_one(pool)
        .await
        .unwrap();
    count
}
