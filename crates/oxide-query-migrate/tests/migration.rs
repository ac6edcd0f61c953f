//! Applying schema definitions against in-memory SQLite.

mod common;

use std::io::Write;

use common::{context, database, inventory, memory_pool, row_count, table_exists, CountingExecutor};
use oxide_query_core::schema::{ColumnDefinition, DataType, TableDefinition, TableName};
use oxide_query_core::SqlValue;
use oxide_query_migrate::log;
use oxide_query_migrate::prelude::*;

// ============================================================================
// Applying
// ============================================================================

#[tokio::test]
async fn test_first_run_creates_tables_and_log() {
    let pool = memory_pool().await;
    let executor = CountingExecutor::new(pool.clone());
    let generator = SchemaGenerator::new(context(&executor));

    let report = generator.generate(&[inventory()]).await.unwrap();

    assert!(table_exists(&executor, "SCHEMA_ACTION_LOG").await);
    assert!(table_exists(&executor, "PART").await);
    assert!(table_exists(&executor, "BIN").await);
    assert_eq!(row_count(&pool, "PART").await, 1);
    // Every logged action, including the blank foreign key.
    assert_eq!(row_count(&pool, "SCHEMA_ACTION_LOG").await, 5);
    // Log table, four statements, five log rows.
    assert_eq!(executor.updates(), 10);
    assert_eq!(report.statements.len(), 11);
    assert_eq!(report.executable().count(), 10);
}

#[tokio::test]
async fn test_log_row_follows_its_action() {
    let pool = memory_pool().await;
    let executor = CountingExecutor::new(pool);
    SchemaGenerator::new(context(&executor))
        .generate(&[inventory()])
        .await
        .unwrap();

    let statements = executor.statements();
    assert!(statements[0].starts_with("create table SCHEMA_ACTION_LOG"));
    assert!(statements[1].starts_with("create table PART"));
    assert!(statements[2].starts_with("insert into SCHEMA_ACTION_LOG"));
    assert!(statements[3].starts_with("create table BIN"));
    assert!(statements[4].starts_with("insert into SCHEMA_ACTION_LOG"));
}

#[tokio::test]
async fn test_replay_executes_nothing() {
    let pool = memory_pool().await;
    let executor = CountingExecutor::new(pool.clone());
    let generator = SchemaGenerator::new(context(&executor));

    generator.generate(&[inventory()]).await.unwrap();
    executor.reset();

    let report = generator.generate(&[inventory()]).await.unwrap();

    assert_eq!(executor.updates(), 0);
    assert!(report.statements.is_empty());
    assert_eq!(row_count(&pool, "SCHEMA_ACTION_LOG").await, 5);
    assert_eq!(row_count(&pool, "PART").await, 1);
}

#[tokio::test]
async fn test_new_actions_run_on_replay() {
    let pool = memory_pool().await;
    let executor = CountingExecutor::new(pool.clone());
    let generator = SchemaGenerator::new(context(&executor));
    generator.generate(&[inventory()]).await.unwrap();
    executor.reset();

    let extended = SchemaDefinition::builder("inventory", "dba")
        .create_table_for::<common::Part>("part-table")
        .run_sql(
            "more-parts",
            "insert into PART (PART_ID, NAME) values (?, ?)",
            vec![SqlValue::Int(2), SqlValue::Text(String::from("nut"))],
        )
        .build()
        .unwrap();
    generator.generate(&[extended]).await.unwrap();

    // The insert and its log row.
    assert_eq!(executor.updates(), 2);
    assert_eq!(row_count(&pool, "PART").await, 2);
    assert_eq!(row_count(&pool, "SCHEMA_ACTION_LOG").await, 6);
}

#[tokio::test]
async fn test_failure_stops_and_is_not_logged() {
    let pool = memory_pool().await;
    let executor = CountingExecutor::new(pool.clone());
    let definition = SchemaDefinition::builder("broken", "dba")
        .create_table_for::<common::Part>("part-table")
        .run_sql("bad", "insert into MISSING (ID) values (?)", vec![SqlValue::Int(1)])
        .create_table_for::<common::Bin>("bin-table")
        .build()
        .unwrap();

    let err = SchemaGenerator::new(context(&executor))
        .generate(&[definition])
        .await
        .unwrap_err();

    match &err {
        MigrateError::ActionFailed { definition, action, .. } => {
            assert_eq!(definition, "broken");
            assert_eq!(action, "bad");
        }
        other => panic!("unexpected error {other}"),
    }
    assert!(err.to_string().starts_with("action `broken/bad` failed"));
    assert!(table_exists(&executor, "PART").await);
    assert!(!table_exists(&executor, "BIN").await);

    let entries = log::entries(&database(), executor.as_ref(), Some("broken")).await.unwrap();
    let ids: Vec<&str> = entries.iter().map(|e| e.action_id.as_str()).collect();
    assert_eq!(ids, vec!["part-table"]);
}

#[tokio::test]
async fn test_unlogged_action_runs_every_time() {
    let pool = memory_pool().await;
    let executor = CountingExecutor::new(pool.clone());
    let definition = SchemaDefinition::builder("ticks", "dba")
        .create_table(
            "tick-table",
            TableDefinition::new(TableName::new("TICK"))
                .column(ColumnDefinition::new("N", DataType::Integer)),
        )
        .run_sql_always("tick", "insert into TICK (N) values (?)", vec![SqlValue::Int(1)])
        .build()
        .unwrap();
    let generator = SchemaGenerator::new(context(&executor));

    generator.generate(std::slice::from_ref(&definition)).await.unwrap();
    generator.generate(std::slice::from_ref(&definition)).await.unwrap();

    assert_eq!(row_count(&pool, "TICK").await, 2);
    assert_eq!(row_count(&pool, "SCHEMA_ACTION_LOG").await, 1);
}

// ============================================================================
// Dry run
// ============================================================================

#[tokio::test]
async fn test_dry_run_touches_nothing() {
    let pool = memory_pool().await;
    let executor = CountingExecutor::new(pool);
    let generator = SchemaGenerator::new(context(&executor).with_dry_run(true));

    let report = generator.generate(&[inventory()]).await.unwrap();

    assert_eq!(executor.updates(), 0);
    assert!(!table_exists(&executor, "SCHEMA_ACTION_LOG").await);
    assert!(!table_exists(&executor, "PART").await);
    let sql: Vec<&str> = report.executable().map(|s| s.sql.as_str()).collect();
    assert!(sql[0].starts_with("create table SCHEMA_ACTION_LOG"));
    assert!(sql.iter().any(|s| s.starts_with("create table PART")));
    assert!(sql.iter().any(|s| s.starts_with("create index IX_BIN_PART")));
}

#[tokio::test]
async fn test_dry_run_after_apply_shows_nothing() {
    let pool = memory_pool().await;
    let executor = CountingExecutor::new(pool);
    SchemaGenerator::new(context(&executor))
        .generate(&[inventory()])
        .await
        .unwrap();
    executor.reset();

    let report = SchemaGenerator::new(context(&executor).with_dry_run(true))
        .generate(&[inventory()])
        .await
        .unwrap();

    assert!(report.statements.is_empty());
    assert_eq!(executor.updates(), 0);
}

// ============================================================================
// Action log
// ============================================================================

#[tokio::test]
async fn test_log_entries_read_back() {
    let pool = memory_pool().await;
    let executor = CountingExecutor::new(pool);
    SchemaGenerator::new(context(&executor))
        .generate(&[inventory()])
        .await
        .unwrap();

    let entries = log::entries(&database(), executor.as_ref(), Some("inventory")).await.unwrap();
    let mut ids: Vec<&str> = entries.iter().map(|e| e.action_id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["bin-part-fk", "bin-part-index", "bin-table", "part-table", "seed"]);
    assert!(entries.iter().all(|e| e.executed_by == "ci" && e.author == "dba"));

    let others = log::entries(&database(), executor.as_ref(), Some("other")).await.unwrap();
    assert!(others.is_empty());
}

#[tokio::test]
async fn test_is_logged() {
    let pool = memory_pool().await;
    let executor = CountingExecutor::new(pool);
    SchemaGenerator::new(context(&executor))
        .generate(&[inventory()])
        .await
        .unwrap();

    let db = database();
    assert!(log::is_logged(&db, executor.as_ref(), &ActionMeta::new("inventory", "seed", "dba"))
        .await
        .unwrap());
    assert!(!log::is_logged(&db, executor.as_ref(), &ActionMeta::new("inventory", "nope", "dba"))
        .await
        .unwrap());
}

// ============================================================================
// Definition files
// ============================================================================

const GADGETS: &str = r#"{
    "id": "gadgets",
    "author": "ops",
    "actions": [
        {
            "id": "gadget-table",
            "type": "create_table",
            "table": {
                "name": "GADGET",
                "columns": [
                    {"name": "GADGET_ID", "data_type": "big_int"},
                    {"name": "NAME", "data_type": {"varchar": 50}, "nullable": true}
                ],
                "primary_key": ["GADGET_ID"]
            }
        },
        {"id": "seed", "type": "sql", "sql": "insert into GADGET (GADGET_ID, NAME) values (?, ?)", "args": [7, "lever"]}
    ]
}"#;

#[tokio::test]
async fn test_definitions_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gadgets.json");
    std::fs::File::create(&path)
        .unwrap()
        .write_all(GADGETS.as_bytes())
        .unwrap();

    let definitions = SchemaDefinition::load_all([&path]).unwrap();
    let pool = memory_pool().await;
    let executor = CountingExecutor::new(pool.clone());
    SchemaGenerator::new(context(&executor))
        .generate(&definitions)
        .await
        .unwrap();

    assert_eq!(row_count(&pool, "GADGET").await, 1);
    let entries = log::entries(&database(), executor.as_ref(), None).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.definition_id == "gadgets" && e.author == "ops"));
}

#[test]
fn test_load_all_reports_every_failure() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.json");
    let bad = dir.path().join("bad.json");
    std::fs::write(&good, GADGETS).unwrap();
    std::fs::write(&bad, "{\"id\": ").unwrap();
    let missing = dir.path().join("missing.json");

    let err = SchemaDefinition::load_all([&good, &bad, &missing]).unwrap_err();
    match err {
        MigrateError::Multiple(errors) => {
            assert_eq!(errors.len(), 2);
            assert!(matches!(errors[0], MigrateError::Serialization(_)));
            assert!(matches!(errors[1], MigrateError::Io(_)));
        }
        other => panic!("unexpected error {other}"),
    }
}
