//! Metadata generated by `#[derive(Row)]`.

mod common;

use common::{widget, Manufacturer, ManufacturerColumns, Shipment, Widget, WidgetColumns};
use oxide_query_core::schema::{DataType, TableDefinition, TableName};
use oxide_query_core::{Column, QueryError, RowType, SqlRow, SqlValue};
use oxide_query_derive::Row;

// ============================================================================
// Table metadata
// ============================================================================

#[test]
fn test_default_table_and_column_names() {
    let table = Widget::table();
    assert_eq!(table.name, "WIDGET");
    assert_eq!(table.schema, None);
    assert_eq!(
        table.column_names().collect::<Vec<_>>(),
        vec!["WIDGET_ID", "NAME", "DESCRIPTION", "MANUFACTURER_ID", "QUANTITY"]
    );
    assert_eq!(table.primary_key, &["WIDGET_ID"]);
}

#[test]
fn test_column_types_and_nullability() {
    let table = Widget::table();
    let id = table.column("WIDGET_ID").unwrap();
    assert_eq!(id.data_type, DataType::BigInt);
    assert!(!id.nullable);

    let description = table.column("DESCRIPTION").unwrap();
    assert_eq!(description.data_type, DataType::Varchar(200));
    assert!(description.nullable);

    assert_eq!(
        table.column("QUANTITY").unwrap().data_type,
        DataType::Integer
    );
    assert!(table.column("MISSING").is_none());
}

#[test]
fn test_column_descriptors() {
    assert_eq!(WidgetColumns::WidgetId::NAME, "WIDGET_ID");
    assert_eq!(WidgetColumns::Description::NAME, "DESCRIPTION");
    assert_eq!(ManufacturerColumns::Name::NAME, "NAME");

    fn column_name<C: Column>(_column: C) -> &'static str {
        C::NAME
    }
    assert_eq!(column_name(Widget::manufacturer_id()), "MANUFACTURER_ID");
}

#[test]
fn test_default_foreign_key_name() {
    let fks = Widget::table().foreign_keys;
    assert_eq!(fks.len(), 1);
    assert_eq!(fks[0].name, "FK_WIDGET_MANUFACTURER");
    assert_eq!(fks[0].columns, &["MANUFACTURER_ID"]);
    assert_eq!(fks[0].referenced_table, "MANUFACTURER");
    assert_eq!(fks[0].referenced_columns, &["MANUFACTURER_ID"]);
    assert!(Manufacturer::table().foreign_keys.is_empty());
}

#[test]
fn test_named_foreign_keys() {
    let names: Vec<&str> = Shipment::table()
        .foreign_keys
        .iter()
        .map(|fk| fk.name)
        .collect();
    assert_eq!(names, vec!["FK_SHIPMENT_SENDER", "FK_SHIPMENT_RECEIVER"]);
}

#[derive(Debug, Clone, Row)]
#[table(name = "ORDER_LINE", schema = "SALES")]
struct Line {
    #[column(primary_key)]
    order_id: i64,
    #[column(primary_key, name = "LINE_NO")]
    line: i32,
    #[column(sql_type = "decimal(12, 2)")]
    amount: f64,
    #[column(
        references = "SALES.ORDER_HEADER(ORDER_ID)",
        foreign_key = "FK_LINE_HEADER"
    )]
    header_id: i64,
    #[column(
        references = "SALES.ORDER_HEADER(REVISION)",
        foreign_key = "FK_LINE_HEADER"
    )]
    header_revision: i32,
}

#[test]
fn test_explicit_table_attributes() {
    let table = Line::table();
    assert_eq!(table.schema, Some("SALES"));
    assert_eq!(table.name, "ORDER_LINE");
    assert_eq!(table.primary_key, &["ORDER_ID", "LINE_NO"]);
    assert_eq!(LineColumns::Line::NAME, "LINE_NO");
    assert_eq!(
        table.column("AMOUNT").unwrap().data_type,
        DataType::Custom("decimal(12, 2)".into())
    );
}

#[test]
fn test_composite_foreign_key() {
    let fks = Line::table().foreign_keys;
    assert_eq!(fks.len(), 1);
    assert_eq!(fks[0].columns, &["HEADER_ID", "HEADER_REVISION"]);
    assert_eq!(fks[0].referenced_schema, Some("SALES"));
    assert_eq!(fks[0].referenced_columns, &["ORDER_ID", "REVISION"]);
}

#[test]
fn test_table_definition_from_row_type() {
    let definition = TableDefinition::from(Line::table());
    assert_eq!(
        definition.name,
        TableName::new("ORDER_LINE").in_schema("SALES")
    );
    assert_eq!(definition.columns.len(), 5);
    assert_eq!(definition.foreign_keys[0].references.name, "ORDER_HEADER");
}

// ============================================================================
// Values
// ============================================================================

#[test]
fn test_values_in_column_order() {
    let mut row = widget(3, "gear");
    row.description = Some(String::from("steel"));
    assert_eq!(
        row.values(),
        vec![
            SqlValue::Int(3),
            SqlValue::Text(String::from("gear")),
            SqlValue::Text(String::from("steel")),
            SqlValue::Int(7),
            SqlValue::Int(10),
        ]
    );
}

#[test]
fn test_from_row_with_prefix() {
    let row = SqlRow::new()
        .with("w_WIDGET_ID", SqlValue::Int(3))
        .with("w_NAME", SqlValue::Text(String::from("gear")))
        .with("w_DESCRIPTION", SqlValue::Null)
        .with("w_MANUFACTURER_ID", SqlValue::Int(7))
        .with("w_QUANTITY", SqlValue::Int(10));

    assert_eq!(Widget::from_row(&row, "w").unwrap(), widget(3, "gear"));
}

#[test]
fn test_from_row_without_prefix() {
    let row = SqlRow::new()
        .with("MANUFACTURER_ID", SqlValue::Int(1))
        .with("NAME", SqlValue::Text(String::from("Acme")));
    let maker = Manufacturer::from_row(&row, "").unwrap();
    assert_eq!(maker.name, "Acme");
}

#[test]
fn test_from_row_missing_column() {
    let row = SqlRow::new().with("MANUFACTURER_ID", SqlValue::Int(1));
    let err = Manufacturer::from_row(&row, "").unwrap_err();
    assert!(matches!(err, QueryError::Conversion { ref label, .. } if label == "NAME"));
}
