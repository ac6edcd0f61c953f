//! Rendering of DELETE, INSERT and UPDATE statements.

mod common;

use common::{ansi, placeholder_count, widget, Widget};
use oxide_query_core::dialect::Dialect;
use oxide_query_core::function::FunctionRegistry;
use oxide_query_core::{column, Alias, Database, Delete, Insert, SqlValue, Statement, Update};

// ============================================================================
// DELETE
// ============================================================================

#[test]
fn test_delete_with_nested_predicates() {
    let db = ansi();
    let widget = Alias::<Widget>::new();

    let rendered = Delete::new(&widget)
        .where_clause(
            column(Widget::widget_id()).eq(2_i64).and(
                column(Widget::description())
                    .between("C", column(Widget::name()))
                    .or(column(Widget::description()).is_null()),
            ),
        )
        .render(&db)
        .unwrap();

    assert_eq!(
        rendered.sql,
        "delete from TEST.WIDGET as WIDGET where WIDGET.WIDGET_ID = ? and \
         (WIDGET.DESCRIPTION between ? and WIDGET.NAME or WIDGET.DESCRIPTION is null)"
    );
    assert_eq!(
        rendered.args,
        vec![SqlValue::Int(2), SqlValue::Text(String::from("C"))]
    );
    assert_eq!(placeholder_count(&rendered), rendered.args.len());
}

#[test]
fn test_delete_without_where() {
    let db = ansi();
    let widget = Alias::<Widget>::named("w");
    let rendered = Delete::new(&widget).render(&db).unwrap();
    assert_eq!(rendered.sql, "delete from TEST.WIDGET as w");
    assert!(rendered.args.is_empty());
}

#[test]
fn test_delete_explicit_schema_wins() {
    let db = Database::new(oxide_query_core::dialect::AnsiDialect::new());
    let widget = Alias::<Widget>::new();
    let rendered = Delete::new(&widget)
        .where_clause(column(Widget::quantity()).lt(0_i32))
        .render(&db)
        .unwrap();
    assert_eq!(
        rendered.sql,
        "delete from WIDGET as WIDGET where WIDGET.QUANTITY < ?"
    );
}

#[test]
fn test_render_is_deterministic() {
    let db = ansi();
    let widget = Alias::<Widget>::new();
    let delete = Delete::new(&widget).where_clause(
        column(Widget::name())
            .like("bolt%")
            .or(column(Widget::widget_id()).in_list([1_i64, 2, 3])),
    );
    assert_eq!(delete.render(&db).unwrap(), delete.render(&db).unwrap());
}

// ============================================================================
// INSERT
// ============================================================================

#[test]
fn test_insert_single_row() {
    let db = ansi();
    let rendered = Insert::new(&widget(1, "bolt")).render(&db).unwrap();
    assert_eq!(
        rendered.sql,
        "insert into TEST.WIDGET (WIDGET_ID, NAME, DESCRIPTION, MANUFACTURER_ID, QUANTITY) \
         values (?, ?, ?, ?, ?)"
    );
    assert_eq!(
        rendered.args,
        vec![
            SqlValue::Int(1),
            SqlValue::Text(String::from("bolt")),
            SqlValue::Null,
            SqlValue::Int(7),
            SqlValue::Int(10),
        ]
    );
}

#[test]
fn test_insert_multiple_rows() {
    let db = ansi();
    let rows = [widget(1, "bolt"), widget(2, "nut")];
    let insert = Insert::from_rows(&rows).unwrap();
    assert_eq!(insert.len(), 2);

    let rendered = insert.render(&db).unwrap();
    assert!(rendered
        .sql
        .ends_with("values (?, ?, ?, ?, ?), (?, ?, ?, ?, ?)"));
    assert_eq!(rendered.args.len(), 10);
    assert_eq!(placeholder_count(&rendered), 10);
    assert_eq!(rendered.args[5], SqlValue::Int(2));
}

#[test]
fn test_insert_from_no_rows() {
    let rows: Vec<Widget> = Vec::new();
    assert!(Insert::from_rows(&rows).is_none());
}

#[derive(Debug)]
struct SingleRowInsertDialect {
    functions: FunctionRegistry,
}

impl Dialect for SingleRowInsertDialect {
    fn name(&self) -> &'static str {
        "single-row"
    }

    fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    fn supports_multi_insert(&self) -> bool {
        false
    }
}

#[test]
fn test_insert_batch_without_multi_row_support() {
    let db = Database::new(SingleRowInsertDialect {
        functions: FunctionRegistry::ansi(),
    });
    let insert = Insert::new(&widget(1, "bolt")).row(&widget(2, "nut"));

    let batch = insert.render_batch(&db).unwrap();
    assert_eq!(batch.len(), 2);
    for (rendered, id) in batch.iter().zip([1, 2]) {
        assert!(rendered.sql.ends_with("values (?, ?, ?, ?, ?)"));
        assert_eq!(rendered.args[0], SqlValue::Int(id));
    }
}

// ============================================================================
// UPDATE
// ============================================================================

#[test]
fn test_update_set_and_where() {
    let db = ansi();
    let widget = Alias::<Widget>::new();

    let rendered = Update::new(&widget)
        .set(Widget::quantity(), column(Widget::quantity()).plus(1_i32))
        .set(Widget::description(), "spare")
        .where_clause(column(Widget::widget_id()).eq(1_i64))
        .render(&db)
        .unwrap();

    assert_eq!(
        rendered.sql,
        "update TEST.WIDGET as WIDGET set QUANTITY = WIDGET.QUANTITY + ?, DESCRIPTION = ? \
         where WIDGET.WIDGET_ID = ?"
    );
    assert_eq!(
        rendered.args,
        vec![
            SqlValue::Int(1),
            SqlValue::Text(String::from("spare")),
            SqlValue::Int(1),
        ]
    );
}
