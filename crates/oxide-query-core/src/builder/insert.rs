//! INSERT statements.

use super::value::SqlValue;
use super::{Rendered, Statement};
use crate::database::Database;
use crate::error::Result;
use crate::schema::RowType;

/// An INSERT of one or more rows of `R`, writing every column.
#[derive(Debug, Clone)]
pub struct Insert<R> {
    rows: Vec<Vec<SqlValue>>,
    _row: std::marker::PhantomData<fn() -> R>,
}

impl<R: RowType> Insert<R> {
    /// Creates an insert of one row.
    #[must_use]
    pub fn new(row: &R) -> Self {
        Self {
            rows: vec![row.values()],
            _row: std::marker::PhantomData,
        }
    }

    /// Creates an insert of several rows, or `None` when there are none.
    pub fn from_rows<'a, I>(rows: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a R>,
    {
        let rows: Vec<Vec<SqlValue>> = rows.into_iter().map(RowType::values).collect();
        if rows.is_empty() {
            None
        } else {
            Some(Self {
                rows,
                _row: std::marker::PhantomData,
            })
        }
    }

    /// Adds another row.
    #[must_use]
    pub fn row(mut self, row: &R) -> Self {
        self.rows.push(row.values());
        self
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Always false; an insert holds at least one row.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn render_rows(&self, database: &Database, rows: &[Vec<SqlValue>]) -> Rendered {
        let table = R::table();
        let columns: Vec<&str> = table.column_names().collect();
        let placeholders = format!(
            "({})",
            vec![SqlValue::placeholder(); columns.len()].join(", ")
        );
        let sql = format!(
            "insert into {} ({}) values {}",
            database.qualified_table_name(table),
            columns.join(", "),
            vec![placeholders; rows.len()].join(", ")
        );
        Rendered::new(sql, rows.iter().flatten().cloned().collect())
    }
}

impl<R: RowType> Statement for Insert<R> {
    /// Renders every row into one multi-row statement. Use
    /// [`Statement::render_batch`] for dialects without multi-row inserts.
    fn render(&self, database: &Database) -> Result<Rendered> {
        Ok(self.render_rows(database, &self.rows))
    }

    fn render_batch(&self, database: &Database) -> Result<Vec<Rendered>> {
        if database.dialect().supports_multi_insert() {
            Ok(vec![self.render(database)?])
        } else {
            Ok(self
                .rows
                .iter()
                .map(|row| self.render_rows(database, std::slice::from_ref(row)))
                .collect())
        }
    }
}
