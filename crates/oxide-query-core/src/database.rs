//! The render and execution target: a dialect plus per-database settings.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::builder::{Rendered, Statement};
use crate::dialect::Dialect;
use crate::error::Result;
use crate::executor::{SqlExecutor, SqlRow};
use crate::json::{JsonProvider, SerdeJsonProvider};
use crate::schema::{
    ForeignKeyDefinition, IndexDefinition, RowType, TableDef, TableDefinition, TableName,
};

/// A database as seen by the renderer.
///
/// Holds the dialect, the schema that unqualified tables fall back to, and
/// the JSON provider. Cheap to clone and shared read-only.
#[derive(Clone)]
pub struct Database {
    dialect: Arc<dyn Dialect>,
    default_schema: Option<String>,
    json: Arc<dyn JsonProvider>,
}

impl Database {
    /// Creates a database without a default schema.
    pub fn new(dialect: impl Dialect + 'static) -> Self {
        Self {
            dialect: Arc::new(dialect),
            default_schema: None,
            json: Arc::new(SerdeJsonProvider::new()),
        }
    }

    /// Sets the schema used for tables that do not name one.
    #[must_use]
    pub fn with_default_schema(mut self, schema: impl Into<String>) -> Self {
        self.default_schema = Some(schema.into());
        self
    }

    /// Replaces the JSON provider.
    #[must_use]
    pub fn with_json_provider(mut self, json: impl JsonProvider + 'static) -> Self {
        self.json = Arc::new(json);
        self
    }

    /// The dialect.
    #[must_use]
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// The default schema.
    #[must_use]
    pub fn default_schema(&self) -> Option<&str> {
        self.default_schema.as_deref()
    }

    /// The JSON provider.
    #[must_use]
    pub fn json(&self) -> &dyn JsonProvider {
        self.json.as_ref()
    }

    /// Fills in the default schema.
    #[must_use]
    pub fn qualify(&self, table: &TableName) -> TableName {
        TableName {
            schema: table.schema.clone().or_else(|| self.default_schema.clone()),
            name: table.name.clone(),
        }
    }

    /// The table name as written in statements.
    #[must_use]
    pub fn qualified_table_name(&self, table: &TableDef) -> String {
        self.dialect
            .qualified_table_name(&self.qualify(&TableName::from(table)))
    }

    /// `create table` for a definition.
    #[must_use]
    pub fn create_table_sql(&self, table: &TableDefinition) -> Rendered {
        let mut table = table.clone();
        table.name = self.qualify(&table.name);
        for fk in &mut table.foreign_keys {
            fk.references = self.qualify(&fk.references);
        }
        Rendered::sql(self.dialect.create_table_sql(&table))
    }

    /// `create table` for a row type.
    #[must_use]
    pub fn create_table_sql_for<R: RowType>(&self) -> Rendered {
        self.create_table_sql(&TableDefinition::from(R::table()))
    }

    /// `create index`
    #[must_use]
    pub fn create_index_sql(&self, index: &IndexDefinition) -> Rendered {
        let mut index = index.clone();
        index.table = self.qualify(&index.table);
        Rendered::sql(self.dialect.create_index_sql(&index))
    }

    /// `alter table ... add constraint ... foreign key`, blank where the
    /// dialect cannot add constraints later.
    #[must_use]
    pub fn add_foreign_key_sql(&self, table: &TableName, foreign_key: &ForeignKeyDefinition) -> Rendered {
        let mut foreign_key = foreign_key.clone();
        foreign_key.references = self.qualify(&foreign_key.references);
        Rendered::sql(
            self.dialect
                .add_foreign_key_sql(&self.qualify(table), &foreign_key),
        )
    }

    /// `drop table`
    #[must_use]
    pub fn drop_table_sql(&self, table: &TableName) -> Rendered {
        Rendered::sql(self.dialect.drop_table_sql(&self.qualify(table)))
    }

    /// Checks whether a table exists.
    ///
    /// # Errors
    ///
    /// Fails when the probe query fails.
    pub async fn table_exists(&self, executor: &dyn SqlExecutor, table: &TableName) -> Result<bool> {
        let probe = self.dialect.table_exists(&self.qualify(table));
        debug!(sql = %probe.sql, "Probing for table");
        let rows = executor.query(&probe.sql, &probe.args).await?;
        match rows.first() {
            Some(row) => Ok(row.get_index::<i64>(0)? > 0),
            None => Ok(false),
        }
    }

    /// Renders a statement.
    ///
    /// # Errors
    ///
    /// Fails when the statement cannot be rendered.
    pub fn render(&self, statement: &impl Statement) -> Result<Rendered> {
        statement.render(self)
    }

    /// Renders and runs a statement, returning the affected row count.
    ///
    /// # Errors
    ///
    /// Fails when rendering or execution fails.
    pub async fn execute(&self, executor: &dyn SqlExecutor, statement: &(impl Statement + Sync)) -> Result<u64> {
        let mut affected = 0;
        for rendered in statement.render_batch(self)? {
            debug!(sql = %rendered.sql, args = rendered.args.len(), "Executing statement");
            affected += executor.update(&rendered.sql, &rendered.args).await?;
        }
        Ok(affected)
    }

    /// Renders and runs a query.
    ///
    /// # Errors
    ///
    /// Fails when rendering or execution fails.
    pub async fn fetch(&self, executor: &dyn SqlExecutor, statement: &(impl Statement + Sync)) -> Result<Vec<SqlRow>> {
        let rendered = statement.render(self)?;
        debug!(sql = %rendered.sql, args = rendered.args.len(), "Running query");
        executor.query(&rendered.sql, &rendered.args).await
    }

    /// Renders and runs a query, mapping each row.
    ///
    /// # Errors
    ///
    /// Fails when rendering, execution or the mapper fails.
    pub async fn fetch_as<T, F>(
        &self,
        executor: &dyn SqlExecutor,
        statement: &(impl Statement + Sync),
        mapper: F,
    ) -> Result<Vec<T>>
    where
        F: FnMut(&SqlRow) -> Result<T>,
    {
        self.fetch(executor, statement)
            .await?
            .iter()
            .map(mapper)
            .collect()
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("dialect", &self.dialect.name())
            .field("default_schema", &self.default_schema)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{AnsiDialect, SqliteDialect};
    use crate::schema::{ColumnDefinition, DataType};

    #[test]
    fn test_default_schema_qualification() {
        let db = Database::new(AnsiDialect::new()).with_default_schema("TEST");
        assert_eq!(
            db.qualify(&TableName::new("WIDGET")),
            TableName::new("WIDGET").in_schema("TEST")
        );
        assert_eq!(
            db.qualify(&TableName::new("WIDGET").in_schema("OTHER")),
            TableName::new("WIDGET").in_schema("OTHER")
        );
        assert_eq!(db.drop_table_sql(&TableName::new("WIDGET")).sql, "drop table TEST.WIDGET");
    }

    #[test]
    fn test_foreign_key_references_are_qualified() {
        let db = Database::new(AnsiDialect::new()).with_default_schema("TEST");
        let table = TableDefinition::new(TableName::new("PART"))
            .column(ColumnDefinition::new("OWNER_ID", DataType::BigInt))
            .foreign_key(ForeignKeyDefinition {
                name: String::from("FK_PART_OWNER"),
                columns: vec![String::from("OWNER_ID")],
                references: TableName::new("OWNER"),
                referenced_columns: vec![String::from("OWNER_ID")],
            });
        assert_eq!(
            db.create_table_sql(&table).sql,
            "create table TEST.PART (OWNER_ID bigint not null, \
             constraint FK_PART_OWNER foreign key (OWNER_ID) references TEST.OWNER (OWNER_ID))"
        );
    }

    #[test]
    fn test_blank_foreign_key_on_sqlite() {
        let db = Database::new(SqliteDialect::new());
        let fk = ForeignKeyDefinition {
            name: String::from("FK_PART_OWNER"),
            columns: vec![String::from("OWNER_ID")],
            references: TableName::new("OWNER"),
            referenced_columns: vec![String::from("OWNER_ID")],
        };
        assert!(db.add_foreign_key_sql(&TableName::new("PART"), &fk).is_blank());
    }
}
