//! JSON object construction.

use super::{FunctionName, FunctionRegistry, JsonObjectFunction};
use crate::ast::{Expr, Expression};
use crate::builder::value::{SqlValue, ToSqlValue};

/// Registers the standard `json_object(key .. value ..)` renderer.
pub fn register(registry: &mut FunctionRegistry) {
    registry.register(FunctionName::JSON_OBJECT, JsonObjectFunction::new("json_object"));
}

/// Builds a `json_object` call from key/expression entries, rendered by the
/// database.
#[derive(Debug, Clone, Default)]
pub struct JsonObject {
    args: Vec<Expression>,
}

impl JsonObject {
    /// Creates an empty object.
    #[must_use]
    pub const fn new() -> Self {
        Self { args: Vec::new() }
    }

    /// Adds an entry.
    #[must_use]
    pub fn entry<T>(mut self, key: &str, value: Expr<T>) -> Self {
        self.args.push(Expression::Literal(SqlValue::Text(key.to_string())));
        self.args.push(value.into_expression());
        self
    }

    /// The finished call.
    #[must_use]
    pub fn build(self) -> Expr<String> {
        Expr::from_node(Expression::function(FunctionName::JSON_OBJECT, self.args))
    }
}

/// `json_object(...)` from entries.
#[must_use]
pub const fn json_object() -> JsonObject {
    JsonObject::new()
}

/// A JSON document built client-side by the database's JSON provider and
/// bound as a text parameter.
#[must_use]
pub fn json_value<I, K, V>(entries: I) -> Expr<String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: ToSqlValue,
{
    Expr::from_node(Expression::Json(
        entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.to_sql_value()))
            .collect(),
    ))
}
