//! Function names, renderers and the per-dialect registry.
//!
//! A [`FunctionName`] is an opaque key. The active dialect's
//! [`FunctionRegistry`] maps it to a [`FunctionSpec`] that turns already
//! rendered arguments into SQL text. A dialect overrides individual entries
//! for product-specific spellings.

pub mod aggregate;
pub mod json;
mod specs;
pub mod string;

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub use specs::{
    ArgumentlessFunction, DistinctFunction, JsonObjectFunction, KeyValueFunction, PermutedFunction,
    SimpleFunction,
};

use crate::error::Result;

/// Registry key of a SQL function.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionName(Cow<'static, str>);

impl FunctionName {
    /// `max`
    pub const MAX: Self = Self::new("max");
    /// `max(distinct ...)`
    pub const MAX_DISTINCT: Self = Self::new("max_distinct");
    /// `min`
    pub const MIN: Self = Self::new("min");
    /// `min(distinct ...)`
    pub const MIN_DISTINCT: Self = Self::new("min_distinct");
    /// `sum`
    pub const SUM: Self = Self::new("sum");
    /// `sum(distinct ...)`
    pub const SUM_DISTINCT: Self = Self::new("sum_distinct");
    /// `avg`
    pub const AVG: Self = Self::new("avg");
    /// `avg(distinct ...)`
    pub const AVG_DISTINCT: Self = Self::new("avg_distinct");
    /// `count`
    pub const COUNT: Self = Self::new("count");
    /// `count(distinct ...)`
    pub const COUNT_DISTINCT: Self = Self::new("count_distinct");
    /// `count_big`
    pub const COUNT_BIG: Self = Self::new("count_big");
    /// `count_big(distinct ...)`
    pub const COUNT_BIG_DISTINCT: Self = Self::new("count_big_distinct");
    /// `upper`
    pub const UPPER: Self = Self::new("upper");
    /// `lower`
    pub const LOWER: Self = Self::new("lower");
    /// `trim`
    pub const TRIM: Self = Self::new("trim");
    /// `length`
    pub const LENGTH: Self = Self::new("length");
    /// `substr`
    pub const SUBSTR: Self = Self::new("substr");
    /// Position of a substring.
    pub const INSTR: Self = Self::new("instr");
    /// `coalesce`
    pub const COALESCE: Self = Self::new("coalesce");
    /// `current_date`
    pub const CURRENT_DATE: Self = Self::new("current_date");
    /// `current_timestamp`
    pub const CURRENT_TIMESTAMP: Self = Self::new("current_timestamp");
    /// JSON object constructor.
    pub const JSON_OBJECT: Self = Self::new("json_object");

    /// Creates a name from a static string.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Creates a name from an owned string.
    #[must_use]
    pub fn owned(name: String) -> Self {
        Self(Cow::Owned(name))
    }

    /// The name as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FunctionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Renders one function for one dialect.
pub trait FunctionSpec: Send + Sync {
    /// The SQL name, used in error messages.
    fn name(&self) -> &str;

    /// Renders the call from argument text in call order.
    ///
    /// # Errors
    ///
    /// Fails when the arguments do not fit the function.
    fn sql(&self, args: &[String]) -> Result<String>;

    /// Order in which the call-order arguments appear in the rendered text.
    ///
    /// Bind arguments are collected in this order so that they line up with
    /// the placeholders.
    fn argument_order(&self, count: usize) -> Vec<usize> {
        (0..count).collect()
    }
}

/// Function renderers keyed by name.
///
/// Built once when a dialect is constructed and only read afterwards.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    specs: HashMap<FunctionName, Arc<dyn FunctionSpec>>,
}

impl FunctionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The baseline function set shared by every dialect.
    #[must_use]
    pub fn ansi() -> Self {
        let mut registry = Self::new();
        aggregate::register(&mut registry);
        string::register(&mut registry);
        json::register(&mut registry);
        registry
    }

    /// Registers a renderer, replacing any previous one.
    pub fn register(&mut self, name: FunctionName, spec: impl FunctionSpec + 'static) -> &mut Self {
        self.specs.insert(name, Arc::new(spec));
        self
    }

    /// Registers a shared renderer.
    pub fn register_shared(&mut self, name: FunctionName, spec: Arc<dyn FunctionSpec>) -> &mut Self {
        self.specs.insert(name, spec);
        self
    }

    /// Registers a renderer in builder style.
    #[must_use]
    pub fn with(mut self, name: FunctionName, spec: impl FunctionSpec + 'static) -> Self {
        self.register(name, spec);
        self
    }

    /// Looks up a renderer.
    #[must_use]
    pub fn get(&self, name: &FunctionName) -> Option<&Arc<dyn FunctionSpec>> {
        self.specs.get(name)
    }

    /// Whether a renderer is registered.
    #[must_use]
    pub fn contains(&self, name: &FunctionName) -> bool {
        self.specs.contains_key(name)
    }

    /// Number of registered functions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.specs.keys().map(FunctionName::as_str).collect();
        names.sort_unstable();
        f.debug_struct("FunctionRegistry").field("functions", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(registry: &FunctionRegistry, name: &FunctionName, args: &[&str]) -> String {
        let args: Vec<String> = args.iter().map(|a| (*a).to_string()).collect();
        registry.get(name).unwrap().sql(&args).unwrap()
    }

    #[test]
    fn test_ansi_baseline() {
        let registry = FunctionRegistry::ansi();
        for name in [
            FunctionName::MAX,
            FunctionName::MIN,
            FunctionName::SUM,
            FunctionName::AVG,
            FunctionName::COUNT,
            FunctionName::COUNT_BIG,
            FunctionName::COUNT_DISTINCT,
            FunctionName::COUNT_BIG_DISTINCT,
            FunctionName::JSON_OBJECT,
        ] {
            assert!(registry.contains(&name), "missing {name}");
        }
    }

    #[test]
    fn test_count_distinct_differs_from_count() {
        let registry = FunctionRegistry::ansi();
        assert_eq!(render(&registry, &FunctionName::COUNT, &["W.NAME"]), "count(W.NAME)");
        assert_eq!(
            render(&registry, &FunctionName::COUNT_DISTINCT, &["W.NAME"]),
            "count(distinct W.NAME)"
        );
    }

    #[test]
    fn test_override_replaces_entry() {
        let registry =
            FunctionRegistry::ansi().with(FunctionName::COUNT_BIG, SimpleFunction::new("count"));
        assert_eq!(render(&registry, &FunctionName::COUNT_BIG, &["*"]), "count(*)");
    }

    #[test]
    fn test_json_object_pairs() {
        let registry = FunctionRegistry::ansi();
        assert_eq!(
            render(&registry, &FunctionName::JSON_OBJECT, &["'a'", "W.NAME", "'b'", "?"]),
            "json_object(key 'a' value W.NAME, key 'b' value ?)"
        );
    }

    #[test]
    fn test_json_object_odd_arguments() {
        let registry = FunctionRegistry::ansi();
        let spec = registry.get(&FunctionName::JSON_OBJECT).unwrap();
        let err = spec.sql(&[String::from("'a'")]).unwrap_err();
        assert!(err.to_string().contains("even number"));
    }
}
