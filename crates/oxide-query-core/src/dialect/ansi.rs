//! ANSI SQL dialect.

use super::Dialect;
use crate::function::FunctionRegistry;

/// Standard SQL with the baseline function set.
#[derive(Debug, Clone)]
pub struct AnsiDialect {
    functions: FunctionRegistry,
}

impl AnsiDialect {
    /// Creates a new ANSI dialect.
    #[must_use]
    pub fn new() -> Self {
        Self::with_functions(FunctionRegistry::ansi())
    }

    /// Creates an ANSI dialect with a custom registry, for products that only
    /// differ in how a few functions are spelled.
    #[must_use]
    pub const fn with_functions(functions: FunctionRegistry) -> Self {
        Self { functions }
    }
}

impl Default for AnsiDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for AnsiDialect {
    fn name(&self) -> &'static str {
        "ansi"
    }

    fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }
}
