//! Reusable function rendering strategies.

use std::borrow::Cow;
use std::sync::Arc;

use super::FunctionSpec;
use crate::error::{QueryError, Result};

fn invalid(function: &str, message: impl Into<String>) -> QueryError {
    QueryError::InvalidArguments {
        function: function.to_string(),
        message: message.into(),
    }
}

/// `name(a, b, ...)`
#[derive(Debug, Clone)]
pub struct SimpleFunction {
    name: Cow<'static, str>,
}

impl SimpleFunction {
    /// Creates a renderer for `name(args)`.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
        }
    }
}

impl FunctionSpec for SimpleFunction {
    fn name(&self) -> &str {
        &self.name
    }

    fn sql(&self, args: &[String]) -> Result<String> {
        Ok(format!("{}({})", self.name, args.join(", ")))
    }
}

/// Wraps another renderer, putting `distinct` before the first argument.
#[derive(Clone)]
pub struct DistinctFunction {
    base: Arc<dyn FunctionSpec>,
}

impl DistinctFunction {
    /// Creates a distinct variant of `base`.
    pub fn new(base: impl FunctionSpec + 'static) -> Self {
        Self {
            base: Arc::new(base),
        }
    }

    /// Creates a distinct variant of a shared renderer.
    #[must_use]
    pub const fn shared(base: Arc<dyn FunctionSpec>) -> Self {
        Self { base }
    }
}

impl FunctionSpec for DistinctFunction {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn sql(&self, args: &[String]) -> Result<String> {
        let Some((first, rest)) = args.split_first() else {
            return Err(invalid(self.name(), "distinct needs an argument"));
        };
        let mut args = Vec::with_capacity(args.len());
        args.push(format!("distinct {first}"));
        args.extend(rest.iter().cloned());
        self.base.sql(&args)
    }

    fn argument_order(&self, count: usize) -> Vec<usize> {
        self.base.argument_order(count)
    }
}

/// A niladic function written without parentheses, e.g. `current_date`.
#[derive(Debug, Clone)]
pub struct ArgumentlessFunction {
    name: &'static str,
}

impl ArgumentlessFunction {
    /// Creates a renderer for the bare keyword `name`.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl FunctionSpec for ArgumentlessFunction {
    fn name(&self) -> &str {
        self.name
    }

    fn sql(&self, args: &[String]) -> Result<String> {
        if args.is_empty() {
            Ok(self.name.to_string())
        } else {
            Err(invalid(self.name, "takes no arguments"))
        }
    }
}

fn pairs<'a>(function: &str, args: &'a [String]) -> Result<std::slice::ChunksExact<'a, String>> {
    if args.len() % 2 != 0 {
        return Err(invalid(
            function,
            format!("expected an even number of key/value arguments, got {}", args.len()),
        ));
    }
    Ok(args.chunks_exact(2))
}

/// `name(key k1 value v1, key k2 value v2)`, from alternating key/value
/// arguments.
#[derive(Debug, Clone)]
pub struct JsonObjectFunction {
    name: &'static str,
}

impl JsonObjectFunction {
    /// Creates a renderer using the standard `key ... value ...` syntax.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl FunctionSpec for JsonObjectFunction {
    fn name(&self) -> &str {
        self.name
    }

    fn sql(&self, args: &[String]) -> Result<String> {
        let entries = pairs(self.name, args)?
            .map(|pair| format!("key {} value {}", pair[0], pair[1]))
            .collect::<Vec<_>>();
        Ok(format!("{}({})", self.name, entries.join(", ")))
    }
}

/// `name(k1, v1, k2, v2)`, checking the arguments pair up.
#[derive(Debug, Clone)]
pub struct KeyValueFunction {
    name: &'static str,
}

impl KeyValueFunction {
    /// Creates a renderer for a flat key/value argument list.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl FunctionSpec for KeyValueFunction {
    fn name(&self) -> &str {
        self.name
    }

    fn sql(&self, args: &[String]) -> Result<String> {
        let entries = pairs(self.name, args)?
            .map(|pair| format!("{}, {}", pair[0], pair[1]))
            .collect::<Vec<_>>();
        Ok(format!("{}({})", self.name, entries.join(", ")))
    }
}

/// `name(...)` with the arguments reordered, e.g. `locate(needle, haystack)`
/// for a call written as `instr(haystack, needle)`.
#[derive(Debug, Clone)]
pub struct PermutedFunction {
    name: &'static str,
    order: Vec<usize>,
}

impl PermutedFunction {
    /// Creates a renderer emitting call argument `order[i]` in position `i`.
    #[must_use]
    pub fn new(name: &'static str, order: impl Into<Vec<usize>>) -> Self {
        Self {
            name,
            order: order.into(),
        }
    }
}

impl FunctionSpec for PermutedFunction {
    fn name(&self) -> &str {
        self.name
    }

    fn sql(&self, args: &[String]) -> Result<String> {
        if args.len() != self.order.len() {
            return Err(invalid(
                self.name,
                format!("expected {} arguments, got {}", self.order.len(), args.len()),
            ));
        }
        let reordered = self
            .order
            .iter()
            .map(|&i| {
                args.get(i)
                    .cloned()
                    .ok_or_else(|| invalid(self.name, "argument index out of range"))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(format!("{}({})", self.name, reordered.join(", ")))
    }

    fn argument_order(&self, count: usize) -> Vec<usize> {
        if count == self.order.len() {
            self.order.clone()
        } else {
            (0..count).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn test_permuted_function() {
        let locate = PermutedFunction::new("locate", [1, 0]);
        assert_eq!(locate.sql(&args(&["W.NAME", "?"])).unwrap(), "locate(?, W.NAME)");
        assert_eq!(locate.argument_order(2), vec![1, 0]);
        assert!(locate.sql(&args(&["W.NAME"])).is_err());
    }

    #[test]
    fn test_distinct_needs_argument() {
        let spec = DistinctFunction::new(SimpleFunction::new("sum"));
        assert_eq!(spec.sql(&args(&["W.QTY"])).unwrap(), "sum(distinct W.QTY)");
        assert!(spec.sql(&[]).is_err());
    }

    #[test]
    fn test_key_value_function() {
        let spec = KeyValueFunction::new("json_object");
        assert_eq!(spec.sql(&args(&["'a'", "?"])).unwrap(), "json_object('a', ?)");
        assert!(spec.sql(&args(&["'a'", "?", "'b'"])).is_err());
    }

    #[test]
    fn test_argumentless_function() {
        let spec = ArgumentlessFunction::new("current_date");
        assert_eq!(spec.sql(&[]).unwrap(), "current_date");
        assert!(spec.sql(&args(&["1"])).is_err());
    }
}
