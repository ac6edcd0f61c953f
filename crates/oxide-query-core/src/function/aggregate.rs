//! Aggregate functions.

use super::{DistinctFunction, FunctionName, FunctionRegistry, SimpleFunction};
use crate::ast::{Expr, Expression};

/// Registers the aggregates and their distinct variants.
pub fn register(registry: &mut FunctionRegistry) {
    let aggregates = [
        (FunctionName::MAX, FunctionName::MAX_DISTINCT, "max"),
        (FunctionName::MIN, FunctionName::MIN_DISTINCT, "min"),
        (FunctionName::SUM, FunctionName::SUM_DISTINCT, "sum"),
        (FunctionName::AVG, FunctionName::AVG_DISTINCT, "avg"),
        (FunctionName::COUNT, FunctionName::COUNT_DISTINCT, "count"),
        (FunctionName::COUNT_BIG, FunctionName::COUNT_BIG_DISTINCT, "count_big"),
    ];
    for (name, distinct, sql) in aggregates {
        registry.register(name, SimpleFunction::new(sql));
        registry.register(distinct, DistinctFunction::new(SimpleFunction::new(sql)));
    }
}

fn call<T, R>(name: FunctionName, expr: Expr<T>) -> Expr<R> {
    Expr::from_node(Expression::function(name, vec![expr.into_expression()]))
}

/// `max(expr)`
#[must_use]
pub fn max<T>(expr: Expr<T>) -> Expr<T> {
    call(FunctionName::MAX, expr)
}

/// `max(distinct expr)`
#[must_use]
pub fn max_distinct<T>(expr: Expr<T>) -> Expr<T> {
    call(FunctionName::MAX_DISTINCT, expr)
}

/// `min(expr)`
#[must_use]
pub fn min<T>(expr: Expr<T>) -> Expr<T> {
    call(FunctionName::MIN, expr)
}

/// `min(distinct expr)`
#[must_use]
pub fn min_distinct<T>(expr: Expr<T>) -> Expr<T> {
    call(FunctionName::MIN_DISTINCT, expr)
}

/// `sum(expr)`
#[must_use]
pub fn sum<T>(expr: Expr<T>) -> Expr<T> {
    call(FunctionName::SUM, expr)
}

/// `sum(distinct expr)`
#[must_use]
pub fn sum_distinct<T>(expr: Expr<T>) -> Expr<T> {
    call(FunctionName::SUM_DISTINCT, expr)
}

/// `avg(expr)`
#[must_use]
pub fn avg<T>(expr: Expr<T>) -> Expr<f64> {
    call(FunctionName::AVG, expr)
}

/// `avg(distinct expr)`
#[must_use]
pub fn avg_distinct<T>(expr: Expr<T>) -> Expr<f64> {
    call(FunctionName::AVG_DISTINCT, expr)
}

/// `count(*)`
#[must_use]
pub fn count() -> Expr<i64> {
    Expr::from_node(Expression::function(FunctionName::COUNT, vec![Expression::Star]))
}

/// `count(expr)`
#[must_use]
pub fn count_of<T>(expr: Expr<T>) -> Expr<i64> {
    call(FunctionName::COUNT, expr)
}

/// `count(distinct expr)`
#[must_use]
pub fn count_distinct<T>(expr: Expr<T>) -> Expr<i64> {
    call(FunctionName::COUNT_DISTINCT, expr)
}

/// `count_big(expr)`, spelled `count` where the product has no 64-bit
/// variant.
#[must_use]
pub fn count_big<T>(expr: Expr<T>) -> Expr<i64> {
    call(FunctionName::COUNT_BIG, expr)
}

/// `count_big(distinct expr)`
#[must_use]
pub fn count_big_distinct<T>(expr: Expr<T>) -> Expr<i64> {
    call(FunctionName::COUNT_BIG_DISTINCT, expr)
}
