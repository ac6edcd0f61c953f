//! String and date functions.

use chrono::{DateTime, NaiveDate, Utc};

use super::{ArgumentlessFunction, FunctionName, FunctionRegistry, SimpleFunction};
use crate::ast::{Expr, Expression, Operand};
use crate::schema::SqlType;

/// Registers the scalar functions.
pub fn register(registry: &mut FunctionRegistry) {
    registry
        .register(FunctionName::UPPER, SimpleFunction::new("upper"))
        .register(FunctionName::LOWER, SimpleFunction::new("lower"))
        .register(FunctionName::TRIM, SimpleFunction::new("trim"))
        .register(FunctionName::LENGTH, SimpleFunction::new("length"))
        .register(FunctionName::SUBSTR, SimpleFunction::new("substr"))
        .register(FunctionName::INSTR, SimpleFunction::new("instr"))
        .register(FunctionName::COALESCE, SimpleFunction::new("coalesce"))
        .register(FunctionName::CURRENT_DATE, ArgumentlessFunction::new("current_date"))
        .register(
            FunctionName::CURRENT_TIMESTAMP,
            ArgumentlessFunction::new("current_timestamp"),
        );
}

fn call<R>(name: FunctionName, args: Vec<Expression>) -> Expr<R> {
    Expr::from_node(Expression::function(name, args))
}

/// `upper(expr)`
#[must_use]
pub fn upper<T: SqlType<NonNull = String>>(expr: Expr<T>) -> Expr<T> {
    call(FunctionName::UPPER, vec![expr.into_expression()])
}

/// `lower(expr)`
#[must_use]
pub fn lower<T: SqlType<NonNull = String>>(expr: Expr<T>) -> Expr<T> {
    call(FunctionName::LOWER, vec![expr.into_expression()])
}

/// `trim(expr)`
#[must_use]
pub fn trim<T: SqlType<NonNull = String>>(expr: Expr<T>) -> Expr<T> {
    call(FunctionName::TRIM, vec![expr.into_expression()])
}

/// `length(expr)`
#[must_use]
pub fn length<T: SqlType<NonNull = String>>(expr: Expr<T>) -> Expr<i64> {
    call(FunctionName::LENGTH, vec![expr.into_expression()])
}

/// `substr(expr, start, length)`, 1-based.
#[must_use]
pub fn substr<T: SqlType<NonNull = String>>(
    expr: Expr<T>,
    start: impl Operand<i64>,
    length: impl Operand<i64>,
) -> Expr<T> {
    call(
        FunctionName::SUBSTR,
        vec![expr.into_expression(), start.into_operand(), length.into_operand()],
    )
}

/// 1-based position of `needle` in `haystack`, 0 when absent.
#[must_use]
pub fn instr<T: SqlType<NonNull = String>>(haystack: Expr<T>, needle: impl Operand<T>) -> Expr<i64> {
    call(
        FunctionName::INSTR,
        vec![haystack.into_expression(), needle.into_operand()],
    )
}

/// `coalesce(expr, fallback)`
#[must_use]
pub fn coalesce<T: SqlType>(expr: Expr<Option<T>>, fallback: impl Operand<T>) -> Expr<T> {
    call(
        FunctionName::COALESCE,
        vec![expr.into_expression(), fallback.into_operand()],
    )
}

/// `current_date`
#[must_use]
pub fn current_date() -> Expr<NaiveDate> {
    call(FunctionName::CURRENT_DATE, Vec::new())
}

/// `current_timestamp`
#[must_use]
pub fn current_timestamp() -> Expr<DateTime<Utc>> {
    call(FunctionName::CURRENT_TIMESTAMP, Vec::new())
}
