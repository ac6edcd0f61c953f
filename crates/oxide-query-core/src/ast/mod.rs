//! Expression and predicate trees.
//!
//! Every node renders three things against a [`Scope`](crate::scope::Scope):
//! its SQL text, the bind arguments for its `?` placeholders in text order,
//! and a label for its result column.

mod condition;
mod expression;
mod foreign_key;

pub use condition::{exists, not, not_exists, BooleanExpression, ComparisonOperator, Condition};
pub use expression::{
    column, column_of, literal, scalar, value, ArithmeticOperator, ColumnRef, Expr, Expression,
    Numeric, Operand, Precedence,
};
pub use foreign_key::{foreign_key, named_foreign_key, ForeignKeyJoin};
