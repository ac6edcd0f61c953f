//! Value expressions.

use std::any::TypeId;
use std::fmt;
use std::marker::PhantomData;

use super::condition::{BooleanExpression, ComparisonOperator, Condition};
use crate::builder::select::{Select, SelectStatement};
use crate::builder::value::{SqlValue, ToSqlValue};
use crate::error::Result;
use crate::function::FunctionName;
use crate::schema::{column_label, Column, DataType, RowType, SqlType, TableDef};
use crate::scope::{AliasRef, Scope};

/// Binding strength of a node, lowest first.
///
/// A child that binds more loosely than its parent is parenthesised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    /// `or`
    Or,
    /// `and`
    And,
    /// `not`
    Not,
    /// Comparisons, `between`, `in`, `like`, `is null`.
    Comparison,
    /// `+`, `-`, concatenation.
    Additive,
    /// `*`, `/`.
    Multiplicative,
    /// Columns, values, function calls, parenthesised subqueries.
    Primary,
}

/// A column reference, resolved against the scope at render time.
#[derive(Debug, Clone)]
pub struct ColumnRef {
    pub(crate) row: TypeId,
    pub(crate) table: &'static TableDef,
    pub(crate) alias: Option<String>,
    pub(crate) column: &'static str,
}

impl ColumnRef {
    fn resolve<'s>(&self, scope: &'s Scope<'_>) -> Result<&'s AliasRef> {
        Ok(scope.find_alias(self.row, self.table, self.alias.as_deref())?)
    }
}

/// Arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOperator {
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Times,
    /// `/`
    Divide,
}

impl ArithmeticOperator {
    const fn sql(self) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Times => "*",
            Self::Divide => "/",
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Plus => "plus",
            Self::Minus => "minus",
            Self::Times => "times",
            Self::Divide => "divided_by",
        }
    }

    const fn precedence(self) -> Precedence {
        match self {
            Self::Plus | Self::Minus => Precedence::Additive,
            Self::Times | Self::Divide => Precedence::Multiplicative,
        }
    }
}

/// An untyped value expression.
///
/// Every variant renders SQL text, the bind arguments for its `?`
/// placeholders in text order, and a label naming its result column.
#[derive(Debug, Clone)]
pub enum Expression {
    /// A column of an alias.
    Column(ColumnRef),
    /// A bound parameter.
    Value(SqlValue),
    /// A value escaped into the SQL text.
    Literal(SqlValue),
    /// `*`
    Star,
    /// A call rendered by the dialect's function registry.
    Function {
        /// Registry key.
        name: FunctionName,
        /// Arguments in call order.
        args: Vec<Expression>,
    },
    /// Binary arithmetic.
    Arithmetic {
        /// Left operand.
        lhs: Box<Expression>,
        /// Operator.
        op: ArithmeticOperator,
        /// Right operand.
        rhs: Box<Expression>,
    },
    /// String concatenation, spelled by the dialect.
    Concat(Vec<Expression>),
    /// `cast(expr as type)`
    Cast {
        /// Operand.
        expr: Box<Expression>,
        /// Target type.
        data_type: DataType,
    },
    /// A scalar subquery.
    Subquery(Box<SelectStatement>),
    /// A JSON object built by the database's JSON provider and bound as text.
    Json(Vec<(String, SqlValue)>),
}

impl Expression {
    /// A function call.
    #[must_use]
    pub const fn function(name: FunctionName, args: Vec<Self>) -> Self {
        Self::Function { name, args }
    }

    /// How tightly this node binds.
    #[must_use]
    pub const fn precedence(&self) -> Precedence {
        match self {
            Self::Arithmetic { op, .. } => op.precedence(),
            Self::Concat(_) => Precedence::Additive,
            _ => Precedence::Primary,
        }
    }

    /// Renders the SQL text.
    ///
    /// # Errors
    ///
    /// Fails on unresolvable columns and unsupported functions.
    pub fn sql(&self, scope: &Scope<'_>) -> Result<String> {
        match self {
            Self::Column(column) => Ok(column.resolve(scope)?.column_sql(column.column)),
            Self::Value(_) | Self::Json(_) => Ok(SqlValue::placeholder().to_string()),
            Self::Literal(value) => Ok(value.to_sql_inline()),
            Self::Star => Ok(String::from("*")),
            Self::Function { name, args } => {
                let spec = scope.dialect().function(name)?;
                let rendered = args
                    .iter()
                    .map(|arg| arg.sql(scope))
                    .collect::<Result<Vec<_>>>()?;
                spec.sql(&rendered)
            }
            Self::Arithmetic { lhs, op, rhs } => Ok(format!(
                "{} {} {}",
                lhs.sql_within(scope, op.precedence(), false)?,
                op.sql(),
                rhs.sql_within(scope, op.precedence(), true)?
            )),
            Self::Concat(parts) => {
                let rendered = parts
                    .iter()
                    .map(|part| part.sql_within(scope, Precedence::Additive, true))
                    .collect::<Result<Vec<_>>>()?;
                Ok(scope.dialect().concat(&rendered))
            }
            Self::Cast { expr, data_type } => Ok(format!(
                "cast({} as {})",
                expr.sql(scope)?,
                scope.dialect().data_type(data_type)
            )),
            Self::Subquery(select) => Ok(format!("({})", select.sql(scope)?)),
        }
    }

    /// Renders the SQL text, parenthesised when it binds more loosely than
    /// `parent` (or equally, for the right operand of a binary operator).
    pub(crate) fn sql_within(
        &self,
        scope: &Scope<'_>,
        parent: Precedence,
        right: bool,
    ) -> Result<String> {
        let sql = self.sql(scope)?;
        let own = self.precedence();
        if own < parent || (right && own == parent) {
            Ok(format!("({sql})"))
        } else {
            Ok(sql)
        }
    }

    /// The bind arguments, in placeholder order.
    ///
    /// # Errors
    ///
    /// Fails on unsupported functions and JSON provider errors.
    pub fn args(&self, scope: &Scope<'_>) -> Result<Vec<SqlValue>> {
        match self {
            Self::Column(_) | Self::Literal(_) | Self::Star => Ok(Vec::new()),
            Self::Value(value) => Ok(vec![value.clone()]),
            Self::Json(pairs) => {
                let json = scope.database().json().construct_json_object(pairs)?;
                Ok(vec![SqlValue::Text(json)])
            }
            Self::Function { name, args } => {
                let spec = scope.dialect().function(name)?;
                let mut out = Vec::new();
                for index in spec.argument_order(args.len()) {
                    if let Some(arg) = args.get(index) {
                        out.extend(arg.args(scope)?);
                    }
                }
                Ok(out)
            }
            Self::Arithmetic { lhs, rhs, .. } => {
                let mut out = lhs.args(scope)?;
                out.extend(rhs.args(scope)?);
                Ok(out)
            }
            Self::Concat(parts) => collect_args(parts, scope),
            Self::Cast { expr, .. } => expr.args(scope),
            Self::Subquery(select) => select.args(scope),
        }
    }

    /// The result-column label.
    ///
    /// # Errors
    ///
    /// Fails on unresolvable columns.
    pub fn label(&self, scope: &Scope<'_>) -> Result<String> {
        match self {
            Self::Column(column) => Ok(column_label(
                column.resolve(scope)?.name(),
                column.column,
            )),
            Self::Value(_) => Ok(String::from("value")),
            Self::Literal(_) => Ok(String::from("literal")),
            Self::Star => Ok(String::from("all")),
            Self::Json(_) => Ok(String::from("json")),
            Self::Function { name, args } => match args.first() {
                None | Some(Self::Star) => Ok(name.to_string()),
                Some(first) => Ok(format!("{name}_{}", first.label(scope)?)),
            },
            Self::Arithmetic { lhs, op, rhs } => Ok(format!(
                "{}_{}_{}",
                lhs.label(scope)?,
                op.label(),
                rhs.label(scope)?
            )),
            Self::Concat(parts) => match parts.first() {
                Some(first) => Ok(format!("concat_{}", first.label(scope)?)),
                None => Ok(String::from("concat")),
            },
            Self::Cast { expr, .. } => Ok(format!("cast_{}", expr.label(scope)?)),
            Self::Subquery(_) => Ok(String::from("subquery")),
        }
    }
}

pub(crate) fn collect_args(expressions: &[Expression], scope: &Scope<'_>) -> Result<Vec<SqlValue>> {
    let mut out = Vec::new();
    for expression in expressions {
        out.extend(expression.args(scope)?);
    }
    Ok(out)
}

/// An expression producing values of type `T`.
pub struct Expr<T> {
    node: Expression,
    selectivity: Option<f64>,
    _type: PhantomData<fn() -> T>,
}

impl<T> Clone for Expr<T> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
            selectivity: self.selectivity,
            _type: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Expr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expr")
            .field("node", &self.node)
            .field("selectivity", &self.selectivity)
            .finish()
    }
}

/// Anything usable where an expression of type `T` is expected: another
/// expression, or a plain value that is bound as a parameter.
pub trait Operand<T> {
    /// Converts into an untyped expression.
    fn into_operand(self) -> Expression;
}

impl<T: SqlType> Operand<T> for Expr<T> {
    fn into_operand(self) -> Expression {
        self.node
    }
}

impl<T: SqlType> Operand<Option<T>> for Expr<T> {
    fn into_operand(self) -> Expression {
        self.node
    }
}

impl<T: SqlType> Operand<T> for Expr<Option<T>> {
    fn into_operand(self) -> Expression {
        self.node
    }
}

impl<T, V> Operand<T> for V
where
    T: SqlType,
    V: ToSqlValue + Into<T::NonNull>,
{
    fn into_operand(self) -> Expression {
        Expression::Value(self.to_sql_value())
    }
}

/// Types that take part in arithmetic.
pub trait Numeric {}

impl Numeric for i16 {}
impl Numeric for i32 {}
impl Numeric for i64 {}
impl Numeric for f32 {}
impl Numeric for f64 {}
impl<T: Numeric> Numeric for Option<T> {}

impl<T> Expr<T> {
    pub(crate) const fn from_node(node: Expression) -> Self {
        Self {
            node,
            selectivity: None,
            _type: PhantomData,
        }
    }

    /// Estimated fraction of rows the next comparison keeps.
    ///
    /// Only `=`, `<>`, `<`, `<=`, `>` and `>=` carry the estimate, and only
    /// dialects with planner hints render it, directly after the predicate.
    #[must_use]
    pub fn selectivity(mut self, selectivity: f64) -> Self {
        self.selectivity = Some(selectivity);
        self
    }

    /// The untyped expression.
    #[must_use]
    pub const fn expression(&self) -> &Expression {
        &self.node
    }

    /// Consumes the wrapper, returning the untyped expression.
    #[must_use]
    pub fn into_expression(self) -> Expression {
        self.node
    }

    fn test(self, condition: Condition) -> BooleanExpression {
        BooleanExpression::Test {
            lhs: self.node,
            condition,
        }
    }

    fn compare(self, op: ComparisonOperator, rhs: Expression) -> BooleanExpression {
        let selectivity = self.selectivity;
        self.test(Condition::Compare { op, rhs, selectivity })
    }

    /// `is null`
    #[must_use]
    pub fn is_null(self) -> BooleanExpression {
        self.test(Condition::IsNull { negated: false })
    }

    /// `is not null`
    #[must_use]
    pub fn is_not_null(self) -> BooleanExpression {
        self.test(Condition::IsNull { negated: true })
    }

    /// Casts to another SQL type.
    #[must_use]
    pub fn cast<U>(self, data_type: DataType) -> Expr<U> {
        Expr::from_node(Expression::Cast {
            expr: Box::new(self.node),
            data_type,
        })
    }
}

impl<T: SqlType> Expr<T> {
    /// `=`
    #[must_use]
    pub fn eq(self, rhs: impl Operand<T>) -> BooleanExpression {
        self.compare(ComparisonOperator::Eq, rhs.into_operand())
    }

    /// `<>`
    #[must_use]
    pub fn ne(self, rhs: impl Operand<T>) -> BooleanExpression {
        self.compare(ComparisonOperator::Ne, rhs.into_operand())
    }

    /// `<`
    #[must_use]
    pub fn lt(self, rhs: impl Operand<T>) -> BooleanExpression {
        self.compare(ComparisonOperator::Lt, rhs.into_operand())
    }

    /// `<=`
    #[must_use]
    pub fn le(self, rhs: impl Operand<T>) -> BooleanExpression {
        self.compare(ComparisonOperator::Le, rhs.into_operand())
    }

    /// `>`
    #[must_use]
    pub fn gt(self, rhs: impl Operand<T>) -> BooleanExpression {
        self.compare(ComparisonOperator::Gt, rhs.into_operand())
    }

    /// `>=`
    #[must_use]
    pub fn ge(self, rhs: impl Operand<T>) -> BooleanExpression {
        self.compare(ComparisonOperator::Ge, rhs.into_operand())
    }

    /// `between low and high`
    #[must_use]
    pub fn between(self, low: impl Operand<T>, high: impl Operand<T>) -> BooleanExpression {
        self.test(Condition::Between {
            negated: false,
            low: low.into_operand(),
            high: high.into_operand(),
        })
    }

    /// `not between low and high`
    #[must_use]
    pub fn not_between(self, low: impl Operand<T>, high: impl Operand<T>) -> BooleanExpression {
        self.test(Condition::Between {
            negated: true,
            low: low.into_operand(),
            high: high.into_operand(),
        })
    }

    /// `in (...)`
    ///
    /// # Panics
    ///
    /// Panics if `values` is empty, since `in ()` is not valid SQL.
    #[must_use]
    pub fn in_list<I, V>(self, values: I) -> BooleanExpression
    where
        I: IntoIterator<Item = V>,
        V: Operand<T>,
    {
        self.test(Condition::in_list::<T, _, _>(false, values))
    }

    /// `not in (...)`
    ///
    /// # Panics
    ///
    /// Panics if `values` is empty.
    #[must_use]
    pub fn not_in_list<I, V>(self, values: I) -> BooleanExpression
    where
        I: IntoIterator<Item = V>,
        V: Operand<T>,
    {
        self.test(Condition::in_list::<T, _, _>(true, values))
    }

    /// `in (select ...)`
    #[must_use]
    pub fn in_select(self, select: Select) -> BooleanExpression {
        self.test(Condition::InSubquery {
            negated: false,
            select: Box::new(select.into_statement()),
        })
    }

    /// `not in (select ...)`
    #[must_use]
    pub fn not_in_select(self, select: Select) -> BooleanExpression {
        self.test(Condition::InSubquery {
            negated: true,
            select: Box::new(select.into_statement()),
        })
    }
}

impl<T: SqlType<NonNull = String>> Expr<T> {
    /// `like pattern`
    #[must_use]
    pub fn like(self, pattern: impl Operand<T>) -> BooleanExpression {
        self.test(Condition::Like {
            negated: false,
            pattern: pattern.into_operand(),
        })
    }

    /// `not like pattern`
    #[must_use]
    pub fn not_like(self, pattern: impl Operand<T>) -> BooleanExpression {
        self.test(Condition::Like {
            negated: true,
            pattern: pattern.into_operand(),
        })
    }

    /// String concatenation.
    #[must_use]
    pub fn concat(self, other: impl Operand<T>) -> Self {
        let mut parts = match self.node {
            Expression::Concat(parts) => parts,
            node => vec![node],
        };
        parts.push(other.into_operand());
        Self::from_node(Expression::Concat(parts))
    }
}

impl<T: SqlType + Numeric> Expr<T> {
    fn arithmetic(self, op: ArithmeticOperator, rhs: Expression) -> Self {
        Self::from_node(Expression::Arithmetic {
            lhs: Box::new(self.node),
            op,
            rhs: Box::new(rhs),
        })
    }

    /// `+`
    #[must_use]
    pub fn plus(self, rhs: impl Operand<T>) -> Self {
        self.arithmetic(ArithmeticOperator::Plus, rhs.into_operand())
    }

    /// `-`
    #[must_use]
    pub fn minus(self, rhs: impl Operand<T>) -> Self {
        self.arithmetic(ArithmeticOperator::Minus, rhs.into_operand())
    }

    /// `*`
    #[must_use]
    pub fn times(self, rhs: impl Operand<T>) -> Self {
        self.arithmetic(ArithmeticOperator::Times, rhs.into_operand())
    }

    /// `/`
    #[must_use]
    pub fn divided_by(self, rhs: impl Operand<T>) -> Self {
        self.arithmetic(ArithmeticOperator::Divide, rhs.into_operand())
    }
}

/// A column resolved against the only alias of its row type in scope.
#[must_use]
pub fn column<C: Column>(_column: C) -> Expr<C::Type> {
    Expr::from_node(Expression::Column(ColumnRef {
        row: <C::Row as RowType>::row_id(),
        table: <C::Row as RowType>::table(),
        alias: None,
        column: C::NAME,
    }))
}

/// A column resolved against the alias with the given name.
#[must_use]
pub fn column_of<C: Column>(alias: &str, _column: C) -> Expr<C::Type> {
    Expr::from_node(Expression::Column(ColumnRef {
        row: <C::Row as RowType>::row_id(),
        table: <C::Row as RowType>::table(),
        alias: Some(alias.to_string()),
        column: C::NAME,
    }))
}

/// A bound parameter.
#[must_use]
pub fn value<T: ToSqlValue>(value: T) -> Expr<T> {
    Expr::from_node(Expression::Value(value.to_sql_value()))
}

/// A value written into the SQL text.
#[must_use]
pub fn literal<T: ToSqlValue>(value: T) -> Expr<T> {
    Expr::from_node(Expression::Literal(value.to_sql_value()))
}

/// A scalar subquery.
#[must_use]
pub fn scalar<T>(select: Select) -> Expr<T> {
    Expr::from_node(Expression::Subquery(Box::new(select.into_statement())))
}
