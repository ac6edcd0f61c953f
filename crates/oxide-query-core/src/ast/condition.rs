//! Predicates.

use super::expression::{collect_args, Expression, Operand, Precedence};
use super::foreign_key::ForeignKeyJoin;
use crate::builder::select::{Select, SelectStatement};
use crate::builder::value::SqlValue;
use crate::error::Result;
use crate::scope::Scope;

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl ComparisonOperator {
    /// The operator token.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

/// The right-hand side of a test against an expression.
#[derive(Debug, Clone)]
pub enum Condition {
    /// Operator and a value, column or expression.
    Compare {
        /// Operator.
        op: ComparisonOperator,
        /// Right operand.
        rhs: Expression,
        /// Planner estimate rendered after the predicate.
        selectivity: Option<f64>,
    },
    /// `[not] between low and high`
    Between {
        /// `not between`
        negated: bool,
        /// Lower bound.
        low: Expression,
        /// Upper bound.
        high: Expression,
    },
    /// `[not] like pattern`
    Like {
        /// `not like`
        negated: bool,
        /// Pattern.
        pattern: Expression,
    },
    /// `is [not] null`
    IsNull {
        /// `is not null`
        negated: bool,
    },
    /// `[not] in (...)`
    InList {
        /// `not in`
        negated: bool,
        /// Never empty.
        values: Vec<Expression>,
    },
    /// `[not] in (select ...)`
    InSubquery {
        /// `not in`
        negated: bool,
        /// The subquery.
        select: Box<SelectStatement>,
    },
}

const fn negation(negated: bool) -> &'static str {
    if negated {
        "not "
    } else {
        ""
    }
}

impl Condition {
    pub(crate) fn in_list<T, I, V>(negated: bool, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Operand<T>,
    {
        let values: Vec<Expression> = values.into_iter().map(Operand::into_operand).collect();
        assert!(!values.is_empty(), "an in list needs at least one value");
        Self::InList { negated, values }
    }

    /// Renders the operator and right-hand side.
    ///
    /// # Errors
    ///
    /// Fails when a nested expression cannot be rendered.
    pub fn sql(&self, scope: &Scope<'_>) -> Result<String> {
        match self {
            Self::Compare { op, rhs, selectivity } => {
                let mut sql = format!(
                    "{} {}",
                    op.as_sql(),
                    rhs.sql_within(scope, Precedence::Comparison, true)?
                );
                if let Some(selectivity) = selectivity {
                    sql.push_str(&scope.dialect().selectivity(*selectivity));
                }
                Ok(sql)
            }
            Self::Between { negated, low, high } => Ok(format!(
                "{}between {} and {}",
                negation(*negated),
                low.sql_within(scope, Precedence::Comparison, true)?,
                high.sql_within(scope, Precedence::Comparison, true)?
            )),
            Self::Like { negated, pattern } => Ok(format!(
                "{}like {}",
                negation(*negated),
                pattern.sql_within(scope, Precedence::Comparison, true)?
            )),
            Self::IsNull { negated } => Ok(format!("is {}null", negation(*negated))),
            Self::InList { negated, values } => {
                let csv = values
                    .iter()
                    .map(|v| v.sql(scope))
                    .collect::<Result<Vec<_>>>()?
                    .join(", ");
                if scope.dialect().requires_in_values() {
                    Ok(format!("{}in (values {csv})", negation(*negated)))
                } else {
                    Ok(format!("{}in ({csv})", negation(*negated)))
                }
            }
            Self::InSubquery { negated, select } => Ok(format!(
                "{}in ({})",
                negation(*negated),
                select.sql(scope)?
            )),
        }
    }

    /// The bind arguments, in placeholder order.
    ///
    /// # Errors
    ///
    /// Fails when a nested expression cannot be rendered.
    pub fn args(&self, scope: &Scope<'_>) -> Result<Vec<SqlValue>> {
        match self {
            Self::Compare { rhs, .. } => rhs.args(scope),
            Self::Between { low, high, .. } => {
                let mut out = low.args(scope)?;
                out.extend(high.args(scope)?);
                Ok(out)
            }
            Self::Like { pattern, .. } => pattern.args(scope),
            Self::IsNull { .. } => Ok(Vec::new()),
            Self::InList { values, .. } => collect_args(values, scope),
            Self::InSubquery { select, .. } => select.args(scope),
        }
    }
}

/// A boolean-valued predicate tree.
#[derive(Debug, Clone)]
pub enum BooleanExpression {
    /// An expression tested against a condition.
    Test {
        /// Tested expression.
        lhs: Expression,
        /// Condition applied to it.
        condition: Condition,
    },
    /// Every operand holds.
    And(Vec<BooleanExpression>),
    /// At least one operand holds.
    Or(Vec<BooleanExpression>),
    /// Negation.
    Not(Box<BooleanExpression>),
    /// `[not] exists (select ...)`
    Exists {
        /// `not exists`
        negated: bool,
        /// The subquery.
        select: Box<SelectStatement>,
    },
    /// Column equality along a declared foreign key.
    ForeignKey(ForeignKeyJoin),
}

impl BooleanExpression {
    /// How tightly this node binds.
    #[must_use]
    pub const fn precedence(&self) -> Precedence {
        match self {
            Self::Test { .. } => Precedence::Comparison,
            Self::And(_) | Self::ForeignKey(_) => Precedence::And,
            Self::Or(_) => Precedence::Or,
            Self::Not(_) => Precedence::Not,
            Self::Exists { .. } => Precedence::Primary,
        }
    }

    /// Conjunction, flattening an existing `and` chain.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match self {
            Self::And(mut items) => {
                items.push(other);
                Self::And(items)
            }
            single => Self::And(vec![single, other]),
        }
    }

    /// Disjunction, flattening an existing `or` chain.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match self {
            Self::Or(mut items) => {
                items.push(other);
                Self::Or(items)
            }
            single => Self::Or(vec![single, other]),
        }
    }

    /// Renders the SQL text.
    ///
    /// # Errors
    ///
    /// Fails on unresolvable references, unsupported functions and missing
    /// foreign keys.
    pub fn sql(&self, scope: &Scope<'_>) -> Result<String> {
        match self {
            Self::Test { lhs, condition } => Ok(format!(
                "{} {}",
                lhs.sql_within(scope, Precedence::Comparison, false)?,
                condition.sql(scope)?
            )),
            Self::And(items) => join(items, scope, Precedence::And, " and "),
            Self::Or(items) => join(items, scope, Precedence::Or, " or "),
            Self::Not(inner) => Ok(format!("not ({})", inner.sql(scope)?)),
            Self::Exists { negated, select } => Ok(format!(
                "{}exists ({})",
                negation(*negated),
                select.sql(scope)?
            )),
            Self::ForeignKey(join) => join.sql(scope),
        }
    }

    /// The bind arguments, in placeholder order.
    ///
    /// # Errors
    ///
    /// Fails when a nested expression cannot be rendered.
    pub fn args(&self, scope: &Scope<'_>) -> Result<Vec<SqlValue>> {
        match self {
            Self::Test { lhs, condition } => {
                let mut out = lhs.args(scope)?;
                out.extend(condition.args(scope)?);
                Ok(out)
            }
            Self::And(items) | Self::Or(items) => {
                let mut out = Vec::new();
                for item in items {
                    out.extend(item.args(scope)?);
                }
                Ok(out)
            }
            Self::Not(inner) => inner.args(scope),
            Self::Exists { select, .. } => select.args(scope),
            Self::ForeignKey(_) => Ok(Vec::new()),
        }
    }
}

fn join(
    items: &[BooleanExpression],
    scope: &Scope<'_>,
    parent: Precedence,
    separator: &str,
) -> Result<String> {
    let rendered = items
        .iter()
        .map(|item| {
            let sql = item.sql(scope)?;
            if item.precedence() < parent {
                Ok(format!("({sql})"))
            } else {
                Ok(sql)
            }
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(rendered.join(separator))
}

/// `not (...)`
#[must_use]
pub fn not(expression: BooleanExpression) -> BooleanExpression {
    BooleanExpression::Not(Box::new(expression))
}

/// `exists (select ...)`
#[must_use]
pub fn exists(select: Select) -> BooleanExpression {
    BooleanExpression::Exists {
        negated: false,
        select: Box::new(select.into_statement()),
    }
}

/// `not exists (select ...)`
#[must_use]
pub fn not_exists(select: Select) -> BooleanExpression {
    BooleanExpression::Exists {
        negated: true,
        select: Box::new(select.into_statement()),
    }
}
