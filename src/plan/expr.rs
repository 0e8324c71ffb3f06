//! Backend-neutral expressions over plan rows.
//!
//! Each variant has a direct rendering in SQL, in an aggregation pipeline,
//! and in the in-memory evaluator. Nothing here knows about a backend.

use super::value::Value;

/// An expression evaluated against one row.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Field of the current row. Joined fields use `alias.Column`.
    Field(String),

    Literal(Value),

    /// Named scalar bound before the plan runs (a sibling aggregate).
    Param(String),

    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },

    Not(Box<Expr>),

    /// Text concatenation. Any missing part makes the result missing.
    Concat(Vec<Expr>),

    /// `expr` unless it is missing, else `default`.
    IfMissing {
        expr: Box<Expr>,
        default: Box<Expr>,
    },

    /// True when the value is absent, null or the `"NULL"` sentinel.
    IsMissing(Box<Expr>),

    /// Round half away from zero to `digits` fractional digits.
    Round { expr: Box<Expr>, digits: u32 },

    /// Calendar year of a date.
    Year(Box<Expr>),

    /// Calendar month (1-12) of a date.
    Month(Box<Expr>),

    /// Date formatted as `YYYY-MM-DD`.
    DateString(Box<Expr>),

    /// First character is one of `chars` (case-sensitive).
    StartsWithAny { expr: Box<Expr>, chars: Vec<char> },

    /// Fixed characters at 0-based positions; other positions are free but
    /// must exist, so the text is at least `max(position) + 1` long.
    CharsAt {
        expr: Box<Expr>,
        positions: Vec<(usize, char)>,
    },
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    /// Division; a zero divisor yields 0.
    Div,
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    And,
    Or,
}

impl BinaryOp {
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div
        )
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Lte | BinaryOp::Gt | BinaryOp::Gte
        )
    }
}

// =============================================================================
// Constructors
// =============================================================================

/// Field reference.
pub fn field(name: &str) -> Expr {
    Expr::Field(name.into())
}

/// Literal value.
pub fn lit(value: impl Into<Value>) -> Expr {
    Expr::Literal(value.into())
}

/// Bound scalar parameter.
pub fn param(name: &str) -> Expr {
    Expr::Param(name.into())
}

/// Concatenate parts as text.
pub fn concat(parts: Vec<Expr>) -> Expr {
    Expr::Concat(parts)
}

// =============================================================================
// Fluent builders
// =============================================================================

impl Expr {
    fn binary(self, op: BinaryOp, other: impl Into<Expr>) -> Expr {
        Expr::Binary {
            left: Box::new(self),
            op,
            right: Box::new(other.into()),
        }
    }

    pub fn eq(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Eq, other)
    }

    pub fn ne(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Ne, other)
    }

    pub fn lt(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Lt, other)
    }

    pub fn lte(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Lte, other)
    }

    pub fn gt(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Gt, other)
    }

    pub fn gte(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Gte, other)
    }

    pub fn and(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::And, other)
    }

    pub fn or(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Or, other)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn add(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Add, other)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn sub(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Sub, other)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn mul(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Mul, other)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn div(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Div, other)
    }

    /// Inclusive range check.
    pub fn between(self, low: impl Into<Expr>, high: impl Into<Expr>) -> Expr {
        self.clone().gte(low).and(self.lte(high))
    }

    pub fn round(self, digits: u32) -> Expr {
        Expr::Round {
            expr: Box::new(self),
            digits,
        }
    }

    pub fn if_missing(self, default: impl Into<Expr>) -> Expr {
        Expr::IfMissing {
            expr: Box::new(self),
            default: Box::new(default.into()),
        }
    }

    #[allow(clippy::wrong_self_convention)]
    pub fn is_missing(self) -> Expr {
        Expr::IsMissing(Box::new(self))
    }

    #[allow(clippy::wrong_self_convention)]
    pub fn is_present(self) -> Expr {
        self.is_missing().not()
    }

    pub fn year(self) -> Expr {
        Expr::Year(Box::new(self))
    }

    pub fn month(self) -> Expr {
        Expr::Month(Box::new(self))
    }

    pub fn date_string(self) -> Expr {
        Expr::DateString(Box::new(self))
    }

    pub fn starts_with_any(self, chars: impl IntoIterator<Item = char>) -> Expr {
        Expr::StartsWithAny {
            expr: Box::new(self),
            chars: chars.into_iter().collect(),
        }
    }

    pub fn chars_at(self, positions: Vec<(usize, char)>) -> Expr {
        Expr::CharsAt {
            expr: Box::new(self),
            positions,
        }
    }

    /// Field names this expression reads.
    pub fn fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Field(name) => out.push(name),
            Expr::Literal(_) | Expr::Param(_) => {}
            Expr::Binary { left, right, .. } => {
                left.collect_fields(out);
                right.collect_fields(out);
            }
            Expr::Concat(parts) => parts.iter().for_each(|p| p.collect_fields(out)),
            Expr::IfMissing { expr, default } => {
                expr.collect_fields(out);
                default.collect_fields(out);
            }
            Expr::Not(e)
            | Expr::IsMissing(e)
            | Expr::Year(e)
            | Expr::Month(e)
            | Expr::DateString(e) => e.collect_fields(out),
            Expr::Round { expr, .. }
            | Expr::StartsWithAny { expr, .. }
            | Expr::CharsAt { expr, .. } => expr.collect_fields(out),
        }
    }

    /// Parameter names this expression reads.
    pub fn params(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_params(&mut out);
        out
    }

    fn collect_params<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Param(name) => out.push(name),
            Expr::Field(_) | Expr::Literal(_) => {}
            Expr::Binary { left, right, .. } => {
                left.collect_params(out);
                right.collect_params(out);
            }
            Expr::Concat(parts) => parts.iter().for_each(|p| p.collect_params(out)),
            Expr::IfMissing { expr, default } => {
                expr.collect_params(out);
                default.collect_params(out);
            }
            Expr::Not(e)
            | Expr::IsMissing(e)
            | Expr::Year(e)
            | Expr::Month(e)
            | Expr::DateString(e) => e.collect_params(out),
            Expr::Round { expr, .. }
            | Expr::StartsWithAny { expr, .. }
            | Expr::CharsAt { expr, .. } => expr.collect_params(out),
        }
    }
}

impl From<Value> for Expr {
    fn from(v: Value) -> Self {
        Expr::Literal(v)
    }
}

impl From<i64> for Expr {
    fn from(n: i64) -> Self {
        lit(n)
    }
}

impl From<i32> for Expr {
    fn from(n: i32) -> Self {
        lit(n)
    }
}

impl From<&str> for Expr {
    fn from(s: &str) -> Self {
        lit(s)
    }
}

impl From<rust_decimal::Decimal> for Expr {
    fn from(d: rust_decimal::Decimal) -> Self {
        lit(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_between_expands_inclusive() {
        let e = field("UnitPrice").between(5, 15);
        match e {
            Expr::Binary { op, left, right } => {
                assert_eq!(op, BinaryOp::And);
                assert!(matches!(*left, Expr::Binary { op: BinaryOp::Gte, .. }));
                assert!(matches!(*right, Expr::Binary { op: BinaryOp::Lte, .. }));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_fields_and_params() {
        let e = field("line.UnitPrice")
            .mul(field("line.Quantity"))
            .div(param("total"))
            .round(2);
        assert_eq!(e.fields(), vec!["line.UnitPrice", "line.Quantity"]);
        assert_eq!(e.params(), vec!["total"]);
    }

    #[test]
    fn test_is_present_negates_missing() {
        assert_eq!(
            field("Fax").is_present(),
            Expr::Not(Box::new(Expr::IsMissing(Box::new(field("Fax")))))
        );
    }
}
