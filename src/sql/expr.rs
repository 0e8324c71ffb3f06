//! Expression AST - the core of SQL expression building.
//!
//! This module provides a strongly-typed AST for SQL expressions
//! with exhaustive pattern matching enforced by the compiler.

use rust_decimal::Decimal;

use super::dialect::{Dialect, SqlDialect};
use super::query::{NullsOrder, Query, SelectExpr, SortDir};
use super::token::{Token, TokenStream};

// =============================================================================
// Expression AST
// =============================================================================

/// A SQL expression.
///
/// Every variant must be handled in `to_tokens_for_dialect()` - the compiler enforces this.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column reference: optional_table.column
    Column {
        table: Option<String>,
        column: String,
    },

    /// Literal values
    Literal(Literal),

    /// Binary operation: left op right. Nested binary operands are parenthesized.
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },

    /// Unary operation: op (expr)
    UnaryOp { op: UnaryOperator, expr: Box<Expr> },

    /// Function call: name(args...)
    Function { name: String, args: Vec<Expr> },

    /// COUNT(*)
    CountStar,

    /// CASE WHEN... THEN... ELSE... END
    Case {
        when_clauses: Vec<(Expr, Expr)>,
        else_clause: Option<Box<Expr>>,
    },

    /// CAST(expr AS type)
    Cast { expr: Box<Expr>, type_name: String },

    /// EXTRACT(part FROM expr)
    Extract { part: DatePart, expr: Box<Expr> },

    /// Scalar subquery: (SELECT ...)
    Subquery(Box<Query>),

    /// IN: expr IN (values...)
    In { expr: Box<Expr>, values: Vec<Expr> },

    /// IS NULL / IS NOT NULL
    IsNull { expr: Box<Expr>, negated: bool },

    /// LIKE: expr LIKE pattern
    Like { expr: Box<Expr>, pattern: String },

    /// Window function expression.
    ///
    /// Example: `ROW_NUMBER() OVER (PARTITION BY region ORDER BY amount DESC)`
    WindowFunction {
        /// The function being windowed (usually Expr::Function)
        function: Box<Expr>,
        /// PARTITION BY expressions
        partition_by: Vec<Expr>,
        /// ORDER BY within window
        order_by: Vec<WindowOrderBy>,
    },
}

/// Literal values.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Decimal(Decimal),
    String(String),
    Bool(bool),
    Null,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Comparison
    Eq,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,
    // Logical
    And,
    Or,
    // Arithmetic
    Plus,
    Minus,
    Mul,
    Div,
    // String
    Concat,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
}

/// Date parts accepted by EXTRACT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePart {
    Year,
    Month,
}

/// ORDER BY item inside a window specification.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowOrderBy {
    pub expr: Expr,
    pub dir: SortDir,
    pub nulls: Option<NullsOrder>,
}

impl WindowOrderBy {
    pub fn asc(expr: Expr) -> Self {
        Self {
            expr,
            dir: SortDir::Asc,
            nulls: None,
        }
    }

    pub fn desc(expr: Expr) -> Self {
        Self {
            expr,
            dir: SortDir::Desc,
            nulls: None,
        }
    }

    pub fn nulls_first(mut self) -> Self {
        self.nulls = Some(NullsOrder::First);
        self
    }

    pub fn nulls_last(mut self) -> Self {
        self.nulls = Some(NullsOrder::Last);
        self
    }
}

impl Expr {
    /// Convert this expression to a token stream for a specific dialect.
    pub fn to_tokens_for_dialect(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();

        match self {
            Expr::Column { table, column } => {
                if let Some(t) = table {
                    ts.push(Token::Ident(t.clone()));
                    ts.push(Token::Dot);
                }
                ts.push(Token::Ident(column.clone()));
            }

            Expr::Literal(lit) => {
                ts.push(match lit {
                    Literal::Int(n) => Token::LitInt(*n),
                    Literal::Decimal(d) => Token::LitDecimal(*d),
                    Literal::String(s) => Token::LitString(s.clone()),
                    Literal::Bool(b) => Token::LitBool(*b),
                    Literal::Null => Token::LitNull,
                });
            }

            Expr::BinaryOp { left, op, right } => {
                // Handle CONCAT specially for dialects that don't support || operator
                if *op == BinaryOperator::Concat && !dialect.supports_concat_operator() {
                    ts.push(Token::FunctionName("CONCAT".into()));
                    ts.lparen();
                    emit_concat_args(&mut ts, left, dialect);
                    ts.comma().space();
                    emit_concat_args(&mut ts, right, dialect);
                    ts.rparen();
                } else {
                    emit_operand(&mut ts, left, dialect);
                    ts.space();
                    ts.push(binary_op_to_token(*op));
                    ts.space();
                    emit_operand(&mut ts, right, dialect);
                }
            }

            Expr::UnaryOp { op, expr } => {
                ts.push(match op {
                    UnaryOperator::Not => Token::Not,
                });
                ts.space().lparen();
                ts.append(&expr.to_tokens_for_dialect(dialect));
                ts.rparen();
            }

            Expr::Function { name, args } => {
                ts.push(Token::FunctionName(name.clone()));
                ts.lparen();
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        ts.comma().space();
                    }
                    ts.append(&arg.to_tokens_for_dialect(dialect));
                }
                ts.rparen();
            }

            Expr::CountStar => {
                ts.push(Token::FunctionName("COUNT".into()))
                    .lparen()
                    .push(Token::Star)
                    .rparen();
            }

            Expr::Case {
                when_clauses,
                else_clause,
            } => {
                ts.push(Token::Case);
                for (when, then) in when_clauses {
                    ts.space().push(Token::When).space();
                    ts.append(&when.to_tokens_for_dialect(dialect));
                    ts.space().push(Token::Then).space();
                    ts.append(&then.to_tokens_for_dialect(dialect));
                }
                if let Some(else_expr) = else_clause {
                    ts.space().push(Token::Else).space();
                    ts.append(&else_expr.to_tokens_for_dialect(dialect));
                }
                ts.space().push(Token::End);
            }

            Expr::Cast { expr, type_name } => {
                ts.push(Token::Cast).lparen();
                ts.append(&expr.to_tokens_for_dialect(dialect));
                ts.space()
                    .push(Token::As)
                    .space()
                    .push(Token::TypeName(type_name.clone()))
                    .rparen();
            }

            Expr::Extract { part, expr } => {
                ts.push(Token::Extract).lparen();
                ts.push(match part {
                    DatePart::Year => Token::Year,
                    DatePart::Month => Token::Month,
                });
                ts.space().push(Token::From).space();
                ts.append(&expr.to_tokens_for_dialect(dialect));
                ts.rparen();
            }

            Expr::Subquery(query) => {
                ts.lparen();
                ts.append(&query.to_tokens_for_dialect(dialect));
                ts.rparen();
            }

            Expr::In { expr, values } => {
                // "x IN ()" is invalid SQL and should be FALSE
                if values.is_empty() {
                    ts.push(Token::False);
                } else {
                    emit_operand(&mut ts, expr, dialect);
                    ts.space().push(Token::In).space().lparen();
                    for (i, val) in values.iter().enumerate() {
                        if i > 0 {
                            ts.comma().space();
                        }
                        ts.append(&val.to_tokens_for_dialect(dialect));
                    }
                    ts.rparen();
                }
            }

            Expr::IsNull { expr, negated } => {
                emit_operand(&mut ts, expr, dialect);
                ts.space();
                ts.push(if *negated {
                    Token::IsNotNull
                } else {
                    Token::IsNull
                });
            }

            Expr::Like { expr, pattern } => {
                emit_operand(&mut ts, expr, dialect);
                ts.space()
                    .push(Token::Like)
                    .space()
                    .push(Token::LitString(pattern.clone()));
            }

            Expr::WindowFunction {
                function,
                partition_by,
                order_by,
            } => {
                ts.append(&function.to_tokens_for_dialect(dialect));
                ts.space().push(Token::Over).space().lparen();

                let mut need_space = false;

                if !partition_by.is_empty() {
                    ts.push(Token::PartitionBy).space();
                    for (i, expr) in partition_by.iter().enumerate() {
                        if i > 0 {
                            ts.comma().space();
                        }
                        ts.append(&expr.to_tokens_for_dialect(dialect));
                    }
                    need_space = true;
                }

                if !order_by.is_empty() {
                    if need_space {
                        ts.space();
                    }
                    ts.push(Token::OrderBy).space();
                    for (i, ob) in order_by.iter().enumerate() {
                        if i > 0 {
                            ts.comma().space();
                        }
                        ts.append(&ob.expr.to_tokens_for_dialect(dialect));
                        ts.space().push(match ob.dir {
                            SortDir::Asc => Token::Asc,
                            SortDir::Desc => Token::Desc,
                        });
                        if let Some(nulls) = &ob.nulls {
                            if dialect.supports_nulls_ordering() {
                                ts.space().push(match nulls {
                                    NullsOrder::First => Token::NullsFirst,
                                    NullsOrder::Last => Token::NullsLast,
                                });
                            }
                        }
                    }
                }

                ts.rparen();
            }
        }

        ts
    }

    fn needs_parens(&self) -> bool {
        matches!(
            self,
            Expr::BinaryOp { .. } | Expr::In { .. } | Expr::Like { .. }
        )
    }
}

fn emit_operand(ts: &mut TokenStream, expr: &Expr, dialect: Dialect) {
    if expr.needs_parens() {
        ts.lparen();
        ts.append(&expr.to_tokens_for_dialect(dialect));
        ts.rparen();
    } else {
        ts.append(&expr.to_tokens_for_dialect(dialect));
    }
}

// Flattens a chain of concatenations into one CONCAT(...) argument list.
fn emit_concat_args(ts: &mut TokenStream, expr: &Expr, dialect: Dialect) {
    match expr {
        Expr::BinaryOp {
            left,
            op: BinaryOperator::Concat,
            right,
        } => {
            emit_concat_args(ts, left, dialect);
            ts.comma().space();
            emit_concat_args(ts, right, dialect);
        }
        other => {
            ts.append(&other.to_tokens_for_dialect(dialect));
        }
    }
}

fn binary_op_to_token(op: BinaryOperator) -> Token {
    match op {
        BinaryOperator::Eq => Token::Eq,
        BinaryOperator::Ne => Token::Ne,
        BinaryOperator::Lt => Token::Lt,
        BinaryOperator::Gt => Token::Gt,
        BinaryOperator::Lte => Token::Lte,
        BinaryOperator::Gte => Token::Gte,
        BinaryOperator::And => Token::And,
        BinaryOperator::Or => Token::Or,
        BinaryOperator::Plus => Token::Plus,
        BinaryOperator::Minus => Token::Minus,
        BinaryOperator::Mul => Token::Mul,
        BinaryOperator::Div => Token::Div,
        BinaryOperator::Concat => Token::Concat,
    }
}

// =============================================================================
// Expression Constructors
// =============================================================================

/// Create a column reference.
pub fn col(name: &str) -> Expr {
    Expr::Column {
        table: None,
        column: name.into(),
    }
}

/// Create a qualified column reference.
pub fn table_col(table: &str, column: &str) -> Expr {
    Expr::Column {
        table: Some(table.into()),
        column: column.into(),
    }
}

pub fn lit_int(n: i64) -> Expr {
    Expr::Literal(Literal::Int(n))
}

pub fn lit_decimal(d: Decimal) -> Expr {
    Expr::Literal(Literal::Decimal(d))
}

pub fn lit_str(s: &str) -> Expr {
    Expr::Literal(Literal::String(s.into()))
}

pub fn lit_bool(b: bool) -> Expr {
    Expr::Literal(Literal::Bool(b))
}

pub fn lit_null() -> Expr {
    Expr::Literal(Literal::Null)
}

pub fn count_star() -> Expr {
    Expr::CountStar
}

pub fn sum(expr: Expr) -> Expr {
    func("SUM", vec![expr])
}

pub fn avg(expr: Expr) -> Expr {
    func("AVG", vec![expr])
}

pub fn max(expr: Expr) -> Expr {
    func("MAX", vec![expr])
}

pub fn coalesce(args: Vec<Expr>) -> Expr {
    func("COALESCE", args)
}

/// Generic function call.
pub fn func(name: &str, args: Vec<Expr>) -> Expr {
    Expr::Function {
        name: name.into(),
        args,
    }
}

pub fn row_number() -> Expr {
    func("ROW_NUMBER", vec![])
}

/// `CASE WHEN condition THEN then ELSE otherwise END`
pub fn case_when(condition: Expr, then: Expr, otherwise: Expr) -> Expr {
    Expr::Case {
        when_clauses: vec![(condition, then)],
        else_clause: Some(Box::new(otherwise)),
    }
}

pub fn cast(expr: Expr, type_name: &str) -> Expr {
    Expr::Cast {
        expr: Box::new(expr),
        type_name: type_name.into(),
    }
}

pub fn extract(part: DatePart, expr: Expr) -> Expr {
    Expr::Extract {
        part,
        expr: Box::new(expr),
    }
}

// =============================================================================
// Window Builder
// =============================================================================

/// Builder for `function OVER (...)`.
#[derive(Debug, Clone)]
#[must_use = "call build() to produce the window expression"]
pub struct WindowBuilder {
    function: Expr,
    partition_by: Vec<Expr>,
    order_by: Vec<WindowOrderBy>,
}

impl WindowBuilder {
    pub fn new(function: Expr) -> Self {
        Self {
            function,
            partition_by: Vec::new(),
            order_by: Vec::new(),
        }
    }

    pub fn partition_by(mut self, exprs: Vec<Expr>) -> Self {
        self.partition_by = exprs;
        self
    }

    pub fn order_by(mut self, exprs: Vec<WindowOrderBy>) -> Self {
        self.order_by = exprs;
        self
    }

    pub fn build(self) -> Expr {
        Expr::WindowFunction {
            function: Box::new(self.function),
            partition_by: self.partition_by,
            order_by: self.order_by,
        }
    }
}

/// Extension trait to start a window specification.
pub trait WindowExt: Sized {
    fn over(self) -> WindowBuilder;
}

impl WindowExt for Expr {
    fn over(self) -> WindowBuilder {
        WindowBuilder::new(self)
    }
}

// =============================================================================
// Fluent Operators
// =============================================================================

fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Expr {
    Expr::BinaryOp {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

/// Extension trait providing fluent operators on SQL expressions.
pub trait ExprExt: Sized {
    fn into_expr(self) -> Expr;

    fn eq(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Eq, other.into())
    }

    fn ne(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Ne, other.into())
    }

    fn gt(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Gt, other.into())
    }

    fn gte(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Gte, other.into())
    }

    fn lt(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Lt, other.into())
    }

    fn lte(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Lte, other.into())
    }

    fn and(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::And, other.into())
    }

    fn or(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Or, other.into())
    }

    fn not(self) -> Expr {
        Expr::UnaryOp {
            op: UnaryOperator::Not,
            expr: Box::new(self.into_expr()),
        }
    }

    fn add(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Plus, other.into())
    }

    fn sub(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Minus, other.into())
    }

    fn mul(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Mul, other.into())
    }

    fn div(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Div, other.into())
    }

    fn concat(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Concat, other.into())
    }

    fn like(self, pattern: &str) -> Expr {
        Expr::Like {
            expr: Box::new(self.into_expr()),
            pattern: pattern.into(),
        }
    }

    fn is_null(self) -> Expr {
        Expr::IsNull {
            expr: Box::new(self.into_expr()),
            negated: false,
        }
    }

    fn is_not_null(self) -> Expr {
        Expr::IsNull {
            expr: Box::new(self.into_expr()),
            negated: true,
        }
    }

    fn in_list(self, values: Vec<Expr>) -> Expr {
        Expr::In {
            expr: Box::new(self.into_expr()),
            values,
        }
    }

    fn alias(self, name: &str) -> SelectExpr {
        SelectExpr::new(self.into_expr()).with_alias(name)
    }
}

impl ExprExt for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<i64> for Expr {
    fn from(n: i64) -> Self {
        lit_int(n)
    }
}

impl From<i32> for Expr {
    fn from(n: i32) -> Self {
        lit_int(n as i64)
    }
}

impl From<Decimal> for Expr {
    fn from(d: Decimal) -> Self {
        lit_decimal(d)
    }
}

impl From<&str> for Expr {
    fn from(s: &str) -> Self {
        lit_str(s)
    }
}

impl From<bool> for Expr {
    fn from(b: bool) -> Self {
        lit_bool(b)
    }
}

impl From<Query> for Expr {
    fn from(query: Query) -> Self {
        Expr::Subquery(Box::new(query))
    }
}
