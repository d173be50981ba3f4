//! Expression trees for rule conditions.
//!
//! A rule's condition is an explicit AST built with the [`col`] and [`lit`]
//! builders plus combinator methods, e.g. `col("cyl").gt(lit(4))`. Nothing
//! is evaluated at construction time; the evaluator resolves identifiers
//! and runs the tree against a dataset later.
//!
//! # Example
//!
//! ```
//! use medir::{col, lit};
//!
//! let condition = col("cyl").gt(lit(4));
//! assert_eq!(condition.to_string(), "cyl > 4");
//! assert_eq!(condition.free_idents(), vec!["cyl"]);
//! ```

use std::fmt;

/// Identifier referenced by an expression (a column or a scope name).
pub type Identifier = String;

/// A scalar value: a literal in an expression, a captured scope value, or a
/// dataset-level evaluation result.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    /// Unknown marker.
    Null,
    /// Boolean value.
    Boolean(bool),
    /// 64-bit integer value.
    Int64(i64),
    /// 64-bit float value.
    Float64(f64),
    /// UTF-8 string value.
    Utf8(String),
}

impl ScalarValue {
    /// Returns the value as an f64 when it has a numeric reading
    /// (booleans read as 0/1), `None` for unknown markers and strings.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Null | Self::Utf8(_) => None,
            Self::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Int64(v) => Some(*v as f64),
            Self::Float64(v) => Some(*v),
        }
    }

    /// Returns true if this is the unknown marker.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Int64(v) => write!(f, "{}", v),
            Self::Float64(v) => write!(f, "{}", v),
            Self::Utf8(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i32> for ScalarValue {
    fn from(value: i32) -> Self {
        Self::Int64(i64::from(value))
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        Self::Int64(value)
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        Self::Float64(value)
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        Self::Utf8(value.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        Self::Utf8(value)
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// Kleene logical AND.
    And,
    /// Kleene logical OR.
    Or,
    /// Equality.
    Eq,
    /// Inequality.
    NotEq,
    /// Less than.
    Lt,
    /// Less than or equal.
    LtEq,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    GtEq,
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Division (computed in Float64).
    Div,
}

impl BinaryOp {
    fn symbol(self) -> &'static str {
        match self {
            Self::And => "&&",
            Self::Or => "||",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        }
    }

    fn precedence(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Eq | Self::NotEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq => 3,
            Self::Add | Self::Sub => 4,
            Self::Mul | Self::Div => 5,
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Kleene logical NOT.
    Not,
    /// Numeric negation.
    Neg,
}

/// Aggregate functions producing a dataset-level scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggFunc {
    /// Sum of known values.
    Sum,
    /// Mean of known values.
    Mean,
    /// Minimum of known values.
    Min,
    /// Maximum of known values.
    Max,
    /// Count of known values.
    Count,
}

impl AggFunc {
    fn name(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Mean => "mean",
            Self::Min => "min",
            Self::Max => "max",
            Self::Count => "count",
        }
    }
}

/// An unevaluated rule condition.
///
/// The `Display` rendering is the canonical textual form, used as the
/// measurement's rule key.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A name resolved at evaluation time: dataset columns first, then the
    /// rule's captured scope.
    Ident(Identifier),
    /// A literal scalar.
    Literal(ScalarValue),
    /// A binary operation.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// A unary operation.
    Unary {
        /// The operator.
        op: UnaryOp,
        /// The operand.
        expr: Box<Expr>,
    },
    /// An aggregate over the operand's values.
    Aggregate {
        /// The aggregate function.
        func: AggFunc,
        /// The operand.
        expr: Box<Expr>,
    },
    /// Tests for the unknown marker, yielding a known boolean per row.
    IsMissing(Box<Expr>),
}

/// Creates an identifier expression referencing a column or scope name.
pub fn col(name: impl Into<String>) -> Expr {
    Expr::Ident(name.into())
}

/// Creates a literal expression.
pub fn lit(value: impl Into<ScalarValue>) -> Expr {
    Expr::Literal(value.into())
}

#[allow(clippy::should_implement_trait)]
impl Expr {
    fn binary(self, op: BinaryOp, rhs: Expr) -> Self {
        Self::Binary {
            op,
            left: Box::new(self),
            right: Box::new(rhs),
        }
    }

    fn aggregate(self, func: AggFunc) -> Self {
        Self::Aggregate {
            func,
            expr: Box::new(self),
        }
    }

    /// Kleene logical AND.
    #[must_use]
    pub fn and(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::And, rhs)
    }

    /// Kleene logical OR.
    #[must_use]
    pub fn or(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Or, rhs)
    }

    /// Equality comparison.
    #[must_use]
    pub fn eq(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Eq, rhs)
    }

    /// Inequality comparison.
    #[must_use]
    pub fn not_eq(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::NotEq, rhs)
    }

    /// Less-than comparison.
    #[must_use]
    pub fn lt(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Lt, rhs)
    }

    /// Less-than-or-equal comparison.
    #[must_use]
    pub fn lt_eq(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::LtEq, rhs)
    }

    /// Greater-than comparison.
    #[must_use]
    pub fn gt(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Gt, rhs)
    }

    /// Greater-than-or-equal comparison.
    #[must_use]
    pub fn gt_eq(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::GtEq, rhs)
    }

    /// Addition.
    #[must_use]
    pub fn add(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Add, rhs)
    }

    /// Subtraction.
    #[must_use]
    pub fn sub(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Sub, rhs)
    }

    /// Multiplication. Boolean operands read as 0/1, so a violation flag
    /// times a magnitude column yields a materiality column.
    #[must_use]
    pub fn mul(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Mul, rhs)
    }

    /// Division, computed in Float64.
    #[must_use]
    pub fn div(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Div, rhs)
    }

    /// Kleene logical NOT.
    #[must_use]
    pub fn not(self) -> Self {
        Self::Unary {
            op: UnaryOp::Not,
            expr: Box::new(self),
        }
    }

    /// Numeric negation.
    #[must_use]
    pub fn neg(self) -> Self {
        Self::Unary {
            op: UnaryOp::Neg,
            expr: Box::new(self),
        }
    }

    /// Tests for the unknown marker.
    #[must_use]
    pub fn is_missing(self) -> Self {
        Self::IsMissing(Box::new(self))
    }

    /// Sum of known values, as a dataset-level scalar.
    #[must_use]
    pub fn sum(self) -> Self {
        self.aggregate(AggFunc::Sum)
    }

    /// Mean of known values, as a dataset-level scalar.
    #[must_use]
    pub fn mean(self) -> Self {
        self.aggregate(AggFunc::Mean)
    }

    /// Minimum of known values, as a dataset-level scalar.
    #[must_use]
    pub fn min(self) -> Self {
        self.aggregate(AggFunc::Min)
    }

    /// Maximum of known values, as a dataset-level scalar.
    #[must_use]
    pub fn max(self) -> Self {
        self.aggregate(AggFunc::Max)
    }

    /// Count of known values, as a dataset-level scalar.
    #[must_use]
    pub fn count(self) -> Self {
        self.aggregate(AggFunc::Count)
    }

    /// Returns the free identifiers in first-appearance order, deduplicated.
    ///
    /// These are the names the evaluator must resolve, columns taking
    /// precedence over captured scope values.
    pub fn free_idents(&self) -> Vec<&str> {
        let mut idents = Vec::new();
        self.collect_idents(&mut idents);
        idents
    }

    fn collect_idents<'a>(&'a self, idents: &mut Vec<&'a str>) {
        match self {
            Self::Ident(name) => {
                if !idents.contains(&name.as_str()) {
                    idents.push(name.as_str());
                }
            }
            Self::Literal(_) => {}
            Self::Binary { left, right, .. } => {
                left.collect_idents(idents);
                right.collect_idents(idents);
            }
            Self::Unary { expr, .. } => expr.collect_idents(idents),
            Self::Aggregate { expr, .. } => expr.collect_idents(idents),
            Self::IsMissing(expr) => expr.collect_idents(idents),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Self::Binary { op, .. } => op.precedence(),
            Self::Unary { .. } => 6,
            Self::Ident(_) | Self::Literal(_) | Self::Aggregate { .. } | Self::IsMissing(_) => 7,
        }
    }

    fn fmt_child(&self, f: &mut fmt::Formatter<'_>, parent: u8, right_side: bool) -> fmt::Result {
        let needs_parens =
            self.precedence() < parent || (right_side && self.precedence() == parent);
        if needs_parens {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(name) => write!(f, "{}", name),
            Self::Literal(value) => write!(f, "{}", value),
            Self::Binary { op, left, right } => {
                left.fmt_child(f, op.precedence(), false)?;
                write!(f, " {} ", op.symbol())?;
                right.fmt_child(f, op.precedence(), true)
            }
            Self::Unary { op, expr } => {
                match op {
                    UnaryOp::Not => write!(f, "!")?,
                    UnaryOp::Neg => write!(f, "-")?,
                }
                expr.fmt_child(f, 6, false)
            }
            Self::Aggregate { func, expr } => write!(f, "{}({})", func.name(), expr),
            Self::IsMissing(expr) => write!(f, "is_missing({})", expr),
        }
    }
}
