//! Executable expressions.
//!
//! An [Expr] is evaluated against a [FieldSource] holding the current row.
//! Expressions are built from the parser-facing [FactorTree] by
//! [ExprTreeConverter], which also checks every field reference.

mod compare;
mod convert;
mod logic;
mod math;
mod selector;
mod tree;

use std::cell::RefCell;

pub use convert::ExprTreeConverter;
pub use selector::{NoScanSelector, ScanSelector, SimpleScanSelector};
pub use tree::{Constant, ExprTree, Factor, FactorTree, GenBinOp};

use crate::error::{DbError, Result};
use crate::scan::{FieldSource, Scan};
use crate::value::Value;

/// Primitive comparisons. `<=`, `>`, `>=` and `!=` are expressed through
/// these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    /// Strictly less than.
    Lt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinBoolOp {
    And,
    Or,
    Xor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathOp {
    Plus,
    Minus,
    Mul,
    Div,
}

impl MathOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Mul => "*",
            Self::Div => "/",
        }
    }
}

#[derive(Debug)]
pub enum Expr {
    Const(Value),
    /// Reference to a field of the row the expression is evaluated against.
    Field(String),
    Cmp {
        op: CmpOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    BinBool {
        op: BinBoolOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Math {
        op: MathOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Not(Box<Expr>),
    /// Identity comparison: `NULL IS NULL` is true.
    Is {
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// True when the scan yields at least one row. The scan is restarted on
    /// every evaluation.
    Exists(RefCell<Box<Scan>>),
}

impl Expr {
    pub fn cmp(op: CmpOp, lhs: Expr, rhs: Expr) -> Self {
        Self::Cmp {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn bin_bool(op: BinBoolOp, lhs: Expr, rhs: Expr) -> Self {
        Self::BinBool {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn math(op: MathOp, lhs: Expr, rhs: Expr) -> Self {
        Self::Math {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn not(inner: Expr) -> Self {
        Self::Not(Box::new(inner))
    }

    pub fn is(lhs: Expr, rhs: Expr) -> Self {
        Self::Is {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn exists(scan: Scan) -> Self {
        Self::Exists(RefCell::new(Box::new(scan)))
    }

    /// Evaluates the expression for the current row of `row`.
    ///
    /// # Errors
    /// - [DbError::FieldNotFound] if a referenced field is missing from `row`.
    /// - [DbError::TypeMismatch] when comparing a number with a string.
    /// - [DbError::InvalidOperation] and [DbError::DivisionByZero] from
    ///   arithmetic.
    pub fn eval(&self, row: &dyn FieldSource) -> Result<Value> {
        match self {
            Self::Const(value) => Ok(value.clone()),
            Self::Field(name) => row.get_field(name),
            Self::Cmp { op, lhs, rhs } => compare::compare(*op, &lhs.eval(row)?, &rhs.eval(row)?),
            Self::BinBool { op, lhs, rhs } => {
                Ok(logic::bin_bool(*op, &lhs.eval(row)?, &rhs.eval(row)?))
            }
            Self::Math { op, lhs, rhs } => math::apply(*op, &lhs.eval(row)?, &rhs.eval(row)?),
            Self::Not(inner) => Ok(logic::not(&inner.eval(row)?)),
            Self::Is { lhs, rhs } => Ok(compare::is(&lhs.eval(row)?, &rhs.eval(row)?)),
            Self::Exists(scan) => {
                let mut scan = scan.try_borrow_mut().map_err(|_| {
                    DbError::InvalidExpression("EXISTS evaluated recursively".into())
                })?;
                scan.before_first()?;
                Ok(Value::Bool(scan.next()?))
            }
        }
    }
}

/// `lhs IS rhs` as a plain bool.
pub fn identical(lhs: &Value, rhs: &Value) -> bool {
    compare::is(lhs, rhs).is_true()
}
