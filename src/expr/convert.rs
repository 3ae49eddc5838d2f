use crate::error::{DbError, Result};
use crate::value::Value;

use super::tree::{Constant, ExprTree, Factor, FactorTree, GenBinOp};
use super::{BinBoolOp, CmpOp, Expr, MathOp, ScanSelector};

/// Turns a [FactorTree] into an executable [Expr].
///
/// Every field reference is checked against the source picked by the
/// selector, so a converted expression never refers to a missing field.
/// Derived operators are desugared:
/// - `a <= b` becomes `a < b OR a = b`
/// - `a >= b` becomes `b < a OR a = b`
/// - `a > b` becomes `b < a`
/// - `a != b` and `a IS NOT b` become `NOT (a = b)` and `NOT (a IS b)`
/// - unary minus becomes `0 - x`
pub struct ExprTreeConverter<S> {
    selector: S,
}

impl<S: ScanSelector> ExprTreeConverter<S> {
    pub fn new(selector: S) -> Self {
        Self { selector }
    }

    /// # Errors
    /// - [DbError::FieldNotFound] for a field the selected source lacks.
    /// - [DbError::FieldAccessForbidden] when the selector allows no fields.
    /// - [DbError::InvalidExpression] for operators with too few operands.
    pub fn convert(&self, tree: &FactorTree) -> Result<Expr> {
        let mut expr = match &tree.factor {
            Factor::Const(constant) => Expr::Const(constant_value(constant)),
            Factor::Field(name) => self.field(name)?,
            Factor::Tree(tree) => self.convert_tree(tree)?,
        };
        if tree.neg_applied {
            expr = Expr::math(MathOp::Minus, Expr::Const(Value::Int(0)), expr);
        }
        if tree.not_applied {
            expr = Expr::not(expr);
        }
        Ok(expr)
    }

    fn field(&self, name: &str) -> Result<Expr> {
        let source = self.selector.select(name)?;
        if !source.has_field(name) {
            return Err(DbError::FieldNotFound(name.to_owned()));
        }
        Ok(Expr::Field(name.to_owned()))
    }

    fn convert_tree(&self, tree: &ExprTree) -> Result<Expr> {
        if tree.factors.len() < 2 {
            return Err(DbError::InvalidExpression(format!(
                "{:?} needs at least two operands, got {}",
                tree.op,
                tree.factors.len()
            )));
        }
        if tree.op.is_comparison() {
            let [lhs, rhs] = tree.factors.as_slice() else {
                return Err(DbError::InvalidExpression(format!(
                    "{:?} takes exactly two operands, got {}",
                    tree.op,
                    tree.factors.len()
                )));
            };
            return self.comparison(tree.op, lhs, rhs);
        }

        let fold: fn(Expr, Expr) -> Expr = match tree.op {
            GenBinOp::And => |l, r| Expr::bin_bool(BinBoolOp::And, l, r),
            GenBinOp::Or => |l, r| Expr::bin_bool(BinBoolOp::Or, l, r),
            GenBinOp::Xor => |l, r| Expr::bin_bool(BinBoolOp::Xor, l, r),
            GenBinOp::Plus => |l, r| Expr::math(MathOp::Plus, l, r),
            GenBinOp::Minus => |l, r| Expr::math(MathOp::Minus, l, r),
            GenBinOp::Mul => |l, r| Expr::math(MathOp::Mul, l, r),
            GenBinOp::Div => |l, r| Expr::math(MathOp::Div, l, r),
            op => {
                return Err(DbError::InvalidExpression(format!(
                    "unexpected operator {op:?}"
                )));
            }
        };
        let mut factors = tree.factors.iter();
        let mut acc = match factors.next() {
            Some(first) => self.convert(first)?,
            None => return Err(DbError::InvalidExpression("empty expression".into())),
        };
        for factor in factors {
            acc = fold(acc, self.convert(factor)?);
        }
        Ok(acc)
    }

    fn comparison(&self, op: GenBinOp, a: &FactorTree, b: &FactorTree) -> Result<Expr> {
        let eq = || -> Result<Expr> { Ok(Expr::cmp(CmpOp::Eq, self.convert(a)?, self.convert(b)?)) };
        let expr = match op {
            GenBinOp::Eq => eq()?,
            GenBinOp::NotEq => Expr::not(eq()?),
            GenBinOp::Lt => Expr::cmp(CmpOp::Lt, self.convert(a)?, self.convert(b)?),
            GenBinOp::Gt => Expr::cmp(CmpOp::Lt, self.convert(b)?, self.convert(a)?),
            GenBinOp::Le => Expr::bin_bool(
                BinBoolOp::Or,
                Expr::cmp(CmpOp::Lt, self.convert(a)?, self.convert(b)?),
                eq()?,
            ),
            GenBinOp::Ge => Expr::bin_bool(
                BinBoolOp::Or,
                Expr::cmp(CmpOp::Lt, self.convert(b)?, self.convert(a)?),
                eq()?,
            ),
            GenBinOp::Is => Expr::is(self.convert(a)?, self.convert(b)?),
            GenBinOp::IsNot => Expr::not(Expr::is(self.convert(a)?, self.convert(b)?)),
            op => {
                return Err(DbError::InvalidExpression(format!(
                    "{op:?} is not a comparison"
                )));
            }
        };
        Ok(expr)
    }
}

fn constant_value(constant: &Constant) -> Value {
    match constant {
        Constant::Int(i) => Value::Int(*i),
        Constant::Double(d) => Value::Double(*d),
        Constant::Str(s) => Value::varchar(s),
        Constant::Bool(b) => Value::Bool(*b),
        Constant::Null => Value::Null,
    }
}
