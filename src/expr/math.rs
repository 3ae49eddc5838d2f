use crate::error::{DbError, Result};
use crate::value::Value;

use super::MathOp;

/// Numeric rank used for promotion: Bool < Int < Float < Double.
fn rank(value: &Value) -> Option<u8> {
    match value {
        Value::Bool(_) => Some(0),
        Value::Int(_) => Some(1),
        Value::Float(_) => Some(2),
        Value::Double(_) => Some(3),
        _ => None,
    }
}

fn as_i32(value: &Value) -> i32 {
    match value {
        Value::Bool(b) => i32::from(*b),
        Value::Int(i) => *i,
        _ => 0,
    }
}

fn as_f32(value: &Value) -> f32 {
    match value {
        Value::Float(f) => *f,
        other => as_i32(other) as f32,
    }
}

/// Applies an arithmetic operator.
///
/// Numbers are promoted to the wider kind, with Bool widened at least to Int.
/// Strings support `+` as concatenation. NULL in, NULL out.
///
/// # Errors
/// - [DbError::DivisionByZero] on integer division by zero.
/// - [DbError::InvalidOperation] on integer overflow or unsupported kinds.
pub(super) fn apply(op: MathOp, lhs: &Value, rhs: &Value) -> Result<Value> {
    if lhs.is_null() || rhs.is_null() {
        return Ok(Value::Null);
    }
    let invalid = || DbError::InvalidOperation {
        op: op.symbol(),
        left: lhs.type_name(),
        right: rhs.type_name(),
    };

    if let (Value::Varchar(a), Value::Varchar(b)) = (lhs, rhs) {
        return match op {
            MathOp::Plus => Ok(Value::varchar(format!("{a}{b}"))),
            _ => Err(invalid()),
        };
    }

    let (Some(l), Some(r)) = (rank(lhs), rank(rhs)) else {
        return Err(invalid());
    };
    match l.max(r).max(1) {
        1 => {
            let (a, b) = (as_i32(lhs), as_i32(rhs));
            let result = match op {
                MathOp::Plus => a.checked_add(b),
                MathOp::Minus => a.checked_sub(b),
                MathOp::Mul => a.checked_mul(b),
                MathOp::Div => {
                    if b == 0 {
                        return Err(DbError::DivisionByZero);
                    }
                    a.checked_div(b)
                }
            };
            result.map(Value::Int).ok_or_else(invalid)
        }
        2 => {
            let (a, b) = (as_f32(lhs), as_f32(rhs));
            Ok(Value::Float(match op {
                MathOp::Plus => a + b,
                MathOp::Minus => a - b,
                MathOp::Mul => a * b,
                MathOp::Div => a / b,
            }))
        }
        _ => {
            let (Some(a), Some(b)) = (lhs.to_f64(), rhs.to_f64()) else {
                return Err(invalid());
            };
            Ok(Value::Double(match op {
                MathOp::Plus => a + b,
                MathOp::Minus => a - b,
                MathOp::Mul => a * b,
                MathOp::Div => a / b,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calc(op: MathOp, a: Value, b: Value) -> Result<Value> {
        apply(op, &a, &b)
    }

    // ─────────────────────────────────────────────────────────────
    // Test 1 : integer arithmetic
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_int() {
        assert_eq!(calc(MathOp::Plus, Value::Int(2), Value::Int(3)).unwrap(), Value::Int(5));
        assert_eq!(calc(MathOp::Minus, Value::Int(0), Value::Int(3)).unwrap(), Value::Int(-3));
        assert_eq!(calc(MathOp::Mul, Value::Int(4), Value::Int(4)).unwrap(), Value::Int(16));
        assert_eq!(calc(MathOp::Div, Value::Int(7), Value::Int(2)).unwrap(), Value::Int(3));
    }

    // ─────────────────────────────────────────────────────────────
    // Test 2 : promotion
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_promotion() {
        assert_eq!(
            calc(MathOp::Plus, Value::Bool(true), Value::Bool(true)).unwrap(),
            Value::Int(2)
        );
        assert_eq!(
            calc(MathOp::Mul, Value::Int(2), Value::Float(1.5)).unwrap(),
            Value::Float(3.0)
        );
        assert_eq!(
            calc(MathOp::Plus, Value::Float(1.0), Value::Double(0.5)).unwrap(),
            Value::Double(1.5)
        );
        assert_eq!(
            calc(MathOp::Div, Value::Int(1), Value::Double(4.0)).unwrap(),
            Value::Double(0.25)
        );
    }

    // ─────────────────────────────────────────────────────────────
    // Test 3 : NULL and strings
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_null_and_strings() {
        assert_eq!(calc(MathOp::Plus, Value::Null, Value::Int(1)).unwrap(), Value::Null);
        assert_eq!(
            calc(MathOp::Plus, Value::varchar("ab"), Value::varchar("cd")).unwrap(),
            Value::varchar("abcd")
        );
        assert!(matches!(
            calc(MathOp::Minus, Value::varchar("ab"), Value::varchar("cd")),
            Err(DbError::InvalidOperation { op: "-", .. })
        ));
        assert!(matches!(
            calc(MathOp::Plus, Value::Int(1), Value::varchar("cd")),
            Err(DbError::InvalidOperation { .. })
        ));
    }

    // ─────────────────────────────────────────────────────────────
    // Test 4 : division by zero and overflow
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_errors() {
        assert!(matches!(
            calc(MathOp::Div, Value::Int(1), Value::Int(0)),
            Err(DbError::DivisionByZero)
        ));
        assert!(matches!(
            calc(MathOp::Plus, Value::Int(i32::MAX), Value::Int(1)),
            Err(DbError::InvalidOperation { .. })
        ));
        let inf = calc(MathOp::Div, Value::Double(1.0), Value::Int(0)).unwrap();
        assert_eq!(inf, Value::Double(f64::INFINITY));
    }
}
