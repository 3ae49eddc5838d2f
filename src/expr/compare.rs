use std::cmp::Ordering;

use crate::error::{DbError, Result};
use crate::value::Value;

use super::CmpOp;

/// Compares two values.
///
/// Numbers of any kind compare by value after widening, strings compare
/// lexicographically by bytes. Any NULL operand gives NULL.
///
/// # Errors
/// Returns [DbError::TypeMismatch] when a number is compared with a string.
pub(super) fn compare(op: CmpOp, lhs: &Value, rhs: &Value) -> Result<Value> {
    if lhs.is_null() || rhs.is_null() {
        return Ok(Value::Null);
    }
    let ordering = match (lhs, rhs) {
        (Value::Varchar(a), Value::Varchar(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
        _ => match (lhs.to_f64(), rhs.to_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => {
                return Err(DbError::TypeMismatch {
                    expected: lhs.type_name().to_owned(),
                    found: rhs.type_name().to_owned(),
                });
            }
        },
    };
    // NaN compares false both ways.
    let result = match op {
        CmpOp::Eq => ordering == Some(Ordering::Equal),
        CmpOp::Lt => ordering == Some(Ordering::Less),
    };
    Ok(Value::Bool(result))
}

/// Identity comparison, never NULL: two NULLs are identical, a NULL and a
/// non-NULL are not, values of unrelated kinds are not.
pub(super) fn is(lhs: &Value, rhs: &Value) -> Value {
    let same = match (lhs, rhs) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Varchar(a), Value::Varchar(b)) => a == b,
        _ => match (lhs.to_f64(), rhs.to_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
    };
    Value::Bool(same)
}
