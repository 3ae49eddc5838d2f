use crate::value::Value;

use super::BinBoolOp;

fn from_truth(truth: Option<bool>) -> Value {
    truth.map_or(Value::Null, Value::Bool)
}

/// Three-valued AND, OR and XOR. Operands are coerced by [Value::truth].
pub(super) fn bin_bool(op: BinBoolOp, lhs: &Value, rhs: &Value) -> Value {
    let (a, b) = (lhs.truth(), rhs.truth());
    let truth = match op {
        BinBoolOp::And => match (a, b) {
            (Some(false), _) | (_, Some(false)) => Some(false),
            (Some(true), Some(true)) => Some(true),
            _ => None,
        },
        // NULL OR false stays NULL, as in SQL
        BinBoolOp::Or => match (a, b) {
            (Some(true), _) | (_, Some(true)) => Some(true),
            (Some(false), Some(false)) => Some(false),
            _ => None,
        },
        BinBoolOp::Xor => match (a, b) {
            (Some(a), Some(b)) => Some(a ^ b),
            _ => None,
        },
    };
    from_truth(truth)
}

pub(super) fn not(value: &Value) -> Value {
    from_truth(value.truth().map(|b| !b))
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: Value = Value::Bool(true);
    const F: Value = Value::Bool(false);
    const N: Value = Value::Null;

    #[test]
    fn test_and() {
        assert_eq!(bin_bool(BinBoolOp::And, &T, &T), T);
        assert_eq!(bin_bool(BinBoolOp::And, &T, &F), F);
        assert_eq!(bin_bool(BinBoolOp::And, &N, &F), F);
        assert_eq!(bin_bool(BinBoolOp::And, &T, &N), N);
    }

    #[test]
    fn test_or() {
        assert_eq!(bin_bool(BinBoolOp::Or, &F, &F), F);
        assert_eq!(bin_bool(BinBoolOp::Or, &N, &T), T);
        assert_eq!(bin_bool(BinBoolOp::Or, &F, &N), N);
        assert_eq!(bin_bool(BinBoolOp::Or, &N, &F), N);
        assert_eq!(bin_bool(BinBoolOp::Or, &N, &N), N);
    }

    #[test]
    fn test_xor() {
        assert_eq!(bin_bool(BinBoolOp::Xor, &T, &F), T);
        assert_eq!(bin_bool(BinBoolOp::Xor, &T, &T), F);
        assert_eq!(bin_bool(BinBoolOp::Xor, &N, &T), N);
    }

    #[test]
    fn test_coercion_and_not() {
        assert_eq!(bin_bool(BinBoolOp::And, &Value::Int(5), &Value::varchar("x")), T);
        assert_eq!(bin_bool(BinBoolOp::Or, &Value::Double(0.0), &Value::varchar("")), F);
        assert_eq!(not(&Value::Int(0)), T);
        assert_eq!(not(&T), F);
        assert_eq!(not(&N), N);
    }
}
