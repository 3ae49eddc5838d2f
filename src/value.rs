use std::fmt;
use std::sync::Arc;

use crate::data_type::DataType;

/// Represents a single value flowing through the engine.
///
/// A value is either one of the five storable kinds or SQL `NULL`. Values
/// read from rows, produced by expressions and returned to callers all use
/// this type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Represents an absent value.
    Null,
    Bool(bool),
    /// A 32-bit signed integer value.
    Int(i32),
    /// A 32-bit floating-point value.
    Float(f32),
    /// A 64-bit floating-point value.
    Double(f64),
    /// A UTF-8 string value, wrapped in an [Arc] for cheap cloning.
    Varchar(Arc<str>),
}

impl Value {
    /// Builds a [Value::Varchar] from anything string-like.
    pub fn varchar(s: impl AsRef<str>) -> Self {
        Self::Varchar(Arc::from(s.as_ref()))
    }

    /// Returns `true` if the value is [Value::Null].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Varchar(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the logical [DataType] of this value, or `None` for
    /// [Value::Null] which carries no kind of its own.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Self::Null => None,
            Self::Bool(_) => Some(DataType::Bool),
            Self::Int(_) => Some(DataType::Int),
            Self::Float(_) => Some(DataType::Float),
            Self::Double(_) => Some(DataType::Double),
            Self::Varchar(_) => Some(DataType::Varchar),
        }
    }

    /// Name of the value's kind, used in error messages.
    pub fn type_name(&self) -> &'static str {
        self.data_type().map_or("NULL", DataType::name)
    }

    /// Returns `true` for Bool, Int, Float and Double values.
    pub fn is_numeric(&self) -> bool {
        self.data_type().is_some_and(DataType::is_numeric)
    }

    /// Widens any numeric value to `f64`. Booleans count as 0 and 1.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Self::Bool(b) => Some(f64::from(u8::from(*b))),
            Self::Int(i) => Some(f64::from(*i)),
            Self::Float(f) => Some(f64::from(*f)),
            Self::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Truthiness of a value used as a condition.
    ///
    /// Numbers are true when non-zero, strings when non-empty. Returns `None`
    /// for [Value::Null], the unknown truth value.
    pub fn truth(&self) -> Option<bool> {
        match self {
            Self::Null => None,
            Self::Bool(b) => Some(*b),
            Self::Int(i) => Some(*i != 0),
            Self::Float(f) => Some(*f != 0.0),
            Self::Double(d) => Some(*d != 0.0),
            Self::Varchar(s) => Some(!s.is_empty()),
        }
    }

    /// Returns `true` only when the value is definitely true.
    pub fn is_true(&self) -> bool {
        self.truth() == Some(true)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Double(x) => write!(f, "{x}"),
            Self::Varchar(s) => write!(f, "'{s}'"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Self::Float(f)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Self::Double(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::varchar(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ─────────────────────────────────────────────────────────────
    // Test 1 : is_null
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_is_null() {
        assert!(Value::Null.is_null());
        assert!(!Value::Int(1).is_null());
        assert!(!Value::Double(1.0).is_null());
        assert!(!Value::varchar("x").is_null());
        assert!(!Value::Bool(false).is_null());
    }

    // ─────────────────────────────────────────────────────────────
    // Test 2 : accessors
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_accessors() {
        assert_eq!(Value::Int(42).as_int(), Some(42));
        assert_eq!(Value::Double(1.0).as_int(), None);
        assert_eq!(Value::Float(2.5).as_float(), Some(2.5));
        assert_eq!(Value::Double(2.5).as_double(), Some(2.5));
        assert_eq!(Value::varchar("hello").as_str(), Some("hello"));
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Null.as_bool(), None);
    }

    // ─────────────────────────────────────────────────────────────
    // Test 3 : data_type
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_data_type() {
        assert_eq!(Value::Null.data_type(), None);
        assert_eq!(Value::Bool(true).data_type(), Some(DataType::Bool));
        assert_eq!(Value::Int(1).data_type(), Some(DataType::Int));
        assert_eq!(Value::Float(1.0).data_type(), Some(DataType::Float));
        assert_eq!(Value::Double(1.0).data_type(), Some(DataType::Double));
        assert_eq!(Value::varchar("x").data_type(), Some(DataType::Varchar));
        assert_eq!(Value::Null.type_name(), "NULL");
    }

    // ─────────────────────────────────────────────────────────────
    // Test 4 : truthiness
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_truth() {
        assert_eq!(Value::Null.truth(), None);
        assert_eq!(Value::Int(0).truth(), Some(false));
        assert_eq!(Value::Int(-3).truth(), Some(true));
        assert_eq!(Value::Double(0.0).truth(), Some(false));
        assert_eq!(Value::varchar("").truth(), Some(false));
        assert_eq!(Value::varchar("a").truth(), Some(true));
        assert!(!Value::Null.is_true());
    }

    // ─────────────────────────────────────────────────────────────
    // Test 5 : numeric widening
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_to_f64() {
        assert_eq!(Value::Bool(true).to_f64(), Some(1.0));
        assert_eq!(Value::Int(7).to_f64(), Some(7.0));
        assert_eq!(Value::Float(42.0).to_f64(), Some(42.0));
        assert_eq!(Value::varchar("7").to_f64(), None);
        assert!(Value::Bool(false).is_numeric());
        assert!(!Value::Null.is_numeric());
    }

    // ─────────────────────────────────────────────────────────────
    // Test 6 : Display
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Int(5).to_string(), "5");
        assert_eq!(Value::Double(55.5).to_string(), "55.5");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::varchar("Egor").to_string(), "'Egor'");
    }
}
