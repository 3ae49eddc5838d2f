use std::fmt;

/// Represents the supported column types of a table schema.
/// These types decide how many bytes a field occupies inside a packed row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// A boolean, stored as a 4-byte integer.
    Bool,
    /// A 32-bit signed integer.
    Int,
    /// A 32-bit floating-point number.
    Float,
    /// A 64-bit floating-point number.
    Double,
    /// A UTF-8 string with a fixed, declared byte capacity.
    Varchar,
}

impl DataType {
    /// Size in bytes of a field of this type, or `None` for [DataType::Varchar]
    /// whose size is the declared capacity.
    pub fn fixed_size(self) -> Option<usize> {
        match self {
            Self::Bool | Self::Int | Self::Float => Some(4),
            Self::Double => Some(8),
            Self::Varchar => None,
        }
    }

    /// Returns `true` for the types taking part in numeric promotion.
    pub fn is_numeric(self) -> bool {
        !matches!(self, Self::Varchar)
    }

    /// Tag byte used by the dump format.
    pub fn tag(self) -> u8 {
        match self {
            Self::Bool => 0,
            Self::Int => 1,
            Self::Float => 2,
            Self::Double => 3,
            Self::Varchar => 4,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Bool),
            1 => Some(Self::Int),
            2 => Some(Self::Float),
            3 => Some(Self::Double),
            4 => Some(Self::Varchar),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "BOOL",
            Self::Int => "INT",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::Varchar => "VARCHAR",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_sizes() {
        assert_eq!(DataType::Bool.fixed_size(), Some(4));
        assert_eq!(DataType::Int.fixed_size(), Some(4));
        assert_eq!(DataType::Float.fixed_size(), Some(4));
        assert_eq!(DataType::Double.fixed_size(), Some(8));
        assert_eq!(DataType::Varchar.fixed_size(), None);
    }

    #[test]
    fn test_tags() {
        for data_type in [
            DataType::Bool,
            DataType::Int,
            DataType::Float,
            DataType::Double,
            DataType::Varchar,
        ] {
            assert_eq!(DataType::from_tag(data_type.tag()), Some(data_type));
        }
        assert_eq!(DataType::from_tag(9), None);
    }
}
