use thiserror::Error;

/// Coarse classification of a [DbError], used by callers that only need to
/// know which layer rejected a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown or duplicate tables, fields and aliases.
    Schema,
    /// Kind mismatches and oversized strings.
    Type,
    /// NOT NULL, UNIQUE and foreign-key violations.
    Constraint,
    /// Failures while evaluating an expression or driving a scan.
    Eval,
    /// Failures while reading or writing a database dump.
    Io,
}

/// Every error the engine can raise.
///
/// Errors are raised at the point of detection and propagate unchanged up to
/// the statement boundary. Mutations performed before the error are kept.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("no such table: {0}")]
    UnknownTable(String),

    #[error("no such field: {0}")]
    FieldNotFound(String),

    #[error("table {0} already exists")]
    TableExists(String),

    #[error("field {0} is listed more than once")]
    DuplicateField(String),

    #[error("ambiguous field name: {0}")]
    AmbiguousField(String),

    #[error("unknown table or alias: {0}")]
    UnknownAlias(String),

    #[error("alias {0} collides with a table name or another alias")]
    AliasCollision(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("string of {len} bytes does not fit into {field} (capacity {capacity})")]
    StringTooLong {
        field: String,
        capacity: usize,
        len: usize,
    },

    #[error("value {value} is out of range for {field} ({expected})")]
    OutOfRange {
        field: String,
        expected: String,
        value: String,
    },

    #[error("string for {0} contains a NUL byte")]
    NulInString(String),

    #[error("NOT NULL constraint failed: {0}")]
    NotNullViolation(String),

    #[error("field {0} must be specified")]
    MissingField(String),

    #[error("UNIQUE constraint failed: {table}.{field}")]
    UniqueViolation { table: String, field: String },

    #[error("FOREIGN KEY constraint failed: {table}.{field}")]
    ForeignKeyViolation { table: String, field: String },

    #[error("table {0} is still referenced by dependent rows")]
    DependentRows(String),

    #[error("cannot apply `{op}` to {left} and {right}")]
    InvalidOperation {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("cannot access field {0} in this context")]
    FieldAccessForbidden(String),

    #[error("invalid expression: {0}")]
    InvalidExpression(String),

    #[error("scan is not positioned on a row")]
    NoCurrentRow,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt dump: {0}")]
    CorruptDump(String),
}

impl DbError {
    /// Returns the taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownTable(_)
            | Self::FieldNotFound(_)
            | Self::TableExists(_)
            | Self::DuplicateField(_)
            | Self::AmbiguousField(_)
            | Self::UnknownAlias(_)
            | Self::AliasCollision(_)
            | Self::InvalidQuery(_) => ErrorKind::Schema,
            Self::TypeMismatch { .. }
            | Self::StringTooLong { .. }
            | Self::OutOfRange { .. }
            | Self::NulInString(_) => ErrorKind::Type,
            Self::NotNullViolation(_)
            | Self::MissingField(_)
            | Self::UniqueViolation { .. }
            | Self::ForeignKeyViolation { .. }
            | Self::DependentRows(_) => ErrorKind::Constraint,
            Self::InvalidOperation { .. }
            | Self::DivisionByZero
            | Self::FieldAccessForbidden(_)
            | Self::InvalidExpression(_)
            | Self::NoCurrentRow => ErrorKind::Eval,
            Self::Io(_) | Self::CorruptDump(_) => ErrorKind::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_buckets() {
        assert_eq!(DbError::UnknownTable("t".into()).kind(), ErrorKind::Schema);
        assert_eq!(
            DbError::TypeMismatch {
                expected: "INT".into(),
                found: "VARCHAR".into()
            }
            .kind(),
            ErrorKind::Type
        );
        assert_eq!(
            DbError::UniqueViolation {
                table: "t".into(),
                field: "a".into()
            }
            .kind(),
            ErrorKind::Constraint
        );
        assert_eq!(DbError::NulInString("a".into()).kind(), ErrorKind::Type);
        assert_eq!(DbError::DivisionByZero.kind(), ErrorKind::Eval);
        assert_eq!(DbError::CorruptDump("eof".into()).kind(), ErrorKind::Io);
    }

    #[test]
    fn test_messages() {
        let err = DbError::StringTooLong {
            field: "name".into(),
            capacity: 4,
            len: 9,
        };
        assert_eq!(
            err.to_string(),
            "string of 9 bytes does not fit into name (capacity 4)"
        );
        assert_eq!(
            DbError::NotNullViolation("a".into()).to_string(),
            "NOT NULL constraint failed: a"
        );
    }
}
