//! An embeddable relational engine over an in-memory row store.
//!
//! Statements are described by the structs in [query] and run through
//! [Database::execute] and [Database::query]. Queries are planned into a
//! tree of [Scan]s whose predicates and computed fields are [expr::Expr]s
//! evaluated over SQL three-valued logic. Rows are stored packed, with a
//! null bitmap in front of the field bytes.

pub mod constraint;
pub mod data_type;
pub mod database;
pub mod error;
pub mod exec;
pub mod expr;
pub mod persist;
pub mod query;
pub mod row;
pub mod scan;
pub mod schema;
pub mod storage;
pub mod value;

pub use constraint::{OnAction, ReferencesConstraint};
pub use data_type::DataType;
pub use database::Database;
pub use error::{DbError, ErrorKind, Result};
pub use exec::{QueryResult, render_result};
pub use expr::{FactorTree, GenBinOp};
pub use scan::{FieldSource, Scan};
pub use schema::{ColumnDef, Schema};
pub use value::Value;
