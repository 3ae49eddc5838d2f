//! Pull-based row iterators.
//!
//! A [Scan] is a cursor producing rows one at a time through
//! [Scan::before_first] and [Scan::next]. Composite scans own their children
//! and form a tree that is dropped as a whole.

mod extend;
mod join;
mod product;
mod project;
mod select;
mod table;

pub use extend::ExtendScan;
pub use join::LeftJoinScan;
pub use product::ProductScan;
pub use project::ProjectScan;
pub use select::SelectScan;
pub use table::TableScan;

use crate::error::{DbError, Result};
use crate::value::Value;

/// Anything that can resolve field names to values for the current row.
///
/// Expressions are evaluated against a `FieldSource`, which is usually the
/// scan they were bound to.
pub trait FieldSource {
    fn has_field(&self, name: &str) -> bool;

    fn get_field(&self, name: &str) -> Result<Value>;
}

/// A source that exposes no fields, used to evaluate constant expressions.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFields;

impl FieldSource for NoFields {
    fn has_field(&self, _name: &str) -> bool {
        false
    }

    fn get_field(&self, name: &str) -> Result<Value> {
        Err(DbError::FieldNotFound(name.to_owned()))
    }
}

/// A field name, optionally qualified by a table name or alias
/// (`table.field`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualifiedName<'a> {
    pub table: Option<&'a str>,
    pub field: &'a str,
}

impl<'a> QualifiedName<'a> {
    /// Splits `name` at the first dot. A name without a dot, or with an empty
    /// part around the dot, is unqualified.
    pub fn parse(name: &'a str) -> Self {
        match name.split_once('.') {
            Some((table, field)) if !table.is_empty() && !field.is_empty() => Self {
                table: Some(table),
                field,
            },
            _ => Self { table: None, field: name },
        }
    }
}

#[derive(Debug)]
pub enum Scan {
    Table(TableScan),
    Product(ProductScan),
    Select(SelectScan),
    LeftJoin(LeftJoinScan),
    Extend(ExtendScan),
    Project(ProjectScan),
}

impl Scan {
    /// Resets the cursor so that the next call to [Scan::next] yields the
    /// first row.
    pub fn before_first(&mut self) -> Result<()> {
        match self {
            Self::Table(s) => {
                s.before_first();
                Ok(())
            }
            Self::Product(s) => s.before_first(),
            Self::Select(s) => s.before_first(),
            Self::LeftJoin(s) => s.before_first(),
            Self::Extend(s) => s.before_first(),
            Self::Project(s) => s.before_first(),
        }
    }

    /// Advances to the next row. Returns `false` once the scan is
    /// exhausted, and keeps returning `false` until [Scan::before_first].
    pub fn next(&mut self) -> Result<bool> {
        match self {
            Self::Table(s) => Ok(s.next()),
            Self::Product(s) => s.next(),
            Self::Select(s) => s.next(),
            Self::LeftJoin(s) => s.next(),
            Self::Extend(s) => s.next(),
            Self::Project(s) => s.next(),
        }
    }

    pub fn has_field(&self, name: &str) -> bool {
        match self {
            Self::Table(s) => s.has_field(name),
            Self::Product(s) => s.has_field(name),
            Self::Select(s) => s.has_field(name),
            Self::LeftJoin(s) => s.has_field(name),
            Self::Extend(s) => s.has_field(name),
            Self::Project(s) => s.has_field(name),
        }
    }

    pub fn get_field(&self, name: &str) -> Result<Value> {
        match self {
            Self::Table(s) => s.get_field(name),
            Self::Product(s) => s.get_field(name),
            Self::Select(s) => s.get_field(name),
            Self::LeftJoin(s) => s.get_field(name),
            Self::Extend(s) => s.get_field(name),
            Self::Project(s) => s.get_field(name),
        }
    }

    /// Writes a field of the current row through to the underlying table.
    pub fn set_field(&mut self, name: &str, value: &Value) -> Result<()> {
        match self {
            Self::Table(s) => s.set_field(name, value),
            Self::Product(s) => s.set_field(name, value),
            Self::Select(s) => s.set_field(name, value),
            Self::LeftJoin(s) => s.set_field(name, value),
            Self::Extend(s) => s.set_field(name, value),
            Self::Project(s) => s.set_field(name, value),
        }
    }

    /// Appends an all-NULL row and positions the cursor on it. Only scans
    /// with a single underlying table support this, the others do nothing.
    pub fn insert(&mut self) -> Result<()> {
        match self {
            Self::Table(s) => {
                s.insert();
                Ok(())
            }
            Self::Select(s) => s.insert(),
            Self::Extend(s) => s.insert(),
            Self::Project(s) => s.insert(),
            Self::Product(_) | Self::LeftJoin(_) => Ok(()),
        }
    }

    /// Deletes the current row from the underlying table.
    pub fn delete(&mut self) -> Result<()> {
        match self {
            Self::Table(s) => s.delete(),
            Self::Select(s) => s.delete(),
            Self::Extend(s) => s.delete(),
            Self::Project(s) => s.delete(),
            Self::Product(_) | Self::LeftJoin(_) => Ok(()),
        }
    }

    /// Releases the cursor position. The scan can be restarted with
    /// [Scan::before_first].
    pub fn close(&mut self) {
        match self {
            Self::Table(s) => s.close(),
            Self::Product(s) => s.close(),
            Self::Select(s) => s.close(),
            Self::LeftJoin(s) => s.close(),
            Self::Extend(s) => s.close(),
            Self::Project(s) => s.close(),
        }
    }
}

impl FieldSource for Scan {
    fn has_field(&self, name: &str) -> bool {
        Scan::has_field(self, name)
    }

    fn get_field(&self, name: &str) -> Result<Value> {
        Scan::get_field(self, name)
    }
}

macro_rules! impl_from_scan {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Scan {
                fn from(scan: $ty) -> Self {
                    Self::$variant(scan)
                }
            }
        )*
    };
}

impl_from_scan! {
    Table => TableScan,
    Product => ProductScan,
    Select => SelectScan,
    LeftJoin => LeftJoinScan,
    Extend => ExtendScan,
    Project => ProjectScan,
}
