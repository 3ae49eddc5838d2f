use std::rc::Rc;

use crate::error::{DbError, Result};
use crate::row::{self, Row, RowMut};
use crate::schema::Schema;
use crate::storage::SharedStorage;
use crate::value::Value;

use super::QualifiedName;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    BeforeFirst,
    At(u64),
    /// The row the cursor was on has been deleted. The next row is the first
    /// live id after this one.
    Deleted(u64),
    Exhausted,
}

/// Cursor over the rows of one table, in ascending row-id order.
///
/// Field names may be bare (`a`) or qualified with the scan's table name or
/// alias (`t.a`). A name qualified with any other table is not a field of
/// this scan.
#[derive(Debug)]
pub struct TableScan {
    table: String,
    storage: SharedStorage,
    schema: Rc<Schema>,
    position: Position,
}

impl TableScan {
    /// `table` is the name used to qualify fields: the alias if the table
    /// was aliased, its real name otherwise.
    pub fn new(table: impl Into<String>, storage: SharedStorage, schema: Rc<Schema>) -> Self {
        Self {
            table: table.into(),
            storage,
            schema,
            position: Position::BeforeFirst,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn before_first(&mut self) {
        self.position = Position::BeforeFirst;
    }

    pub fn next(&mut self) -> bool {
        let storage = self.storage.borrow();
        let next = match self.position {
            Position::BeforeFirst => storage.first_id(),
            Position::At(id) | Position::Deleted(id) => storage.next_id_after(id),
            Position::Exhausted => None,
        };
        self.position = next.map_or(Position::Exhausted, Position::At);
        next.is_some()
    }

    /// Strips a matching qualifier and checks that the field exists.
    fn local_name<'n>(&self, name: &'n str) -> Option<&'n str> {
        let qualified = QualifiedName::parse(name);
        let field = match qualified.table {
            Some(table) if table == self.table => qualified.field,
            Some(_) => return None,
            None => name,
        };
        self.schema.exists(field).then_some(field)
    }

    fn resolve<'n>(&self, name: &'n str) -> Result<&'n str> {
        self.local_name(name)
            .ok_or_else(|| DbError::FieldNotFound(name.to_owned()))
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.local_name(name).is_some()
    }

    /// Reads a field of the current row. Before the first row, after the
    /// last one, or on a deleted row every field reads as NULL.
    pub fn get_field(&self, name: &str) -> Result<Value> {
        let field = self.resolve(name)?;
        let Position::At(row_id) = self.position else {
            return Ok(Value::Null);
        };
        let storage = self.storage.borrow();
        match storage.get(row_id) {
            Some(buf) => Row::new(buf, &self.schema).get_field(field),
            None => Ok(Value::Null),
        }
    }

    pub fn set_field(&mut self, name: &str, value: &Value) -> Result<()> {
        let field = self.resolve(name)?;
        let Position::At(row_id) = self.position else {
            return Err(DbError::NoCurrentRow);
        };
        let mut storage = self.storage.borrow_mut();
        let buf = storage.get_mut(row_id).ok_or(DbError::NoCurrentRow)?;
        RowMut::new(buf, &self.schema).set_field(field, value)
    }

    /// Appends a new all-NULL row and positions the cursor on it.
    pub fn insert(&mut self) {
        let buf = row::null_row(&self.schema);
        let row_id = self.storage.borrow_mut().allocate(buf);
        self.position = Position::At(row_id);
    }

    /// Deletes the current row. The following [TableScan::next] continues
    /// with the row after it.
    pub fn delete(&mut self) -> Result<()> {
        let Position::At(row_id) = self.position else {
            return Err(DbError::NoCurrentRow);
        };
        self.storage.borrow_mut().remove(row_id);
        self.position = Position::Deleted(row_id);
        Ok(())
    }

    pub fn close(&mut self) {
        self.position = Position::Exhausted;
    }
}
