use std::collections::HashSet;

use crate::error::{DbError, Result};
use crate::value::Value;

use super::Scan;

/// Restricts the visible fields of its child to a fixed set of names.
#[derive(Debug)]
pub struct ProjectScan {
    child: Box<Scan>,
    fields: HashSet<String>,
}

impl ProjectScan {
    pub fn new(child: Scan, fields: impl IntoIterator<Item = String>) -> Self {
        Self {
            child: Box::new(child),
            fields: fields.into_iter().collect(),
        }
    }

    pub fn before_first(&mut self) -> Result<()> {
        self.child.before_first()
    }

    pub fn next(&mut self) -> Result<bool> {
        self.child.next()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains(name) && self.child.has_field(name)
    }

    fn check(&self, name: &str) -> Result<()> {
        if self.fields.contains(name) {
            Ok(())
        } else {
            Err(DbError::FieldNotFound(name.to_owned()))
        }
    }

    pub fn get_field(&self, name: &str) -> Result<Value> {
        self.check(name)?;
        self.child.get_field(name)
    }

    pub fn set_field(&mut self, name: &str, value: &Value) -> Result<()> {
        self.check(name)?;
        self.child.set_field(name, value)
    }

    pub fn insert(&mut self) -> Result<()> {
        self.child.insert()
    }

    pub fn delete(&mut self) -> Result<()> {
        self.child.delete()
    }

    pub fn close(&mut self) {
        self.child.close();
    }
}
