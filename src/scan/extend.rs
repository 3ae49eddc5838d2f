use crate::error::{DbError, Result};
use crate::expr::Expr;
use crate::value::Value;

use super::{NoFields, Scan};

/// Adds a computed field to every row of its child.
///
/// Without a child the scan yields exactly one row, which makes
/// `SELECT 1 + 2 AS x` work without a FROM clause.
#[derive(Debug)]
pub struct ExtendScan {
    child: Option<Box<Scan>>,
    expr: Expr,
    name: String,
    /// Only meaningful without a child: the single row is still pending.
    pending: bool,
}

impl ExtendScan {
    pub fn new(child: Option<Scan>, expr: Expr, name: impl Into<String>) -> Self {
        Self {
            child: child.map(Box::new),
            expr,
            name: name.into(),
            pending: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn before_first(&mut self) -> Result<()> {
        self.pending = true;
        match &mut self.child {
            Some(child) => child.before_first(),
            None => Ok(()),
        }
    }

    pub fn next(&mut self) -> Result<bool> {
        match &mut self.child {
            Some(child) => child.next(),
            None => Ok(std::mem::replace(&mut self.pending, false)),
        }
    }

    pub fn has_field(&self, name: &str) -> bool {
        name == self.name || self.child.as_ref().is_some_and(|c| c.has_field(name))
    }

    /// The computed field is evaluated on every read against the child's
    /// current row.
    pub fn get_field(&self, name: &str) -> Result<Value> {
        if name == self.name {
            return match &self.child {
                Some(child) => self.expr.eval(child.as_ref()),
                None => self.expr.eval(&NoFields),
            };
        }
        match &self.child {
            Some(child) => child.get_field(name),
            None => Err(DbError::FieldNotFound(name.to_owned())),
        }
    }

    /// Writing the computed field is ignored.
    pub fn set_field(&mut self, name: &str, value: &Value) -> Result<()> {
        if name == self.name {
            return Ok(());
        }
        match &mut self.child {
            Some(child) => child.set_field(name, value),
            None => Err(DbError::FieldNotFound(name.to_owned())),
        }
    }

    pub fn insert(&mut self) -> Result<()> {
        match &mut self.child {
            Some(child) => child.insert(),
            None => Ok(()),
        }
    }

    pub fn delete(&mut self) -> Result<()> {
        match &mut self.child {
            Some(child) => child.delete(),
            None => Ok(()),
        }
    }

    pub fn close(&mut self) {
        self.pending = false;
        if let Some(child) = &mut self.child {
            child.close();
        }
    }
}
