use crate::error::{DbError, Result};
use crate::value::Value;

use super::Scan;

/// Cartesian product of two scans, iterated with the left side in the outer
/// loop.
///
/// Fields resolve against the left child first. Insert and delete are not
/// supported and do nothing.
#[derive(Debug)]
pub struct ProductScan {
    lhs: Box<Scan>,
    rhs: Box<Scan>,
    /// `false` once the left side (or the right side, if empty) ran out.
    lhs_has_rows: bool,
}

impl ProductScan {
    /// Builds the product and positions the left side on its first row.
    pub fn new(lhs: Scan, rhs: Scan) -> Result<Self> {
        let mut product = Self {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            lhs_has_rows: false,
        };
        product.before_first()?;
        Ok(product)
    }

    pub fn before_first(&mut self) -> Result<()> {
        self.lhs.before_first()?;
        self.lhs_has_rows = self.lhs.next()?;
        self.rhs.before_first()
    }

    pub fn next(&mut self) -> Result<bool> {
        if !self.lhs_has_rows {
            return Ok(false);
        }
        if self.rhs.next()? {
            return Ok(true);
        }
        self.rhs.before_first()?;
        let advanced = self.lhs.next()? && self.rhs.next()?;
        self.lhs_has_rows = advanced;
        Ok(advanced)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.lhs.has_field(name) || self.rhs.has_field(name)
    }

    pub fn get_field(&self, name: &str) -> Result<Value> {
        if self.lhs.has_field(name) {
            self.lhs.get_field(name)
        } else {
            self.rhs.get_field(name)
        }
    }

    pub fn set_field(&mut self, name: &str, value: &Value) -> Result<()> {
        if self.lhs.has_field(name) {
            self.lhs.set_field(name, value)
        } else if self.rhs.has_field(name) {
            self.rhs.set_field(name, value)
        } else {
            Err(DbError::FieldNotFound(name.to_owned()))
        }
    }

    pub fn close(&mut self) {
        self.lhs.close();
        self.rhs.close();
        self.lhs_has_rows = false;
    }
}
