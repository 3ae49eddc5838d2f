use crate::error::{DbError, Result};
use crate::expr::Expr;
use crate::value::Value;

use super::{FieldSource, Scan};

/// Left outer join of two scans.
///
/// For each row of the outer side every inner row satisfying the predicate is
/// produced. An outer row without any match is produced once, with all inner
/// fields reading as NULL.
///
/// A right join is a left join with the sides swapped. The `flipped` flag
/// restores the declared left-to-right order for resolving names that both
/// sides expose.
#[derive(Debug)]
pub struct LeftJoinScan {
    outer: Box<Scan>,
    inner: Box<Scan>,
    predicate: Expr,
    flipped: bool,
    outer_has_row: bool,
    /// The current outer row has produced at least one match.
    outer_matched: bool,
    /// The current row is the NULL-extended row of an unmatched outer row.
    inner_null: bool,
}

/// The pair of current rows, seen by the join predicate.
struct JoinRow<'a> {
    join: &'a LeftJoinScan,
}

impl FieldSource for JoinRow<'_> {
    fn has_field(&self, name: &str) -> bool {
        self.join.has_field(name)
    }

    fn get_field(&self, name: &str) -> Result<Value> {
        if self.join.resolves_to_inner(name) {
            self.join.inner.get_field(name)
        } else {
            self.join.outer.get_field(name)
        }
    }
}

impl LeftJoinScan {
    /// `lhs LEFT JOIN rhs ON predicate`.
    pub fn left(lhs: Scan, rhs: Scan, predicate: Expr) -> Result<Self> {
        Self::build(lhs, rhs, predicate, false)
    }

    /// `lhs RIGHT JOIN rhs ON predicate`, every row of `rhs` is kept.
    pub fn right(lhs: Scan, rhs: Scan, predicate: Expr) -> Result<Self> {
        Self::build(rhs, lhs, predicate, true)
    }

    fn build(outer: Scan, inner: Scan, predicate: Expr, flipped: bool) -> Result<Self> {
        let mut join = Self {
            outer: Box::new(outer),
            inner: Box::new(inner),
            predicate,
            flipped,
            outer_has_row: false,
            outer_matched: false,
            inner_null: false,
        };
        join.before_first()?;
        Ok(join)
    }

    /// Replaces the join predicate. Used after the predicate has been bound
    /// against the join itself.
    pub fn set_predicate(&mut self, predicate: Expr) {
        self.predicate = predicate;
    }

    pub fn before_first(&mut self) -> Result<()> {
        self.outer.before_first()?;
        self.outer_has_row = self.outer.next()?;
        self.inner.before_first()?;
        self.outer_matched = false;
        self.inner_null = false;
        Ok(())
    }

    pub fn next(&mut self) -> Result<bool> {
        if !self.outer_has_row {
            return Ok(false);
        }
        if self.inner_null {
            self.inner_null = false;
            if !self.advance_outer()? {
                return Ok(false);
            }
        }
        if self.find_match()? {
            self.outer_matched = true;
            return Ok(true);
        }
        if self.outer_matched {
            if !self.advance_outer()? {
                return Ok(false);
            }
            if self.find_match()? {
                self.outer_matched = true;
                return Ok(true);
            }
        }
        self.inner_null = true;
        Ok(true)
    }

    fn advance_outer(&mut self) -> Result<bool> {
        self.outer_has_row = self.outer.next()?;
        self.outer_matched = false;
        self.inner.before_first()?;
        Ok(self.outer_has_row)
    }

    /// Moves the inner side to its next row satisfying the predicate.
    fn find_match(&mut self) -> Result<bool> {
        while self.inner.next()? {
            if self.predicate.eval(&JoinRow { join: &*self })?.is_true() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Whether `name` is read from the inner side. Unflipped joins prefer
    /// the outer (left) side, flipped ones the inner side, which is the
    /// query's left table.
    fn resolves_to_inner(&self, name: &str) -> bool {
        if self.flipped {
            self.inner.has_field(name)
        } else {
            !self.outer.has_field(name) && self.inner.has_field(name)
        }
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.outer.has_field(name) || self.inner.has_field(name)
    }

    pub fn get_field(&self, name: &str) -> Result<Value> {
        if !self.resolves_to_inner(name) {
            return self.outer.get_field(name);
        }
        if self.inner_null {
            Ok(Value::Null)
        } else {
            self.inner.get_field(name)
        }
    }

    pub fn set_field(&mut self, name: &str, value: &Value) -> Result<()> {
        if !self.resolves_to_inner(name) {
            return self.outer.set_field(name, value);
        }
        if self.inner_null {
            return Err(DbError::NoCurrentRow);
        }
        self.inner.set_field(name, value)
    }

    pub fn close(&mut self) {
        self.outer.close();
        self.inner.close();
        self.outer_has_row = false;
    }
}

impl FieldSource for LeftJoinScan {
    fn has_field(&self, name: &str) -> bool {
        LeftJoinScan::has_field(self, name)
    }

    fn get_field(&self, name: &str) -> Result<Value> {
        LeftJoinScan::get_field(self, name)
    }
}
