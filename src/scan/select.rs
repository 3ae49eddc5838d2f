use crate::error::Result;
use crate::expr::Expr;
use crate::value::Value;

use super::Scan;

/// Filters its child, yielding only rows for which the predicate is true.
/// NULL and false both reject the row.
#[derive(Debug)]
pub struct SelectScan {
    child: Box<Scan>,
    predicate: Expr,
}

impl SelectScan {
    pub fn new(child: Scan, predicate: Expr) -> Self {
        Self {
            child: Box::new(child),
            predicate,
        }
    }

    /// Replaces the predicate, typically once it has been bound against this
    /// scan's child.
    pub fn set_predicate(&mut self, predicate: Expr) {
        self.predicate = predicate;
    }

    pub fn child(&self) -> &Scan {
        &self.child
    }

    pub fn before_first(&mut self) -> Result<()> {
        self.child.before_first()
    }

    pub fn next(&mut self) -> Result<bool> {
        while self.child.next()? {
            if self.predicate.eval(self.child.as_ref())?.is_true() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.child.has_field(name)
    }

    pub fn get_field(&self, name: &str) -> Result<Value> {
        self.child.get_field(name)
    }

    pub fn set_field(&mut self, name: &str, value: &Value) -> Result<()> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{CmpOp, MathOp};
    use crate::scan::test_support::{collect, int_scan};

    fn field(name: &str) -> Expr {
        Expr::Field(name.into())
    }

    // ─────────────────────────────────────────────────────────────
    // Test 1 : filters by predicate
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_filter() {
        let predicate = Expr::cmp(CmpOp::Lt, field("a"), Expr::Const(Value::Int(3)));
        let mut scan = Scan::from(SelectScan::new(int_scan("t", "a", &[5, 1, 4, 2]), predicate));
        assert_eq!(
            collect(&mut scan, &["a"]),
            vec![vec![Value::Int(1)], vec![Value::Int(2)]]
        );
    }

    // ─────────────────────────────────────────────────────────────
    // Test 2 : NULL predicate rejects the row
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_null_predicate_rejects() {
        let mut scan = SelectScan::new(int_scan("t", "a", &[1, 2]), Expr::Const(Value::Null));
        assert!(!scan.next().unwrap());
    }

    // ─────────────────────────────────────────────────────────────
    // Test 3 : evaluation errors propagate out of next
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_error_propagates() {
        let predicate = Expr::math(MathOp::Div, field("a"), Expr::Const(Value::Int(0)));
        let mut scan = SelectScan::new(int_scan("t", "a", &[1]), predicate);
        assert!(scan.next().is_err());
    }

    // ─────────────────────────────────────────────────────────────
    // Test 4 : delete goes through to the table
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_delete_matching() {
        let predicate = Expr::cmp(CmpOp::Eq, field("a"), Expr::Const(Value::Int(2)));
        let mut scan = SelectScan::new(int_scan("t", "a", &[1, 2, 3, 2]), predicate);
        while scan.next().unwrap() {
            scan.delete().unwrap();
        }
        scan.set_predicate(Expr::Const(Value::Bool(true)));
        let mut scan = Scan::from(scan);
        assert_eq!(
            collect(&mut scan, &["a"]),
            vec![vec![Value::Int(1)], vec![Value::Int(3)]]
        );
    }
}
