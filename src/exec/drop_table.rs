use tracing::{debug_span, warn};

use crate::constraint::{Action, ReferencesConstraint};
use crate::database::Database;
use crate::error::{DbError, Result};
use crate::expr::{CmpOp, Expr};
use crate::query::DropTableQuery;
use crate::scan::{NoFields, ProductScan, Scan, SelectScan};

/// Executes `DROP TABLE`.
///
/// Constraints declared by the table go away with it. Constraints that
/// reference the table as master are removed as well once no slave row
/// depends on it.
///
/// # Errors
/// - [DbError::UnknownTable] if the table does not exist.
/// - [DbError::DependentRows] if a slave row still references a row of the
///   table through a `NO ACTION` constraint.
pub fn drop_table(db: &mut Database, query: &DropTableQuery) -> Result<()> {
    let table = query.table_name.as_str();
    let _span = debug_span!(target: "scandb.exec", "drop_table", table).entered();

    if !db.exists(table) {
        return Err(DbError::UnknownTable(table.to_owned()));
    }
    for constraint in db.constraints() {
        if constraint.master_table != table || constraint.slave_table == table {
            continue;
        }
        if constraint.blocks(Action::Delete) && has_dependent_row(db, constraint)? {
            warn!(
                target: "scandb.exec",
                table,
                slave = %constraint.slave_table,
                "table still referenced"
            );
            return Err(DbError::DependentRows(table.to_owned()));
        }
    }

    db.remove_table(table);
    db.retain_constraints(|c| c.master_table != table);
    Ok(())
}

/// `EXISTS (SELECT * FROM master, slave WHERE slave.f = master.f)`.
fn has_dependent_row(db: &Database, constraint: &ReferencesConstraint) -> Result<bool> {
    let master = db.table_scan(&constraint.master_table, Some("master"))?;
    let slave = db.table_scan(&constraint.slave_table, Some("slave"))?;
    let product = ProductScan::new(Scan::from(master), Scan::from(slave))?;
    let predicate = Expr::cmp(
        CmpOp::Eq,
        Expr::Field(format!("slave.{}", constraint.slave_field)),
        Expr::Field(format!("master.{}", constraint.master_field)),
    );
    let select = SelectScan::new(Scan::from(product), predicate);
    Ok(Expr::exists(Scan::from(select)).eval(&NoFields)?.is_true())
}
