use tracing::{debug, debug_span};

use crate::constraint::Action;
use crate::database::Database;
use crate::error::Result;
use crate::query::DeleteQuery;

use super::checks;

/// Executes `DELETE FROM`, removing every row matching the predicate (all
/// rows without one).
///
/// Each row is checked right before it is deleted; when a referenced row
/// stops the statement, the rows deleted before it stay deleted.
///
/// # Errors
/// - [crate::DbError::UnknownTable] or [crate::DbError::FieldNotFound] for
///   a bad table or predicate.
/// - [crate::DbError::ForeignKeyViolation] if a slave row references the
///   row through a `NO ACTION` constraint.
pub fn delete(db: &mut Database, query: &DeleteQuery) -> Result<()> {
    let table = query.table_name.as_str();
    let _span = debug_span!(target: "scandb.exec", "delete", table).entered();

    let mut scan = checks::filtered_scan(db, table, query.predicate.as_ref())?;
    let masters: Vec<_> = db
        .constraints()
        .iter()
        .filter(|c| c.master_table == table)
        .collect();

    let mut deleted = 0usize;
    scan.before_first()?;
    while scan.next()? {
        for constraint in &masters {
            let value = scan.get_field(&constraint.master_field)?;
            checks::check_not_referenced(db, constraint, &value, Action::Delete)?;
        }
        scan.delete()?;
        deleted += 1;
    }
    debug!(target: "scandb.exec", table, deleted, "rows deleted");
    Ok(())
}
