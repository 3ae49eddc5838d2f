use std::collections::HashSet;

use tracing::{debug, debug_span, warn};

use crate::constraint::Action;
use crate::database::Database;
use crate::error::{DbError, Result};
use crate::expr::identical;
use crate::query::UpdateQuery;
use crate::schema::ColumnDef;
use crate::value::Value;

use super::checks;

/// Executes `UPDATE`.
///
/// New values for every matched row are computed and checked before any
/// row is written, so a failing check leaves the table untouched. Checks
/// are skipped for a field whose new value is identical to its current
/// one.
///
/// # Errors
/// - [DbError::UnknownTable] or [DbError::FieldNotFound] for a bad target.
/// - [DbError::DuplicateField] if a field is assigned twice.
/// - Type errors from the value checks.
/// - [DbError::UniqueViolation] if a new value collides with another row,
///   including another row of the same statement.
/// - [DbError::ForeignKeyViolation] if a new value has no master row, or if
///   a changed value is still referenced by a slave row.
pub fn update(db: &mut Database, query: &UpdateQuery) -> Result<()> {
    let table = query.table_name.as_str();
    let _span = debug_span!(target: "scandb.exec", "update", table).entered();

    let columns = assigned_columns(db, query)?;
    let mut scan = checks::filtered_scan(db, table, query.predicate.as_ref())?;
    let exprs = query
        .assignments
        .iter()
        .map(|(_, tree)| checks::convert_against(&scan, tree))
        .collect::<Result<Vec<_>>>()?;

    // Values assigned so far to each unique column.
    let mut assigned: Vec<Vec<Value>> = vec![Vec::new(); columns.len()];
    let mut pending = Vec::new();
    scan.before_first()?;
    while scan.next()? {
        let mut row = Vec::with_capacity(columns.len());
        for (i, (column, expr)) in columns.iter().zip(&exprs).enumerate() {
            let value = checks::normalize(column, expr.eval(&scan)?)?;
            let current = scan.get_field(&column.name)?;
            if !identical(&value, &current) {
                checks::check_unique(db, table, column, &value)?;
                checks::check_references(db, table, &column.name, &value)?;
                checks::check_master_field(db, table, &column.name, &current, Action::Update)?;
            }
            if column.unique && !value.is_null() {
                if assigned[i].iter().any(|v| identical(v, &value)) {
                    warn!(target: "scandb.exec", table, field = %column.name, %value, "value assigned twice");
                    return Err(DbError::UniqueViolation {
                        table: table.to_owned(),
                        field: column.name.clone(),
                    });
                }
                assigned[i].push(value.clone());
            }
            row.push(value);
        }
        pending.push(row);
    }

    // Nothing changed since the first pass, so the same rows match again
    // in the same order.
    scan.before_first()?;
    let mut pending = pending.into_iter();
    while scan.next()? {
        let Some(row) = pending.next() else {
            break;
        };
        for (column, value) in columns.iter().zip(&row) {
            scan.set_field(&column.name, value)?;
        }
    }
    debug!(target: "scandb.exec", table, "rows updated");
    Ok(())
}

fn assigned_columns(db: &Database, query: &UpdateQuery) -> Result<Vec<ColumnDef>> {
    let schema = db.schema(&query.table_name)?;
    let mut seen = HashSet::new();
    query
        .assignments
        .iter()
        .map(|(field, _)| {
            if !seen.insert(field.as_str()) {
                return Err(DbError::DuplicateField(field.clone()));
            }
            schema.column(field).cloned()
        })
        .collect()
}
