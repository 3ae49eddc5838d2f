use tracing::debug_span;

use crate::constraint::ReferencesConstraint;
use crate::database::Database;
use crate::error::{DbError, Result};
use crate::query::{CreateTableQuery, ForeignKey};
use crate::schema::Schema;

/// Executes `CREATE TABLE`.
///
/// Columns are added in order; a repeated column name keeps the first
/// definition. Foreign keys become constraints with the new table as slave.
///
/// # Errors
/// - [DbError::TableExists] if the table is already there.
/// - [DbError::UnknownTable] / [DbError::FieldNotFound] for a foreign key
///   naming a missing table or field.
/// - [DbError::TypeMismatch] if a foreign key links a string column to a
///   numeric one.
pub fn create_table(db: &mut Database, query: &CreateTableQuery) -> Result<()> {
    let _span = debug_span!(target: "scandb.exec", "create_table", table = %query.table_name)
        .entered();

    if db.exists(&query.table_name) {
        return Err(DbError::TableExists(query.table_name.clone()));
    }
    let mut schema = Schema::new();
    for column in &query.columns {
        schema.add_column(column.clone());
    }

    let constraints = query
        .foreign_keys
        .iter()
        .map(|fk| check_foreign_key(db, &query.table_name, &schema, fk))
        .collect::<Result<Vec<_>>>()?;

    db.add_table(&query.table_name, schema);
    for constraint in constraints {
        db.add_constraint(constraint);
    }
    Ok(())
}

fn check_foreign_key(
    db: &Database,
    table: &str,
    schema: &Schema,
    fk: &ForeignKey,
) -> Result<ReferencesConstraint> {
    let slave = schema.column(&fk.field)?;
    // A table may reference itself.
    let master_schema = if fk.master_table == table {
        schema
    } else {
        db.schema(&fk.master_table)?
    };
    let master = master_schema.column(&fk.master_field)?;
    if slave.data_type.is_numeric() != master.data_type.is_numeric() {
        return Err(DbError::TypeMismatch {
            expected: master.data_type.to_string(),
            found: slave.data_type.to_string(),
        });
    }

    let mut constraint =
        ReferencesConstraint::new(table, &fk.field, &fk.master_table, &fk.master_field);
    constraint.on_delete = fk.on_delete;
    constraint.on_update = fk.on_update;
    Ok(constraint)
}
