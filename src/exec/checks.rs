//! Validation shared by the DML executors.

use tracing::warn;

use crate::constraint::{Action, ReferencesConstraint};
use crate::data_type::DataType;
use crate::database::Database;
use crate::error::{DbError, Result};
use crate::expr::{CmpOp, Expr, ExprTreeConverter, FactorTree, SimpleScanSelector};
use crate::scan::{FieldSource, NoFields, Scan, SelectScan};
use crate::schema::ColumnDef;
use crate::value::Value;

/// Binds `tree` against `source`.
pub(crate) fn convert_against(source: &dyn FieldSource, tree: &FactorTree) -> Result<Expr> {
    ExprTreeConverter::new(SimpleScanSelector::new(source)).convert(tree)
}

/// Opens a scan over `table`, filtered by `predicate` when one is given.
pub(crate) fn filtered_scan(
    db: &Database,
    table: &str,
    predicate: Option<&FactorTree>,
) -> Result<Scan> {
    let scan = db.scan(table)?;
    match predicate {
        None => Ok(scan),
        Some(tree) => {
            let predicate = convert_against(&scan, tree)?;
            Ok(Scan::from(SelectScan::new(scan, predicate)))
        }
    }
}

/// Checks `value` against the column definition and converts numbers to the
/// column's kind.
///
/// # Errors
/// - [DbError::NotNullViolation] for NULL in a non-nullable column.
/// - [DbError::TypeMismatch] for a string in a numeric column or a number in
///   a Varchar column.
/// - [DbError::StringTooLong] if a string exceeds the column capacity.
/// - [DbError::NulInString] if a string contains a NUL byte.
/// - [DbError::OutOfRange] if a number does not fit the column kind.
pub(crate) fn normalize(column: &ColumnDef, value: Value) -> Result<Value> {
    let mismatch = |value: &Value| DbError::TypeMismatch {
        expected: column.data_type.to_string(),
        found: value.type_name().to_owned(),
    };
    let out_of_range = |value: &Value| DbError::OutOfRange {
        field: column.name.clone(),
        expected: column.data_type.to_string(),
        value: value.to_string(),
    };
    match (column.data_type, value) {
        (_, Value::Null) => {
            if column.nullable {
                Ok(Value::Null)
            } else {
                Err(DbError::NotNullViolation(column.name.clone()))
            }
        }
        (DataType::Varchar, Value::Varchar(s)) => {
            if s.len() > column.size {
                return Err(DbError::StringTooLong {
                    field: column.name.clone(),
                    capacity: column.size,
                    len: s.len(),
                });
            }
            if s.contains('\0') {
                return Err(DbError::NulInString(column.name.clone()));
            }
            Ok(Value::Varchar(s))
        }
        (DataType::Varchar, other) | (_, other @ Value::Varchar(_)) => Err(mismatch(&other)),
        (DataType::Bool, other) => Ok(Value::Bool(other.truth().unwrap_or(false))),
        (DataType::Int, Value::Bool(b)) => Ok(Value::Int(i32::from(b))),
        (DataType::Int, Value::Int(i)) => Ok(Value::Int(i)),
        (DataType::Int, other @ (Value::Float(_) | Value::Double(_))) => {
            let d = other.to_f64().ok_or_else(|| mismatch(&other))?;
            if d.is_finite() && d >= f64::from(i32::MIN) && d <= f64::from(i32::MAX) {
                Ok(Value::Int(d as i32))
            } else {
                Err(out_of_range(&other))
            }
        }
        (DataType::Float, other) => {
            let d = other.to_f64().ok_or_else(|| mismatch(&other))?;
            // NaN and infinities carry over, finite values must fit f32
            if d.is_finite() && d.abs() > f64::from(f32::MAX) {
                return Err(out_of_range(&other));
            }
            Ok(Value::Float(d as f32))
        }
        (DataType::Double, other) => other
            .to_f64()
            .map(Value::Double)
            .ok_or_else(|| mismatch(&other)),
    }
}

/// `EXISTS (SELECT * FROM table WHERE value = field)`.
pub(crate) fn any_row_matches(
    db: &Database,
    table: &str,
    field: &str,
    value: &Value,
) -> Result<bool> {
    let predicate = Expr::cmp(
        CmpOp::Eq,
        Expr::Const(value.clone()),
        Expr::Field(field.to_owned()),
    );
    let select = SelectScan::new(db.scan(table)?, predicate);
    Ok(Expr::exists(Scan::from(select)).eval(&NoFields)?.is_true())
}

/// Fails if a unique column already holds `value`. NULLs never collide.
pub(crate) fn check_unique(db: &Database, table: &str, column: &ColumnDef, value: &Value) -> Result<()> {
    if !column.unique || value.is_null() {
        return Ok(());
    }
    if any_row_matches(db, table, &column.name, value)? {
        warn!(target: "scandb.exec", table, field = %column.name, %value, "unique constraint violated");
        return Err(DbError::UniqueViolation {
            table: table.to_owned(),
            field: column.name.clone(),
        });
    }
    Ok(())
}

/// Fails if `table.field` is a foreign key and `value` has no matching master
/// row. NULL references nothing and is always accepted.
pub(crate) fn check_references(db: &Database, table: &str, field: &str, value: &Value) -> Result<()> {
    if value.is_null() {
        return Ok(());
    }
    for constraint in db.constraints().iter().filter(|c| c.is_slave(table, field)) {
        if !any_row_matches(db, &constraint.master_table, &constraint.master_field, value)? {
            warn!(
                target: "scandb.exec",
                table,
                field,
                master = %constraint.master_table,
                %value,
                "foreign key target missing"
            );
            return Err(DbError::ForeignKeyViolation {
                table: table.to_owned(),
                field: field.to_owned(),
            });
        }
    }
    Ok(())
}

/// Fails if a slave row still references the master value `value` through a
/// constraint that forbids `action`.
pub(crate) fn check_not_referenced(
    db: &Database,
    constraint: &ReferencesConstraint,
    value: &Value,
    action: Action,
) -> Result<()> {
    if value.is_null() || !constraint.blocks(action) {
        return Ok(());
    }
    if any_row_matches(db, &constraint.slave_table, &constraint.slave_field, value)? {
        warn!(
            target: "scandb.exec",
            master = %constraint.master_table,
            slave = %constraint.slave_table,
            %value,
            ?action,
            "row is still referenced"
        );
        return Err(DbError::ForeignKeyViolation {
            table: constraint.slave_table.clone(),
            field: constraint.slave_field.clone(),
        });
    }
    Ok(())
}

/// [check_not_referenced] for every constraint whose master is
/// `table.field`.
pub(crate) fn check_master_field(
    db: &Database,
    table: &str,
    field: &str,
    value: &Value,
    action: Action,
) -> Result<()> {
    db.constraints()
        .iter()
        .filter(|c| c.is_master(table, field))
        .try_for_each(|c| check_not_referenced(db, c, value, action))
}
