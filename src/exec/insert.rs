use std::collections::HashSet;

use tracing::{debug, debug_span};

use crate::database::Database;
use crate::error::{DbError, Result};
use crate::expr::{ExprTreeConverter, NoScanSelector};
use crate::query::InsertQuery;
use crate::scan::NoFields;
use crate::schema::{ColumnDef, Schema};
use crate::value::Value;

use super::checks;

/// Executes `INSERT INTO`.
///
/// Rows are checked and written one at a time, so when a row fails the
/// rows before it stay in the table.
///
/// # Errors
/// - [DbError::UnknownTable], [DbError::FieldNotFound] or
///   [DbError::DuplicateField] for a bad target.
/// - [DbError::MissingField] if a non-nullable field is left out of the
///   field list.
/// - [DbError::InvalidQuery] if a row has the wrong number of values.
/// - [DbError::FieldAccessForbidden] if a value refers to a field.
/// - Type and constraint errors from the value checks.
pub fn insert(db: &mut Database, query: &InsertQuery) -> Result<()> {
    let table = query.table_name.as_str();
    let _span = debug_span!(target: "scandb.exec", "insert", table).entered();

    let schema = db.schema(table)?;
    let columns = target_columns(schema, query.fields.as_deref())?;
    if let Some(row) = query.rows.iter().find(|row| row.len() != columns.len()) {
        return Err(DbError::InvalidQuery(format!(
            "expected {} values per row, got {}",
            columns.len(),
            row.len()
        )));
    }

    let converter = ExprTreeConverter::new(NoScanSelector);
    let mut scan = db.scan(table)?;
    for row in &query.rows {
        let mut values = Vec::with_capacity(row.len());
        for (column, tree) in columns.iter().zip(row) {
            let value = converter.convert(tree)?.eval(&NoFields)?;
            let value = checks::normalize(column, value)?;
            checks::check_unique(db, table, column, &value)?;
            checks::check_references(db, table, &column.name, &value)?;
            values.push(value);
        }

        scan.insert()?;
        for (column, value) in columns.iter().zip(&values) {
            scan.set_field(&column.name, value)?;
        }
    }
    debug!(target: "scandb.exec", table, rows = query.rows.len(), "rows inserted");
    Ok(())
}

/// Resolves the field list to columns. Without a list every column is
/// targeted in declaration order.
fn target_columns(schema: &Schema, fields: Option<&[String]>) -> Result<Vec<ColumnDef>> {
    let Some(fields) = fields else {
        return Ok(schema.columns().to_vec());
    };
    let mut seen = HashSet::new();
    let mut columns = Vec::with_capacity(fields.len());
    for field in fields {
        if !seen.insert(field.as_str()) {
            return Err(DbError::DuplicateField(field.clone()));
        }
        columns.push(schema.column(field)?.clone());
    }
    if let Some(missing) = schema
        .columns()
        .iter()
        .find(|c| !c.nullable && !seen.contains(c.name.as_str()))
    {
        return Err(DbError::MissingField(missing.name.clone()));
    }
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::test_support::{people_and_songs, rows, strs};
    use crate::expr::{FactorTree, GenBinOp};
    use crate::query::{CreateTableQuery, Statement};

    fn single_column_db(column: ColumnDef) -> Database {
        let mut db = Database::new();
        db.execute(&Statement::CreateTable(CreateTableQuery::new("t").column(column)))
            .unwrap();
        db
    }

    // ─────────────────────────────────────────────────────────────
    // Test 1 : values are normalized to the column kinds
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_insert_normalizes() {
        let mut db = Database::new();
        db.execute(&Statement::CreateTable(
            CreateTableQuery::new("t")
                .column(ColumnDef::float("f"))
                .column(ColumnDef::bool("b")),
        ))
        .unwrap();
        let query = InsertQuery::new("t").row(vec![FactorTree::int(3), FactorTree::int(7)]);
        insert(&mut db, &query).unwrap();
        assert_eq!(
            rows(&db, "t", &["f", "b"]),
            vec![vec![Value::Float(3.0), Value::Bool(true)]]
        );
    }

    // ─────────────────────────────────────────────────────────────
    // Test 2 : named fields, the rest stays NULL
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_insert_named_fields() {
        let mut db = people_and_songs();
        let query = InsertQuery::new("songs")
            .fields(["song", "name"])
            .row(vec![FactorTree::int(9), FactorTree::string("John")]);
        insert(&mut db, &query).unwrap();
        let query = InsertQuery::new("songs").fields(["name"]).row(strs(&["Egor"]));
        insert(&mut db, &query).unwrap();
        assert_eq!(
            rows(&db, "songs", &["name", "song"]),
            vec![
                vec![Value::varchar("John"), Value::Int(9)],
                vec![Value::varchar("Egor"), Value::Null],
            ]
        );
    }

    // ─────────────────────────────────────────────────────────────
    // Test 3 : malformed field lists and rows
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_insert_bad_shape() {
        let mut db = people_and_songs();
        let missing = InsertQuery::new("songs").fields(["song"]).row(vec![FactorTree::int(1)]);
        assert!(matches!(
            insert(&mut db, &missing),
            Err(DbError::MissingField(name)) if name == "name"
        ));
        let duplicate = InsertQuery::new("songs")
            .fields(["name", "name"])
            .row(strs(&["John", "John"]));
        assert!(matches!(
            insert(&mut db, &duplicate),
            Err(DbError::DuplicateField(_))
        ));
        let unknown = InsertQuery::new("songs").fields(["name", "album"]).row(strs(&["a", "b"]));
        assert!(matches!(
            insert(&mut db, &unknown),
            Err(DbError::FieldNotFound(_))
        ));
        let short = InsertQuery::new("people").row(strs(&["Ringo"]));
        assert!(matches!(
            insert(&mut db, &short),
            Err(DbError::InvalidQuery(_))
        ));
        assert!(matches!(
            insert(&mut db, &InsertQuery::new("nowhere")),
            Err(DbError::UnknownTable(_))
        ));
        assert_eq!(db.row_count("songs").unwrap(), 0);
        assert_eq!(db.row_count("people").unwrap(), 2);
    }

    // ─────────────────────────────────────────────────────────────
    // Test 4 : values cannot reference fields
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_insert_field_reference() {
        let mut db = single_column_db(ColumnDef::int("a"));
        let query = InsertQuery::new("t").row(vec![FactorTree::field("a")]);
        assert!(matches!(
            insert(&mut db, &query),
            Err(DbError::FieldAccessForbidden(_))
        ));
    }

    // ─────────────────────────────────────────────────────────────
    // Test 5 : constant expressions are evaluated
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_insert_expression() {
        let mut db = single_column_db(ColumnDef::int("a"));
        let value = FactorTree::binary(
            GenBinOp::Mul,
            FactorTree::int(6),
            FactorTree::int(7).negated(),
        );
        insert(&mut db, &InsertQuery::new("t").row(vec![value])).unwrap();
        assert_eq!(rows(&db, "t", &["a"]), vec![vec![Value::Int(-42)]]);
    }

    // ─────────────────────────────────────────────────────────────
    // Test 6 : a failing row keeps the rows before it
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_insert_is_row_by_row() {
        let mut db = single_column_db(ColumnDef::int("a").unique());
        let query = InsertQuery::new("t")
            .row(vec![FactorTree::int(1)])
            .row(vec![FactorTree::int(2)])
            .row(vec![FactorTree::int(1)])
            .row(vec![FactorTree::int(3)]);
        assert!(matches!(
            insert(&mut db, &query),
            Err(DbError::UniqueViolation { .. })
        ));
        assert_eq!(
            rows(&db, "t", &["a"]),
            vec![vec![Value::Int(1)], vec![Value::Int(2)]]
        );
    }

    // ─────────────────────────────────────────────────────────────
    // Test 7 : NULLs never collide on a unique column
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_insert_unique_nulls() {
        let mut db = single_column_db(ColumnDef::int("a").unique());
        let query = InsertQuery::new("t")
            .row(vec![FactorTree::null()])
            .row(vec![FactorTree::null()]);
        insert(&mut db, &query).unwrap();
        assert_eq!(db.row_count("t").unwrap(), 2);
    }

    // ─────────────────────────────────────────────────────────────
    // Test 8 : string capacity
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_insert_string_too_long() {
        let mut db = single_column_db(ColumnDef::varchar("s", 3));
        let query = InsertQuery::new("t").row(strs(&["four"]));
        assert!(matches!(
            insert(&mut db, &query),
            Err(DbError::StringTooLong { capacity: 3, len: 4, .. })
        ));
    }

    // ─────────────────────────────────────────────────────────────
    // Test 9 : values that cannot be stored exactly are rejected
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_insert_rejects_lossy_values() {
        let mut db = single_column_db(ColumnDef::int("a"));
        let too_big = InsertQuery::new("t").row(vec![FactorTree::double(3.0e9)]);
        assert!(matches!(
            insert(&mut db, &too_big),
            Err(DbError::OutOfRange { .. })
        ));
        assert_eq!(db.row_count("t").unwrap(), 0);

        let mut db = single_column_db(ColumnDef::varchar("s", 8).unique());
        let query = InsertQuery::new("t").row(strs(&["a\0b"]));
        assert!(matches!(
            insert(&mut db, &query),
            Err(DbError::NulInString(_))
        ));
        insert(&mut db, &InsertQuery::new("t").row(strs(&["a"]))).unwrap();
        assert_eq!(rows(&db, "t", &["s"]), vec![vec![Value::varchar("a")]]);
    }
}
