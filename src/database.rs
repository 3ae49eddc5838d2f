use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::debug;

use crate::constraint::ReferencesConstraint;
use crate::error::{DbError, Result};
use crate::exec::{self, QueryResult};
use crate::query::{SelectQuery, Statement};
use crate::scan::{Scan, TableScan};
use crate::schema::Schema;
use crate::storage::{SharedStorage, TableStorage};

#[derive(Debug)]
struct Table {
    schema: Rc<Schema>,
    storage: SharedStorage,
}

/// The main entry point of the engine.
///
/// It owns every table's schema and row storage, plus the list of
/// foreign-key constraints. Statements are run through
/// [Database::execute] and queries through [Database::query].
#[derive(Debug, Default)]
pub struct Database {
    /// Ordered by name so that listings and dumps are deterministic.
    tables: BTreeMap<String, Table>,
    constraints: Vec<ReferencesConstraint>,
}

impl Database {
    /// Creates a new, empty database instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exists(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    /// Registers a new empty table. Adding a name that already exists is a
    /// no-op and returns `false`.
    pub fn add_table(&mut self, name: &str, schema: Schema) -> bool {
        if self.exists(name) {
            return false;
        }
        debug!(target: "scandb.db", table = name, fields = schema.len(), "table added");
        self.tables.insert(
            name.to_owned(),
            Table {
                schema: Rc::new(schema),
                storage: TableStorage::shared(),
            },
        );
        true
    }

    /// Removes a table, its rows and every constraint declared by it.
    /// Removing an unknown table is a no-op and returns `false`.
    pub fn remove_table(&mut self, name: &str) -> bool {
        if self.tables.remove(name).is_none() {
            return false;
        }
        self.constraints.retain(|c| c.slave_table != name);
        debug!(target: "scandb.db", table = name, "table removed");
        true
    }

    fn table(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| DbError::UnknownTable(name.to_owned()))
    }

    /// Opens a fresh scan over `name`. With an alias, fields are qualified
    /// by the alias instead of the table name.
    ///
    /// # Errors
    /// Returns [DbError::UnknownTable] if no such table exists.
    pub fn table_scan(&self, name: &str, alias: Option<&str>) -> Result<TableScan> {
        let table = self.table(name)?;
        Ok(TableScan::new(
            alias.unwrap_or(name),
            Rc::clone(&table.storage),
            Rc::clone(&table.schema),
        ))
    }

    /// Same as [Database::table_scan] without an alias, wrapped as a [Scan].
    pub fn scan(&self, name: &str) -> Result<Scan> {
        self.table_scan(name, None).map(Scan::from)
    }

    pub fn schema(&self, name: &str) -> Result<&Schema> {
        Ok(&self.table(name)?.schema)
    }

    pub(crate) fn storage(&self, name: &str) -> Result<SharedStorage> {
        Ok(Rc::clone(&self.table(name)?.storage))
    }

    /// Returns every table name in ascending order.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    pub fn constraints(&self) -> &[ReferencesConstraint] {
        &self.constraints
    }

    pub fn add_constraint(&mut self, constraint: ReferencesConstraint) {
        debug!(
            target: "scandb.db",
            slave = %format!("{}.{}", constraint.slave_table, constraint.slave_field),
            master = %format!("{}.{}", constraint.master_table, constraint.master_field),
            "constraint added"
        );
        self.constraints.push(constraint);
    }

    /// Drops every constraint for which `keep` returns `false`.
    pub(crate) fn retain_constraints(&mut self, keep: impl FnMut(&ReferencesConstraint) -> bool) {
        self.constraints.retain(keep);
    }

    pub fn row_count(&self, name: &str) -> Result<usize> {
        Ok(self.table(name)?.storage.borrow().len())
    }

    /// Heap bytes used by the rows of `name`.
    pub fn allocated_bytes(&self, name: &str) -> Result<usize> {
        Ok(self.table(name)?.storage.borrow().allocated_bytes())
    }

    /// Executes a statement that modifies the database (DDL/DML).
    /// For data retrieval, use [Database::query] instead.
    ///
    /// # Errors
    /// Returns the first error raised while validating or applying the
    /// statement. Rows changed before the error stay changed.
    ///
    /// # Example
    /// ```
    /// use scandb::query::{CreateTableQuery, InsertQuery, SelectQuery, Statement};
    /// use scandb::{ColumnDef, Database, FactorTree, Value};
    ///
    /// let mut db = Database::new();
    /// db.execute(&Statement::CreateTable(
    ///     CreateTableQuery::new("users").column(ColumnDef::int("id").primary_key()),
    /// ))
    /// .unwrap();
    /// db.execute(&Statement::Insert(
    ///     InsertQuery::new("users").row(vec![FactorTree::int(1)]),
    /// ))
    /// .unwrap();
    ///
    /// let rows = db
    ///     .query(&SelectQuery::new().field("id").from("users"))
    ///     .unwrap()
    ///     .collect_rows()
    ///     .unwrap();
    /// assert_eq!(rows, vec![vec![Value::Int(1)]]);
    /// ```
    pub fn execute(&mut self, statement: &Statement) -> Result<()> {
        match statement {
            Statement::CreateTable(q) => exec::create_table(self, q),
            Statement::DropTable(q) => exec::drop_table(self, q),
            Statement::Insert(q) => exec::insert(self, q),
            Statement::Update(q) => exec::update(self, q),
            Statement::Delete(q) => exec::delete(self, q),
        }
    }

    /// Runs a SELECT and returns a lazily evaluated result.
    ///
    /// # Errors
    /// Returns an error if the query references unknown tables or fields,
    /// is ambiguous, or contains an invalid expression.
    pub fn query(&self, query: &SelectQuery) -> Result<QueryResult> {
        exec::select(self, query)
    }
}
