//! Binary dump and load of a whole database.
//!
//! A dump is a directory holding:
//! - `schema.dat`: per table `name\0`, field count (`u32`), then per field
//!   `name\0`, nullable (`u8`), unique (`u8`), type tag (`u8`) and size
//!   (`u32`).
//! - `<table>.dat`: per row the row id (`u64`) followed by the packed row.
//! - `constraints.dat`: per foreign key `slave_table\0 slave_field\0
//!   master_table\0 master_field\0`.
//!
//! Integers are big-endian.

use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, debug_span};

use crate::constraint::ReferencesConstraint;
use crate::data_type::DataType;
use crate::database::Database;
use crate::error::{DbError, Result};
use crate::schema::{ColumnDef, Schema};

pub const SCHEMA_FILE: &str = "schema.dat";
pub const CONSTRAINTS_FILE: &str = "constraints.dat";

/// File holding the rows of `table`. Names that could leave the dump
/// directory are refused.
fn table_file(table: &str) -> Option<String> {
    let unsafe_name = table.is_empty()
        || table.contains(['/', '\\', '\0'])
        || table.contains("..");
    (!unsafe_name).then(|| format!("{table}.dat"))
}

/// Writes every table, its rows and the constraints into `dir`, which is
/// created if needed. Existing dump files are overwritten.
///
/// # Errors
/// [DbError::Io] on write failures, or for a table name containing a path
/// separator or `..`.
pub fn dump(db: &Database, dir: &Path) -> Result<()> {
    let _span = debug_span!(target: "scandb.persist", "dump", dir = %dir.display()).entered();
    fs::create_dir_all(dir)?;

    let mut schemas = Vec::new();
    for table in db.table_names() {
        let file = table_file(table).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("table name {table:?} cannot be used as a file name"),
            )
        })?;
        let schema = db.schema(table)?;
        put_str(&mut schemas, table);
        put_u32(&mut schemas, len_u32(schema.len())?);
        for column in schema.columns() {
            put_str(&mut schemas, &column.name);
            schemas.push(u8::from(column.nullable));
            schemas.push(u8::from(column.unique));
            schemas.push(column.data_type.tag());
            put_u32(&mut schemas, len_u32(column.size)?);
        }

        let storage = db.storage(table)?;
        let storage = storage.borrow();
        let mut rows = Vec::with_capacity(storage.len() * (8 + schema.total_size()));
        for (row_id, row) in storage.iter() {
            rows.extend_from_slice(&row_id.to_be_bytes());
            rows.extend_from_slice(row);
        }
        fs::write(dir.join(file), rows)?;
        debug!(target: "scandb.persist", table, rows = storage.len(), "table dumped");
    }
    fs::write(dir.join(SCHEMA_FILE), schemas)?;

    let mut constraints = Vec::new();
    for c in db.constraints() {
        for part in [&c.slave_table, &c.slave_field, &c.master_table, &c.master_field] {
            put_str(&mut constraints, part);
        }
    }
    fs::write(dir.join(CONSTRAINTS_FILE), constraints)?;
    Ok(())
}

/// Rebuilds a database from a dump written by [dump].
///
/// # Errors
/// - [DbError::Io] if a file is missing or unreadable.
/// - [DbError::CorruptDump] for truncated files or unknown type tags.
pub fn load(dir: &Path) -> Result<Database> {
    let _span = debug_span!(target: "scandb.persist", "load", dir = %dir.display()).entered();
    let mut db = Database::new();

    let bytes = fs::read(dir.join(SCHEMA_FILE))?;
    let mut reader = ByteReader::new(SCHEMA_FILE, &bytes);
    while !reader.is_empty() {
        let table = reader.string()?;
        let count = reader.u32()?;
        let mut schema = Schema::new();
        for _ in 0..count {
            let name = reader.string()?;
            let nullable = reader.u8()? != 0;
            let unique = reader.u8()? != 0;
            let tag = reader.u8()?;
            let data_type = DataType::from_tag(tag)
                .ok_or_else(|| DbError::CorruptDump(format!("unknown type tag {tag}")))?;
            let size = reader.u32()? as usize;
            schema.add_column(ColumnDef {
                name,
                data_type,
                size,
                nullable,
                unique,
            });
        }
        let row_size = schema.total_size();
        if !db.add_table(&table, schema) {
            return Err(DbError::CorruptDump(format!("table {table} listed twice")));
        }
        load_rows(&db, dir, &table, row_size)?;
    }

    let bytes = fs::read(dir.join(CONSTRAINTS_FILE))?;
    let mut reader = ByteReader::new(CONSTRAINTS_FILE, &bytes);
    while !reader.is_empty() {
        let slave_table = reader.string()?;
        let slave_field = reader.string()?;
        let master_table = reader.string()?;
        let master_field = reader.string()?;
        db.add_constraint(ReferencesConstraint::new(
            slave_table,
            slave_field,
            master_table,
            master_field,
        ));
    }
    debug!(target: "scandb.persist", tables = db.table_names().len(), "database loaded");
    Ok(db)
}

fn load_rows(db: &Database, dir: &Path, table: &str, row_size: usize) -> Result<()> {
    let file = table_file(table)
        .ok_or_else(|| DbError::CorruptDump(format!("invalid table name {table:?}")))?;
    let bytes = fs::read(dir.join(&file))?;
    let mut reader = ByteReader::new(&file, &bytes);
    let storage = db.storage(table)?;
    let mut storage = storage.borrow_mut();
    while !reader.is_empty() {
        let row_id = reader.u64()?;
        let row = reader.take(row_size)?;
        storage.insert(row_id, row.to_vec());
    }
    debug!(target: "scandb.persist", table, rows = storage.len(), "table loaded");
    Ok(())
}

fn len_u32(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| DbError::CorruptDump(format!("length {len} does not fit u32")))
}

fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn put_str(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(s.as_bytes());
    out.push(0);
}

/// Cursor over a dump file. Every read past the end is a
/// [DbError::CorruptDump].
struct ByteReader<'a> {
    file: &'a str,
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(file: &'a str, buf: &'a [u8]) -> Self {
        Self { file, buf, pos: 0 }
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n).filter(|end| *end <= self.buf.len());
        let Some(end) = end else {
            return Err(DbError::CorruptDump(format!(
                "{}: unexpected end of file at byte {}",
                self.file, self.pos
            )));
        };
        let bytes = &self.buf[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<u32> {
        self.array().map(u32::from_be_bytes)
    }

    fn u64(&mut self) -> Result<u64> {
        self.array().map(u64::from_be_bytes)
    }

    fn string(&mut self) -> Result<String> {
        let rest = &self.buf[self.pos..];
        let Some(len) = rest.iter().position(|b| *b == 0) else {
            return Err(DbError::CorruptDump(format!(
                "{}: unterminated string at byte {}",
                self.file, self.pos
            )));
        };
        let s = String::from_utf8(rest[..len].to_vec())
            .map_err(|_| DbError::CorruptDump(format!("{}: invalid UTF-8", self.file)))?;
        self.pos += len + 1;
        Ok(s)
    }
}
