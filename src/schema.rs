use std::collections::HashMap;

use crate::data_type::DataType;
use crate::error::{DbError, Result};

/// Column definition in the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
    /// Bytes the field occupies in a row. For Varchar this is the capacity.
    pub size: usize,
    pub nullable: bool,
    pub unique: bool,
}

impl ColumnDef {
    /// Builds a nullable, non-unique column of a fixed-size type.
    ///
    /// A [DataType::Varchar] built this way has capacity 0; use
    /// [ColumnDef::varchar] instead.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            size: data_type.fixed_size().unwrap_or(0),
            nullable: true,
            unique: false,
        }
    }

    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, DataType::Bool)
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, DataType::Int)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, DataType::Float)
    }

    pub fn double(name: impl Into<String>) -> Self {
        Self::new(name, DataType::Double)
    }

    pub fn varchar(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            size: capacity,
            ..Self::new(name, DataType::Varchar)
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// A primary key is a unique, non-nullable column.
    pub fn primary_key(self) -> Self {
        self.not_null().unique()
    }
}

/// Ordered list of columns describing the layout of a packed row.
///
/// A row starts with a null bitmap of `ceil(n / 8)` bytes, followed by the
/// fields in declaration order, each at a fixed offset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    columns: Vec<ColumnDef>,
    /// Offset of each column relative to the end of the null bitmap.
    offsets: Vec<usize>,
    data_size: usize,
    indices: HashMap<String, usize>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a schema from a list of columns. Repeated names keep the first
    /// definition.
    pub fn from_columns(columns: impl IntoIterator<Item = ColumnDef>) -> Self {
        let mut schema = Self::new();
        for column in columns {
            schema.add_column(column);
        }
        schema
    }

    /// Appends a column. Adding a name that already exists is a no-op and
    /// returns `false`.
    pub fn add_column(&mut self, column: ColumnDef) -> bool {
        if self.indices.contains_key(&column.name) {
            return false;
        }
        self.indices.insert(column.name.clone(), self.columns.len());
        self.offsets.push(self.data_size);
        self.data_size += column.size;
        self.columns.push(column);
        true
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.indices.contains_key(name)
    }

    /// Position of the field in declaration order, which is also its bit in
    /// the null bitmap.
    pub fn index(&self, name: &str) -> Result<usize> {
        self.indices
            .get(name)
            .copied()
            .ok_or_else(|| DbError::FieldNotFound(name.to_owned()))
    }

    pub fn column(&self, name: &str) -> Result<&ColumnDef> {
        Ok(&self.columns[self.index(name)?])
    }

    pub fn null_bitmap_size(&self) -> usize {
        self.columns.len().div_ceil(8)
    }

    /// Byte offset of the field from the start of the row.
    pub fn offset(&self, name: &str) -> Result<usize> {
        Ok(self.null_bitmap_size() + self.offsets[self.index(name)?])
    }

    /// Size in bytes of a packed row.
    pub fn total_size(&self) -> usize {
        self.null_bitmap_size() + self.data_size
    }

    pub fn may_be_null(&self, name: &str) -> Result<bool> {
        Ok(self.column(name)?.nullable)
    }

    pub fn is_unique(&self, name: &str) -> Result<bool> {
        Ok(self.column(name)?.unique)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Schema {
        Schema::from_columns([
            ColumnDef::int("a").primary_key(),
            ColumnDef::float("b"),
            ColumnDef::double("c"),
            ColumnDef::bool("d"),
            ColumnDef::varchar("e", 10),
        ])
    }

    // ─────────────────────────────────────────────────────────────
    // Test 1 : offsets follow declaration order after the bitmap
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_offsets() {
        let schema = sample();
        assert_eq!(schema.null_bitmap_size(), 1);
        assert_eq!(schema.offset("a").unwrap(), 1);
        assert_eq!(schema.offset("b").unwrap(), 5);
        assert_eq!(schema.offset("c").unwrap(), 9);
        assert_eq!(schema.offset("d").unwrap(), 17);
        assert_eq!(schema.offset("e").unwrap(), 21);
        assert_eq!(schema.total_size(), 31);
    }

    // ─────────────────────────────────────────────────────────────
    // Test 2 : adding an existing field is a no-op
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_add_column_idempotent() {
        let mut schema = sample();
        assert!(!schema.add_column(ColumnDef::varchar("a", 100)));
        assert_eq!(schema.len(), 5);
        assert_eq!(schema.column("a").unwrap().data_type, DataType::Int);
        assert_eq!(schema.total_size(), 31);
    }

    // ─────────────────────────────────────────────────────────────
    // Test 3 : bitmap grows with every eighth field
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_bitmap_size() {
        let mut schema = Schema::new();
        assert_eq!(schema.null_bitmap_size(), 0);
        for i in 0..9 {
            schema.add_column(ColumnDef::int(format!("f{i}")));
        }
        assert_eq!(schema.null_bitmap_size(), 2);
        assert_eq!(schema.offset("f0").unwrap(), 2);
        assert_eq!(schema.total_size(), 2 + 9 * 4);
    }

    // ─────────────────────────────────────────────────────────────
    // Test 4 : constraint flags and unknown fields
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_flags() {
        let schema = sample();
        assert!(!schema.may_be_null("a").unwrap());
        assert!(schema.is_unique("a").unwrap());
        assert!(schema.may_be_null("b").unwrap());
        assert!(!schema.is_unique("b").unwrap());
        assert!(matches!(
            schema.index("zzz"),
            Err(DbError::FieldNotFound(name)) if name == "zzz"
        ));
        assert_eq!(
            schema.field_names().collect::<Vec<_>>(),
            vec!["a", "b", "c", "d", "e"]
        );
    }
}
