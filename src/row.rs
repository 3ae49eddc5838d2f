use std::borrow::Cow;

use bitvec::prelude::*;

use crate::data_type::DataType;
use crate::error::{DbError, Result};
use crate::schema::Schema;
use crate::value::Value;

/// Allocates a packed row for `schema` where every field is NULL.
pub fn null_row(schema: &Schema) -> Vec<u8> {
    let mut buf = vec![0u8; schema.total_size()];
    buf[..schema.null_bitmap_size()].view_bits_mut::<Lsb0>()[..schema.len()].fill(true);
    buf
}

/// Read-only view over a packed row.
///
/// Numbers are stored little-endian, booleans as a 4-byte integer, strings
/// zero-padded up to the declared capacity.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    buf: &'a [u8],
    schema: &'a Schema,
}

impl<'a> Row<'a> {
    pub fn new(buf: &'a [u8], schema: &'a Schema) -> Self {
        Self { buf, schema }
    }

    pub fn is_null(&self, name: &str) -> Result<bool> {
        let index = self.schema.index(name)?;
        Ok(null_bits(self.buf, self.schema)[index])
    }

    /// Decodes the field `name`, or returns [Value::Null] when its null bit is
    /// set.
    ///
    /// # Errors
    /// Returns [DbError::FieldNotFound] if the schema has no such field.
    pub fn get_field(&self, name: &str) -> Result<Value> {
        if self.is_null(name)? {
            return Ok(Value::Null);
        }
        let column = self.schema.column(name)?;
        let offset = self.schema.offset(name)?;
        let bytes = &self.buf[offset..offset + column.size];
        Ok(decode(column.data_type, bytes))
    }
}

/// Mutable view over a packed row.
#[derive(Debug)]
pub struct RowMut<'a> {
    buf: &'a mut [u8],
    schema: &'a Schema,
}

impl<'a> RowMut<'a> {
    pub fn new(buf: &'a mut [u8], schema: &'a Schema) -> Self {
        Self { buf, schema }
    }

    pub fn as_row(&self) -> Row<'_> {
        Row::new(&*self.buf, self.schema)
    }

    /// Writes `value` into the field `name`.
    ///
    /// # Errors
    /// - [DbError::FieldNotFound] if the schema has no such field.
    /// - [DbError::TypeMismatch] if the value's kind differs from the column's.
    /// - [DbError::StringTooLong] if a string exceeds the declared capacity.
    ///
    /// # Behavior
    /// - Writing `NULL` only sets the null bit, the stored bytes are kept.
    /// - Any other value clears the null bit.
    pub fn set_field(&mut self, name: &str, value: &Value) -> Result<()> {
        let index = self.schema.index(name)?;
        if value.is_null() {
            null_bits_mut(self.buf, self.schema).set(index, true);
            return Ok(());
        }

        let column = self.schema.column(name)?;
        let offset = self.schema.offset(name)?;
        let slot = &mut self.buf[offset..offset + column.size];
        match (column.data_type, value) {
            (DataType::Bool, Value::Bool(b)) => slot.copy_from_slice(&i32::from(*b).to_le_bytes()),
            (DataType::Int, Value::Int(i)) => slot.copy_from_slice(&i.to_le_bytes()),
            (DataType::Float, Value::Float(f)) => slot.copy_from_slice(&f.to_le_bytes()),
            (DataType::Double, Value::Double(d)) => slot.copy_from_slice(&d.to_le_bytes()),
            (DataType::Varchar, Value::Varchar(s)) => {
                if s.len() > column.size {
                    return Err(DbError::StringTooLong {
                        field: name.to_owned(),
                        capacity: column.size,
                        len: s.len(),
                    });
                }
                // a NUL would end the string early on read
                if s.contains('\0') {
                    return Err(DbError::NulInString(name.to_owned()));
                }
                slot[..s.len()].copy_from_slice(s.as_bytes());
                slot[s.len()..].fill(0);
            }
            (expected, found) => {
                return Err(DbError::TypeMismatch {
                    expected: expected.to_string(),
                    found: found.type_name().to_owned(),
                });
            }
        }
        null_bits_mut(self.buf, self.schema).set(index, false);
        Ok(())
    }
}

fn null_bits<'b>(buf: &'b [u8], schema: &Schema) -> &'b BitSlice<u8, Lsb0> {
    buf[..schema.null_bitmap_size()].view_bits::<Lsb0>()
}

fn null_bits_mut<'b>(buf: &'b mut [u8], schema: &Schema) -> &'b mut BitSlice<u8, Lsb0> {
    buf[..schema.null_bitmap_size()].view_bits_mut::<Lsb0>()
}

fn decode(data_type: DataType, bytes: &[u8]) -> Value {
    let word = |n: usize| -> [u8; 4] {
        let mut out = [0u8; 4];
        out.copy_from_slice(&bytes[..n]);
        out
    };
    match data_type {
        DataType::Bool => Value::Bool(i32::from_le_bytes(word(4)) != 0),
        DataType::Int => Value::Int(i32::from_le_bytes(word(4))),
        DataType::Float => Value::Float(f32::from_le_bytes(word(4))),
        DataType::Double => {
            let mut out = [0u8; 8];
            out.copy_from_slice(&bytes[..8]);
            Value::Double(f64::from_le_bytes(out))
        }
        DataType::Varchar => {
            let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
            match String::from_utf8_lossy(&bytes[..end]) {
                Cow::Borrowed(s) => Value::varchar(s),
                Cow::Owned(s) => Value::varchar(s),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnDef;

    fn schema() -> Schema {
        Schema::from_columns([
            ColumnDef::int("a"),
            ColumnDef::float("b"),
            ColumnDef::double("c"),
            ColumnDef::bool("d"),
            ColumnDef::varchar("e", 8),
        ])
    }

    // ─────────────────────────────────────────────────────────────
    // Test 1 : fresh rows are all NULL
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_null_row() {
        let schema = schema();
        let buf = null_row(&schema);
        assert_eq!(buf.len(), schema.total_size());
        assert_eq!(buf[0], 0b0001_1111);
        let row = Row::new(&buf, &schema);
        for name in ["a", "b", "c", "d", "e"] {
            assert_eq!(row.get_field(name).unwrap(), Value::Null);
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Test 2 : written values read back and clear the null bit
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_set_and_get() {
        let schema = schema();
        let mut buf = null_row(&schema);
        let mut row = RowMut::new(&mut buf, &schema);
        row.set_field("a", &Value::Int(-7)).unwrap();
        row.set_field("b", &Value::Float(42.0)).unwrap();
        row.set_field("c", &Value::Double(55.5)).unwrap();
        row.set_field("d", &Value::Bool(true)).unwrap();
        row.set_field("e", &Value::varchar("test")).unwrap();

        let row = row.as_row();
        assert_eq!(row.get_field("a").unwrap(), Value::Int(-7));
        assert_eq!(row.get_field("b").unwrap(), Value::Float(42.0));
        assert_eq!(row.get_field("c").unwrap(), Value::Double(55.5));
        assert_eq!(row.get_field("d").unwrap(), Value::Bool(true));
        assert_eq!(row.get_field("e").unwrap(), Value::varchar("test"));
        assert_eq!(buf[0], 0);
    }

    // ─────────────────────────────────────────────────────────────
    // Test 3 : little-endian layout and lsb-first bitmap
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_byte_layout() {
        let schema = schema();
        let mut buf = null_row(&schema);
        RowMut::new(&mut buf, &schema)
            .set_field("a", &Value::Int(1))
            .unwrap();
        assert_eq!(&buf[1..5], &[1, 0, 0, 0]);
        assert_eq!(buf[0], 0b0001_1110);
    }

    // ─────────────────────────────────────────────────────────────
    // Test 4 : shorter string overwrites a longer one
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_varchar_padding() {
        let schema = schema();
        let mut buf = null_row(&schema);
        let mut row = RowMut::new(&mut buf, &schema);
        row.set_field("e", &Value::varchar("abcdefgh")).unwrap();
        row.set_field("e", &Value::varchar("xy")).unwrap();
        assert_eq!(row.as_row().get_field("e").unwrap(), Value::varchar("xy"));
    }

    // ─────────────────────────────────────────────────────────────
    // Test 5 : setting NULL keeps bytes but hides the value
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_set_null() {
        let schema = schema();
        let mut buf = null_row(&schema);
        let mut row = RowMut::new(&mut buf, &schema);
        row.set_field("a", &Value::Int(9)).unwrap();
        row.set_field("a", &Value::Null).unwrap();
        assert!(row.as_row().is_null("a").unwrap());
        assert_eq!(row.as_row().get_field("a").unwrap(), Value::Null);
    }

    // ─────────────────────────────────────────────────────────────
    // Test 6 : errors
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_errors() {
        let schema = schema();
        let mut buf = null_row(&schema);
        let mut row = RowMut::new(&mut buf, &schema);
        assert!(matches!(
            row.set_field("e", &Value::varchar("way too long")),
            Err(DbError::StringTooLong { capacity: 8, len: 12, .. })
        ));
        assert!(matches!(
            row.set_field("a", &Value::varchar("1")),
            Err(DbError::TypeMismatch { .. })
        ));
        assert!(matches!(
            row.set_field("nope", &Value::Int(1)),
            Err(DbError::FieldNotFound(_))
        ));
        assert!(row.as_row().is_null("e").unwrap());
    }

    // ─────────────────────────────────────────────────────────────
    // Test 7 : NUL bytes cannot be stored
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_varchar_nul_byte() {
        let schema = schema();
        let mut buf = null_row(&schema);
        let mut row = RowMut::new(&mut buf, &schema);
        assert!(matches!(
            row.set_field("e", &Value::varchar("a\0b")),
            Err(DbError::NulInString(_))
        ));
        assert!(row.as_row().is_null("e").unwrap());
    }
}
