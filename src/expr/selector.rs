use crate::error::{DbError, Result};
use crate::scan::FieldSource;

/// Decides which row source a field reference is checked against while an
/// expression is being built.
pub trait ScanSelector {
    fn select(&self, field_name: &str) -> Result<&dyn FieldSource>;
}

/// Resolves every field against a single source.
pub struct SimpleScanSelector<'a> {
    source: &'a dyn FieldSource,
}

impl<'a> SimpleScanSelector<'a> {
    pub fn new(source: &'a dyn FieldSource) -> Self {
        Self { source }
    }
}

impl ScanSelector for SimpleScanSelector<'_> {
    fn select(&self, _field_name: &str) -> Result<&dyn FieldSource> {
        Ok(self.source)
    }
}

/// Rejects every field reference. Used for contexts that only allow
/// constants, such as INSERT values.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoScanSelector;

impl ScanSelector for NoScanSelector {
    fn select(&self, field_name: &str) -> Result<&dyn FieldSource> {
        Err(DbError::FieldAccessForbidden(field_name.to_owned()))
    }
}
