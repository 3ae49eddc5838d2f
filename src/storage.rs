use std::cell::RefCell;
use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};
use std::rc::Rc;

use allocative::Allocative;

/// Row storage of a single table: packed row buffers keyed by row id.
///
/// Row ids come from a high-water mark, so an id is never handed out twice
/// even after the highest row was deleted.
#[derive(Debug, Default, Allocative)]
pub struct TableStorage {
    rows: BTreeMap<u64, Vec<u8>>,
    next_row_id: u64,
}

/// Storage handle shared between the database and every scan over the table.
pub type SharedStorage = Rc<RefCell<TableStorage>>;

impl TableStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedStorage {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, row_id: u64) -> Option<&[u8]> {
        self.rows.get(&row_id).map(Vec::as_slice)
    }

    pub fn get_mut(&mut self, row_id: u64) -> Option<&mut [u8]> {
        self.rows.get_mut(&row_id).map(Vec::as_mut_slice)
    }

    pub fn first_id(&self) -> Option<u64> {
        self.rows.keys().next().copied()
    }

    /// Smallest live row id strictly greater than `row_id`.
    pub fn next_id_after(&self, row_id: u64) -> Option<u64> {
        self.rows
            .range((Excluded(row_id), Unbounded))
            .next()
            .map(|(id, _)| *id)
    }

    /// Stores `row` under a fresh id and returns that id.
    pub fn allocate(&mut self, row: Vec<u8>) -> u64 {
        let row_id = self.next_row_id;
        self.insert(row_id, row);
        row_id
    }

    /// Stores `row` under an explicit id, used when loading a dump.
    pub fn insert(&mut self, row_id: u64, row: Vec<u8>) {
        self.rows.insert(row_id, row);
        self.next_row_id = self.next_row_id.max(row_id + 1);
    }

    pub fn remove(&mut self, row_id: u64) -> Option<Vec<u8>> {
        self.rows.remove(&row_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &[u8])> {
        self.rows.iter().map(|(id, row)| (*id, row.as_slice()))
    }

    /// Bytes held on the heap by this table's rows.
    pub fn allocated_bytes(&self) -> usize {
        allocative::size_of_unique_allocated_data(self)
    }
}
