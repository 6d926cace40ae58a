//! Volatile in-memory record store

use std::sync::RwLock;

use super::errors::{StoreError, StoreResult};
use super::ordering;
use super::record::Record;
use super::store::RecordStore;
use crate::mac::Tag;

/// Records held in insertion order behind a read-write lock.
///
/// Lives for the process lifetime.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<Record>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Records in insertion order (a copy)
    pub fn insertion_order(&self) -> StoreResult<Vec<Record>> {
        let records = self
            .records
            .read()
            .map_err(|_| StoreError::poisoned("records"))?;
        Ok(records.clone())
    }
}

impl RecordStore for MemoryStore {
    fn append(&self, data: Vec<u8>, tag: Tag, timestamp: i64) -> StoreResult<Record> {
        let mut records = self
            .records
            .write()
            .map_err(|_| StoreError::poisoned("records"))?;
        let record = Record::new(records.len() as u64, timestamp, data, tag);
        records.push(record.clone());
        Ok(record)
    }

    fn latest(&self) -> StoreResult<Option<Record>> {
        let records = self
            .records
            .read()
            .map_err(|_| StoreError::poisoned("records"))?;
        Ok(ordering::newest(&records).cloned())
    }

    fn all_by_timestamp_descending(&self) -> StoreResult<Vec<Record>> {
        let mut snapshot = self.insertion_order()?;
        ordering::sort_descending(&mut snapshot);
        Ok(snapshot)
    }

    fn len(&self) -> StoreResult<usize> {
        let records = self
            .records
            .read()
            .map_err(|_| StoreError::poisoned("records"))?;
        Ok(records.len())
    }
}
