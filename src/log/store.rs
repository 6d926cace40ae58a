//! The record store contract

use super::errors::StoreResult;
use super::record::Record;
use crate::mac::Tag;

/// Append-only, ordered collection of records.
///
/// Implementations must make `append` atomic with respect to other appends
/// (sequence assignment and insertion happen under one lock) and must serve
/// reads from a consistent snapshot. There is no update or delete.
pub trait RecordStore: Send + Sync {
    /// Store a new record. The tag is stored as given and not validated here.
    fn append(&self, data: Vec<u8>, tag: Tag, timestamp: i64) -> StoreResult<Record>;

    /// The record with the greatest timestamp, ties going to the later append.
    fn latest(&self) -> StoreResult<Option<Record>>;

    /// A snapshot of every record, newest first, ordered consistently with
    /// [`RecordStore::latest`]. Never reorders the store itself.
    fn all_by_timestamp_descending(&self) -> StoreResult<Vec<Record>>;

    /// Number of records
    fn len(&self) -> StoreResult<usize>;

    /// Whether the store holds no records
    fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}
