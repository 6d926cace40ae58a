//! Record store for tamperlog
//!
//! Holds the append-only sequence of `(data, tag, timestamp)` records.
//! The store owns every record; callers only ever receive copies.
//!
//! # Design Principles
//!
//! - Append-only (no update, no delete)
//! - Tags are stored as given; checking them is the scanner's job
//! - Reads are snapshots; ordering for reads happens on the copy
//! - Newest = greatest timestamp, then greatest sequence
//!
//! Two implementations share the [`RecordStore`] trait: [`MemoryStore`]
//! (volatile) and [`FileStore`] (append-only file, fsync per record).

mod checksum;
mod errors;
mod file;
mod memory;
mod ordering;
mod record;
mod store;

pub use checksum::compute_checksum;
pub use errors::{Severity, StoreError, StoreErrorCode, StoreResult};
pub use file::{FileStore, LOG_SUBDIR, RECORD_FILE};
pub use memory::MemoryStore;
pub use ordering::{newest, sort_descending};
pub use record::{Record, FRAME_HEADER_SIZE, MIN_FRAME_SIZE};
pub use store::RecordStore;
