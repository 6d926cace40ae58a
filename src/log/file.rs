//! Durable record store backed by an append-only file
//!
//! Layout: `<data_dir>/log/records.dat`, one frame per record (see
//! `record.rs`). Every append is written and fsynced before it is
//! acknowledged. All frames are loaded into memory at open; reads are served
//! from that index.
//!
//! Open-time policy:
//! - The record file is locked exclusively for the life of the store
//! - A final frame that runs past EOF is a torn write: truncate and warn
//! - Any other framing fault is fatal (`TLOG_STORE_CORRUPTION`)
//!
//! A torn frame must still look like the start of the next record: its
//! sequence and data length agree with its length prefix. A damaged length
//! prefix in the middle of the file therefore fails open instead of cutting
//! off the records behind it.
//!
//! A frame whose data was rewritten with a valid CRC loads normally. Catching
//! that is the verification scanner's job.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use fs2::FileExt;

use super::errors::{StoreError, StoreResult};
use super::ordering;
use super::record::{Record, FRAME_HEADER_SIZE, MIN_FRAME_SIZE};
use super::store::RecordStore;
use crate::mac::Tag;
use crate::observability::{log_event_with_fields, Event};

/// Subdirectory of the data directory holding the record file
pub const LOG_SUBDIR: &str = "log";

/// Record file name
pub const RECORD_FILE: &str = "records.dat";

struct FileState {
    file: File,
    records: Vec<Record>,
    offset: u64,
    /// Set when a failed append could not be rolled back
    failed: bool,
}

/// Result of scanning the raw bytes of a record file
#[derive(Debug)]
struct ScanOutcome {
    records: Vec<Record>,
    /// Length of the prefix made of complete, valid frames
    valid_len: u64,
    /// Bytes past `valid_len` belonging to a torn final frame
    torn_bytes: u64,
}

/// File-backed [`RecordStore`].
pub struct FileStore {
    path: PathBuf,
    state: RwLock<FileState>,
}

impl FileStore {
    /// Opens or creates `<data_dir>/log/records.dat`.
    ///
    /// # Errors
    ///
    /// - `TLOG_STORE_WRITE_FAILED` if the directory or file cannot be created
    /// - `TLOG_STORE_LOCKED` if another store holds the record file
    /// - `TLOG_STORE_READ_FAILED` if existing frames cannot be read
    /// - `TLOG_STORE_CORRUPTION` if a frame other than a torn tail is invalid
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        let log_dir = data_dir.join(LOG_SUBDIR);
        let path = log_dir.join(RECORD_FILE);

        if !log_dir.exists() {
            fs::create_dir_all(&log_dir).map_err(|e| {
                StoreError::write_failed(
                    format!("Failed to create log directory: {}", log_dir.display()),
                    e,
                )
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                StoreError::write_failed(
                    format!("Failed to open record file: {}", path.display()),
                    e,
                )
            })?;

        file.try_lock_exclusive().map_err(|e| {
            if e.kind() == fs2::lock_contended_error().kind() {
                StoreError::locked(&path, e)
            } else {
                StoreError::io_error(
                    format!("Failed to lock record file: {}", path.display()),
                    e,
                )
            }
        })?;

        let bytes = fs::read(&path).map_err(|e| {
            StoreError::read_failed(format!("Failed to read record file: {}", path.display()), e)
        })?;

        let outcome = scan_frames(&bytes)?;

        let path_str = path.display().to_string();

        if outcome.torn_bytes > 0 {
            file.set_len(outcome.valid_len).map_err(|e| {
                StoreError::io_error("Failed to truncate torn frame", e)
            })?;
            file.sync_all()
                .map_err(|e| StoreError::io_error("fsync failed after truncation", e))?;
            log_event_with_fields(
                Event::StoreTailTruncated,
                &[
                    ("path", path_str.as_str()),
                    ("torn_bytes", outcome.torn_bytes.to_string().as_str()),
                    ("valid_len", outcome.valid_len.to_string().as_str()),
                ],
            );
        }

        log_event_with_fields(
            Event::StoreOpened,
            &[
                ("path", path_str.as_str()),
                ("records", outcome.records.len().to_string().as_str()),
            ],
        );

        Ok(Self {
            path,
            state: RwLock::new(FileState {
                file,
                records: outcome.records,
                offset: outcome.valid_len,
                failed: false,
            }),
        })
    }

    /// Path to the record file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Byte length of the valid part of the file
    pub fn current_offset(&self) -> StoreResult<u64> {
        let state = self.state.read().map_err(|_| StoreError::poisoned("file"))?;
        Ok(state.offset)
    }

    fn write_frame(state: &mut FileState, frame: &[u8]) -> io::Result<()> {
        state.file.write_all(frame)?;
        state.file.sync_all()
    }
}

impl RecordStore for FileStore {
    fn append(&self, data: Vec<u8>, tag: Tag, timestamp: i64) -> StoreResult<Record> {
        let mut state = self.state.write().map_err(|_| StoreError::poisoned("file"))?;

        if state.failed {
            return Err(StoreError::append_refused(format!(
                "Record file {} holds an unrecovered partial frame; refusing appends",
                self.path.display()
            )));
        }

        let record = Record::new(state.records.len() as u64, timestamp, data, tag);
        let frame = record.to_frame();

        if let Err(e) = Self::write_frame(&mut state, &frame) {
            // Drop any partial frame so the next append starts on a boundary.
            let offset = state.offset;
            let message = match state.file.set_len(offset) {
                Ok(()) => format!("Failed to append record {}", record.sequence),
                Err(rollback) => {
                    state.failed = true;
                    format!(
                        "Failed to append record {}; rollback to offset {} failed: {}",
                        record.sequence, offset, rollback
                    )
                }
            };
            return Err(StoreError::write_failed(message, e));
        }

        state.offset += frame.len() as u64;
        state.records.push(record.clone());
        Ok(record)
    }

    fn latest(&self) -> StoreResult<Option<Record>> {
        let state = self.state.read().map_err(|_| StoreError::poisoned("file"))?;
        Ok(ordering::newest(&state.records).cloned())
    }

    fn all_by_timestamp_descending(&self) -> StoreResult<Vec<Record>> {
        let mut snapshot = {
            let state = self.state.read().map_err(|_| StoreError::poisoned("file"))?;
            state.records.clone()
        };
        ordering::sort_descending(&mut snapshot);
        Ok(snapshot)
    }

    fn len(&self) -> StoreResult<usize> {
        let state = self.state.read().map_err(|_| StoreError::poisoned("file"))?;
        Ok(state.records.len())
    }
}

/// Decode consecutive frames. Sequences must run 0, 1, 2, ...
fn scan_frames(bytes: &[u8]) -> StoreResult<ScanOutcome> {
    let mut records = Vec::new();
    let mut offset = 0usize;

    while offset < bytes.len() {
        let remaining = &bytes[offset..];

        if remaining.len() < 4 {
            break;
        }
        let mut len_buf = [0u8; 4];
        len_buf.copy_from_slice(&remaining[..4]);
        let frame_length = u32::from_le_bytes(len_buf) as usize;

        if frame_length < MIN_FRAME_SIZE {
            return Err(StoreError::corruption_at_offset(
                offset as u64,
                format!("Invalid frame length: {}", frame_length),
            ));
        }
        if frame_length > remaining.len() {
            check_torn_tail(remaining, frame_length, records.len() as u64)
                .map_err(|reason| StoreError::corruption_at_offset(offset as u64, reason))?;
            break;
        }

        let (record, consumed) = Record::from_frame(remaining)
            .map_err(|e| StoreError::corruption_at_offset(offset as u64, e.to_string()))?;

        let expected = records.len() as u64;
        if record.sequence != expected {
            return Err(StoreError::corruption_at_offset(
                offset as u64,
                format!(
                    "Sequence out of order: expected {}, found {}",
                    expected, record.sequence
                ),
            ));
        }

        records.push(record);
        offset += consumed;
    }

    Ok(ScanOutcome {
        records,
        valid_len: offset as u64,
        torn_bytes: (bytes.len() - offset) as u64,
    })
}

/// Accept a frame running past EOF only if the bytes present agree with it.
fn check_torn_tail(remaining: &[u8], frame_length: usize, expected: u64) -> Result<(), String> {
    if remaining.len() >= 12 {
        let mut seq_buf = [0u8; 8];
        seq_buf.copy_from_slice(&remaining[4..12]);
        let sequence = u64::from_le_bytes(seq_buf);
        if sequence != expected {
            return Err(format!(
                "Frame of {} bytes runs past end of file with sequence {}, expected {}",
                frame_length, sequence, expected
            ));
        }
    }

    if remaining.len() >= FRAME_HEADER_SIZE {
        let mut len_buf = [0u8; 4];
        len_buf.copy_from_slice(&remaining[FRAME_HEADER_SIZE - 4..FRAME_HEADER_SIZE]);
        let data_len = u32::from_le_bytes(len_buf) as usize;
        if MIN_FRAME_SIZE + data_len != frame_length {
            return Err(format!(
                "Frame length {} disagrees with data length {} and runs past end of file",
                frame_length, data_len
            ));
        }
    }

    Ok(())
}
