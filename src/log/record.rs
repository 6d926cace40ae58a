//! Log record and its on-disk frame
//!
//! Frame layout (all integers little-endian):
//!
//! ```text
//! +------------------+
//! | Frame Length     | (u32) total bytes including this field and the CRC
//! +------------------+
//! | Sequence         | (u64)
//! +------------------+
//! | Timestamp        | (i64, ms since Unix epoch)
//! +------------------+
//! | Tag              | (32 bytes, HMAC-SHA256)
//! +------------------+
//! | Data             | (length-prefixed bytes, u32 length)
//! +------------------+
//! | CRC32            | (u32)
//! +------------------+
//! ```
//!
//! The CRC covers every byte before it. It catches torn and garbled frames;
//! authenticity is the tag's job.

use std::io;

use super::checksum::compute_checksum;
use crate::mac::{Tag, TAG_LEN};

/// Bytes before the data: length, sequence, timestamp, tag, data length
pub const FRAME_HEADER_SIZE: usize = 4 + 8 + 8 + TAG_LEN + 4;

/// Smallest possible frame: empty data
pub const MIN_FRAME_SIZE: usize = FRAME_HEADER_SIZE + 4;

/// One entry of the append-only log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Position in append order, assigned by the store
    pub sequence: u64,
    /// Milliseconds since the Unix epoch at append time
    pub timestamp: i64,
    /// Opaque payload
    pub data: Vec<u8>,
    /// `HMAC-SHA256(key, data)` as computed at append time
    pub tag: Tag,
}

impl Record {
    /// Create a record
    pub fn new(sequence: u64, timestamp: i64, data: Vec<u8>, tag: Tag) -> Self {
        Self {
            sequence,
            timestamp,
            data,
            tag,
        }
    }

    /// Payload as text, replacing invalid UTF-8
    pub fn data_lossy(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }

    /// Encode the record as a frame.
    pub fn to_frame(&self) -> Vec<u8> {
        let frame_length = (MIN_FRAME_SIZE + self.data.len()) as u32;

        let mut frame = Vec::with_capacity(frame_length as usize);
        frame.extend_from_slice(&frame_length.to_le_bytes());
        frame.extend_from_slice(&self.sequence.to_le_bytes());
        frame.extend_from_slice(&self.timestamp.to_le_bytes());
        frame.extend_from_slice(self.tag.as_bytes());
        frame.extend_from_slice(&(self.data.len() as u32).to_le_bytes());
        frame.extend_from_slice(&self.data);

        let checksum = compute_checksum(&frame);
        frame.extend_from_slice(&checksum.to_le_bytes());

        frame
    }

    /// Decode one frame from the start of `buf`, verifying its CRC.
    ///
    /// Returns the record and the number of bytes consumed.
    pub fn from_frame(buf: &[u8]) -> io::Result<(Self, usize)> {
        if buf.len() < MIN_FRAME_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Frame too short",
            ));
        }

        let frame_length = read_u32(buf, 0) as usize;

        if frame_length < MIN_FRAME_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid frame length: {}", frame_length),
            ));
        }

        if buf.len() < frame_length {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "Frame truncated: expected {} bytes, got {}",
                    frame_length,
                    buf.len()
                ),
            ));
        }

        let crc_offset = frame_length - 4;
        let stored = read_u32(buf, crc_offset);
        let computed = compute_checksum(&buf[..crc_offset]);
        if stored != computed {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Frame checksum mismatch: computed {:08x}, stored {:08x}",
                    computed, stored
                ),
            ));
        }

        let sequence = u64::from_le_bytes(slice_array(buf, 4));
        let timestamp = i64::from_le_bytes(slice_array(buf, 12));
        let tag = Tag::from_bytes(slice_array(buf, 20));

        let data_len_offset = 20 + TAG_LEN;
        let data_len = read_u32(buf, data_len_offset) as usize;
        let data_start = data_len_offset + 4;
        if data_start + data_len != crc_offset {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Data length {} disagrees with frame length {}",
                    data_len, frame_length
                ),
            ));
        }
        let data = buf[data_start..crc_offset].to_vec();

        Ok((Self::new(sequence, timestamp, data, tag), frame_length))
    }
}

fn read_u32(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(slice_array(buf, at))
}

/// Copy `N` bytes starting at `at`. Callers have already bounds-checked.
fn slice_array<const N: usize>(buf: &[u8], at: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&buf[at..at + N]);
    out
}
