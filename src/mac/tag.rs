//! Authentication tag type

use std::fmt;

use subtle::ConstantTimeEq;

/// Length of an HMAC-SHA256 tag in bytes
pub const TAG_LEN: usize = 32;

/// Fixed-length authentication tag.
///
/// Equality is constant-time.
#[derive(Clone, Copy, Eq)]
pub struct Tag([u8; TAG_LEN]);

impl Tag {
    /// Wrap raw tag bytes
    pub fn from_bytes(bytes: [u8; TAG_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw tag bytes
    pub fn as_bytes(&self) -> &[u8; TAG_LEN] {
        &self.0
    }

    /// Lowercase hex encoding
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({})", self.to_hex())
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
