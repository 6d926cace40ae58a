//! Process-wide secret key
//!
//! The key is loaded once at startup and never printed, serialized, or
//! returned to callers.

use std::fmt;
use std::fs;
use std::path::Path;

use rand::rngs::OsRng;
use rand::RngCore;

use super::errors::{MacError, MacResult};

/// Keys shorter than this are accepted but reported as weak.
pub const RECOMMENDED_KEY_LEN: usize = 16;

/// Length of keys produced by [`SecretKey::generate_hex`].
pub const GENERATED_KEY_LEN: usize = 32;

/// Secret key bytes for the MAC engine.
#[derive(Clone)]
pub struct SecretKey {
    bytes: Vec<u8>,
}

impl SecretKey {
    /// Create a key from raw bytes. Empty keys are rejected.
    pub fn new(bytes: impl Into<Vec<u8>>) -> MacResult<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(MacError::EmptyKey);
        }
        Ok(Self { bytes })
    }

    /// Read the key from the named environment variable.
    pub fn from_env(var: &str) -> MacResult<Self> {
        let value = std::env::var(var).map_err(|_| MacError::KeyMissing(var.to_string()))?;
        Self::new(value.into_bytes())
    }

    /// Read the key from a file. A single trailing newline is trimmed.
    pub fn from_file(path: &Path) -> MacResult<Self> {
        let mut bytes = fs::read(path)
            .map_err(|e| MacError::KeyFileUnreadable(format!("{}: {}", path.display(), e)))?;
        if bytes.last() == Some(&b'\n') {
            bytes.pop();
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
        }
        Self::new(bytes)
    }

    /// Generate a random key and return it hex-encoded.
    pub fn generate_hex() -> String {
        let mut bytes = [0u8; GENERATED_KEY_LEN];
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// Whether the key is shorter than [`RECOMMENDED_KEY_LEN`].
    pub fn is_weak(&self) -> bool {
        self.bytes.len() < RECOMMENDED_KEY_LEN
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}
