//! HMAC-SHA256 tagging

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::errors::{MacError, MacResult};
use super::key::SecretKey;
use super::tag::{Tag, TAG_LEN};

type HmacSha256 = Hmac<Sha256>;

/// Computes and checks tags under a single immutable key.
///
/// Stateless apart from the keyed HMAC state, which is cloned for every tag.
#[derive(Clone)]
pub struct MacEngine {
    keyed: HmacSha256,
    weak_key: bool,
}

impl MacEngine {
    /// Build the engine, checking that the HMAC primitive accepts the key.
    pub fn new(key: SecretKey) -> MacResult<Self> {
        let keyed = HmacSha256::new_from_slice(key.as_bytes())
            .map_err(|e| MacError::PrimitiveUnavailable(e.to_string()))?;
        Ok(Self {
            keyed,
            weak_key: key.is_weak(),
        })
    }

    /// Compute `HMAC-SHA256(key, data)`.
    pub fn tag(&self, data: &[u8]) -> Tag {
        let mut mac = self.keyed.clone();
        mac.update(data);
        let mut out = [0u8; TAG_LEN];
        out.copy_from_slice(&mac.finalize().into_bytes());
        Tag::from_bytes(out)
    }

    /// Recompute the tag for `data` and compare it to `expected` in constant time.
    pub fn verify(&self, data: &[u8], expected: &Tag) -> bool {
        self.tag(data) == *expected
    }

    /// Whether the engine's key is below the recommended length
    pub fn has_weak_key(&self) -> bool {
        self.weak_key
    }
}

impl fmt::Debug for MacEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MacEngine")
            .field("algorithm", &"HMAC-SHA256")
            .finish_non_exhaustive()
    }
}
