//! MAC engine for tamperlog
//!
//! Every record's tag is `HMAC-SHA256(key, data)`, computed server-side at
//! append time and recomputed at verification time. A party that can write
//! storage but does not hold the key cannot produce a tag that verifies.
//!
//! # Invariants
//!
//! - The key is fixed at startup and never derived from request input
//! - The key never appears in logs, `Debug` output, or responses
//! - Tag comparison is constant-time

mod engine;
mod errors;
mod key;
mod tag;

pub use engine::MacEngine;
pub use errors::{MacError, MacResult};
pub use key::{SecretKey, GENERATED_KEY_LEN, RECOMMENDED_KEY_LEN};
pub use tag::{Tag, TAG_LEN};
