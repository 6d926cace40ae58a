//! tamperlog - A tamper-evident, HMAC-verified append-only record log
//!
//! Every record is tagged with HMAC-SHA256 under a process-wide secret key
//! when it is appended. Verification scans newest-first and returns the
//! latest record whose tag still matches, reporting whether anything newer
//! was corrupt.

pub mod cli;
pub mod http_server;
pub mod log;
pub mod mac;
pub mod observability;
pub mod service;
pub mod verify;
