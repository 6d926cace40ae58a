//! MAC engine errors
//!
//! Every error here is a configuration error: the process must not start
//! serving when one is raised.

use thiserror::Error;

/// Result type for MAC operations
pub type MacResult<T> = Result<T, MacError>;

/// Errors raised while loading the secret key
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MacError {
    /// The configured key source holds no key
    #[error("Secret key missing: environment variable {0} is not set")]
    KeyMissing(String),

    /// The key is present but empty
    #[error("Secret key must not be empty")]
    EmptyKey,

    /// The key file could not be read
    #[error("Secret key file unreadable: {0}")]
    KeyFileUnreadable(String),

    /// The HMAC primitive rejected the key
    #[error("MAC primitive unavailable: {0}")]
    PrimitiveUnavailable(String),
}

impl MacError {
    /// Returns the error code string
    pub fn code(&self) -> &'static str {
        match self {
            MacError::KeyMissing(_) => "TLOG_CONFIG_KEY_MISSING",
            MacError::EmptyKey => "TLOG_CONFIG_KEY_EMPTY",
            MacError::KeyFileUnreadable(_) => "TLOG_CONFIG_KEY_FILE",
            MacError::PrimitiveUnavailable(_) => "TLOG_CONFIG_MAC_UNAVAILABLE",
        }
    }
}
