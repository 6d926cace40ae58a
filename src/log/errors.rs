//! Record store error types
//!
//! Error codes:
//! - TLOG_STORE_IO_ERROR (ERROR severity)
//! - TLOG_STORE_WRITE_FAILED (ERROR severity)
//! - TLOG_STORE_READ_FAILED (ERROR severity)
//! - TLOG_STORE_POISONED (ERROR severity)
//! - TLOG_STORE_LOCKED (ERROR severity)
//! - TLOG_STORE_CORRUPTION (FATAL severity)
//!
//! Tag mismatches are not store errors. A frame that cannot be decoded is.

use std::fmt;
use std::io;

/// Severity levels for store errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, server continues
    Error,
    /// tamperlog must not start (or must stop)
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Store-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorCode {
    /// Disk I/O failure outside a read or write of a frame
    TlogStoreIoError,
    /// Frame write or fsync failed
    TlogStoreWriteFailed,
    /// Frame read failed
    TlogStoreReadFailed,
    /// A lock guarding the store was poisoned by a panicking thread
    TlogStorePoisoned,
    /// The record file is held by another open store
    TlogStoreLocked,
    /// Frame structure or framing checksum is invalid
    TlogStoreCorruption,
}

impl StoreErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            StoreErrorCode::TlogStoreIoError => "TLOG_STORE_IO_ERROR",
            StoreErrorCode::TlogStoreWriteFailed => "TLOG_STORE_WRITE_FAILED",
            StoreErrorCode::TlogStoreReadFailed => "TLOG_STORE_READ_FAILED",
            StoreErrorCode::TlogStorePoisoned => "TLOG_STORE_POISONED",
            StoreErrorCode::TlogStoreLocked => "TLOG_STORE_LOCKED",
            StoreErrorCode::TlogStoreCorruption => "TLOG_STORE_CORRUPTION",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            StoreErrorCode::TlogStoreCorruption => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for StoreErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Store error with code, message, and optional context
#[derive(Debug)]
pub struct StoreError {
    code: StoreErrorCode,
    message: String,
    details: Option<String>,
    source: Option<io::Error>,
}

impl StoreError {
    fn with_code(code: StoreErrorCode, message: String, source: Option<io::Error>) -> Self {
        Self {
            code,
            message,
            details: None,
            source,
        }
    }

    /// Create a store I/O error
    pub fn io_error(message: impl Into<String>, source: io::Error) -> Self {
        Self::with_code(StoreErrorCode::TlogStoreIoError, message.into(), Some(source))
    }

    /// Create a write failed error
    pub fn write_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self::with_code(
            StoreErrorCode::TlogStoreWriteFailed,
            message.into(),
            Some(source),
        )
    }

    /// Create a read failed error
    pub fn read_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self::with_code(
            StoreErrorCode::TlogStoreReadFailed,
            message.into(),
            Some(source),
        )
    }

    /// Create a poisoned-lock error
    pub fn poisoned(what: &str) -> Self {
        Self::with_code(
            StoreErrorCode::TlogStorePoisoned,
            format!("{} lock poisoned", what),
            None,
        )
    }

    /// Create an error for appends refused after an unrecovered write failure
    pub fn append_refused(message: impl Into<String>) -> Self {
        Self::with_code(StoreErrorCode::TlogStoreWriteFailed, message.into(), None)
    }

    /// Create an error for a record file already held by another store
    pub fn locked(path: &std::path::Path, source: io::Error) -> Self {
        Self::with_code(
            StoreErrorCode::TlogStoreLocked,
            format!(
                "Record file {} is already in use by another process",
                path.display()
            ),
            Some(source),
        )
    }

    /// Create a corruption error with byte offset context (FATAL)
    pub fn corruption_at_offset(offset: u64, reason: impl Into<String>) -> Self {
        Self {
            code: StoreErrorCode::TlogStoreCorruption,
            message: reason.into(),
            details: Some(format!("byte_offset: {}", offset)),
            source: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> StoreErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns additional error details
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Returns whether this error is fatal
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
