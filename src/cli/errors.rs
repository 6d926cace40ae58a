//! CLI-specific error types
//!
//! All CLI errors end the process with a non-zero exit code.

use std::fmt;
use std::io;

use crate::log::StoreError;
use crate::mac::MacError;
use crate::service::ServiceError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file or key error
    ConfigError,
    /// I/O error (stdout)
    IoError,
    /// Command needs a durable store but no data_dir is configured
    NoDataDir,
    /// Store could not be opened or failed
    StoreError,
    /// Boot failed
    BootFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "TLOG_CLI_CONFIG_ERROR",
            Self::IoError => "TLOG_CLI_IO_ERROR",
            Self::NoDataDir => "TLOG_CLI_NO_DATA_DIR",
            Self::StoreError => "TLOG_CLI_STORE_ERROR",
            Self::BootFailed => "TLOG_CLI_BOOT_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// No data directory configured
    pub fn no_data_dir() -> Self {
        Self::new(
            CliErrorCode::NoDataDir,
            "This command needs a durable log. Set data_dir in the config file.",
        )
    }

    /// Boot failed
    pub fn boot_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::BootFailed, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<MacError> for CliError {
    fn from(e: MacError) -> Self {
        Self::config_error(format!("{}: {}", e.code(), e))
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        Self::new(CliErrorCode::StoreError, e.to_string())
    }
}

impl From<ServiceError> for CliError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Store(e) => e.into(),
            other => Self::io_error(other.to_string()),
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_has_code() {
        let err = CliError::no_data_dir();
        assert!(err.to_string().starts_with("TLOG_CLI_NO_DATA_DIR"));
    }

    #[test]
    fn test_mac_error_is_config_error() {
        let err: CliError = MacError::EmptyKey.into();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
        assert!(err.message().contains("TLOG_CONFIG_KEY_EMPTY"));
    }
}
