//! Observable events for tamperlog
//!
//! Events are explicit and typed. Each one maps to a fixed log line name
//! and a severity.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Boot & lifecycle
    /// Startup begins
    BootStart,
    /// Configuration loaded and validated
    ConfigLoaded,
    /// Startup aborted (FATAL)
    BootFailed,
    /// Secret key is shorter than recommended
    WeakSecretKey,
    /// Demo records seeded into an empty store
    DemoSeeded,
    /// HTTP listener bound
    ServerListening,

    // Store
    /// Record file opened and indexed
    StoreOpened,
    /// Torn final frame removed at open
    StoreTailTruncated,
    /// A record was appended
    RecordAppended,
    /// An append failed in the store
    AppendFailed,

    // Verification
    /// A record's stored tag differs from its recomputed tag
    RecordTagMismatch,
    /// Scan finished
    VerifyComplete,
    /// Scan finished and found corruption
    CorruptionDetected,

    // Transport
    /// A caller-supplied tag was discarded on the write path
    ClientTagIgnored,
    /// A request was rejected as malformed or oversized
    RequestRejected,
    /// A request failed inside the store
    RequestFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "BOOT_START",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::BootFailed => "BOOT_FAILED",
            Event::WeakSecretKey => "WEAK_SECRET_KEY",
            Event::DemoSeeded => "DEMO_SEEDED",
            Event::ServerListening => "SERVER_LISTENING",

            Event::StoreOpened => "STORE_OPENED",
            Event::StoreTailTruncated => "STORE_TAIL_TRUNCATED",
            Event::RecordAppended => "RECORD_APPENDED",
            Event::AppendFailed => "APPEND_FAILED",

            Event::RecordTagMismatch => "RECORD_TAG_MISMATCH",
            Event::VerifyComplete => "VERIFY_COMPLETE",
            Event::CorruptionDetected => "CORRUPTION_DETECTED",

            Event::ClientTagIgnored => "CLIENT_TAG_IGNORED",
            Event::RequestRejected => "REQUEST_REJECTED",
            Event::RequestFailed => "REQUEST_FAILED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::BootFailed => Severity::Fatal,
            Event::AppendFailed | Event::RequestFailed => Severity::Error,
            Event::WeakSecretKey
            | Event::StoreTailTruncated
            | Event::RecordTagMismatch
            | Event::CorruptionDetected
            | Event::ClientTagIgnored
            | Event::RequestRejected => Severity::Warn,
            _ => Severity::Info,
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_boot_failure_is_fatal() {
        assert!(Event::BootFailed.is_fatal());
        assert!(!Event::CorruptionDetected.is_fatal());
        assert!(!Event::RecordTagMismatch.is_fatal());
    }

    #[test]
    fn test_corruption_events_warn() {
        assert_eq!(Event::RecordTagMismatch.severity(), Severity::Warn);
        assert_eq!(Event::CorruptionDetected.severity(), Severity::Warn);
        assert_eq!(Event::VerifyComplete.severity(), Severity::Info);
    }

    #[test]
    fn test_names_are_screaming_snake() {
        for event in [Event::BootStart, Event::ClientTagIgnored, Event::StoreTailTruncated] {
            let name = event.as_str();
            assert!(name.chars().all(|c| c.is_ascii_uppercase() || c == '_'));
        }
    }
}
