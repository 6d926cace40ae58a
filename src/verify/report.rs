//! Verification outcomes

use std::fmt;

use crate::log::Record;

/// Message when the newest record verifies
pub const MSG_VERIFIED: &str = "Data verified!";

/// Message when newer records failed but an older one verifies
pub const MSG_RECOVERED: &str = "Corrupt data detected! Last verified data shown.";

/// Message when no record verifies, including the empty log
pub const MSG_NO_VERIFIED: &str = "Corrupt data detected! No verified data found.";

/// Classification of a verification scan.
///
/// None of these are errors: corruption is reported as data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The newest record's tag matches
    Verified,
    /// At least one newer record failed; an older record matches
    RecoveredAfterCorruption,
    /// No record matches, or the log is empty
    NoVerifiedRecord,
}

impl Verdict {
    /// The caller-facing message for this verdict
    pub fn message(&self) -> &'static str {
        match self {
            Verdict::Verified => MSG_VERIFIED,
            Verdict::RecoveredAfterCorruption => MSG_RECOVERED,
            Verdict::NoVerifiedRecord => MSG_NO_VERIFIED,
        }
    }

    /// Whether any corruption was observed
    pub fn is_corrupt(&self) -> bool {
        !matches!(self, Verdict::Verified)
    }

    /// Event-style name
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Verified => "VERIFIED",
            Verdict::RecoveredAfterCorruption => "RECOVERED_AFTER_CORRUPTION",
            Verdict::NoVerifiedRecord => "NO_VERIFIED_RECORD",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of `VerifyLatest`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    /// Classification
    pub verdict: Verdict,
    /// The latest verified record, if any
    pub record: Option<Record>,
    /// Records newer than the verified one (or all, if none verified) that failed
    pub corrupted: usize,
    /// Records examined before the scan stopped
    pub scanned: usize,
}

impl VerificationReport {
    /// The caller-facing message
    pub fn message(&self) -> &'static str {
        self.verdict.message()
    }

    /// Payload of the verified record
    pub fn data(&self) -> Option<&[u8]> {
        self.record.as_ref().map(|r| r.data.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_exact() {
        assert_eq!(Verdict::Verified.message(), "Data verified!");
        assert_eq!(
            Verdict::RecoveredAfterCorruption.message(),
            "Corrupt data detected! Last verified data shown."
        );
        assert_eq!(
            Verdict::NoVerifiedRecord.message(),
            "Corrupt data detected! No verified data found."
        );
    }

    #[test]
    fn test_is_corrupt() {
        assert!(!Verdict::Verified.is_corrupt());
        assert!(Verdict::RecoveredAfterCorruption.is_corrupt());
        assert!(Verdict::NoVerifiedRecord.is_corrupt());
    }
}
