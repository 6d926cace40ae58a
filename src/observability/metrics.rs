//! Operational counters
//!
//! Counters only, monotonic, reset on process start. Relaxed atomics: the
//! values are exact per counter, not a consistent cross-counter snapshot.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::verify::Verdict;

/// Counters for appends and verification scans
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    appends: AtomicU64,
    append_failures: AtomicU64,
    verifications: AtomicU64,
    verified: AtomicU64,
    recovered_after_corruption: AtomicU64,
    no_verified_record: AtomicU64,
    tag_mismatches: AtomicU64,
    malformed_requests: AtomicU64,
}

/// Point-in-time copy of every counter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub appends: u64,
    pub append_failures: u64,
    pub verifications: u64,
    pub verified: u64,
    pub recovered_after_corruption: u64,
    pub no_verified_record: u64,
    pub tag_mismatches: u64,
    pub malformed_requests: u64,
}

impl MetricsRegistry {
    /// Create a registry with every counter at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a successful append
    pub fn increment_appends(&self) {
        self.appends.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a failed append
    pub fn increment_append_failures(&self) {
        self.append_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a request rejected as malformed
    pub fn increment_malformed_requests(&self) {
        self.malformed_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of one verification scan
    pub fn record_verification(&self, verdict: Verdict, mismatches: usize) {
        self.verifications.fetch_add(1, Ordering::Relaxed);
        self.tag_mismatches
            .fetch_add(mismatches as u64, Ordering::Relaxed);
        let counter = match verdict {
            Verdict::Verified => &self.verified,
            Verdict::RecoveredAfterCorruption => &self.recovered_after_corruption,
            Verdict::NoVerifiedRecord => &self.no_verified_record,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            appends: self.appends.load(Ordering::Relaxed),
            append_failures: self.append_failures.load(Ordering::Relaxed),
            verifications: self.verifications.load(Ordering::Relaxed),
            verified: self.verified.load(Ordering::Relaxed),
            recovered_after_corruption: self.recovered_after_corruption.load(Ordering::Relaxed),
            no_verified_record: self.no_verified_record.load(Ordering::Relaxed),
            tag_mismatches: self.tag_mismatches.load(Ordering::Relaxed),
            malformed_requests: self.malformed_requests.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_starts_at_zero() {
        let snapshot = MetricsRegistry::new().snapshot();
        assert_eq!(snapshot.appends, 0);
        assert_eq!(snapshot.verifications, 0);
    }

    #[test]
    fn test_record_verification() {
        let metrics = MetricsRegistry::new();
        metrics.record_verification(Verdict::Verified, 0);
        metrics.record_verification(Verdict::RecoveredAfterCorruption, 2);
        metrics.record_verification(Verdict::NoVerifiedRecord, 3);

        let s = metrics.snapshot();
        assert_eq!(s.verifications, 3);
        assert_eq!(s.verified, 1);
        assert_eq!(s.recovered_after_corruption, 1);
        assert_eq!(s.no_verified_record, 1);
        assert_eq!(s.tag_mismatches, 5);
    }

    #[test]
    fn test_concurrent_increments() {
        let metrics = Arc::new(MetricsRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let m = Arc::clone(&metrics);
                thread::spawn(move || {
                    for _ in 0..100 {
                        m.increment_appends();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(metrics.snapshot().appends, 800);
    }

    #[test]
    fn test_snapshot_serializes() {
        let json = serde_json::to_value(MetricsRegistry::new().snapshot()).unwrap();
        assert_eq!(json["tag_mismatches"], 0);
    }
}
