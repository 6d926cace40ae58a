//! Newest-to-oldest verification scan
//!
//! Walks a snapshot of the log newest first and stops at the first record
//! whose recomputed tag matches. Newer mismatches are counted as corruption
//! but do not block recovery of the latest good state. O(n) in the worst
//! case.

use super::report::{VerificationReport, Verdict};
use crate::log::{RecordStore, StoreResult};
use crate::mac::MacEngine;
use crate::observability::{log_event_with_fields, Event};

/// Stateless scanner over a store and an engine
pub struct Scanner<'a> {
    store: &'a dyn RecordStore,
    engine: &'a MacEngine,
}

impl<'a> Scanner<'a> {
    /// Create a scanner
    pub fn new(store: &'a dyn RecordStore, engine: &'a MacEngine) -> Self {
        Self { store, engine }
    }

    /// Find the latest verified record.
    ///
    /// Only store failures are errors; corruption is part of the report.
    pub fn verify_latest(&self) -> StoreResult<VerificationReport> {
        let snapshot = self.store.all_by_timestamp_descending()?;

        let mut corrupted = 0usize;
        for record in snapshot {
            if self.engine.verify(&record.data, &record.tag) {
                let verdict = if corrupted == 0 {
                    Verdict::Verified
                } else {
                    Verdict::RecoveredAfterCorruption
                };
                return Ok(VerificationReport {
                    verdict,
                    record: Some(record),
                    corrupted,
                    scanned: corrupted + 1,
                });
            }

            corrupted += 1;
            log_event_with_fields(
                Event::RecordTagMismatch,
                &[
                    ("sequence", record.sequence.to_string().as_str()),
                    ("timestamp", record.timestamp.to_string().as_str()),
                ],
            );
        }

        Ok(VerificationReport {
            verdict: Verdict::NoVerifiedRecord,
            record: None,
            corrupted,
            scanned: corrupted,
        })
    }
}
