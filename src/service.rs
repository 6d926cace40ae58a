//! Service context for the integrity-verified log
//!
//! One `LogService` is built at startup and shared (behind an `Arc`) by every
//! transport. It owns the MAC engine, the store, the clock, and the metrics.
//! Independent instances share nothing, which is what tests rely on.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use crate::log::{Record, RecordStore, StoreError};
use crate::mac::MacEngine;
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};
use crate::verify::{Scanner, VerificationReport};

/// Demo payload that verifies
pub const DEMO_GOOD_DATA: &str = "Hello World!";

/// Demo payload carrying a copied tag
pub const DEMO_TAMPERED_DATA: &str = "This is bad data!";

/// Errors surfaced by service operations
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was rejected before anything was appended
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// The store failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Source of append timestamps (ms since the Unix epoch)
pub trait Clock: Send + Sync {
    /// Current time in milliseconds
    fn now_millis(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Manually driven clock for tests and deterministic tooling
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// Start at `now`
    pub fn new(now: i64) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    /// Set the current time
    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Move the clock forward by `millis`
    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// The core: `append`, `verify_latest`, `latest_raw`.
pub struct LogService {
    engine: MacEngine,
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    metrics: MetricsRegistry,
}

impl LogService {
    /// Build a service on the wall clock
    pub fn new(engine: MacEngine, store: Arc<dyn RecordStore>) -> Self {
        Self::with_clock(engine, store, Arc::new(SystemClock))
    }

    /// Build a service with an explicit clock
    pub fn with_clock(
        engine: MacEngine,
        store: Arc<dyn RecordStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            engine,
            store,
            clock,
            metrics: MetricsRegistry::new(),
        }
    }

    /// Tag `data` with the process key and append it.
    ///
    /// The tag is always computed here; there is no way to hand one in.
    pub fn append(&self, data: Vec<u8>) -> ServiceResult<Record> {
        let tag = self.engine.tag(&data);
        let timestamp = self.clock.now_millis();

        match self.store.append(data, tag, timestamp) {
            Ok(record) => {
                self.metrics.increment_appends();
                log_event_with_fields(
                    Event::RecordAppended,
                    &[
                        ("bytes", record.data.len().to_string().as_str()),
                        ("sequence", record.sequence.to_string().as_str()),
                        ("timestamp", record.timestamp.to_string().as_str()),
                    ],
                );
                Ok(record)
            }
            Err(e) => {
                self.metrics.increment_append_failures();
                log_event_with_fields(
                    Event::AppendFailed,
                    &[("code", e.code().code()), ("message", e.message())],
                );
                Err(e.into())
            }
        }
    }

    /// Find the latest verified record.
    ///
    /// Corruption is reported through the verdict, never as an error.
    pub fn verify_latest(&self) -> ServiceResult<VerificationReport> {
        let report = Scanner::new(self.store.as_ref(), &self.engine).verify_latest()?;
        self.metrics
            .record_verification(report.verdict, report.corrupted);

        let corrupted = report.corrupted.to_string();
        let scanned = report.scanned.to_string();
        let fields = [
            ("corrupted", corrupted.as_str()),
            ("scanned", scanned.as_str()),
            ("verdict", report.verdict.as_str()),
        ];
        if report.verdict.is_corrupt() {
            log_event_with_fields(Event::CorruptionDetected, &fields);
        } else {
            log_event_with_fields(Event::VerifyComplete, &fields);
        }

        Ok(report)
    }

    /// The newest record, unverified
    pub fn latest_raw(&self) -> ServiceResult<Option<Record>> {
        Ok(self.store.latest()?)
    }

    /// Number of records in the store
    pub fn record_count(&self) -> ServiceResult<usize> {
        Ok(self.store.len()?)
    }

    /// Seed the two demo records into an empty store.
    ///
    /// The second record reuses the first record's tag, so it fails
    /// verification. Returns whether anything was seeded.
    pub fn seed_demo(&self) -> ServiceResult<bool> {
        if !self.store.is_empty()? {
            return Ok(false);
        }
        let tag = self.engine.tag(DEMO_GOOD_DATA.as_bytes());
        self.store.append(DEMO_GOOD_DATA.as_bytes().to_vec(), tag, 0)?;
        self.store
            .append(DEMO_TAMPERED_DATA.as_bytes().to_vec(), tag, 1)?;
        log_event_with_fields(Event::DemoSeeded, &[("records", "2")]);
        Ok(true)
    }

    /// Whether the engine's key is below the recommended length
    pub fn has_weak_key(&self) -> bool {
        self.engine.has_weak_key()
    }

    /// Counters
    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::MemoryStore;
    use crate::mac::{SecretKey, Tag, TAG_LEN};
    use crate::verify::Verdict;

    fn engine() -> MacEngine {
        MacEngine::new(SecretKey::new(b"supersecretkey".to_vec()).unwrap()).unwrap()
    }

    fn service_with(store: Arc<MemoryStore>, clock: Arc<ManualClock>) -> LogService {
        LogService::with_clock(engine(), store, clock)
    }

    #[test]
    fn test_append_tags_server_side() {
        let store = Arc::new(MemoryStore::new());
        let service = service_with(store.clone(), Arc::new(ManualClock::new(42)));

        let record = service.append(b"Hello World!".to_vec()).unwrap();
        assert_eq!(record.tag, engine().tag(b"Hello World!"));
        assert_eq!(record.timestamp, 42);
        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(service.metrics().snapshot().appends, 1);
    }

    #[test]
    fn test_append_then_verify() {
        let service = LogService::new(engine(), Arc::new(MemoryStore::new()));
        service.append(b"Hello World!".to_vec()).unwrap();

        let report = service.verify_latest().unwrap();
        assert_eq!(report.message(), "Data verified!");
        assert_eq!(report.data(), Some(&b"Hello World!"[..]));
    }

    #[test]
    fn test_corrupted_latest_recovers_predecessor() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(1));
        let service = service_with(store.clone(), clock.clone());

        service.append(b"trusted".to_vec()).unwrap();
        store
            .append(b"forged".to_vec(), Tag::from_bytes([1u8; TAG_LEN]), 2)
            .unwrap();

        let report = service.verify_latest().unwrap();
        assert_eq!(report.verdict, Verdict::RecoveredAfterCorruption);
        assert_eq!(report.message(), "Corrupt data detected! Last verified data shown.");
        assert_eq!(report.data(), Some(&b"trusted"[..]));
        assert_eq!(service.metrics().snapshot().tag_mismatches, 1);
    }

    #[test]
    fn test_latest_raw_does_not_verify() {
        let store = Arc::new(MemoryStore::new());
        let service = service_with(store.clone(), Arc::new(ManualClock::new(1)));
        store
            .append(b"forged".to_vec(), Tag::from_bytes([1u8; TAG_LEN]), 5)
            .unwrap();

        let raw = service.latest_raw().unwrap().unwrap();
        assert_eq!(raw.data, b"forged");
    }

    #[test]
    fn test_seed_demo() {
        let service = LogService::new(engine(), Arc::new(MemoryStore::new()));
        assert!(service.seed_demo().unwrap());
        assert!(!service.seed_demo().unwrap());
        assert_eq!(service.record_count().unwrap(), 2);

        let report = service.verify_latest().unwrap();
        assert_eq!(report.verdict, Verdict::RecoveredAfterCorruption);
        assert_eq!(report.data(), Some(DEMO_GOOD_DATA.as_bytes()));
    }

    #[test]
    fn test_instances_are_independent() {
        let a = LogService::new(engine(), Arc::new(MemoryStore::new()));
        let b = LogService::new(engine(), Arc::new(MemoryStore::new()));
        a.append(b"only in a".to_vec()).unwrap();
        assert_eq!(a.record_count().unwrap(), 1);
        assert_eq!(b.record_count().unwrap(), 0);
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(10);
        clock.advance(5);
        assert_eq!(clock.now_millis(), 15);
        clock.set(3);
        assert_eq!(clock.now_millis(), 3);
    }
}
