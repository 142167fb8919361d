//! # Sequence Allocator
//!
//! Produces unique, human-readable, monotonically increasing document
//! numbers per (owner, year, document type), safe under concurrent
//! callers that share one backing store.
//!
//! ## How Uniqueness Is Guaranteed
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    One Allocation Attempt                       │
//! │                                                                 │
//! │  1. increment(owner, year, kind)  ◄── THE atomic step.         │
//! │        │                              Upsert-and-return in one │
//! │        │                              statement; two callers   │
//! │        ▼                              never see the same value │
//! │  2. format "INV-2025-042"                                      │
//! │        │                                                        │
//! │        ▼                                                        │
//! │  3. number_exists(owner, number)? ◄── defense-in-depth only    │
//! │        │                              (legacy/manual rows)     │
//! │        ├── no  → return number                                 │
//! │        └── yes → burn the value, go to 1 (bounded retries)     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The increment is the only step that needs cross-process
//! synchronization. Every caller's post-increment value is unique to
//! that caller, so formatting and the existence check run lock-free.
//! Burned counter values are never reused; gaps in the sequence from
//! discarded candidates (or callers that give up mid-flight) are an
//! accepted cost of safety.

use chrono::{Datelike, Utc};
use tracing::{debug, warn};

use crate::error::AllocationError;
use crate::number::{DocumentKind, DocumentNumber};

/// Default bound on per-candidate retries.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

// =============================================================================
// Backend Trait
// =============================================================================

/// The two operations the allocator needs from its backing store.
///
/// Injected so the allocator stays free of any database engine's
/// idiosyncratic upsert syntax and testable against an in-memory fake.
/// The real implementation is `SequenceRepository` in quill-db.
#[allow(async_fn_in_trait)]
pub trait SequenceBackend {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Atomically increments the counter for (owner, year, kind) and
    /// returns the new value, creating the counter at 1 on first use.
    ///
    /// ## Contract
    /// This MUST be a single atomic operation against the store (an
    /// upsert returning the new value, or an equivalent row-locked
    /// transaction). Implementations must never read the last value,
    /// add one, and write it back as separate statements: two
    /// concurrent readers would observe the same value and hand out
    /// duplicate numbers.
    async fn increment(
        &self,
        owner_id: &str,
        year: i32,
        kind: DocumentKind,
    ) -> Result<i64, Self::Error>;

    /// Whether a document with this exact number already exists for
    /// the owner. Guards against rows created outside the allocator's
    /// control (imports, legacy data, desynchronized counters).
    async fn number_exists(&self, owner_id: &str, number: &str) -> Result<bool, Self::Error>;
}

// =============================================================================
// Sequence Allocator
// =============================================================================

/// Allocates document numbers over an injected [`SequenceBackend`].
///
/// Holds no in-process locks and no shared state; one allocator per
/// process (or per request) is fine, correctness comes entirely from
/// the backend's atomic increment.
#[derive(Debug, Clone)]
pub struct SequenceAllocator<B> {
    backend: B,
    max_attempts: u32,
}

impl<B: SequenceBackend> SequenceAllocator<B> {
    /// Creates an allocator with the default attempt budget.
    pub fn new(backend: B) -> Self {
        SequenceAllocator {
            backend,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Sets the retry budget (clamped to at least 1 attempt).
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// The configured retry budget.
    #[inline]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Allocates a number for the current UTC calendar year.
    ///
    /// Year boundary policy: UTC, always. Callers that need a different
    /// boundary (e.g. the owner's local fiscal midnight) must resolve
    /// the year themselves and use [`allocate_for_year`].
    ///
    /// [`allocate_for_year`]: Self::allocate_for_year
    pub async fn allocate(
        &self,
        owner_id: &str,
        kind: DocumentKind,
    ) -> Result<DocumentNumber, AllocationError<B::Error>> {
        self.allocate_for_year(owner_id, kind, Utc::now().year()).await
    }

    /// Like [`allocate`](Self::allocate), but parses the document type
    /// from its prefix string as it arrives from the HTTP layer.
    ///
    /// An unsupported prefix fails before any counter state is touched.
    pub async fn allocate_for_prefix(
        &self,
        owner_id: &str,
        prefix: &str,
    ) -> Result<DocumentNumber, AllocationError<B::Error>> {
        let kind = DocumentKind::from_prefix(prefix)
            .map_err(|_| AllocationError::UnsupportedKind(prefix.to_string()))?;
        self.allocate(owner_id, kind).await
    }

    /// Allocates a number for an explicit year.
    ///
    /// ## Errors
    /// - [`AllocationError::Exhausted`] after `max_attempts` candidates
    ///   all collided; the counter has been advanced once per attempt.
    /// - [`AllocationError::Backend`] for store failures, propagated
    ///   unchanged and never retried here.
    pub async fn allocate_for_year(
        &self,
        owner_id: &str,
        kind: DocumentKind,
        year: i32,
    ) -> Result<DocumentNumber, AllocationError<B::Error>> {
        for attempt in 1..=self.max_attempts {
            let seq = self.backend.increment(owner_id, year, kind).await?;
            let candidate = DocumentNumber::new(kind, year, seq);

            // Each caller's post-increment value is unique, so this check
            // needs no locking; it only defends against out-of-band rows.
            if !self.backend.number_exists(owner_id, candidate.as_str()).await? {
                debug!(owner_id, number = %candidate, attempt, "allocated document number");
                return Ok(candidate);
            }

            // The candidate is never reused once found to conflict.
            warn!(
                owner_id,
                number = %candidate,
                attempt,
                "candidate document number already taken, burning counter value"
            );
        }

        Err(AllocationError::Exhausted {
            attempts: self.max_attempts,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    /// In-memory fake of the backing store: a counter map plus a set of
    /// taken numbers, mirroring the two operations the real SQLite
    /// store provides.
    #[derive(Clone, Default)]
    struct MemoryBackend {
        inner: Arc<MemoryInner>,
    }

    #[derive(Default)]
    struct MemoryInner {
        counters: Mutex<HashMap<(String, i32, DocumentKind), i64>>,
        taken: Mutex<HashSet<(String, String)>>,
        increments: AtomicU32,
    }

    impl MemoryBackend {
        fn seed_taken(&self, owner_id: &str, number: &str) {
            self.inner
                .taken
                .lock()
                .unwrap()
                .insert((owner_id.to_string(), number.to_string()));
        }

        fn seed_counter(&self, owner_id: &str, year: i32, kind: DocumentKind, last: i64) {
            self.inner
                .counters
                .lock()
                .unwrap()
                .insert((owner_id.to_string(), year, kind), last);
        }

        fn counter(&self, owner_id: &str, year: i32, kind: DocumentKind) -> Option<i64> {
            self.inner
                .counters
                .lock()
                .unwrap()
                .get(&(owner_id.to_string(), year, kind))
                .copied()
        }

        fn increment_calls(&self) -> u32 {
            self.inner.increments.load(Ordering::SeqCst)
        }
    }

    impl SequenceBackend for MemoryBackend {
        type Error = Infallible;

        async fn increment(
            &self,
            owner_id: &str,
            year: i32,
            kind: DocumentKind,
        ) -> Result<i64, Infallible> {
            self.inner.increments.fetch_add(1, Ordering::SeqCst);
            let mut counters = self.inner.counters.lock().unwrap();
            let last = counters
                .entry((owner_id.to_string(), year, kind))
                .or_insert(0);
            *last += 1;
            Ok(*last)
        }

        async fn number_exists(&self, owner_id: &str, number: &str) -> Result<bool, Infallible> {
            let taken = self.inner.taken.lock().unwrap();
            Ok(taken.contains(&(owner_id.to_string(), number.to_string())))
        }
    }

    fn allocator() -> (SequenceAllocator<MemoryBackend>, MemoryBackend) {
        let backend = MemoryBackend::default();
        (SequenceAllocator::new(backend.clone()), backend)
    }

    #[tokio::test]
    async fn test_sequential_allocations_for_owner() {
        // Seed no prior documents; three INV calls then one QTN call
        let (allocator, _) = allocator();

        for expected in ["INV-2025-001", "INV-2025-002", "INV-2025-003"] {
            let number = allocator
                .allocate_for_year("7", DocumentKind::Invoice, 2025)
                .await
                .unwrap();
            assert_eq!(number.as_str(), expected);
        }

        let number = allocator
            .allocate_for_year("7", DocumentKind::Quotation, 2025)
            .await
            .unwrap();
        assert_eq!(number.as_str(), "QTN-2025-001");
    }

    #[tokio::test]
    async fn test_allocate_uses_current_utc_year() {
        let (allocator, _) = allocator();
        let number = allocator.allocate("7", DocumentKind::Invoice).await.unwrap();
        assert_eq!(number.year(), Utc::now().year());
        assert_eq!(number.seq(), 1);
    }

    #[tokio::test]
    async fn test_monotonically_increasing_sequence() {
        let (allocator, _) = allocator();
        let mut previous = 0;
        for _ in 0..25 {
            let number = allocator
                .allocate_for_year("1", DocumentKind::Invoice, 2025)
                .await
                .unwrap();
            assert!(number.seq() > previous);
            previous = number.seq();
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_allocations_are_unique() {
        let (allocator, _) = allocator();

        let mut handles = Vec::new();
        for _ in 0..32 {
            let allocator = allocator.clone();
            handles.push(tokio::spawn(async move {
                allocator
                    .allocate_for_year("1", DocumentKind::Invoice, 2025)
                    .await
                    .unwrap()
                    .into_string()
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            let number = handle.await.unwrap();
            assert!(seen.insert(number.clone()), "duplicate number {number}");
        }
        assert_eq!(seen.len(), 32);
    }

    #[tokio::test]
    async fn test_owners_have_independent_sequences() {
        let (allocator, _) = allocator();

        let a = allocator
            .allocate_for_year("1", DocumentKind::Invoice, 2025)
            .await
            .unwrap();
        let b = allocator
            .allocate_for_year("2", DocumentKind::Invoice, 2025)
            .await
            .unwrap();

        // Both owners start at 1 independently
        assert_eq!(a.seq(), 1);
        assert_eq!(b.seq(), 1);
    }

    #[tokio::test]
    async fn test_sequence_resets_each_year() {
        let (allocator, _) = allocator();

        for _ in 0..5 {
            allocator
                .allocate_for_year("1", DocumentKind::Invoice, 2024)
                .await
                .unwrap();
        }

        let number = allocator
            .allocate_for_year("1", DocumentKind::Invoice, 2025)
            .await
            .unwrap();
        assert_eq!(number.as_str(), "INV-2025-001");
    }

    #[tokio::test]
    async fn test_kinds_have_independent_sequences() {
        let (allocator, _) = allocator();

        let inv = allocator
            .allocate_for_year("1", DocumentKind::Invoice, 2025)
            .await
            .unwrap();
        let qtn = allocator
            .allocate_for_year("1", DocumentKind::Quotation, 2025)
            .await
            .unwrap();

        assert_eq!(inv.as_str(), "INV-2025-001");
        assert_eq!(qtn.as_str(), "QTN-2025-001");
    }

    #[tokio::test]
    async fn test_invalid_prefix_rejected_without_touching_store() {
        let (allocator, backend) = allocator();

        let err = allocator.allocate_for_prefix("7", "RCT").await.unwrap_err();
        assert!(matches!(err, AllocationError::UnsupportedKind(p) if p == "RCT"));
        assert_eq!(backend.increment_calls(), 0);
    }

    #[tokio::test]
    async fn test_collided_candidate_is_burned_not_reused() {
        let (allocator, backend) = allocator();
        backend.seed_taken("1", "INV-2025-001");

        let number = allocator
            .allocate_for_year("1", DocumentKind::Invoice, 2025)
            .await
            .unwrap();

        // 001 was burned, the caller gets 002
        assert_eq!(number.as_str(), "INV-2025-002");
        assert_eq!(backend.counter("1", 2025, DocumentKind::Invoice), Some(2));
    }

    #[tokio::test]
    async fn test_exhaustion_advances_counter_once_per_attempt() {
        let (allocator, backend) = allocator();
        let allocator = allocator.with_max_attempts(5);

        for seq in 1..=5 {
            backend.seed_taken("1", DocumentNumber::new(DocumentKind::Invoice, 2025, seq).as_str());
        }

        let err = allocator
            .allocate_for_year("1", DocumentKind::Invoice, 2025)
            .await
            .unwrap_err();

        assert!(matches!(err, AllocationError::Exhausted { attempts: 5 }));
        assert_eq!(backend.counter("1", 2025, DocumentKind::Invoice), Some(5));
    }

    #[tokio::test]
    async fn test_padding_grows_past_999() {
        let (allocator, backend) = allocator();
        backend.seed_counter("1", 2025, DocumentKind::Invoice, 999);

        let number = allocator
            .allocate_for_year("1", DocumentKind::Invoice, 2025)
            .await
            .unwrap();
        assert_eq!(number.as_str(), "INV-2025-1000");
    }

    #[test]
    fn test_max_attempts_clamped_to_one() {
        let backend = MemoryBackend::default();
        let allocator = SequenceAllocator::new(backend).with_max_attempts(0);
        assert_eq!(allocator.max_attempts(), 1);
    }

    /// A backing store that fails either on the increment itself or on
    /// the existence check right after it.
    #[derive(Clone)]
    struct BrokenBackend {
        fail_on_exists: bool,
        increments: Arc<AtomicU32>,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("store offline")]
    struct StoreOffline;

    impl BrokenBackend {
        fn new(fail_on_exists: bool) -> Self {
            BrokenBackend {
                fail_on_exists,
                increments: Arc::new(AtomicU32::new(0)),
            }
        }

        fn increment_calls(&self) -> u32 {
            self.increments.load(Ordering::SeqCst)
        }
    }

    impl SequenceBackend for BrokenBackend {
        type Error = StoreOffline;

        async fn increment(
            &self,
            _owner_id: &str,
            _year: i32,
            _kind: DocumentKind,
        ) -> Result<i64, StoreOffline> {
            let seq = self.increments.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_on_exists {
                Ok(seq as i64)
            } else {
                Err(StoreOffline)
            }
        }

        async fn number_exists(&self, _owner_id: &str, _number: &str) -> Result<bool, StoreOffline> {
            Err(StoreOffline)
        }
    }

    #[tokio::test]
    async fn test_increment_failure_surfaces_unretried() {
        let backend = BrokenBackend::new(false);
        let allocator = SequenceAllocator::new(backend.clone());

        let err = allocator
            .allocate_for_year("1", DocumentKind::Invoice, 2025)
            .await
            .unwrap_err();

        // Propagated as-is, after exactly one store call
        assert!(matches!(err, AllocationError::Backend(StoreOffline)));
        assert_eq!(backend.increment_calls(), 1);
    }

    #[tokio::test]
    async fn test_existence_check_failure_surfaces_unretried() {
        let backend = BrokenBackend::new(true);
        let allocator = SequenceAllocator::new(backend.clone());

        let err = allocator
            .allocate_for_year("1", DocumentKind::Invoice, 2025)
            .await
            .unwrap_err();

        // The increment succeeded once; the failing check did not burn
        // further attempts
        assert!(matches!(err, AllocationError::Backend(StoreOffline)));
        assert_eq!(backend.increment_calls(), 1);
    }
}
