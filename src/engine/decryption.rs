//! Asynchronous decryption tracking.
//!
//! ## Why a Ledger
//!
//! Decryption spans invocations: one call requests it, a later call collects
//! it. The ledger gives each tracked computation (keyed by operation
//! fingerprint) a tiny state machine so the protocol can ask "is the answer
//! in yet?" without ever blocking, and fall back to the last known answer
//! while a request is still in flight.
//!
//! ## State Machine
//!
//! ```text
//!          request              backend ready
//!   Idle ----------> Pending ------------------> poll = Fresh(v)
//!                       |                              |
//!                       | backend not ready            | complete(v)
//!                       v                              v
//!                 poll = FromCache(last_known)       Idle, last_known = v
//!                       (or NotReady)
//! ```
//!
//! Polling an `Idle` key is always `NotReady`, even when a `last_known`
//! value survives from an earlier cycle; history is served only through the
//! `Pending` branch.
//!
//! A `Fresh` poll outcome is *observable*, not durable: the record stays
//! `Pending` until the caller invokes `complete`. A caller that consumes a
//! fresh value without completing will poll the same fresh value again next
//! time, and no new request can start. Records are never deleted, only
//! overwritten.

use std::collections::HashMap;

use crate::fhe::FheBackend;
use crate::types::{DecryptionId, EncU64, Fingerprint};

// ============================================================================
// Record types
// ============================================================================

/// Where one tracked computation stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecryptionStatus {
    /// Nothing outstanding
    Idle,
    /// A request is in flight at the coprocessor
    Pending {
        /// Backend job id
        id: DecryptionId,
        /// Unix seconds when the request was issued
        requested_at: u64,
    },
}

/// Per-fingerprint tracking record.
#[derive(Debug, Clone)]
pub struct DecryptionRecord {
    /// Current request status
    pub status: DecryptionStatus,

    /// Most recently completed plaintext, if any
    pub last_known: Option<u64>,

    /// Unix seconds of the most recent completion
    pub last_completed_at: Option<u64>,
}

impl DecryptionRecord {
    fn new() -> Self {
        Self {
            status: DecryptionStatus::Idle,
            last_known: None,
            last_completed_at: None,
        }
    }
}

/// Result of polling one tracked computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// No result available and nothing to fall back on
    NotReady,
    /// The outstanding request has finished; value is current
    Fresh(u64),
    /// Served from `last_known`; possibly stale, always better than nothing
    FromCache(u64),
}

impl PollOutcome {
    /// True when a value is available, fresh or cached
    #[inline]
    pub fn is_ready(&self) -> bool {
        !matches!(self, PollOutcome::NotReady)
    }

    /// True when the value came from `last_known` rather than a completion
    #[inline]
    pub fn is_from_cache(&self) -> bool {
        matches!(self, PollOutcome::FromCache(_))
    }

    /// The carried value, if any
    #[inline]
    pub fn value(&self) -> Option<u64> {
        match self {
            PollOutcome::NotReady => None,
            PollOutcome::Fresh(v) | PollOutcome::FromCache(v) => Some(*v),
        }
    }
}

// ============================================================================
// DecryptionLedger
// ============================================================================

/// Per-venue registry of asynchronous decryptions.
#[derive(Debug, Clone, Default)]
pub struct DecryptionLedger {
    records: HashMap<Fingerprint, DecryptionRecord>,
}

impl DecryptionLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
        }
    }

    /// Request decryption of `value` under `key`.
    ///
    /// Idempotent: if a request for this key is already pending, nothing is
    /// issued. One key never has two outstanding jobs.
    pub fn request<B: FheBackend>(
        &mut self,
        fhe: &mut B,
        key: Fingerprint,
        value: EncU64,
        now: u64,
    ) {
        let record = self
            .records
            .entry(key)
            .or_insert_with(DecryptionRecord::new);

        if let DecryptionStatus::Pending { .. } = record.status {
            return;
        }

        let id = fhe.request_decryption(value);
        record.status = DecryptionStatus::Pending {
            id,
            requested_at: now,
        };
    }

    /// Poll `key` without mutating anything.
    ///
    /// An `Idle` key is `NotReady` regardless of history; `last_known` is
    /// served only while a request is outstanding. A `Fresh` outcome must be
    /// followed by [`DecryptionLedger::complete`] by the caller; the ledger
    /// itself never transitions on a poll.
    pub fn poll<B: FheBackend>(&self, fhe: &B, key: &Fingerprint) -> PollOutcome {
        let Some(record) = self.records.get(key) else {
            return PollOutcome::NotReady;
        };

        match record.status {
            DecryptionStatus::Idle => PollOutcome::NotReady,
            DecryptionStatus::Pending { id, .. } => match fhe.fetch_decryption(id) {
                Some(v) => PollOutcome::Fresh(v),
                None => match record.last_known {
                    Some(v) => PollOutcome::FromCache(v),
                    None => PollOutcome::NotReady,
                },
            },
        }
    }

    /// Record a consumed fresh value and reset the key to `Idle`.
    ///
    /// The next `request` for this key starts a new cycle.
    pub fn complete(&mut self, key: Fingerprint, value: u64, now: u64) {
        let record = self
            .records
            .entry(key)
            .or_insert_with(DecryptionRecord::new);
        record.last_known = Some(value);
        record.last_completed_at = Some(now);
        record.status = DecryptionStatus::Idle;
    }

    /// Inspect a record
    pub fn record(&self, key: &Fingerprint) -> Option<&DecryptionRecord> {
        self.records.get(key)
    }

    /// True when `key` has an outstanding request
    pub fn is_pending(&self, key: &Fingerprint) -> bool {
        matches!(
            self.records.get(key).map(|r| r.status),
            Some(DecryptionStatus::Pending { .. })
        )
    }

    /// Number of tracked keys
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing has ever been tracked
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
