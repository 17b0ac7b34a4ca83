//! Per-venue aggregate state.
//!
//! A venue owns everything scoped to it: its curve configuration, its public
//! accounting state, its evaluation cache, its decryption ledger, and its
//! pending-trade records. Venues live in the engine's arena and never
//! interfere with one another; the whole aggregate is `Clone` so an
//! invocation can snapshot it and restore on abort.

use std::collections::HashMap;

use crate::engine::cache::EvaluationCache;
use crate::engine::decryption::DecryptionLedger;
use crate::types::{CurveConfiguration, CurveKind, EncU64, Fingerprint, RiskBounds, VenueState};

/// Parameters for venue initialization.
#[derive(Debug, Clone)]
pub struct VenueParams {
    /// Governing strategist account id
    pub strategist: u64,

    /// Curve family
    pub kind: CurveKind,

    /// Encrypted coefficients
    pub coefficients: Vec<EncU64>,

    /// Plaintext risk envelope
    pub bounds: RiskBounds,

    /// Seed base-asset reserve
    pub reserve_base: u64,

    /// Seed quote-asset reserve
    pub reserve_quote: u64,

    /// Unix seconds, recorded as the curve's first update
    pub timestamp: u64,
}

/// A fallback-priced trade awaiting its settlement phase.
///
/// Written by pre-trade when the confidential price was not ready; consumed
/// by post-trade unconditionally. Lifetime is bounded to one trade.
#[derive(Debug, Clone, Copy)]
pub struct PendingTradeComputation {
    /// The public approximation that was applied
    pub fallback_price: u64,

    /// Unix seconds when pre-trade computed it
    pub computed_at: u64,

    /// Always true while the record exists
    pub pending: bool,
}

/// One venue in the engine arena.
#[derive(Debug, Clone)]
pub struct Venue {
    /// Curve configuration, strategist-governed
    pub config: CurveConfiguration,

    /// Public accounting state
    pub state: VenueState,

    /// Evaluated-price cache
    pub cache: EvaluationCache,

    /// Asynchronous decryption tracking
    pub decryptions: DecryptionLedger,

    /// Fallback-priced trades awaiting settlement, by trade fingerprint
    pub pending: HashMap<Fingerprint, PendingTradeComputation>,

    /// Reentrancy latch; set for the duration of one invocation
    pub busy: bool,
}

impl Venue {
    /// Assemble a venue from a validated configuration
    pub fn new(config: CurveConfiguration, state: VenueState, cache_ttl_secs: u64) -> Self {
        Self {
            config,
            state,
            cache: EvaluationCache::new(cache_ttl_secs),
            decryptions: DecryptionLedger::new(),
            pending: HashMap::new(),
            busy: false,
        }
    }
}
