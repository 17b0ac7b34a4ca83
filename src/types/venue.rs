//! Venue identity, trade requests, and public venue state.
//!
//! ## Public vs Confidential
//!
//! Everything in this module is plaintext. Reserves, volume, and trade counts
//! are deliberately public (they feed the fallback price and the health
//! score); only the curve that prices against them is confidential.
//!
//! ## State Digests
//!
//! `VenueState` is SSZ-serializable and can be collapsed to a 32-byte SHA-256
//! digest. Two engine runs that processed the same trades produce identical
//! digests, which is how the determinism tests compare runs without dumping
//! full state.

use sha2::{Digest, Sha256};
use ssz_rs::prelude::*;

/// Venue identifier: the arena slot assigned at initialization.
///
/// Venues are never removed, so ids stay stable for the engine's lifetime.
pub type VenueId = usize;

// ============================================================================
// TradeDirection enum
// ============================================================================

/// Which reserve the trader feeds.
///
/// Represented as u8 for fingerprint encoding:
/// - BaseForQuote = 0
/// - QuoteForBase = 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TradeDirection {
    /// Deposit base, withdraw quote
    #[default]
    BaseForQuote,
    /// Deposit quote, withdraw base
    QuoteForBase,
}

impl TradeDirection {
    /// Convert to u8 for serialization
    pub fn to_u8(self) -> u8 {
        match self {
            TradeDirection::BaseForQuote => 0,
            TradeDirection::QuoteForBase => 1,
        }
    }

    /// Convert from u8 for deserialization
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(TradeDirection::BaseForQuote),
            1 => Some(TradeDirection::QuoteForBase),
            _ => None,
        }
    }

    /// Returns the opposite direction
    pub fn opposite(self) -> Self {
        match self {
            TradeDirection::BaseForQuote => TradeDirection::QuoteForBase,
            TradeDirection::QuoteForBase => TradeDirection::BaseForQuote,
        }
    }
}

// ============================================================================
// TradeRequest
// ============================================================================

/// One trade as submitted by a trader.
///
/// Both protocol phases of a trade must receive the *same* request: the
/// fingerprint that links pre-trade to post-trade is derived from these
/// fields, including the minute bucket of `timestamp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeRequest {
    /// Input amount, in the deposited reserve's units
    pub amount_in: u64,

    /// Which reserve is deposited
    pub direction: TradeDirection,

    /// Trader account id
    pub trader: u64,

    /// Unix seconds at submission
    pub timestamp: u64,
}

impl TradeRequest {
    /// Create a new trade request
    pub fn new(amount_in: u64, direction: TradeDirection, trader: u64, timestamp: u64) -> Self {
        Self {
            amount_in,
            direction,
            trader,
            timestamp,
        }
    }

    /// Minute bucket of the submission time.
    ///
    /// Trades in the same minute share a bucket, so a pre/post pair keeps one
    /// fingerprint even when the phases land seconds apart.
    #[inline]
    pub fn time_bucket(&self) -> u64 {
        self.timestamp / 60
    }
}

// ============================================================================
// VenueState
// ============================================================================

/// Public accounting state of one venue.
///
/// ## SSZ Layout
///
/// Fixed-size container of six u64 fields: 48 bytes.
///
/// ## Example
///
/// ```
/// use dark_curvecore::types::VenueState;
///
/// let state = VenueState::new(1_000_000, 2_000_000);
/// assert_eq!(state.total_liquidity, 3_000_000);
/// assert_eq!(state.digest_hex().len(), 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct VenueState {
    /// Base-asset reserve
    pub reserve_base: u64,

    /// Quote-asset reserve
    pub reserve_quote: u64,

    /// Reserve sum, maintained by the engine on every trade
    pub total_liquidity: u64,

    /// Sum of all input amounts ever settled
    pub cumulative_volume: u64,

    /// Number of settled trades
    pub trade_count: u64,

    /// Unix seconds of the most recent settlement
    pub last_trade_at: u64,
}

impl VenueState {
    /// Create a fresh state from seed reserves
    pub fn new(reserve_base: u64, reserve_quote: u64) -> Self {
        Self {
            reserve_base,
            reserve_quote,
            total_liquidity: reserve_base.saturating_add(reserve_quote),
            cumulative_volume: 0,
            trade_count: 0,
            last_trade_at: 0,
        }
    }

    /// SHA-256 digest of the SSZ encoding.
    ///
    /// Deterministic across runs and platforms.
    pub fn digest(&self) -> [u8; 32] {
        let bytes = ssz_rs::serialize(self).expect("Failed to serialize");
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let result = hasher.finalize();

        let mut digest = [0u8; 32];
        digest.copy_from_slice(&result);
        digest
    }

    /// The digest as a hex string
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
