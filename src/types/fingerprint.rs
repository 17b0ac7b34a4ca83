//! Deterministic fingerprints over plaintext facets.
//!
//! ## What Gets Hashed
//!
//! Caching and decryption tracking need stable keys, but most of the
//! interesting data is ciphertext. A fingerprint therefore commits to the
//! *plaintext facets* of a computation only: curve kind, risk bounds, update
//! epoch, trade parameters. Encrypted coefficients never enter a fingerprint;
//! a handle is backend-local and hashing it would make keys non-portable.
//!
//! The flip side is deliberate: two configurations that differ only in their
//! encrypted coefficients share a curve fingerprint. Cache correctness
//! therefore leans on `last_update` being bumped whenever coefficients
//! change meaning.
//!
//! ## Encoding
//!
//! Facets are SSZ-serialized (deterministic little-endian layout) and hashed
//! with SHA-256. Per the SSZ spec (ethereum.org), basic types encode
//! little-endian and fixed-size containers concatenate their fields, so the
//! byte stream is identical across platforms.

use sha2::{Digest, Sha256};
use ssz_rs::prelude::*;

use crate::types::curve::CurveConfiguration;
use crate::types::venue::{TradeRequest, VenueId};

// ============================================================================
// OperationKind enum
// ============================================================================

/// Engine operations that track asynchronous decryptions.
///
/// Represented as u8 for fingerprint encoding:
/// - SwapPrice = 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OperationKind {
    /// Decryption of a swap's evaluated price
    #[default]
    SwapPrice,
}

impl OperationKind {
    /// Convert to u8 for serialization
    pub fn to_u8(self) -> u8 {
        match self {
            OperationKind::SwapPrice => 0,
        }
    }

    /// Convert from u8 for deserialization
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(OperationKind::SwapPrice),
            _ => None,
        }
    }
}

// ============================================================================
// Facet containers
// ============================================================================

/// Plaintext facets of a curve configuration.
///
/// ## SSZ Layout
///
/// Fixed-size container: 1 + 8 + 8 + 8 + 8 = 33 bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct CurveFacets {
    /// Curve kind as u8
    pub kind_raw: u8,

    /// Risk bound: maximum leverage
    pub max_leverage: u64,

    /// Risk bound: volatility in basis points
    pub volatility_bps: u64,

    /// Unix seconds of the last full curve update
    pub last_update: u64,

    /// Governing strategist account id
    pub strategist: u64,
}

/// Plaintext facets of one trade.
///
/// ## SSZ Layout
///
/// Fixed-size container: 8 + 8 + 1 + 8 + 8 = 33 bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct TradeFacets {
    /// Venue id
    pub venue: u64,

    /// Input amount
    pub amount_in: u64,

    /// Trade direction as u8
    pub direction_raw: u8,

    /// Minute bucket of the submission timestamp
    pub time_bucket: u64,

    /// Trader account id
    pub trader: u64,
}

/// Plaintext facets of a tracked asynchronous operation.
///
/// ## SSZ Layout
///
/// Fixed-size container: 8 + 1 + 8 + 8 + 8 = 33 bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct OperationFacets {
    /// Venue id
    pub venue: u64,

    /// Operation kind as u8
    pub op_raw: u8,

    /// First operation parameter
    pub param0: u64,

    /// Second operation parameter
    pub param1: u64,

    /// Third operation parameter
    pub param2: u64,
}

// ============================================================================
// Fingerprint
// ============================================================================

/// 32-byte SHA-256 commitment to a set of plaintext facets.
///
/// Used as the key of the evaluation cache, the decryption ledger, and the
/// pending-trade map.
///
/// ## Example
///
/// ```
/// use dark_curvecore::types::{Fingerprint, TradeDirection, TradeRequest};
///
/// let req = TradeRequest::new(100, TradeDirection::BaseForQuote, 42, 1_700_000_000);
/// let fp = Fingerprint::for_trade(0, &req);
/// assert_eq!(fp.to_hex().len(), 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Fingerprint of a curve configuration's plaintext facets.
    ///
    /// Commits to kind, leverage/volatility bounds, `last_update`, and the
    /// strategist. Never to the encrypted coefficients.
    pub fn for_curve(cfg: &CurveConfiguration) -> Self {
        let facets = CurveFacets {
            kind_raw: cfg.kind.to_u8(),
            max_leverage: cfg.bounds.max_leverage,
            volatility_bps: cfg.bounds.volatility_bps,
            last_update: cfg.last_update,
            strategist: cfg.strategist,
        };
        let bytes = ssz_rs::serialize(&facets).expect("Failed to serialize");
        Self(Self::compute_hash(&bytes))
    }

    /// Fingerprint of one trade.
    ///
    /// Both protocol phases derive this from the same request, which is what
    /// links a settlement back to its pending record.
    pub fn for_trade(venue: VenueId, request: &TradeRequest) -> Self {
        let facets = TradeFacets {
            venue: venue as u64,
            amount_in: request.amount_in,
            direction_raw: request.direction.to_u8(),
            time_bucket: request.time_bucket(),
            trader: request.trader,
        };
        let bytes = ssz_rs::serialize(&facets).expect("Failed to serialize");
        Self(Self::compute_hash(&bytes))
    }

    /// Fingerprint of a tracked asynchronous operation.
    ///
    /// Keys the decryption ledger. Parameters identify the computation, not
    /// the trade: two traders asking the same question share a key and the
    /// second one benefits from the first one's warmed decryption.
    pub fn for_operation(
        venue: VenueId,
        op: OperationKind,
        param0: u64,
        param1: u64,
        param2: u64,
    ) -> Self {
        let facets = OperationFacets {
            venue: venue as u64,
            op_raw: op.to_u8(),
            param0,
            param1,
            param2,
        };
        let bytes = ssz_rs::serialize(&facets).expect("Failed to serialize");
        Self(Self::compute_hash(&bytes))
    }

    /// Compute SHA-256 hash of the given data
    fn compute_hash(data: &[u8]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(data);
        let result = hasher.finalize();

        let mut hash = [0u8; 32];
        hash.copy_from_slice(&result);
        hash
    }

    /// The raw 32 bytes
    #[inline]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The fingerprint as a hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
