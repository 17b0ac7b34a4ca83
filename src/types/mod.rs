//! Core data types for Dark CurveCore
//!
//! Plaintext types implement SSZ serialization for deterministic encoding;
//! encrypted values appear only as opaque handles.
//!
//! ## Types
//!
//! - [`EncU64`], [`EncBool`], [`DecryptionId`]: opaque ciphertext handles
//! - [`CurveKind`], [`RiskBounds`], [`CurveConfiguration`]: per-venue curve setup
//! - [`TradeDirection`], [`TradeRequest`], [`VenueState`]: plaintext trade types
//! - [`Fingerprint`]: SHA-256 commitment to plaintext facets
//!
//! ## Fixed-Point Arithmetic
//!
//! Fractional quantities are stored as `u64` scaled by 10^12 (see
//! [`scale::PRECISION`]). Example: 2.5 is stored as 2_500_000_000_000u64.

mod ciphertext;
mod curve;
mod fingerprint;
mod venue;
pub mod scale;

// Re-export all types at module level
pub use ciphertext::{DecryptionId, EncBool, EncU64};
pub use curve::{CurveConfiguration, CurveKind, RiskBounds};
pub use fingerprint::{
    CurveFacets, Fingerprint, OperationFacets, OperationKind, TradeFacets,
};
pub use venue::{TradeDirection, TradeRequest, VenueId, VenueState};
