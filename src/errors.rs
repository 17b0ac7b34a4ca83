//! Error taxonomy for the pricing engine.
//!
//! ## Design
//!
//! Errors fall into four families, each rejected at a precise point:
//!
//! - **Validation**: bad coefficient counts, unsupported curve kinds,
//!   out-of-range risk bounds, unknown or inactive venues. Raised before any
//!   state mutation.
//! - **Authorization**: a caller other than the current strategist attempting
//!   a curve mutation. No state change.
//! - **Budget**: the invocation's metered compute units exceeded the
//!   configured ceiling. The whole trade aborts and the venue snapshot is
//!   restored with no partial effects.
//! - **Reentrancy**: a second entry into a venue whose invocation is still in
//!   flight.
//!
//! Two things are deliberately *not* errors: division by an encrypted zero
//! (resolved branchlessly to a sentinel, see [`crate::fhe::kernel`]) and a
//! decryption that is not yet ready (handled by the fallback path, see
//! [`crate::engine`]).

use thiserror::Error;

/// Convenience alias used across the engine surface.
pub type EngineResult<T> = Result<T, EngineError>;

// ============================================================================
// Error Enum
// ============================================================================

/// All failure modes surfaced by the pricing engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineError {
    // ========================================================================
    // Validation
    // ========================================================================
    /// Raw curve-kind byte does not name a supported curve.
    #[error("unsupported curve kind {0}")]
    UnsupportedCurveKind(u8),

    /// Coefficient vector shorter than the curve kind requires.
    #[error("curve requires at least {required} coefficients, got {actual}")]
    CoefficientCount { required: usize, actual: usize },

    /// A plaintext risk bound lies outside its validated range.
    #[error("risk bound `{field}` = {value} outside limit {limit}")]
    InvalidBound {
        field: &'static str,
        value: u64,
        limit: u64,
    },

    /// No venue exists under the given identifier.
    #[error("unknown venue {0}")]
    UnknownVenue(u64),

    /// The venue is paused; pre-trade pricing is rejected until resumed.
    #[error("venue {0} is inactive")]
    VenueInactive(u64),

    // ========================================================================
    // Authorization
    // ========================================================================
    /// Curve mutations are strategist-only.
    #[error("caller {caller} is not the strategist of venue {venue}")]
    NotStrategist { venue: u64, caller: u64 },

    // ========================================================================
    // Budget
    // ========================================================================
    /// The invocation consumed more compute units than the configured ceiling.
    #[error("computation budget exceeded: used {used} of {budget} units")]
    BudgetExceeded { used: u64, budget: u64 },

    // ========================================================================
    // Reentrancy
    // ========================================================================
    /// Single-writer discipline: the venue is already inside an invocation.
    #[error("venue {0} is busy with an in-flight invocation")]
    VenueBusy(u64),
}

// ============================================================================
// Unit Tests
// ============================================================================
