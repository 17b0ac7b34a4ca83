//! Curve shapes, risk bounds, and the per-venue curve configuration.
//!
//! ## Confidentiality Split
//!
//! A configuration mixes two worlds. The *shape* of the curve (its kind, its
//! risk envelope, who governs it, when it last changed) is plaintext and may
//! be hashed, logged, and compared. The *coefficients* are ciphertext handles
//! and never leave the encrypted domain; nothing in this module can read
//! them.
//!
//! ## Clamp Convention
//!
//! Each kind declares a minimum coefficient count. A strategist may append
//! exactly two more encrypted values; when present, those final two act as
//! encrypted min/max clamp bounds applied to every evaluation result.

use crate::errors::{EngineError, EngineResult};
use crate::types::ciphertext::EncU64;

// ============================================================================
// CurveKind enum
// ============================================================================

/// Supported curve families.
///
/// Represented as u8 for fingerprint encoding:
/// - Linear = 0
/// - Exponential = 1
/// - Logarithmic = 2
/// - Polynomial = 3
/// - Sigmoid = 4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CurveKind {
    /// `a*x + b`
    #[default]
    Linear,
    /// `a * exp(b*x)`, exp via Taylor kernel
    Exponential,
    /// `a * ln(b*x + c)`, ln via Taylor kernel
    Logarithmic,
    /// `a*x^2 + b*x + c`
    Polynomial,
    /// `L / (1 + exp(-k*(x - x0)))`
    Sigmoid,
}

impl CurveKind {
    /// Convert to u8 for serialization
    pub fn to_u8(self) -> u8 {
        match self {
            CurveKind::Linear => 0,
            CurveKind::Exponential => 1,
            CurveKind::Logarithmic => 2,
            CurveKind::Polynomial => 3,
            CurveKind::Sigmoid => 4,
        }
    }

    /// Convert from u8 for deserialization
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::try_from(value).ok()
    }

    /// Minimum number of coefficients the formula consumes.
    ///
    /// Two-parameter kinds take `[a, b]`; three-parameter kinds take
    /// `[a, b, c]` (sigmoid reads them as `[L, k, x0]`).
    pub fn min_coefficients(self) -> usize {
        match self {
            CurveKind::Linear | CurveKind::Exponential => 2,
            CurveKind::Logarithmic | CurveKind::Polynomial | CurveKind::Sigmoid => 3,
        }
    }
}

/// Raw-byte ingress; an out-of-range kind is a validation error.
impl TryFrom<u8> for CurveKind {
    type Error = EngineError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CurveKind::Linear),
            1 => Ok(CurveKind::Exponential),
            2 => Ok(CurveKind::Logarithmic),
            3 => Ok(CurveKind::Polynomial),
            4 => Ok(CurveKind::Sigmoid),
            other => Err(EngineError::UnsupportedCurveKind(other)),
        }
    }
}

// ============================================================================
// RiskBounds
// ============================================================================

/// Plaintext risk envelope attached to a curve.
///
/// These are governance parameters, not trading state: they gate validation
/// and health scoring but never enter the encrypted computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskBounds {
    /// Maximum permitted leverage, whole units. Must be in (0, 100].
    pub max_leverage: u64,

    /// Expected volatility in basis points. Must be <= 10_000 (100%).
    pub volatility_bps: u64,

    /// Maximum tolerated slippage in basis points. Must be <= 5_000.
    pub max_slippage_bps: u64,

    /// Liquidity floor the venue is expected to hold. Must be > 0.
    pub min_liquidity: u64,

    /// Time-decay rate in basis points. Must be <= 10_000.
    ///
    /// Validated and stored for strategists that encode decay into their
    /// coefficients off-platform; no formula in this crate consumes it.
    pub time_decay_bps: u64,
}

impl Default for RiskBounds {
    fn default() -> Self {
        Self {
            max_leverage: 10,
            volatility_bps: 500,
            max_slippage_bps: 100,
            min_liquidity: 1_000,
            time_decay_bps: 0,
        }
    }
}

impl RiskBounds {
    /// Validate every field against its governance limit.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - All bounds within limits
    /// * `Err(EngineError::InvalidBound)` - First violated field
    pub fn validate(&self) -> EngineResult<()> {
        if self.max_leverage == 0 || self.max_leverage > 100 {
            return Err(EngineError::InvalidBound {
                field: "max_leverage",
                value: self.max_leverage,
                limit: 100,
            });
        }
        if self.volatility_bps > 10_000 {
            return Err(EngineError::InvalidBound {
                field: "volatility_bps",
                value: self.volatility_bps,
                limit: 10_000,
            });
        }
        if self.max_slippage_bps > 5_000 {
            return Err(EngineError::InvalidBound {
                field: "max_slippage_bps",
                value: self.max_slippage_bps,
                limit: 5_000,
            });
        }
        if self.min_liquidity == 0 {
            return Err(EngineError::InvalidBound {
                field: "min_liquidity",
                value: 0,
                limit: 1,
            });
        }
        if self.time_decay_bps > 10_000 {
            return Err(EngineError::InvalidBound {
                field: "time_decay_bps",
                value: self.time_decay_bps,
                limit: 10_000,
            });
        }
        Ok(())
    }
}

// ============================================================================
// CurveConfiguration
// ============================================================================

/// The full pricing configuration of one venue.
///
/// Created at venue initialization, mutated only through strategist-gated
/// engine calls, deactivated (never deleted) on pause.
#[derive(Debug, Clone)]
pub struct CurveConfiguration {
    /// Curve family
    pub kind: CurveKind,

    /// Encrypted coefficients, `[a, b, (c)]` plus optional clamp pair
    pub coefficients: Vec<EncU64>,

    /// Plaintext risk envelope
    pub bounds: RiskBounds,

    /// Whether the venue accepts new trades
    pub active: bool,

    /// Unix seconds of the last full curve update
    pub last_update: u64,

    /// Account id of the governing strategist
    pub strategist: u64,
}

impl CurveConfiguration {
    /// Create a validated configuration.
    ///
    /// # Arguments
    ///
    /// * `kind` - Curve family
    /// * `coefficients` - Encrypted coefficients (at least the kind's minimum)
    /// * `bounds` - Plaintext risk envelope
    /// * `strategist` - Governing account id
    /// * `now` - Unix seconds, recorded as `last_update`
    ///
    /// # Returns
    ///
    /// * `Ok(CurveConfiguration)` - Active configuration
    /// * `Err(EngineError)` - Bound or coefficient-count violation
    pub fn new(
        kind: CurveKind,
        coefficients: Vec<EncU64>,
        bounds: RiskBounds,
        strategist: u64,
        now: u64,
    ) -> EngineResult<Self> {
        bounds.validate()?;
        Self::check_coefficient_count(kind, coefficients.len())?;

        Ok(Self {
            kind,
            coefficients,
            bounds,
            active: true,
            last_update: now,
            strategist,
        })
    }

    /// Reject coefficient vectors shorter than the kind's minimum.
    pub fn check_coefficient_count(kind: CurveKind, actual: usize) -> EngineResult<()> {
        let required = kind.min_coefficients();
        if actual < required {
            return Err(EngineError::CoefficientCount { required, actual });
        }
        Ok(())
    }

    /// True when the coefficient vector carries the trailing clamp pair.
    ///
    /// The pair begins two past the minimum; a single extra coefficient is
    /// ignored rather than half-applied.
    #[inline]
    pub fn has_clamp_bounds(&self) -> bool {
        self.coefficients.len() >= self.kind.min_coefficients() + 2
    }

    /// The encrypted `(lower, upper)` clamp pair, when present.
    pub fn clamp_bounds(&self) -> Option<(EncU64, EncU64)> {
        if !self.has_clamp_bounds() {
            return None;
        }
        let n = self.coefficients.len();
        Some((self.coefficients[n - 2], self.coefficients[n - 1]))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
