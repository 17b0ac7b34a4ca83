//! Fixed-point scaling utilities.
//!
//! ## Overview
//!
//! Encrypted arithmetic has no floating point: every fractional quantity in
//! Dark CurveCore is a u64 scaled by 10^12. The scale is plaintext metadata;
//! only the scaled integer ever gets encrypted.
//!
//! ## Why Fixed-Point?
//!
//! Homomorphic backends operate on integers, and floating-point arithmetic
//! can produce different results on different hardware, breaking
//! determinism. Fixed-point ensures identical results everywhere.
//!
//! ## Scale Factors
//!
//! [`PRECISION`] (10^12) is the working scale of the encrypted kernel: the
//! Taylor approximations in [`crate::fhe::kernel`] treat a ciphertext of
//! `PRECISION` as the number one. [`CALC_PRECISION`] (10^6) is a coarser
//! scale used when cross-checking kernel outputs against plaintext
//! references, where twelve digits of noise would drown the comparison.
//!
//! ## Examples
//!
//! ```
//! use dark_curvecore::types::scale::{PRECISION, to_fixed, from_fixed};
//!
//! // Convert 2.5 to fixed-point
//! let x = to_fixed("2.5").unwrap();
//! assert_eq!(x, 2_500_000_000_000);
//!
//! // Convert back to string
//! let s = from_fixed(x);
//! assert_eq!(s, "2.500000000000");
//! ```

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Working scale of the encrypted kernel: 10^12
///
/// A ciphertext holding `PRECISION` represents the number one.
pub const PRECISION: u64 = 1_000_000_000_000;

/// Coarse comparison scale: 10^6
///
/// Used by tests to collapse kernel outputs before comparing against
/// plaintext references.
pub const CALC_PRECISION: u64 = 1_000_000;

/// Maximum whole-unit value that can be represented at [`PRECISION`]
///
/// u64::MAX / PRECISION ≈ 18,446,744 (18 million units)
pub const MAX_VALUE: u64 = u64::MAX / PRECISION;

// ============================================================================
// Conversion Functions
// ============================================================================

/// Convert a decimal string to fixed-point u64
///
/// # Arguments
///
/// * `s` - Decimal string (e.g., "2.5")
///
/// # Returns
///
/// * `Some(u64)` - The fixed-point representation
/// * `None` - If parsing fails or value is out of range
///
/// # Example
///
/// ```
/// use dark_curvecore::types::scale::to_fixed;
///
/// assert_eq!(to_fixed("1.0"), Some(1_000_000_000_000));
/// assert_eq!(to_fixed("2.5"), Some(2_500_000_000_000));
/// assert_eq!(to_fixed("0.000000000001"), Some(1));
/// ```
pub fn to_fixed(s: &str) -> Option<u64> {
    let decimal = Decimal::from_str(s).ok()?;
    decimal_to_fixed(decimal)
}

/// Convert a Decimal to fixed-point u64
///
/// # Arguments
///
/// * `d` - rust_decimal::Decimal value
///
/// # Returns
///
/// * `Some(u64)` - The fixed-point representation
/// * `None` - If value is negative or out of range
pub fn decimal_to_fixed(d: Decimal) -> Option<u64> {
    if d.is_sign_negative() {
        return None;
    }

    let scaled = d.checked_mul(Decimal::from(PRECISION))?;
    let rounded = scaled.round_dp(0);
    rounded.to_u64()
}

/// Convert fixed-point u64 to a Decimal
///
/// # Arguments
///
/// * `value` - Fixed-point value
///
/// # Returns
///
/// The Decimal representation
pub fn fixed_to_decimal(value: u64) -> Decimal {
    Decimal::from(value) / Decimal::from(PRECISION)
}

/// Convert fixed-point u64 to a string with 12 decimal places
///
/// # Arguments
///
/// * `value` - Fixed-point value
///
/// # Returns
///
/// String representation with 12 decimal places
///
/// # Example
///
/// ```
/// use dark_curvecore::types::scale::from_fixed;
///
/// assert_eq!(from_fixed(1_000_000_000_000), "1.000000000000");
/// assert_eq!(from_fixed(2_500_000_000_000), "2.500000000000");
/// ```
pub fn from_fixed(value: u64) -> String {
    let decimal = fixed_to_decimal(value);
    format!("{:.12}", decimal)
}

/// Convert fixed-point u64 to a human-readable string (trimmed trailing zeros)
///
/// # Example
///
/// ```
/// use dark_curvecore::types::scale::from_fixed_trimmed;
///
/// assert_eq!(from_fixed_trimmed(1_000_000_000_000), "1");
/// assert_eq!(from_fixed_trimmed(1_500_000_000_000), "1.5");
/// ```
pub fn from_fixed_trimmed(value: u64) -> String {
    let decimal = fixed_to_decimal(value);
    format!("{}", decimal.normalize())
}

// ============================================================================
// Comparison Helpers
// ============================================================================

/// Compare two fixed-point values with a tolerance (for testing)
///
/// The Taylor kernels are approximations, so exact equality is rarely the
/// right assertion.
///
/// # Arguments
///
/// * `a` - First value
/// * `b` - Second value
/// * `tolerance` - Maximum allowed difference
///
/// # Returns
///
/// `true` if |a - b| <= tolerance
pub fn approx_eq(a: u64, b: u64, tolerance: u64) -> bool {
    if a >= b {
        a - b <= tolerance
    } else {
        b - a <= tolerance
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
