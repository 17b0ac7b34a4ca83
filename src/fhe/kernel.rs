//! Fixed-point numeric kernel over encrypted values.
//!
//! ## Scale Convention
//!
//! The kernel works at [`PRECISION`] (10^12): a ciphertext holding
//! `PRECISION` means 1.0. Curve formulas mix two regimes on purpose; raw
//! domain values (amounts, coefficients) multiply and add directly, while
//! the transcendental helpers interpret their argument as PRECISION-scaled.
//! [`precision_mul`] and [`precision_div`] bridge the regimes. Callers
//! pre-scale; nothing validates the regime.
//!
//! ## Approximation Contract
//!
//! `fast_exp` and `fast_ln` are short Taylor expansions around 1, accurate
//! for small scaled arguments. Outside that regime, and whenever an
//! intermediate product exceeds 2^64, results wrap modularly and are
//! well-defined garbage: deterministic, never a fault. `fast_ln` of an
//! argument below `PRECISION` wraps the same way (there is no negative
//! number to return). Downstream clamping is how production curves keep the
//! garbage from reaching a price.
//!
//! ## Branchless Shape
//!
//! Every operation performs a fixed sequence of backend calls, regardless of
//! the encrypted operand values. The only data-dependent iteration is
//! `fast_pow`, whose exponent is plaintext. Observing the call trace of a
//! kernel op therefore reveals nothing about the ciphertexts flowing
//! through it.
//!
//! ## Division Guard
//!
//! Encrypted divisors can be zero and nobody can check first. Every division
//! in this crate goes through [`guarded_div`], which swaps a zero divisor
//! for 1, divides, then swaps the result for the [`DIV_BY_ZERO_SENTINEL`].
//! Two selects, no branches.

use crate::fhe::backend::FheBackend;
use crate::types::scale::PRECISION;
use crate::types::EncU64;

/// Result of any guarded division with a zero divisor.
pub const DIV_BY_ZERO_SENTINEL: u64 = u64::MAX;

// ============================================================================
// Division Guard
// ============================================================================

/// Branchless division with a zero-divisor sentinel.
///
/// # Arguments
///
/// * `numerator` - Encrypted dividend
/// * `divisor` - Encrypted divisor, possibly zero
///
/// # Returns
///
/// `numerator / divisor` (floored), or [`DIV_BY_ZERO_SENTINEL`] when the
/// divisor is zero. The zero check, the division, and the sentinel swap all
/// execute unconditionally.
///
/// # Example
///
/// ```
/// use dark_curvecore::fhe::{kernel, FheBackend, SoftwareFhe};
///
/// let mut fhe = SoftwareFhe::default();
/// let n = fhe.encrypt(10);
/// let zero = fhe.encrypt(0);
/// let q = kernel::guarded_div(&mut fhe, n, zero);
/// assert_eq!(fhe.reveal(q), u64::MAX);
/// ```
pub fn guarded_div<B: FheBackend>(fhe: &mut B, numerator: EncU64, divisor: EncU64) -> EncU64 {
    let zero = fhe.encrypt(0);
    let one = fhe.encrypt(1);
    let sentinel = fhe.encrypt(DIV_BY_ZERO_SENTINEL);

    let divisor_is_zero = fhe.eq(divisor, zero);
    let safe_divisor = fhe.select(divisor_is_zero, one, divisor);
    let quotient = fhe.div(numerator, safe_divisor);
    fhe.select(divisor_is_zero, sentinel, quotient)
}

// ============================================================================
// Precision Bridges
// ============================================================================

/// Fixed-point division: scales the numerator by [`PRECISION`] first.
///
/// `precision_div(a, b)` of two same-regime values yields their
/// PRECISION-scaled ratio; of a raw numerator and scaled divisor, a raw
/// quotient.
pub fn precision_div<B: FheBackend>(fhe: &mut B, numerator: EncU64, divisor: EncU64) -> EncU64 {
    let scale = fhe.encrypt(PRECISION);
    let scaled = fhe.mul(numerator, scale);
    guarded_div(fhe, scaled, divisor)
}

/// Fixed-point multiplication: divides the raw product by [`PRECISION`].
///
/// The scaled one is its identity: `precision_mul(PRECISION, x) == x` while
/// the product fits.
pub fn precision_mul<B: FheBackend>(fhe: &mut B, a: EncU64, b: EncU64) -> EncU64 {
    let product = fhe.mul(a, b);
    let scale = fhe.encrypt(PRECISION);
    guarded_div(fhe, product, scale)
}

// ============================================================================
// Transcendental Approximations
// ============================================================================

/// Three-term Taylor exponential: `1 + x + x^2/2`, PRECISION-scaled.
///
/// # Arguments
///
/// * `x` - PRECISION-scaled exponent, expected small
///
/// # Returns
///
/// PRECISION-scaled `e^x` approximation. Exact to the truncated series for
/// in-regime inputs; modular garbage outside.
pub fn fast_exp<B: FheBackend>(fhe: &mut B, x: EncU64) -> EncU64 {
    let one = fhe.encrypt(PRECISION);
    let x_sq = precision_mul(fhe, x, x);
    let two = fhe.encrypt(2);
    let half_sq = guarded_div(fhe, x_sq, two);

    let sum = fhe.add(one, x);
    fhe.add(sum, half_sq)
}

/// Two-term Taylor logarithm around 1: `t - t^2/2` with `t = x - 1`.
///
/// # Arguments
///
/// * `x` - PRECISION-scaled argument, expected near 1
///
/// # Returns
///
/// PRECISION-scaled `ln(x)` approximation. An argument below `PRECISION`
/// wraps `t` through zero and the result is modular garbage.
pub fn fast_ln<B: FheBackend>(fhe: &mut B, x: EncU64) -> EncU64 {
    let one = fhe.encrypt(PRECISION);
    let t = fhe.sub(x, one);
    let t_sq = precision_mul(fhe, t, t);
    let two = fhe.encrypt(2);
    let half_sq = guarded_div(fhe, t_sq, two);
    fhe.sub(t, half_sq)
}

/// Binary exponentiation over [`precision_mul`].
///
/// The exponent is plaintext; the number of multiplications is
/// `O(log exponent)` and depends only on it. `fast_pow(_, 0)` is the
/// scaled 1.
pub fn fast_pow<B: FheBackend>(fhe: &mut B, base: EncU64, exponent: u32) -> EncU64 {
    let mut result = fhe.encrypt(PRECISION);
    let mut factor = base;
    let mut exp = exponent;

    while exp > 0 {
        if exp & 1 == 1 {
            result = precision_mul(fhe, result, factor);
        }
        exp >>= 1;
        if exp > 0 {
            factor = precision_mul(fhe, factor, factor);
        }
    }
    result
}

/// Newton-Raphson square root with a fixed iteration count.
///
/// Initial guess `x/2`, then exactly three rounds of
/// `r = (r + precision_div(x, r)) / 2`. The count never varies, keeping the
/// call shape data-independent; accuracy is whatever three rounds buy from
/// that guess. A zero input divides by its own zero guess, inherits the
/// division sentinel, and returns garbage.
pub fn fast_sqrt<B: FheBackend>(fhe: &mut B, x: EncU64) -> EncU64 {
    let two = fhe.encrypt(2);
    let mut r = guarded_div(fhe, x, two);

    for _ in 0..3 {
        let q = precision_div(fhe, x, r);
        let sum = fhe.add(r, q);
        r = guarded_div(fhe, sum, two);
    }
    r
}

// ============================================================================
// Clamp
// ============================================================================

/// Branchless `min(max(value, lower), upper)`.
///
/// Two comparisons and two selects; the result is always a fresh handle.
pub fn clamp<B: FheBackend>(fhe: &mut B, value: EncU64, lower: EncU64, upper: EncU64) -> EncU64 {
    let below = fhe.lt(value, lower);
    let raised = fhe.select(below, lower, value);
    let above = fhe.gt(raised, upper);
    fhe.select(above, upper, raised)
}

// ============================================================================
// Unit Tests
// ============================================================================
