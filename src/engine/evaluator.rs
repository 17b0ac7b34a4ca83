//! Curve evaluation over encrypted coefficients.
//!
//! ## Evaluation Pipeline
//!
//! 1. Fingerprint the configuration's plaintext facets.
//! 2. Consult the TTL cache; a hit returns the stored ciphertext handle
//!    without touching the backend.
//! 3. On a miss, dispatch on the curve kind and run the formula through the
//!    kernel.
//! 4. Apply the encrypted clamp pair when the configuration carries one.
//! 5. Store the result under the fingerprint.
//!
//! ## Scale Regimes
//!
//! Curve algebra runs on raw domain values: a linear curve with `a = 2`,
//! `b = 5` evaluated at `x = 10` prices at 25, not at a scaled
//! representation. The transcendental kinds route through the Taylor
//! helpers, which interpret their argument as PRECISION-scaled, with
//! `precision_mul`/`precision_div` bridging back to the raw regime.
//! Strategists pick coefficients with those regimes in mind.
//!
//! The evaluator never requests decryption; whether a price leaves the
//! encrypted domain is the protocol's decision.

use crate::engine::cache::EvaluationCache;
use crate::errors::EngineResult;
use crate::fhe::{kernel, FheBackend};
use crate::types::scale::PRECISION;
use crate::types::{CurveConfiguration, CurveKind, EncU64, Fingerprint};

/// Evaluate `cfg` at the encrypted point `x`.
///
/// # Arguments
///
/// * `fhe` - Backend executing the homomorphic ops
/// * `cfg` - Curve configuration (validated at creation; revalidated here)
/// * `cache` - The owning venue's evaluation cache
/// * `x` - Encrypted evaluation point, raw domain scale
/// * `now` - Unix seconds, for cache aging
///
/// # Returns
///
/// * `Ok(handle)` - Encrypted price, cached or fresh
/// * `Err(EngineError::CoefficientCount)` - Raised before any homomorphic
///   work if the coefficient vector is short
pub fn evaluate<B: FheBackend>(
    fhe: &mut B,
    cfg: &CurveConfiguration,
    cache: &mut EvaluationCache,
    x: EncU64,
    now: u64,
) -> EngineResult<EncU64> {
    CurveConfiguration::check_coefficient_count(cfg.kind, cfg.coefficients.len())?;

    let key = Fingerprint::for_curve(cfg);
    if let Some(cached) = cache.get(&key, now) {
        return Ok(cached);
    }

    let raw = dispatch(fhe, cfg, x);
    let result = match cfg.clamp_bounds() {
        Some((lower, upper)) => kernel::clamp(fhe, raw, lower, upper),
        None => raw,
    };

    cache.insert(key, result, now);
    Ok(result)
}

fn dispatch<B: FheBackend>(fhe: &mut B, cfg: &CurveConfiguration, x: EncU64) -> EncU64 {
    let c = &cfg.coefficients;
    match cfg.kind {
        CurveKind::Linear => eval_linear(fhe, c[0], c[1], x),
        CurveKind::Exponential => eval_exponential(fhe, c[0], c[1], x),
        CurveKind::Logarithmic => eval_logarithmic(fhe, c[0], c[1], c[2], x),
        CurveKind::Polynomial => eval_polynomial(fhe, c[0], c[1], c[2], x),
        CurveKind::Sigmoid => eval_sigmoid(fhe, c[0], c[1], c[2], x),
    }
}

/// `a*x + b`
fn eval_linear<B: FheBackend>(fhe: &mut B, a: EncU64, b: EncU64, x: EncU64) -> EncU64 {
    let ax = fhe.mul(a, x);
    fhe.add(ax, b)
}

/// `a * exp(b*x)`
fn eval_exponential<B: FheBackend>(fhe: &mut B, a: EncU64, b: EncU64, x: EncU64) -> EncU64 {
    let bx = fhe.mul(b, x);
    let exp_bx = kernel::fast_exp(fhe, bx);
    kernel::precision_mul(fhe, a, exp_bx)
}

/// `a * ln(b*x + c)`
fn eval_logarithmic<B: FheBackend>(
    fhe: &mut B,
    a: EncU64,
    b: EncU64,
    c: EncU64,
    x: EncU64,
) -> EncU64 {
    let bx = fhe.mul(b, x);
    let arg = fhe.add(bx, c);
    let ln_arg = kernel::fast_ln(fhe, arg);
    kernel::precision_mul(fhe, a, ln_arg)
}

/// `a*x^2 + b*x + c`
fn eval_polynomial<B: FheBackend>(
    fhe: &mut B,
    a: EncU64,
    b: EncU64,
    c: EncU64,
    x: EncU64,
) -> EncU64 {
    let x_sq = fhe.mul(x, x);
    let ax2 = fhe.mul(a, x_sq);
    let bx = fhe.mul(b, x);
    let sum = fhe.add(ax2, bx);
    fhe.add(sum, c)
}

/// `L / (1 + exp(-k*(x - x0)))`, with `[L, k, x0]`.
///
/// Unsigned ciphertexts have no negation; `-k*(x - x0)` is spelled
/// `PRECISION - k*(x - x0)`, wrapping when the product exceeds the scaled
/// one.
fn eval_sigmoid<B: FheBackend>(
    fhe: &mut B,
    l: EncU64,
    k: EncU64,
    x0: EncU64,
    x: EncU64,
) -> EncU64 {
    let dx = fhe.sub(x, x0);
    let k_dx = fhe.mul(k, dx);
    let one = fhe.encrypt(PRECISION);
    let neg = fhe.sub(one, k_dx);
    let exp_neg = kernel::fast_exp(fhe, neg);
    let one_again = fhe.encrypt(PRECISION);
    let denom = fhe.add(one_again, exp_neg);
    kernel::precision_div(fhe, l, denom)
}

// ============================================================================
// Unit Tests
// ============================================================================
