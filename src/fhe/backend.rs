//! Homomorphic backend contract and the software reference backend.
//!
//! ## The Contract
//!
//! [`FheBackend`] is everything the engine is allowed to ask of a
//! coprocessor. The rules are strict:
//!
//! - No operation exposes plaintext. Arithmetic and comparison return fresh
//!   ciphertext handles; the only way out of the encrypted domain is the
//!   asynchronous request/fetch pair.
//! - No native branch may depend on an encrypted condition. Comparisons
//!   return [`EncBool`], which has no boolean accessor; conditionality is
//!   expressed through `select`.
//! - `div` must not fault. An encrypted divisor can be zero and nobody can
//!   check first, so division by zero yields `u64::MAX` instead of trapping.
//! - Arithmetic is modular: results wrap mod 2^64, and `div` floors.
//!
//! ## Compute Units
//!
//! Every operation adds a fixed cost to a cumulative meter, mirroring how
//! real coprocessors bill gates:
//!
//! | operation        | units |
//! |------------------|-------|
//! | encrypt          | 1     |
//! | add / sub        | 2     |
//! | gt/lt/gte/lte/eq | 2     |
//! | select           | 3     |
//! | request_decryption | 4   |
//! | mul              | 5     |
//! | div              | 8     |
//! | fetch_decryption | 0     |
//!
//! ## SoftwareFhe
//!
//! [`SoftwareFhe`] implements the contract over cleartext slab cells. It is
//! not secure and does not pretend to be; it exists so the engine's
//! asynchrony, metering, and arithmetic semantics are testable without a
//! coprocessor. Decryption latency runs on a logical clock that only
//! [`SoftwareFhe::advance_clock`] moves, so tests decide exactly when a
//! pending decryption becomes ready.

use slab::Slab;

use crate::types::{DecryptionId, EncBool, EncU64};

/// Unit cost of `encrypt`
pub const COST_ENCRYPT: u64 = 1;
/// Unit cost of `add` and `sub`
pub const COST_ADD_SUB: u64 = 2;
/// Unit cost of each comparison
pub const COST_COMPARE: u64 = 2;
/// Unit cost of `select`
pub const COST_SELECT: u64 = 3;
/// Unit cost of `request_decryption`
pub const COST_REQUEST: u64 = 4;
/// Unit cost of `mul`
pub const COST_MUL: u64 = 5;
/// Unit cost of `div`
pub const COST_DIV: u64 = 8;

// ============================================================================
// FheBackend trait
// ============================================================================

/// Operations a homomorphic coprocessor must provide.
///
/// The engine is generic over this trait; production deployments bind a real
/// FHE library, tests and the demo bind [`SoftwareFhe`].
pub trait FheBackend {
    /// Encrypt a plaintext value into a fresh ciphertext cell
    fn encrypt(&mut self, plain: u64) -> EncU64;

    /// Homomorphic addition, wrapping mod 2^64
    fn add(&mut self, a: EncU64, b: EncU64) -> EncU64;

    /// Homomorphic subtraction, wrapping mod 2^64
    fn sub(&mut self, a: EncU64, b: EncU64) -> EncU64;

    /// Homomorphic multiplication, wrapping mod 2^64
    fn mul(&mut self, a: EncU64, b: EncU64) -> EncU64;

    /// Homomorphic flooring division.
    ///
    /// Division by an encrypted zero yields `u64::MAX`, never a fault.
    fn div(&mut self, a: EncU64, b: EncU64) -> EncU64;

    /// Encrypted `a > b`
    fn gt(&mut self, a: EncU64, b: EncU64) -> EncBool;

    /// Encrypted `a < b`
    fn lt(&mut self, a: EncU64, b: EncU64) -> EncBool;

    /// Encrypted `a >= b`
    fn gte(&mut self, a: EncU64, b: EncU64) -> EncBool;

    /// Encrypted `a <= b`
    fn lte(&mut self, a: EncU64, b: EncU64) -> EncBool;

    /// Encrypted `a == b`
    fn eq(&mut self, a: EncU64, b: EncU64) -> EncBool;

    /// Branchless conditional: `if cond { a } else { b }`, as a fresh cell.
    ///
    /// This is the only consumer of [`EncBool`].
    fn select(&mut self, cond: EncBool, a: EncU64, b: EncU64) -> EncU64;

    /// Ask the coprocessor to decrypt a ciphertext.
    ///
    /// Returns immediately with a job id; the plaintext arrives later.
    fn request_decryption(&mut self, value: EncU64) -> DecryptionId;

    /// Poll a decryption job.
    ///
    /// `None` until the coprocessor finishes; afterwards `Some(plaintext)`
    /// on every poll.
    fn fetch_decryption(&self, id: DecryptionId) -> Option<u64>;

    /// Cumulative compute units consumed since construction
    fn compute_units_used(&self) -> u64;
}

// ============================================================================
// SoftwareFhe
// ============================================================================

/// One queued decryption job.
#[derive(Debug, Clone)]
struct DecryptionJob {
    /// Plaintext snapshot taken at request time
    value: u64,

    /// Logical clock reading when the request was issued
    requested_at: u64,
}

/// Cleartext reference implementation of [`FheBackend`].
///
/// ## Example
///
/// ```
/// use dark_curvecore::fhe::{FheBackend, SoftwareFhe};
///
/// let mut fhe = SoftwareFhe::default();
/// let ct = fhe.encrypt(7);
/// let id = fhe.request_decryption(ct);
///
/// // Not ready until the clock moves past the configured latency.
/// assert_eq!(fhe.fetch_decryption(id), None);
/// fhe.advance_clock(1);
/// assert_eq!(fhe.fetch_decryption(id), Some(7));
/// ```
#[derive(Debug, Clone)]
pub struct SoftwareFhe {
    /// Ciphertext cells; the handle is the slab key
    cells: Slab<u64>,

    /// Decryption jobs; the job id is the slab key
    jobs: Slab<DecryptionJob>,

    /// Logical clock, advanced only by `advance_clock`
    clock: u64,

    /// Ticks between request and readiness
    latency: u64,

    /// Cumulative compute units
    units: u64,
}

impl Default for SoftwareFhe {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftwareFhe {
    /// Create a backend with the default 1-tick decryption latency.
    ///
    /// One tick keeps asynchrony visible: a decryption requested in this
    /// invocation is never ready in the same invocation.
    pub fn new() -> Self {
        Self::with_latency(1)
    }

    /// Create a backend with an explicit decryption latency in ticks.
    ///
    /// Latency 0 makes decryption synchronous, which some tests use to
    /// isolate non-asynchrony behavior.
    pub fn with_latency(latency: u64) -> Self {
        Self {
            cells: Slab::new(),
            jobs: Slab::new(),
            clock: 0,
            latency,
            units: 0,
        }
    }

    /// Advance the logical clock by `ticks`
    pub fn advance_clock(&mut self, ticks: u64) {
        self.clock = self.clock.saturating_add(ticks);
    }

    /// Current logical clock reading
    #[inline]
    pub fn clock(&self) -> u64 {
        self.clock
    }

    /// Number of decryption jobs ever issued
    #[inline]
    pub fn jobs_issued(&self) -> usize {
        self.jobs.len()
    }

    /// Read a ciphertext cell directly, bypassing the decryption path.
    ///
    /// Test and demo aid only; a real backend has no equivalent.
    pub fn reveal(&self, value: EncU64) -> u64 {
        self.value_of(value)
    }

    fn value_of(&self, value: EncU64) -> u64 {
        *self
            .cells
            .get(value.handle() as usize)
            .expect("Invalid ciphertext handle")
    }

    fn bool_of(&self, cond: EncBool) -> bool {
        *self
            .cells
            .get(cond.handle() as usize)
            .expect("Invalid ciphertext handle")
            != 0
    }

    fn store(&mut self, plain: u64) -> EncU64 {
        EncU64::from_handle(self.cells.insert(plain) as u64)
    }

    fn store_bool(&mut self, truth: bool) -> EncBool {
        EncBool::from_handle(self.cells.insert(truth as u64) as u64)
    }

    fn binary(&mut self, a: EncU64, b: EncU64, cost: u64, op: impl Fn(u64, u64) -> u64) -> EncU64 {
        self.units += cost;
        let result = op(self.value_of(a), self.value_of(b));
        self.store(result)
    }

    fn compare(&mut self, a: EncU64, b: EncU64, op: impl Fn(u64, u64) -> bool) -> EncBool {
        self.units += COST_COMPARE;
        let truth = op(self.value_of(a), self.value_of(b));
        self.store_bool(truth)
    }
}

impl FheBackend for SoftwareFhe {
    fn encrypt(&mut self, plain: u64) -> EncU64 {
        self.units += COST_ENCRYPT;
        self.store(plain)
    }

    fn add(&mut self, a: EncU64, b: EncU64) -> EncU64 {
        self.binary(a, b, COST_ADD_SUB, u64::wrapping_add)
    }

    fn sub(&mut self, a: EncU64, b: EncU64) -> EncU64 {
        self.binary(a, b, COST_ADD_SUB, u64::wrapping_sub)
    }

    fn mul(&mut self, a: EncU64, b: EncU64) -> EncU64 {
        self.binary(a, b, COST_MUL, u64::wrapping_mul)
    }

    fn div(&mut self, a: EncU64, b: EncU64) -> EncU64 {
        self.binary(a, b, COST_DIV, |x, y| {
            if y == 0 {
                u64::MAX
            } else {
                x / y
            }
        })
    }

    fn gt(&mut self, a: EncU64, b: EncU64) -> EncBool {
        self.compare(a, b, |x, y| x > y)
    }

    fn lt(&mut self, a: EncU64, b: EncU64) -> EncBool {
        self.compare(a, b, |x, y| x < y)
    }

    fn gte(&mut self, a: EncU64, b: EncU64) -> EncBool {
        self.compare(a, b, |x, y| x >= y)
    }

    fn lte(&mut self, a: EncU64, b: EncU64) -> EncBool {
        self.compare(a, b, |x, y| x <= y)
    }

    fn eq(&mut self, a: EncU64, b: EncU64) -> EncBool {
        self.compare(a, b, |x, y| x == y)
    }

    fn select(&mut self, cond: EncBool, a: EncU64, b: EncU64) -> EncU64 {
        self.units += COST_SELECT;
        let chosen = if self.bool_of(cond) {
            self.value_of(a)
        } else {
            self.value_of(b)
        };
        // Always a fresh cell, so the chosen branch is not identifiable
        // by handle reuse.
        self.store(chosen)
    }

    fn request_decryption(&mut self, value: EncU64) -> DecryptionId {
        self.units += COST_REQUEST;
        let job = DecryptionJob {
            value: self.value_of(value),
            requested_at: self.clock,
        };
        DecryptionId::from_raw(self.jobs.insert(job) as u64)
    }

    fn fetch_decryption(&self, id: DecryptionId) -> Option<u64> {
        let job = self.jobs.get(id.raw() as usize)?;
        if self.clock >= job.requested_at.saturating_add(self.latency) {
            Some(job.value)
        } else {
            None
        }
    }

    fn compute_units_used(&self) -> u64 {
        self.units
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_reveal() {
        let mut fhe = SoftwareFhe::default();
        let ct = fhe.encrypt(1234);
        assert_eq!(fhe.reveal(ct), 1234);
    }

    #[test]
    fn test_arithmetic() {
        let mut fhe = SoftwareFhe::default();
        let a = fhe.encrypt(10);
        let b = fhe.encrypt(3);

        let sum = fhe.add(a, b);
        let diff = fhe.sub(a, b);
        let prod = fhe.mul(a, b);
        let quot = fhe.div(a, b);

        assert_eq!(fhe.reveal(sum), 13);
        assert_eq!(fhe.reveal(diff), 7);
        assert_eq!(fhe.reveal(prod), 30);
        assert_eq!(fhe.reveal(quot), 3); // floors
    }

    #[test]
    fn test_arithmetic_wraps() {
        let mut fhe = SoftwareFhe::default();
        let max = fhe.encrypt(u64::MAX);
        let two = fhe.encrypt(2);
        let zero = fhe.encrypt(0);
        let one = fhe.encrypt(1);

        let wrapped_add = fhe.add(max, two);
        assert_eq!(fhe.reveal(wrapped_add), 1);

        let wrapped_sub = fhe.sub(zero, one);
        assert_eq!(fhe.reveal(wrapped_sub), u64::MAX);
    }

    #[test]
    fn test_div_by_zero_sentinel() {
        let mut fhe = SoftwareFhe::default();
        let a = fhe.encrypt(10);
        let zero = fhe.encrypt(0);

        let q = fhe.div(a, zero);
        assert_eq!(fhe.reveal(q), u64::MAX);
    }

    #[test]
    fn test_comparisons_and_select() {
        let mut fhe = SoftwareFhe::default();
        let a = fhe.encrypt(5);
        let b = fhe.encrypt(9);

        let lt = fhe.lt(a, b);
        let gt = fhe.gt(a, b);

        let pick_small = fhe.select(lt, a, b);
        let pick_large = fhe.select(gt, a, b);

        assert_eq!(fhe.reveal(pick_small), 5);
        assert_eq!(fhe.reveal(pick_large), 9); // cond false, second branch

        let eq = fhe.eq(a, a);
        let gte = fhe.gte(a, a);
        let lte = fhe.lte(b, a);
        let eq_val = fhe.select(eq, a, b);
        let gte_val = fhe.select(gte, a, b);
        let lte_val = fhe.select(lte, a, b);
        assert_eq!(fhe.reveal(eq_val), 5);
        assert_eq!(fhe.reveal(gte_val), 5);
        assert_eq!(fhe.reveal(lte_val), 9);
    }

    #[test]
    fn test_select_mints_fresh_handle() {
        let mut fhe = SoftwareFhe::default();
        let a = fhe.encrypt(5);
        let b = fhe.encrypt(9);
        let cond = fhe.lt(a, b);

        let chosen = fhe.select(cond, a, b);
        assert_ne!(chosen.handle(), a.handle());
        assert_ne!(chosen.handle(), b.handle());
    }

    #[test]
    fn test_async_decryption() {
        let mut fhe = SoftwareFhe::default(); // latency 1
        let ct = fhe.encrypt(77);
        let id = fhe.request_decryption(ct);

        // Same invocation: not ready.
        assert_eq!(fhe.fetch_decryption(id), None);

        fhe.advance_clock(1);
        assert_eq!(fhe.fetch_decryption(id), Some(77));

        // Stays ready on repeated polls.
        assert_eq!(fhe.fetch_decryption(id), Some(77));
    }

    #[test]
    fn test_zero_latency_decryption() {
        let mut fhe = SoftwareFhe::with_latency(0);
        let ct = fhe.encrypt(42);
        let id = fhe.request_decryption(ct);
        assert_eq!(fhe.fetch_decryption(id), Some(42));
    }

    #[test]
    fn test_longer_latency() {
        let mut fhe = SoftwareFhe::with_latency(3);
        let ct = fhe.encrypt(11);
        let id = fhe.request_decryption(ct);

        fhe.advance_clock(2);
        assert_eq!(fhe.fetch_decryption(id), None);
        fhe.advance_clock(1);
        assert_eq!(fhe.fetch_decryption(id), Some(11));
    }

    #[test]
    fn test_unit_metering() {
        let mut fhe = SoftwareFhe::default();
        assert_eq!(fhe.compute_units_used(), 0);

        let a = fhe.encrypt(1);
        assert_eq!(fhe.compute_units_used(), COST_ENCRYPT);

        let b = fhe.encrypt(2);
        let sum = fhe.add(a, b);
        assert_eq!(fhe.compute_units_used(), 2 * COST_ENCRYPT + COST_ADD_SUB);

        let _ = fhe.mul(sum, a);
        let before_fetch = fhe.compute_units_used();
        assert_eq!(before_fetch, 2 * COST_ENCRYPT + COST_ADD_SUB + COST_MUL);

        // Fetch is free.
        let id = fhe.request_decryption(sum);
        let after_request = fhe.compute_units_used();
        assert_eq!(after_request, before_fetch + COST_REQUEST);
        let _ = fhe.fetch_decryption(id);
        assert_eq!(fhe.compute_units_used(), after_request);
    }

    #[test]
    fn test_jobs_issued() {
        let mut fhe = SoftwareFhe::default();
        let ct = fhe.encrypt(5);
        assert_eq!(fhe.jobs_issued(), 0);
        let _ = fhe.request_decryption(ct);
        let _ = fhe.request_decryption(ct);
        assert_eq!(fhe.jobs_issued(), 2);
    }
}
