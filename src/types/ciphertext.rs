//! Opaque encrypted-value handles.
//!
//! ## Handle Model
//!
//! A ciphertext never lives inside the engine; it lives inside whatever
//! backend implements [`crate::fhe::FheBackend`]. What the engine holds is a
//! *handle*: a small `Copy` token the backend can resolve. Handles carry no
//! plaintext and comparing two handles says nothing about the values behind
//! them, only that they name the same ciphertext cell.
//!
//! ## The Branch Rule
//!
//! [`EncBool`] has no accessor that yields a native `bool`. That is the whole
//! point: an encrypted comparison result can only be consumed by
//! `select(cond, a, b)`, so secret-dependent control flow cannot be written
//! by accident. Turning an encrypted value into plaintext goes exclusively
//! through the asynchronous decryption path ([`DecryptionId`]).

// ============================================================================
// EncU64
// ============================================================================

/// Handle to an encrypted 64-bit unsigned integer.
///
/// ## Example
///
/// ```
/// use dark_curvecore::fhe::{FheBackend, SoftwareFhe};
///
/// let mut fhe = SoftwareFhe::default();
/// let a = fhe.encrypt(40);
/// let b = fhe.encrypt(2);
/// let sum = fhe.add(a, b);
/// assert_eq!(fhe.reveal(sum), 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EncU64(u64);

impl EncU64 {
    /// Wrap a backend-issued handle.
    ///
    /// Backends mint handles; the handle value itself is not secret.
    pub fn from_handle(handle: u64) -> Self {
        Self(handle)
    }

    /// The raw handle value (a backend cell key, not a plaintext).
    #[inline]
    pub fn handle(self) -> u64 {
        self.0
    }
}

// ============================================================================
// EncBool
// ============================================================================

/// Handle to an encrypted boolean, produced only by homomorphic comparisons.
///
/// There is deliberately no `as_bool()`; consume it with
/// `FheBackend::select`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncBool(u64);

impl EncBool {
    /// Wrap a backend-issued handle.
    pub fn from_handle(handle: u64) -> Self {
        Self(handle)
    }

    /// The raw handle value.
    #[inline]
    pub fn handle(self) -> u64 {
        self.0
    }
}

// ============================================================================
// DecryptionId
// ============================================================================

/// Identifier of an outstanding decryption job at the coprocessor.
///
/// Decryption is request/poll, never synchronous: `request_decryption` issues
/// the job and returns this id; `fetch_decryption` answers `None` until the
/// coprocessor has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecryptionId(u64);

impl DecryptionId {
    /// Wrap a backend-issued job id.
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// The raw job id.
    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
