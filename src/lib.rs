//! # Dark CurveCore
//!
//! Confidential trade pricing over homomorphic encryption.
//!
//! ## Architecture
//!
//! The pricing kernel consists of:
//! - **Types**: Core data structures (CurveConfiguration, TradeRequest, Fingerprint)
//! - **Fhe**: The homomorphic backend trait, its software model, and the math kernel
//! - **Engine**: Curve evaluation, caching, async decryption, and the trade protocol
//!
//! ## Design Principles
//!
//! 1. **Determinism**: All operations produce identical results for identical inputs
//! 2. **No Floating Point**: All math uses fixed-point arithmetic (10^12 scaling)
//! 3. **Branchless Secrets**: Encrypted comparisons resolve through `select`, never `if`
//! 4. **Non-Blocking Decryption**: Trades execute on fallbacks while ciphertexts decrypt
//!
//! ## Cost Targets
//!
//! - Cache hit: 0 homomorphic operations per quote
//! - Cold linear quote: 12 compute units end to end
//! - Memory: one cached ciphertext handle per curve epoch

// ============================================================================
// Module declarations
// ============================================================================

/// Core data types: CurveConfiguration, TradeRequest, Fingerprint
pub mod types;

/// Homomorphic backend: FheBackend trait, SoftwareFhe, fixed-point kernel
pub mod fhe;

/// Pricing engine: evaluation, caching, decryption ledger, trade protocol
pub mod engine;

/// Error types shared across the crate
pub mod errors;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use engine::{PricingEngine, PreTradeOutcome, PostTradeOutcome, PriceResolution, VenueParams};
pub use errors::{EngineError, EngineResult};
pub use fhe::{FheBackend, SoftwareFhe};
pub use types::{CurveConfiguration, CurveKind, RiskBounds, TradeDirection, TradeRequest, VenueState};
