//! Pricing engine module for Dark CurveCore.
//!
//! ## Design Principles
//!
//! The pricing engine is designed for:
//!
//! 1. **Determinism**: Same input always produces same output
//! 2. **Non-Blocking Execution**: A trade never waits on a decryption
//! 3. **Invocation Atomicity**: Each phase commits fully or not at all
//! 4. **Cost Awareness**: Every homomorphic operation is metered
//!
//! ## Layering
//!
//! - [`evaluator`] dispatches curve formulas over encrypted coefficients
//! - [`cache`] memoizes evaluation results per curve epoch
//! - [`decryption`] tracks the asynchronous request/poll/complete cycle
//! - [`venue`] bundles one market's configuration and runtime state
//! - [`protocol`] drives the two-phase trade flow and governance
//!
//! ## Example
//!
//! ```
//! use dark_curvecore::engine::{PricingEngine, VenueParams};
//! use dark_curvecore::fhe::{FheBackend, SoftwareFhe};
//! use dark_curvecore::types::{CurveKind, RiskBounds, TradeDirection, TradeRequest};
//!
//! let mut engine = PricingEngine::new(SoftwareFhe::default());
//!
//! // Curve 2*x + 5, coefficients encrypted client-side.
//! let a = engine.backend_mut().encrypt(2);
//! let b = engine.backend_mut().encrypt(5);
//! let venue = engine
//!     .initialize_venue(VenueParams {
//!         strategist: 7,
//!         kind: CurveKind::Linear,
//!         coefficients: vec![a, b],
//!         bounds: RiskBounds::default(),
//!         reserve_base: 1_000_000,
//!         reserve_quote: 1_000_000,
//!         timestamp: 1_700_000_000,
//!     })
//!     .unwrap();
//!
//! let request = TradeRequest::new(100, TradeDirection::BaseForQuote, 42, 1_700_000_000);
//!
//! // First invocation trades at the public fallback while the
//! // decryption pends.
//! let pre = engine.pre_trade(venue, &request).unwrap();
//! assert!(pre.resolution.is_fallback());
//!
//! // The decryption lands; phase two reconciles it.
//! engine.backend_mut().advance_clock(1);
//! let post = engine.post_trade(venue, &request).unwrap();
//! assert_eq!(post.reconciled, Some(205));
//! ```

pub mod cache;
pub mod decryption;
pub mod evaluator;
pub mod protocol;
pub mod venue;

pub use cache::{CacheStats, CachedPrice, EvaluationCache};
pub use decryption::{DecryptionLedger, DecryptionRecord, DecryptionStatus, PollOutcome};
pub use evaluator::evaluate;
pub use protocol::{
    ExecutionLimits, HealthReport, PostTradeOutcome, PreTradeOutcome, PriceResolution,
    PricingEngine, BASE_FEE_BPS, MAX_FEE_BPS,
};
pub use venue::{PendingTradeComputation, Venue, VenueParams};
