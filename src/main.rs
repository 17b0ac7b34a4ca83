//! Dark CurveCore - Binary Entry Point
//!
//! Walks one venue through the full confidential pricing cycle on the
//! software backend: fallback execution while the decryption pends,
//! reconciliation, then a warm quote served from cache.

use dark_curvecore::engine::{PricingEngine, VenueParams};
use dark_curvecore::fhe::{FheBackend, SoftwareFhe};
use dark_curvecore::types::{CurveKind, RiskBounds, TradeDirection, TradeRequest};
use dark_curvecore::EngineError;

fn main() -> Result<(), EngineError> {
    println!("===========================================");
    println!("  Dark CurveCore - Confidential Pricing");
    println!("===========================================");
    println!();

    let mut engine = PricingEngine::new(SoftwareFhe::default());

    // Curve 2*x + 5; only the strategist ever sees these numbers.
    println!("Initializing venue with encrypted linear curve...");
    let a = engine.backend_mut().encrypt(2);
    let b = engine.backend_mut().encrypt(5);
    let venue = engine.initialize_venue(VenueParams {
        strategist: 7,
        kind: CurveKind::Linear,
        coefficients: vec![a, b],
        bounds: RiskBounds::default(),
        reserve_base: 1_000_000,
        reserve_quote: 1_000_000,
        timestamp: 1_700_000_000,
    })?;

    let state = engine.venue_state(venue)?;
    println!("  Venue: {}", venue);
    println!("  Reserves: {} / {}", state.reserve_base, state.reserve_quote);
    println!("  State digest: {}", state.digest_hex());
    println!();

    // Phase one: the decryption cannot land within this invocation, so the
    // trade executes at the public constant-product fallback.
    let request = TradeRequest::new(1_000, TradeDirection::BaseForQuote, 42, 1_700_000_000);
    println!("Pre-trade (cold)...");
    let pre = engine.pre_trade(venue, &request)?;
    println!("  Resolution: {:?}", pre.resolution);
    println!("  Applied price: {}", pre.price);
    println!("  Fee: {}", pre.fee);
    println!("  Compute units: {}", pre.compute_units);
    println!();

    // The coprocessor finishes between invocations.
    engine.backend_mut().advance_clock(1);

    println!("Post-trade...");
    let post = engine.post_trade(venue, &request)?;
    println!("  Had pending: {}", post.had_pending);
    println!("  Reconciled confidential price: {:?}", post.reconciled);
    println!();

    // Same question again: the evaluation cache answers for zero
    // homomorphic cost and the ledger serves the decrypted price.
    println!("Pre-trade (warm)...");
    let warm = engine.pre_trade(venue, &request)?;
    println!("  Resolution: {:?}", warm.resolution);
    println!("  Applied price: {}", warm.price);
    println!("  Compute units: {}", warm.compute_units);
    println!();

    let stats = engine.cache_stats(venue)?;
    let state = engine.venue_state(venue)?;
    println!("Final venue state:");
    println!("  Cache: {} hit(s), {} miss(es)", stats.hits, stats.misses);
    println!("  Reserves: {} / {}", state.reserve_base, state.reserve_quote);
    println!("  Volume: {} across {} trade(s)", state.cumulative_volume, state.trade_count);
    println!("  State digest: {}", state.digest_hex());
    println!();
    println!("Run 'cargo test' to verify all tests pass.");

    Ok(())
}
