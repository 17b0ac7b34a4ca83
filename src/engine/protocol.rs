//! The staged trade-execution protocol and venue governance.
//!
//! ## Two Phases, Never a Wait
//!
//! Decryption takes longer than one invocation, and a trade cannot block.
//! The protocol therefore splits every trade into two entry points:
//!
//! - **pre-trade** evaluates the curve, requests decryption of the price,
//!   and polls once. If an answer is available (fresh or last-known) the
//!   trade executes at it; otherwise it executes at a *public fallback
//!   price* derived from the venue reserves, and a pending record is left
//!   behind.
//! - **post-trade** settles the accounting and, when a pending record
//!   exists, polls again. A decryption that completed in the meantime is
//!   recorded for future trades; the already-applied price is never
//!   retroactively corrected. Liveness over precision.
//!
//! ## Invocation Atomicity
//!
//! Each entry point either commits all of its mutations or none: the venue
//! is snapshotted on entry and restored verbatim when the compute budget
//! trips. A `busy` latch on the venue rejects reentrant calls for the
//! duration of one invocation. There is deliberately no atomicity across
//! the pre/post pair; between the two phases the venue visibly holds the
//! "trade applied, decryption pending" state.

use slab::Slab;

use crate::engine::cache::CacheStats;
use crate::engine::decryption::PollOutcome;
use crate::engine::evaluator::evaluate;
use crate::engine::venue::{PendingTradeComputation, Venue, VenueParams};
use crate::errors::{EngineError, EngineResult};
use crate::fhe::FheBackend;
use crate::types::{
    CurveConfiguration, CurveKind, EncU64, Fingerprint, OperationKind, RiskBounds, TradeDirection,
    TradeRequest, VenueId, VenueState,
};

/// Base protocol fee in basis points
pub const BASE_FEE_BPS: u64 = 30;

/// Ceiling on the dynamic fee in basis points
pub const MAX_FEE_BPS: u64 = 1_000;

/// Seconds in a day, the staleness threshold for health scoring
const STALENESS_SECS: u64 = 86_400;

// ============================================================================
// Configuration & outcome types
// ============================================================================

/// Engine-wide execution limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionLimits {
    /// Abort any single invocation that meters past this many compute units
    pub max_compute_units: u64,

    /// Lifetime of evaluation-cache entries in seconds
    pub cache_ttl_secs: u64,
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        Self {
            max_compute_units: 10_000,
            cache_ttl_secs: 300,
        }
    }
}

/// How pre-trade arrived at its price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceResolution {
    /// A decrypted confidential price was applied
    Resolved {
        /// True when it came from the last-known value rather than a
        /// completion in this invocation
        from_cache: bool,
    },
    /// The public fallback price was applied; a pending record was left
    PendingFallback,
}

impl PriceResolution {
    /// True when a confidential price (fresh or last-known) was applied
    #[inline]
    pub fn is_resolved(&self) -> bool {
        matches!(self, PriceResolution::Resolved { .. })
    }

    /// True when the public fallback was applied
    #[inline]
    pub fn is_fallback(&self) -> bool {
        matches!(self, PriceResolution::PendingFallback)
    }

    /// True when the applied price was the stale last-known value
    #[inline]
    pub fn is_from_cache(&self) -> bool {
        matches!(self, PriceResolution::Resolved { from_cache: true })
    }
}

/// Result of the pre-trade phase.
#[derive(Debug, Clone, Copy)]
pub struct PreTradeOutcome {
    /// The price that was applied to the reserves
    pub price: u64,

    /// Protocol fee charged on the input amount
    pub fee: u64,

    /// How the price was obtained
    pub resolution: PriceResolution,

    /// Trade fingerprint linking this phase to post-trade
    pub fingerprint: Fingerprint,

    /// Compute units this invocation consumed
    pub compute_units: u64,
}

/// Result of the post-trade phase.
#[derive(Debug, Clone, Copy)]
pub struct PostTradeOutcome {
    /// The confidential price whose decryption completed between the
    /// phases, if any. Informational; it was not applied to this trade.
    pub reconciled: Option<u64>,

    /// True when pre-trade had left a pending record for this trade
    pub had_pending: bool,

    /// Trade fingerprint
    pub fingerprint: Fingerprint,
}

/// Venue health summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthReport {
    /// 0..=100
    pub score: u8,

    /// True when the score is at least 70
    pub healthy: bool,
}

// ============================================================================
// PricingEngine
// ============================================================================

/// The confidential pricing engine.
///
/// Owns the homomorphic backend, the venue arena, and the execution limits.
/// Generic over [`FheBackend`] so tests and the demo run on
/// [`crate::fhe::SoftwareFhe`] while deployments bind a real coprocessor.
///
/// ## Example
///
/// ```
/// use dark_curvecore::engine::{PricingEngine, VenueParams};
/// use dark_curvecore::fhe::{FheBackend, SoftwareFhe};
/// use dark_curvecore::types::{CurveKind, RiskBounds, TradeDirection, TradeRequest};
///
/// let mut engine = PricingEngine::new(SoftwareFhe::default());
/// let a = engine.backend_mut().encrypt(2);
/// let b = engine.backend_mut().encrypt(5);
/// let venue = engine
///     .initialize_venue(VenueParams {
///         strategist: 7,
///         kind: CurveKind::Linear,
///         coefficients: vec![a, b],
///         bounds: RiskBounds::default(),
///         reserve_base: 1_000_000,
///         reserve_quote: 1_000_000,
///         timestamp: 1_700_000_000,
///     })
///     .unwrap();
///
/// let request = TradeRequest::new(100, TradeDirection::BaseForQuote, 42, 1_700_000_000);
/// let outcome = engine.pre_trade(venue, &request).unwrap();
/// assert!(outcome.resolution.is_fallback()); // decryption needs a tick
/// ```
pub struct PricingEngine<B: FheBackend> {
    /// Homomorphic coprocessor binding
    fhe: B,

    /// Venue arena; `VenueId` is the slot key
    venues: Slab<Venue>,

    /// Engine-wide limits
    limits: ExecutionLimits,
}

impl<B: FheBackend> PricingEngine<B> {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Create an engine with default limits
    pub fn new(fhe: B) -> Self {
        Self::with_limits(fhe, ExecutionLimits::default())
    }

    /// Create an engine with explicit limits
    pub fn with_limits(fhe: B, limits: ExecutionLimits) -> Self {
        Self {
            fhe,
            venues: Slab::new(),
            limits,
        }
    }

    // ========================================================================
    // Trading Protocol
    // ========================================================================

    /// Phase one: price and apply a trade.
    ///
    /// # Arguments
    ///
    /// * `venue_id` - Target venue
    /// * `request` - The trade; the same request must be passed to
    ///   [`PricingEngine::post_trade`]
    ///
    /// # Returns
    ///
    /// * `Ok(PreTradeOutcome)` - Applied price, fee, and resolution
    /// * `Err(...)` - Unknown/inactive/busy venue, or budget abort (venue
    ///   restored untouched)
    pub fn pre_trade(
        &mut self,
        venue_id: VenueId,
        request: &TradeRequest,
    ) -> EngineResult<PreTradeOutcome> {
        let venue = self
            .venues
            .get_mut(venue_id)
            .ok_or(EngineError::UnknownVenue(venue_id as u64))?;
        if !venue.config.active {
            return Err(EngineError::VenueInactive(venue_id as u64));
        }
        if venue.busy {
            return Err(EngineError::VenueBusy(venue_id as u64));
        }

        // Snapshot before the latch so a restore clears it too.
        let snapshot = venue.clone();
        venue.busy = true;

        let trade_fp = Fingerprint::for_trade(venue_id, request);
        let op_fp = operation_fingerprint(venue_id, request, &venue.config);

        let units_before = self.fhe.compute_units_used();

        let x = self.fhe.encrypt(request.amount_in);
        let price_ct = match evaluate(
            &mut self.fhe,
            &venue.config,
            &mut venue.cache,
            x,
            request.timestamp,
        ) {
            Ok(ct) => ct,
            Err(e) => {
                *venue = snapshot;
                return Err(e);
            }
        };

        // Warm the decryption pipeline for this computation whether or not
        // this trade gets to use the answer.
        venue
            .decryptions
            .request(&mut self.fhe, op_fp, price_ct, request.timestamp);

        let (price, resolution) = match venue.decryptions.poll(&self.fhe, &op_fp) {
            PollOutcome::Fresh(value) => {
                venue.decryptions.complete(op_fp, value, request.timestamp);
                (value, PriceResolution::Resolved { from_cache: false })
            }
            PollOutcome::FromCache(value) => {
                // Stale but confidential beats fresh but public.
                (value, PriceResolution::Resolved { from_cache: true })
            }
            PollOutcome::NotReady => {
                let fallback = fallback_price(
                    &venue.state,
                    &venue.config.bounds,
                    request.amount_in,
                    request.direction,
                );
                venue.pending.insert(
                    trade_fp,
                    PendingTradeComputation {
                        fallback_price: fallback,
                        computed_at: request.timestamp,
                        pending: true,
                    },
                );
                (fallback, PriceResolution::PendingFallback)
            }
        };

        let compute_units = self.fhe.compute_units_used() - units_before;
        if compute_units > self.limits.max_compute_units {
            // Whole-trade abort: cache fills, ledger warm-ups, and pending
            // records from this invocation all roll back with the snapshot.
            *venue = snapshot;
            return Err(EngineError::BudgetExceeded {
                used: compute_units,
                budget: self.limits.max_compute_units,
            });
        }

        let fee = dynamic_fee(
            request.amount_in,
            venue.config.bounds.volatility_bps,
            compute_units,
        );
        apply_reserves(&mut venue.state, request, price);

        venue.busy = false;
        Ok(PreTradeOutcome {
            price,
            fee,
            resolution,
            fingerprint: trade_fp,
            compute_units,
        })
    }

    /// Phase two: settle a trade's accounting and reconcile its decryption.
    ///
    /// A paused venue still settles its in-flight trades; only new
    /// pre-trades are rejected.
    pub fn post_trade(
        &mut self,
        venue_id: VenueId,
        request: &TradeRequest,
    ) -> EngineResult<PostTradeOutcome> {
        let venue = self
            .venues
            .get_mut(venue_id)
            .ok_or(EngineError::UnknownVenue(venue_id as u64))?;
        if venue.busy {
            return Err(EngineError::VenueBusy(venue_id as u64));
        }
        venue.busy = true;

        let trade_fp = Fingerprint::for_trade(venue_id, request);
        let op_fp = operation_fingerprint(venue_id, request, &venue.config);

        // The pending record lives exactly one trade; consume it either way.
        let had_pending = venue.pending.remove(&trade_fp).is_some();

        let mut reconciled = None;
        if had_pending {
            if let PollOutcome::Fresh(value) = venue.decryptions.poll(&self.fhe, &op_fp) {
                venue.decryptions.complete(op_fp, value, request.timestamp);
                reconciled = Some(value);
            }
        }

        // Applied prices stay applied; only the rolling accounting moves.
        venue.state.cumulative_volume = venue
            .state
            .cumulative_volume
            .saturating_add(request.amount_in);
        venue.state.trade_count += 1;
        venue.state.last_trade_at = request.timestamp;

        venue.busy = false;
        Ok(PostTradeOutcome {
            reconciled,
            had_pending,
            fingerprint: trade_fp,
        })
    }

    // ========================================================================
    // Governance
    // ========================================================================

    /// Create a venue from validated parameters.
    ///
    /// # Returns
    ///
    /// * `Ok(VenueId)` - Stable arena id of the new venue
    /// * `Err(...)` - Bound or coefficient-count violation; nothing created
    pub fn initialize_venue(&mut self, params: VenueParams) -> EngineResult<VenueId> {
        let config = CurveConfiguration::new(
            params.kind,
            params.coefficients,
            params.bounds,
            params.strategist,
            params.timestamp,
        )?;
        let state = VenueState::new(params.reserve_base, params.reserve_quote);
        let venue = Venue::new(config, state, self.limits.cache_ttl_secs);
        Ok(self.venues.insert(venue))
    }

    /// Replace the whole curve: kind, coefficients, and bounds.
    ///
    /// Strategist-only. Bumps `last_update`, which rolls the cache and
    /// decryption keys to a fresh epoch.
    pub fn update_curve(
        &mut self,
        venue_id: VenueId,
        caller: u64,
        kind: CurveKind,
        coefficients: Vec<EncU64>,
        bounds: RiskBounds,
        now: u64,
    ) -> EngineResult<()> {
        let venue = self.venue_mut(venue_id)?;
        authorize(venue, venue_id, caller)?;
        bounds.validate()?;
        CurveConfiguration::check_coefficient_count(kind, coefficients.len())?;

        venue.config.kind = kind;
        venue.config.coefficients = coefficients;
        venue.config.bounds = bounds;
        venue.config.last_update = now;
        Ok(())
    }

    /// Swap coefficients without touching anything else.
    ///
    /// Strategist-only. Leaves `last_update` untouched, so cached prices
    /// keyed on the current epoch stay live until TTL expiry; a strategist
    /// who wants the change to take effect immediately uses
    /// [`PricingEngine::update_curve`] instead.
    pub fn set_coefficients(
        &mut self,
        venue_id: VenueId,
        caller: u64,
        coefficients: Vec<EncU64>,
    ) -> EngineResult<()> {
        let venue = self.venue_mut(venue_id)?;
        authorize(venue, venue_id, caller)?;
        CurveConfiguration::check_coefficient_count(venue.config.kind, coefficients.len())?;

        venue.config.coefficients = coefficients;
        Ok(())
    }

    /// Hand the venue to a new strategist. Strategist-only.
    pub fn transfer_strategist(
        &mut self,
        venue_id: VenueId,
        caller: u64,
        new_strategist: u64,
    ) -> EngineResult<()> {
        let venue = self.venue_mut(venue_id)?;
        authorize(venue, venue_id, caller)?;
        venue.config.strategist = new_strategist;
        Ok(())
    }

    /// Stop accepting new trades. Strategist-only; configuration survives.
    pub fn pause(&mut self, venue_id: VenueId, caller: u64) -> EngineResult<()> {
        let venue = self.venue_mut(venue_id)?;
        authorize(venue, venue_id, caller)?;
        venue.config.active = false;
        Ok(())
    }

    /// Resume accepting trades. Strategist-only.
    pub fn resume(&mut self, venue_id: VenueId, caller: u64) -> EngineResult<()> {
        let venue = self.venue_mut(venue_id)?;
        authorize(venue, venue_id, caller)?;
        venue.config.active = true;
        Ok(())
    }

    // ========================================================================
    // Health & Accessors
    // ========================================================================

    /// Score a venue's operational health.
    ///
    /// Starts at 100: -20 when liquidity is under twice the configured
    /// floor, -15 when volatility exceeds 1,000 bps, -10 when the curve has
    /// not been updated for a day. Healthy means 70 or better.
    pub fn health_score(&self, venue_id: VenueId, now: u64) -> EngineResult<HealthReport> {
        let venue = self.venue(venue_id)?;

        let mut score: u8 = 100;
        if venue.state.total_liquidity < venue.config.bounds.min_liquidity.saturating_mul(2) {
            score -= 20;
        }
        if venue.config.bounds.volatility_bps > 1_000 {
            score -= 15;
        }
        if now.saturating_sub(venue.config.last_update) > STALENESS_SECS {
            score -= 10;
        }

        Ok(HealthReport {
            score,
            healthy: score >= 70,
        })
    }

    /// The venue's curve configuration
    pub fn curve_configuration(&self, venue_id: VenueId) -> EngineResult<&CurveConfiguration> {
        Ok(&self.venue(venue_id)?.config)
    }

    /// The venue's public accounting state
    pub fn venue_state(&self, venue_id: VenueId) -> EngineResult<&VenueState> {
        Ok(&self.venue(venue_id)?.state)
    }

    /// The venue's cache counters
    pub fn cache_stats(&self, venue_id: VenueId) -> EngineResult<CacheStats> {
        Ok(self.venue(venue_id)?.cache.stats())
    }

    /// Drop the venue's cached evaluations
    pub fn clear_cache(&mut self, venue_id: VenueId) -> EngineResult<()> {
        self.venue_mut(venue_id)?.cache.clear();
        Ok(())
    }

    /// Number of venues ever initialized
    #[inline]
    pub fn venue_count(&self) -> usize {
        self.venues.len()
    }

    /// The homomorphic backend
    #[inline]
    pub fn backend(&self) -> &B {
        &self.fhe
    }

    /// The homomorphic backend, mutably.
    ///
    /// Callers encrypt coefficients and trade-independent inputs through
    /// this; tests drive the software backend's clock through it.
    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.fhe
    }

    fn venue(&self, venue_id: VenueId) -> EngineResult<&Venue> {
        self.venues
            .get(venue_id)
            .ok_or(EngineError::UnknownVenue(venue_id as u64))
    }

    fn venue_mut(&mut self, venue_id: VenueId) -> EngineResult<&mut Venue> {
        self.venues
            .get_mut(venue_id)
            .ok_or(EngineError::UnknownVenue(venue_id as u64))
    }
}

// ============================================================================
// Pricing helpers
// ============================================================================

/// Ledger key for one confidential price computation.
///
/// Scoped to trade size, direction, and the curve's update epoch; two
/// traders asking the same question share the key and the warmed answer.
fn operation_fingerprint(
    venue_id: VenueId,
    request: &TradeRequest,
    cfg: &CurveConfiguration,
) -> Fingerprint {
    Fingerprint::for_operation(
        venue_id,
        OperationKind::SwapPrice,
        request.amount_in,
        request.direction.to_u8() as u64,
        cfg.last_update,
    )
}

/// Public constant-product fallback, volatility-adjusted.
///
/// `out = r_out - r_in*r_out/(r_in + amount)`, scaled by
/// `(10_000 + volatility_bps)/10_000`. Empty reserves fall back to 95% of
/// the input. Pure plaintext; u128 intermediates keep the products exact.
fn fallback_price(
    state: &VenueState,
    bounds: &RiskBounds,
    amount_in: u64,
    direction: TradeDirection,
) -> u64 {
    let (r_in, r_out) = match direction {
        TradeDirection::BaseForQuote => (state.reserve_base, state.reserve_quote),
        TradeDirection::QuoteForBase => (state.reserve_quote, state.reserve_base),
    };

    if r_in == 0 || r_out == 0 {
        return ((amount_in as u128) * 95 / 100) as u64;
    }

    let r_in = r_in as u128;
    let r_out = r_out as u128;
    let amount = amount_in as u128;

    let out = r_out - (r_in * r_out) / (r_in + amount);
    let adjusted = out * (10_000 + bounds.volatility_bps as u128) / 10_000;
    adjusted.min(u64::MAX as u128) as u64
}

/// Base fee plus volatility and compute-cost terms, capped.
fn dynamic_fee(amount_in: u64, volatility_bps: u64, compute_units: u64) -> u64 {
    let fee_bps = (BASE_FEE_BPS + volatility_bps / 50 + compute_units / 50).min(MAX_FEE_BPS);
    ((amount_in as u128 * fee_bps as u128) / 10_000) as u64
}

/// Apply a priced trade to the reserves.
///
/// The input side grows by the full amount; the output side shrinks by the
/// price, capped at what the reserve actually holds.
fn apply_reserves(state: &mut VenueState, request: &TradeRequest, price: u64) {
    match request.direction {
        TradeDirection::BaseForQuote => {
            state.reserve_base = state.reserve_base.saturating_add(request.amount_in);
            let out = price.min(state.reserve_quote);
            state.reserve_quote -= out;
        }
        TradeDirection::QuoteForBase => {
            state.reserve_quote = state.reserve_quote.saturating_add(request.amount_in);
            let out = price.min(state.reserve_base);
            state.reserve_base -= out;
        }
    }
    state.total_liquidity = state.reserve_base.saturating_add(state.reserve_quote);
}

fn authorize(venue: &Venue, venue_id: VenueId, caller: u64) -> EngineResult<()> {
    if venue.config.strategist != caller {
        return Err(EngineError::NotStrategist {
            venue: venue_id as u64,
            caller,
        });
    }
    Ok(())
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fhe::SoftwareFhe;

    const STRATEGIST: u64 = 7;
    const TRADER: u64 = 42;
    const T0: u64 = 1_000_000;

    fn engine() -> PricingEngine<SoftwareFhe> {
        PricingEngine::new(SoftwareFhe::default())
    }

    fn linear_venue(
        engine: &mut PricingEngine<SoftwareFhe>,
        reserves: (u64, u64),
        volatility_bps: u64,
    ) -> VenueId {
        // 2*x + 5
        let a = engine.backend_mut().encrypt(2);
        let b = engine.backend_mut().encrypt(5);
        let bounds = RiskBounds {
            volatility_bps,
            ..RiskBounds::default()
        };
        engine
            .initialize_venue(VenueParams {
                strategist: STRATEGIST,
                kind: CurveKind::Linear,
                coefficients: vec![a, b],
                bounds,
                reserve_base: reserves.0,
                reserve_quote: reserves.1,
                timestamp: T0,
            })
            .unwrap()
    }

    fn req(amount: u64, t: u64) -> TradeRequest {
        TradeRequest::new(amount, TradeDirection::BaseForQuote, TRADER, t)
    }

    // ------------------------------------------------------------------
    // Fallback and fee helpers
    // ------------------------------------------------------------------

    #[test]
    fn test_fallback_constant_product() {
        let state = VenueState::new(1_000, 1_000);
        let bounds = RiskBounds {
            volatility_bps: 0,
            ..RiskBounds::default()
        };

        // 1000 - 1000*1000/1100 = 91
        let p = fallback_price(&state, &bounds, 100, TradeDirection::BaseForQuote);
        assert_eq!(p, 91);

        // Same inputs, same answer.
        let again = fallback_price(&state, &bounds, 100, TradeDirection::BaseForQuote);
        assert_eq!(p, again);
    }

    #[test]
    fn test_fallback_volatility_adjustment() {
        let state = VenueState::new(1_000, 1_000);
        let bounds = RiskBounds {
            volatility_bps: 500,
            ..RiskBounds::default()
        };

        // 91 * 10500 / 10000 = 95 (floored)
        let p = fallback_price(&state, &bounds, 100, TradeDirection::BaseForQuote);
        assert_eq!(p, 95);
    }

    #[test]
    fn test_fallback_respects_direction() {
        let state = VenueState::new(2_000, 1_000);
        let bounds = RiskBounds {
            volatility_bps: 0,
            ..RiskBounds::default()
        };

        // Quote in, base out: 2000 - 2000*1000/1100 = 182
        let p = fallback_price(&state, &bounds, 100, TradeDirection::QuoteForBase);
        assert_eq!(p, 182);
    }

    #[test]
    fn test_fallback_empty_reserves() {
        let state = VenueState::new(0, 0);
        let bounds = RiskBounds::default();
        assert_eq!(
            fallback_price(&state, &bounds, 100, TradeDirection::BaseForQuote),
            95
        );
        assert_eq!(
            fallback_price(&state, &bounds, 1, TradeDirection::BaseForQuote),
            0
        );
    }

    #[test]
    fn test_dynamic_fee_terms_and_cap() {
        // Base fee only.
        assert_eq!(dynamic_fee(10_000, 0, 0), 30);
        // Volatility term: 30 + 2500/50 = 80 bps.
        assert_eq!(dynamic_fee(10_000, 2_500, 0), 80);
        // Compute term: 30 + 5000/50 = 130 bps.
        assert_eq!(dynamic_fee(10_000, 0, 5_000), 130);
        // Cap: 30 + 200 + 2000 = 2230, capped at 1000 bps.
        assert_eq!(dynamic_fee(10_000, 10_000, 100_000), 1_000);
    }

    #[test]
    fn test_apply_reserves_caps_output() {
        let mut state = VenueState::new(1_000, 50);
        let request = req(100, T0);
        apply_reserves(&mut state, &request, 205);

        assert_eq!(state.reserve_base, 1_100);
        assert_eq!(state.reserve_quote, 0); // only 50 was available
        assert_eq!(state.total_liquidity, 1_100);
    }

    // ------------------------------------------------------------------
    // Initialization and validation
    // ------------------------------------------------------------------

    #[test]
    fn test_initialize_assigns_sequential_ids() {
        let mut engine = engine();
        let v0 = linear_venue(&mut engine, (1_000, 1_000), 0);
        let v1 = linear_venue(&mut engine, (1_000, 1_000), 0);
        assert_eq!(v0, 0);
        assert_eq!(v1, 1);
        assert_eq!(engine.venue_count(), 2);
    }

    #[test]
    fn test_initialize_rejects_bad_bounds() {
        let mut engine = engine();
        let a = engine.backend_mut().encrypt(2);
        let b = engine.backend_mut().encrypt(5);
        let err = engine
            .initialize_venue(VenueParams {
                strategist: STRATEGIST,
                kind: CurveKind::Linear,
                coefficients: vec![a, b],
                bounds: RiskBounds {
                    max_leverage: 0,
                    ..RiskBounds::default()
                },
                reserve_base: 1_000,
                reserve_quote: 1_000,
                timestamp: T0,
            })
            .unwrap_err();

        assert!(matches!(err, EngineError::InvalidBound { .. }));
        assert_eq!(engine.venue_count(), 0);
    }

    #[test]
    fn test_initialize_rejects_short_coefficients() {
        let mut engine = engine();
        let a = engine.backend_mut().encrypt(2);
        let err = engine
            .initialize_venue(VenueParams {
                strategist: STRATEGIST,
                kind: CurveKind::Sigmoid,
                coefficients: vec![a],
                bounds: RiskBounds::default(),
                reserve_base: 1_000,
                reserve_quote: 1_000,
                timestamp: T0,
            })
            .unwrap_err();

        assert_eq!(
            err,
            EngineError::CoefficientCount {
                required: 3,
                actual: 1,
            }
        );
    }

    // ------------------------------------------------------------------
    // Pre-trade
    // ------------------------------------------------------------------

    #[test]
    fn test_pre_trade_unknown_venue() {
        let mut engine = engine();
        let err = engine.pre_trade(99, &req(100, T0)).unwrap_err();
        assert_eq!(err, EngineError::UnknownVenue(99));
    }

    #[test]
    fn test_pre_trade_falls_back_while_decryption_pends() {
        let mut engine = engine();
        let venue = linear_venue(&mut engine, (1_000, 1_000), 0);

        let outcome = engine.pre_trade(venue, &req(100, T0)).unwrap();

        assert_eq!(outcome.price, 91);
        assert!(outcome.resolution.is_fallback());
        assert!(outcome.compute_units > 0);

        let state = engine.venue_state(venue).unwrap();
        assert_eq!(state.reserve_base, 1_100);
        assert_eq!(state.reserve_quote, 909);
        assert_eq!(state.total_liquidity, 2_009);
        // Accounting waits for post-trade.
        assert_eq!(state.trade_count, 0);
    }

    #[test]
    fn test_pre_trade_fee_on_fallback_path() {
        let mut engine = engine();
        let venue = linear_venue(&mut engine, (1_000_000, 1_000_000), 0);

        let outcome = engine.pre_trade(venue, &req(10_000, T0)).unwrap();

        // Cold linear path meters 12 units; both dynamic terms floor to
        // zero, leaving the 30 bps base.
        assert_eq!(outcome.compute_units, 12);
        assert_eq!(outcome.fee, 30);
    }

    #[test]
    fn test_pre_trade_resolves_synchronously_at_zero_latency() {
        let mut engine = PricingEngine::new(SoftwareFhe::with_latency(0));
        let venue = linear_venue(&mut engine, (100_000, 100_000), 0);

        let outcome = engine.pre_trade(venue, &req(100, T0)).unwrap();

        // 2*100 + 5, decrypted within the invocation.
        assert_eq!(outcome.price, 205);
        assert_eq!(
            outcome.resolution,
            PriceResolution::Resolved { from_cache: false }
        );

        // No pending record, so post-trade has nothing to reconcile.
        let settled = engine.post_trade(venue, &req(100, T0)).unwrap();
        assert!(!settled.had_pending);
        assert_eq!(settled.reconciled, None);
    }

    #[test]
    fn test_pre_trade_rejects_paused_venue() {
        let mut engine = engine();
        let venue = linear_venue(&mut engine, (1_000, 1_000), 0);

        engine.pause(venue, STRATEGIST).unwrap();
        let err = engine.pre_trade(venue, &req(100, T0)).unwrap_err();
        assert_eq!(err, EngineError::VenueInactive(venue as u64));

        engine.resume(venue, STRATEGIST).unwrap();
        assert!(engine.pre_trade(venue, &req(100, T0)).is_ok());
    }

    #[test]
    fn test_busy_venue_rejects_both_phases() {
        let mut engine = engine();
        let venue = linear_venue(&mut engine, (1_000, 1_000), 0);

        engine.venues.get_mut(venue).unwrap().busy = true;
        assert_eq!(
            engine.pre_trade(venue, &req(100, T0)).unwrap_err(),
            EngineError::VenueBusy(venue as u64)
        );
        assert_eq!(
            engine.post_trade(venue, &req(100, T0)).unwrap_err(),
            EngineError::VenueBusy(venue as u64)
        );
    }

    #[test]
    fn test_budget_abort_restores_venue() {
        let mut engine = PricingEngine::with_limits(
            SoftwareFhe::default(),
            ExecutionLimits {
                max_compute_units: 5,
                cache_ttl_secs: 300,
            },
        );
        let venue = linear_venue(&mut engine, (1_000, 1_000), 0);

        let err = engine.pre_trade(venue, &req(100, T0)).unwrap_err();
        match err {
            EngineError::BudgetExceeded { used, budget } => {
                assert!(used > budget);
                assert_eq!(budget, 5);
            }
            other => panic!("expected budget abort, got {:?}", other),
        }

        // Reserves, cache counters, and the ledger all rolled back.
        let state = engine.venue_state(venue).unwrap();
        assert_eq!(state.reserve_base, 1_000);
        assert_eq!(state.reserve_quote, 1_000);
        let stats = engine.cache_stats(venue).unwrap();
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.entries, 0);

        // The latch rolled back too: the next attempt aborts on budget
        // again, not on busyness.
        let err = engine.pre_trade(venue, &req(100, T0)).unwrap_err();
        assert!(matches!(err, EngineError::BudgetExceeded { .. }));
    }

    // ------------------------------------------------------------------
    // Two-phase flow
    // ------------------------------------------------------------------

    #[test]
    fn test_full_trade_cycle_with_reconciliation() {
        let mut engine = engine();
        let venue = linear_venue(&mut engine, (1_000, 1_000), 0);
        let request = req(100, T0);

        // Phase one: decryption pends, fallback applies.
        let pre = engine.pre_trade(venue, &request).unwrap();
        assert!(pre.resolution.is_fallback());
        assert_eq!(pre.price, 91);

        // The coprocessor finishes between invocations.
        engine.backend_mut().advance_clock(1);

        // Phase two: reconciles the now-ready confidential price.
        let post = engine.post_trade(venue, &request).unwrap();
        assert!(post.had_pending);
        assert_eq!(post.reconciled, Some(205));
        assert_eq!(post.fingerprint, pre.fingerprint);

        let state = engine.venue_state(venue).unwrap();
        assert_eq!(state.cumulative_volume, 100);
        assert_eq!(state.trade_count, 1);
        assert_eq!(state.last_trade_at, T0);
        // The applied fallback price was not retroactively corrected.
        assert_eq!(state.reserve_quote, 909);
    }

    #[test]
    fn test_second_trade_uses_warmed_decryption() {
        let mut engine = engine();
        let venue = linear_venue(&mut engine, (1_000, 1_000), 0);
        let request = req(100, T0);

        let first = engine.pre_trade(venue, &request).unwrap();
        assert!(first.resolution.is_fallback());

        engine.backend_mut().advance_clock(1);
        engine.post_trade(venue, &request).unwrap();

        // Same question again: the ledger holds the completed answer, so
        // the trade resolves from the last-known value even though the
        // re-requested decryption has not landed yet.
        let second = engine.pre_trade(venue, &request).unwrap();
        assert_eq!(second.price, 205);
        assert!(second.resolution.is_from_cache());

        // And it came off the evaluation cache for free.
        let stats = engine.cache_stats(venue).unwrap();
        assert_eq!(stats.hits, 1);
    }

    #[test]
    fn test_post_trade_settles_on_paused_venue() {
        let mut engine = engine();
        let venue = linear_venue(&mut engine, (1_000, 1_000), 0);
        let request = req(100, T0);

        engine.pre_trade(venue, &request).unwrap();
        engine.pause(venue, STRATEGIST).unwrap();

        // The in-flight trade still settles.
        let post = engine.post_trade(venue, &request).unwrap();
        assert!(post.had_pending);
        assert_eq!(engine.venue_state(venue).unwrap().trade_count, 1);
    }

    #[test]
    fn test_pending_record_consumed_once() {
        let mut engine = engine();
        let venue = linear_venue(&mut engine, (1_000, 1_000), 0);
        let request = req(100, T0);

        engine.pre_trade(venue, &request).unwrap();
        let first = engine.post_trade(venue, &request).unwrap();
        assert!(first.had_pending);

        // Settling the same fingerprint again finds nothing.
        let second = engine.post_trade(venue, &request).unwrap();
        assert!(!second.had_pending);
        assert_eq!(second.reconciled, None);
    }

    // ------------------------------------------------------------------
    // Governance
    // ------------------------------------------------------------------

    #[test]
    fn test_strategist_gating() {
        let mut engine = engine();
        let venue = linear_venue(&mut engine, (1_000, 1_000), 0);
        let stranger = 1_234;

        assert_eq!(
            engine.pause(venue, stranger).unwrap_err(),
            EngineError::NotStrategist {
                venue: venue as u64,
                caller: stranger,
            }
        );

        let c = engine.backend_mut().encrypt(9);
        let d = engine.backend_mut().encrypt(9);
        assert!(engine
            .set_coefficients(venue, stranger, vec![c, d])
            .is_err());
        assert!(engine
            .update_curve(
                venue,
                stranger,
                CurveKind::Linear,
                vec![c, d],
                RiskBounds::default(),
                T0 + 10,
            )
            .is_err());
        assert!(engine.transfer_strategist(venue, stranger, stranger).is_err());
    }

    #[test]
    fn test_transfer_strategist_moves_authority() {
        let mut engine = engine();
        let venue = linear_venue(&mut engine, (1_000, 1_000), 0);
        let successor = 8;

        engine
            .transfer_strategist(venue, STRATEGIST, successor)
            .unwrap();

        // The old strategist is out, the new one is in.
        assert!(engine.pause(venue, STRATEGIST).is_err());
        engine.pause(venue, successor).unwrap();
        engine.resume(venue, successor).unwrap();
    }

    #[test]
    fn test_update_curve_bumps_epoch_and_revalidates() {
        let mut engine = engine();
        let venue = linear_venue(&mut engine, (1_000, 1_000), 0);

        let a = engine.backend_mut().encrypt(1);
        let b = engine.backend_mut().encrypt(2);
        let c = engine.backend_mut().encrypt(3);
        engine
            .update_curve(
                venue,
                STRATEGIST,
                CurveKind::Polynomial,
                vec![a, b, c],
                RiskBounds::default(),
                T0 + 500,
            )
            .unwrap();

        let cfg = engine.curve_configuration(venue).unwrap();
        assert_eq!(cfg.kind, CurveKind::Polynomial);
        assert_eq!(cfg.last_update, T0 + 500);

        // Short vector rejected without touching the configuration.
        let a = engine.backend_mut().encrypt(1);
        let err = engine
            .update_curve(
                venue,
                STRATEGIST,
                CurveKind::Polynomial,
                vec![a],
                RiskBounds::default(),
                T0 + 600,
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::CoefficientCount { .. }));
        assert_eq!(
            engine.curve_configuration(venue).unwrap().last_update,
            T0 + 500
        );
    }

    #[test]
    fn test_coefficient_swap_serves_stale_price_until_epoch_bump() {
        let mut engine = PricingEngine::new(SoftwareFhe::with_latency(0));
        let venue = linear_venue(&mut engine, (100_000, 100_000), 0);

        // 2*100 + 5 resolves synchronously.
        let first = engine.pre_trade(venue, &req(100, T0)).unwrap();
        assert_eq!(first.price, 205);

        // Swap to 3*x + 7 without bumping the epoch.
        let a = engine.backend_mut().encrypt(3);
        let b = engine.backend_mut().encrypt(7);
        engine.set_coefficients(venue, STRATEGIST, vec![a, b]).unwrap();

        // Same size, next minute: cache and ledger keys are unchanged, so
        // the old curve's price is still served.
        let stale = engine.pre_trade(venue, &req(100, T0 + 60)).unwrap();
        assert_eq!(stale.price, 205);

        // A full update rolls the epoch and the new curve takes effect.
        let a = engine.backend_mut().encrypt(3);
        let b = engine.backend_mut().encrypt(7);
        engine
            .update_curve(
                venue,
                STRATEGIST,
                CurveKind::Linear,
                vec![a, b],
                RiskBounds {
                    volatility_bps: 0,
                    ..RiskBounds::default()
                },
                T0 + 120,
            )
            .unwrap();

        let fresh = engine.pre_trade(venue, &req(100, T0 + 120)).unwrap();
        assert_eq!(fresh.price, 307);
    }

    // ------------------------------------------------------------------
    // Health
    // ------------------------------------------------------------------

    #[test]
    fn test_health_score_of_fresh_venue() {
        let mut engine = engine();
        let venue = linear_venue(&mut engine, (1_000, 1_000), 0);

        // Liquidity 2000 is exactly twice the 1000 floor: no deduction.
        let report = engine.health_score(venue, T0).unwrap();
        assert_eq!(report.score, 100);
        assert!(report.healthy);
    }

    #[test]
    fn test_health_score_deductions_stack() {
        let mut engine = engine();
        let a = engine.backend_mut().encrypt(2);
        let b = engine.backend_mut().encrypt(5);
        let venue = engine
            .initialize_venue(VenueParams {
                strategist: STRATEGIST,
                kind: CurveKind::Linear,
                coefficients: vec![a, b],
                bounds: RiskBounds {
                    volatility_bps: 1_500,
                    min_liquidity: 1_000,
                    ..RiskBounds::default()
                },
                reserve_base: 500,
                reserve_quote: 500,
                timestamp: T0,
            })
            .unwrap();

        // Thin liquidity (-20), hot volatility (-15), two days stale (-10).
        let report = engine.health_score(venue, T0 + 2 * STALENESS_SECS).unwrap();
        assert_eq!(report.score, 55);
        assert!(!report.healthy);
    }
}
