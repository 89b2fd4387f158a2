//! Mining rate derivation. Pure functions, no failure modes.

use crate::state::Boost;

/// Base accrual rate for `owned` assets, GARG per second. The asset feed is
/// external input, so negative counts are clamped to zero.
pub fn base_rate(owned: i64, per_asset: f64) -> f64 {
    owned.max(0) as f64 * per_asset
}

/// Effective accrual rate with the active boost applied.
pub fn effective_rate(base: f64, boost: Option<&Boost>) -> f64 {
    base * boost.map_or(1.0, |b| b.multiplier)
}
