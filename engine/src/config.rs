use std::time::Duration;

use crate::consts;

/// Engine tunables. Every cadence is an explicit parameter; the defaults are
/// the production values.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// GARG accrued per second per owned asset.
    pub per_asset_rate: f64,

    /// Accrual clock period. Each tick credits `effective_rate × tick_period`.
    pub tick_period: Duration,

    /// Checkpoint save cadence.
    pub checkpoint_period: Duration,

    /// GARG credited by the daily claim.
    pub daily_claim_amount: f64,

    /// Minimum wait between daily claims.
    pub daily_claim_cooldown: Duration,

    /// Treat a failed checkpoint load as a fresh account instead of holding
    /// the session in `Failed` with accrual paused.
    pub start_fresh_on_load_failure: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            per_asset_rate: consts::PER_ASSET_RATE,
            tick_period: consts::TICK_PERIOD,
            checkpoint_period: consts::CHECKPOINT_PERIOD,
            daily_claim_amount: consts::DAILY_CLAIM_AMOUNT,
            daily_claim_cooldown: consts::DAILY_CLAIM_COOLDOWN,
            start_fresh_on_load_failure: false,
        }
    }
}
