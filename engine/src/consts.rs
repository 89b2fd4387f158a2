use std::time::Duration;

/// GARG accrued per second for each owned OG asset.
pub const PER_ASSET_RATE: f64 = 0.0005775;

/// Period of the accrual clock.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Period of the checkpoint save cycle, independent of the accrual tick.
pub const CHECKPOINT_PERIOD: Duration = Duration::from_secs(15);

/// GARG credited by the daily claim.
pub const DAILY_CLAIM_AMOUNT: f64 = 1.0;

/// Minimum wait between daily claims.
pub const DAILY_CLAIM_COOLDOWN: Duration = Duration::from_secs(24 * 60 * 60);
