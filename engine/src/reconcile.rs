//! Offline reconciliation: combining a stored checkpoint with elapsed
//! offline time to produce the current balance.

use chrono::{DateTime, Utc};

use crate::state::Checkpoint;

/// Reconciliation progress for a session. The accrual clock may only run in
/// `Loaded`, so accrual can never race ahead of an unconfirmed balance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    /// No load issued yet.
    #[default]
    Idle,

    /// Checkpoint fetch in flight.
    Loading,

    /// Balance confirmed; accrual may run.
    Loaded,

    /// Checkpoint fetch failed. Accrual stays paused until the account is
    /// activated again.
    Failed,
}

/// Balance after crediting `rate × offline seconds` since the checkpoint.
///
/// A checkpoint from the future counts as zero elapsed time, so the restored
/// balance never drops below the stored one.
pub fn restored_balance(checkpoint: &Checkpoint, now: DateTime<Utc>) -> f64 {
    let offline_secs = (now - checkpoint.timestamp).num_milliseconds().max(0) as f64 / 1000.0;
    checkpoint.balance + offline_secs * checkpoint.rate
}
