use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable snapshot of an account's mining progress.
///
/// Each save supersedes the previous record wholesale; records are never
/// merged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Unclaimed GARG at `timestamp`.
    pub balance: f64,

    /// Effective accrual rate at `timestamp`, GARG per second. Offline
    /// catch-up credits this rate for the whole gap.
    pub rate: f64,

    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Last successful daily claim, carried here so the cooldown survives
    /// reconnects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_daily_claim: Option<DateTime<Utc>>,
}
