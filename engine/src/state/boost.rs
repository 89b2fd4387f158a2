use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A temporary multiplier applied to the accrual rate.
///
/// At most one boost runs per account; a purchase while one is active is
/// rejected before any funds move.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Boost {
    /// Rate multiplier, strictly greater than 1.
    pub multiplier: f64,

    /// Instant at which the boost stops applying.
    pub expires_at: DateTime<Utc>,
}

impl Boost {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
