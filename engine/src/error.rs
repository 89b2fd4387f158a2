use chrono::{DateTime, Utc};
use thiserror::Error;

/// Recoverable, user-facing engine errors. None of these mutate state.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum EngineError {
    /// The unclaimed balance cannot cover the purchase price.
    #[error("not enough GARG: have {balance}, need {price}")]
    InsufficientFunds { balance: f64, price: f64 },

    /// A mining boost is already running; boosts do not stack.
    #[error("a mining boost is already active")]
    BoostAlreadyActive,

    /// The daily claim cooldown has not elapsed yet.
    #[error("daily claim not ready until {ready_at}")]
    ClaimNotReady { ready_at: DateTime<Utc> },

    /// The item id is not in the shop catalog.
    #[error("unknown shop item: {0}")]
    UnknownItem(String),

    /// The session has not finished reconciling its stored balance.
    #[error("mining data is not loaded yet")]
    NotReady,
}
