//! Checkpoint persistence contract.
//!
//! The engine only ever sees this trait; the HTTP implementation lives in
//! the client crate, and [`MemoryStore`] backs tests and offline development.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use thiserror::Error;

use crate::state::Checkpoint;

/// Errors surfaced by a checkpoint store.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum StoreError {
    /// Transport-level failure. Loads hold the session in `Failed`; saves
    /// are retried on the next cycle.
    #[error("mining store unavailable: {0}")]
    Unavailable(String),

    /// The store answered with a record the engine cannot decode.
    #[error("malformed mining record: {0}")]
    Malformed(String),
}

/// Remote key-value persistence of mining checkpoints, keyed by wallet
/// address.
pub trait CheckpointStore: Send + Sync + 'static {
    /// Fetch the last checkpoint for `address`. `Ok(None)` means no prior
    /// checkpoint exists (a new account).
    fn load(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<Option<Checkpoint>, StoreError>> + Send;

    /// Persist `checkpoint` for `address`, superseding any previous record.
    fn save(
        &self,
        address: &str,
        checkpoint: &Checkpoint,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// In-process store used by tests and offline development.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, Checkpoint>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a checkpoint, as if a previous session had saved it.
    pub fn seed(&self, address: &str, checkpoint: Checkpoint) {
        self.lock().insert(address.to_string(), checkpoint);
    }

    /// Make subsequent operations fail with `Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// The stored record for `address`, if any.
    pub fn get(&self, address: &str) -> Option<Checkpoint> {
        self.lock().get(address).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Checkpoint>> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CheckpointStore for MemoryStore {
    async fn load(&self, address: &str) -> Result<Option<Checkpoint>, StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store offline".into()));
        }
        Ok(self.get(address))
    }

    async fn save(&self, address: &str, checkpoint: &Checkpoint) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store offline".into()));
        }
        self.seed(address, checkpoint.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn checkpoint(balance: f64) -> Checkpoint {
        Checkpoint {
            balance,
            rate: 0.0,
            timestamp: Utc::now(),
            last_daily_claim: None,
        }
    }

    #[tokio::test]
    async fn missing_records_load_as_none() {
        let store = MemoryStore::new();
        assert_eq!(store.load("nobody").await, Ok(None));
    }

    #[tokio::test]
    async fn saves_supersede_previous_records() {
        let store = MemoryStore::new();
        store.save("wallet", &checkpoint(1.0)).await.unwrap();
        store.save("wallet", &checkpoint(2.0)).await.unwrap();
        let record = store.load("wallet").await.unwrap().unwrap();
        assert_eq!(record.balance, 2.0);
    }

    #[tokio::test]
    async fn unavailable_store_fails_both_operations() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            store.load("wallet").await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(
            store.save("wallet", &checkpoint(1.0)).await,
            Err(StoreError::Unavailable(_))
        ));
    }
}
