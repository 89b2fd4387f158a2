//! Account-level lifecycle: one engine, at most one live session.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::session::Session;
use crate::store::CheckpointStore;

/// The mining engine consumed by the UI layer.
///
/// Owns the checkpoint store handle and at most one per-account session.
/// Connecting a wallet tears any previous session down first, so no timer or
/// in-flight load of the old account survives into the new one.
pub struct Engine<S> {
    store: Arc<S>,
    config: EngineConfig,
    session: Option<Session<S>>,
}

impl<S: CheckpointStore> Engine<S> {
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self {
            store: Arc::new(store),
            config,
            session: None,
        }
    }

    /// Activate `address`, replacing any live session. Reconciliation starts
    /// immediately; the accrual clock follows once the balance is confirmed.
    ///
    /// Reconnecting the same address is how a `Failed` load is retried.
    pub fn connect(&mut self, address: impl Into<String>, owned_assets: i64) -> &Session<S> {
        self.disconnect();
        let session = Session::spawn(
            address.into(),
            owned_assets,
            Arc::clone(&self.store),
            self.config.clone(),
        );
        self.session.insert(session)
    }

    /// Drop the live session, cancelling its scheduled work and flushing a
    /// final checkpoint.
    pub fn disconnect(&mut self) {
        if let Some(session) = self.session.take() {
            session.shutdown();
        }
    }

    /// The active session, if a wallet is connected.
    pub fn session(&self) -> Option<&Session<S>> {
        self.session.as_ref()
    }

    /// The checkpoint store this engine persists to.
    pub fn store(&self) -> &S {
        &self.store
    }
}
