//! Per-account mining session: reconciliation, the accrual clock, the
//! checkpoint cycle, and boost expiry.
//!
//! A session owns every scheduled task it starts. Teardown cancels all of
//! them, so a superseded account can never apply a stale load or keep a
//! timer running into the next account's session.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::reconcile::Phase;
use crate::shop;
use crate::state::{AccountState, Boost};
use crate::store::CheckpointStore;
use crate::task::Scheduled;

/// Read-only view of a session for display.
#[derive(Clone, Debug, PartialEq)]
pub struct MiningSnapshot {
    pub address: String,
    pub phase: Phase,
    pub owned_assets: i64,
    pub balance: f64,
    pub base_rate: f64,
    pub effective_rate: f64,
    pub active_boost: Option<Boost>,
    pub daily_claim_ready: bool,
}

#[derive(Default)]
struct Timers {
    clock: Option<Scheduled>,
    saver: Option<Scheduled>,
    boost: Option<Scheduled>,
}

struct Inner {
    address: String,
    config: EngineConfig,
    state: Mutex<AccountState>,
    timers: Mutex<Timers>,
}

/// One connected wallet's live mining session.
pub struct Session<S> {
    inner: Arc<Inner>,
    store: Arc<S>,
    reconcile: Option<Scheduled>,
}

impl<S: CheckpointStore> Session<S> {
    pub(crate) fn spawn(
        address: String,
        owned_assets: i64,
        store: Arc<S>,
        config: EngineConfig,
    ) -> Self {
        let inner = Arc::new(Inner {
            address: address.clone(),
            config,
            state: Mutex::new(AccountState::new(address, owned_assets)),
            timers: Mutex::new(Timers::default()),
        });
        let mut session = Self {
            inner,
            store,
            reconcile: None,
        };
        session.start_reconcile();
        session
    }

    /// The wallet address this session accrues for.
    pub fn address(&self) -> &str {
        &self.inner.address
    }

    /// Update the owned-asset count reported by the asset feed. The accrual
    /// clock follows the new rate.
    pub fn set_owned_assets(&self, owned: i64) {
        {
            let mut state = lock(&self.inner.state);
            if state.owned_assets == owned {
                return;
            }
            state.owned_assets = owned;
        }
        sync_clock(&self.inner);
    }

    /// Buy a shop item with unclaimed GARG.
    pub fn purchase(&self, item_id: &str) -> Result<(), EngineError> {
        let item =
            shop::find(item_id).ok_or_else(|| EngineError::UnknownItem(item_id.to_string()))?;
        let now = Utc::now();
        let installed = {
            let mut state = lock(&self.inner.state);
            if state.phase != Phase::Loaded {
                return Err(EngineError::NotReady);
            }
            state.purchase(item, now)?
        };
        if let Some(boost) = installed {
            self.schedule_boost_expiry(boost);
            info!(address = %self.inner.address, multiplier = boost.multiplier, "mining boost installed");
        }
        self.save_soon("purchase");
        Ok(())
    }

    /// Claim the daily GARG bonus. Returns the credited amount.
    pub fn claim_daily(&self) -> Result<f64, EngineError> {
        let amount = {
            let mut state = lock(&self.inner.state);
            if state.phase != Phase::Loaded {
                return Err(EngineError::NotReady);
            }
            state.claim_daily(&self.inner.config, Utc::now())?
        };
        self.save_soon("daily-claim");
        Ok(amount)
    }

    /// Current values for display.
    pub fn snapshot(&self) -> MiningSnapshot {
        let now = Utc::now();
        let config = &self.inner.config;
        let state = lock(&self.inner.state);
        MiningSnapshot {
            address: state.address.clone(),
            phase: state.phase,
            owned_assets: state.owned_assets,
            balance: state.balance,
            base_rate: state.base_rate(config),
            effective_rate: state.effective_rate(config, now),
            active_boost: state.boost_at(now).copied(),
            daily_claim_ready: state.daily_claim_ready(config, now),
        }
    }

    /// Whether the accrual clock is currently running.
    pub fn clock_running(&self) -> bool {
        lock(&self.inner.timers)
            .clock
            .as_ref()
            .map_or(false, |clock| !clock.is_finished())
    }

    /// Tear the session down: cancel every scheduled task and flush a final
    /// checkpoint.
    pub(crate) fn shutdown(mut self) {
        if let Some(reconcile) = self.reconcile.take() {
            reconcile.cancel();
        }
        {
            let mut timers = lock(&self.inner.timers);
            for task in [
                timers.clock.take(),
                timers.saver.take(),
                timers.boost.take(),
            ]
            .into_iter()
            .flatten()
            {
                task.cancel();
            }
        }
        if lock(&self.inner.state).phase == Phase::Loaded {
            self.save_soon("disconnect");
        }
        info!(address = %self.inner.address, "mining session closed");
    }

    fn start_reconcile(&mut self) {
        lock(&self.inner.state).phase = Phase::Loading;
        let inner = Arc::clone(&self.inner);
        let store = Arc::clone(&self.store);
        self.reconcile = Some(Scheduled::spawn("reconcile", async move {
            let result = store.load(&inner.address).await;
            let now = Utc::now();
            {
                let mut state = lock(&inner.state);
                match result {
                    Ok(Some(checkpoint)) => {
                        state.restore(&checkpoint, now);
                        state.phase = Phase::Loaded;
                        info!(
                            address = %inner.address,
                            balance = state.balance,
                            "mining state restored"
                        );
                    }
                    Ok(None) => {
                        state.balance = 0.0;
                        state.phase = Phase::Loaded;
                        info!(address = %inner.address, "no prior mining record, starting fresh");
                    }
                    Err(err) if inner.config.start_fresh_on_load_failure => {
                        warn!(address = %inner.address, %err, "mining record unavailable, starting from zero");
                        state.balance = 0.0;
                        state.phase = Phase::Loaded;
                    }
                    Err(err) => {
                        warn!(address = %inner.address, %err, "mining record unavailable, accrual paused");
                        state.phase = Phase::Failed;
                        return;
                    }
                }
            }
            start_timers(&inner, &store);
        }));
    }

    fn schedule_boost_expiry(&self, boost: Boost) {
        let delay = (boost.expires_at - Utc::now()).to_std().unwrap_or_default();
        let inner = Arc::clone(&self.inner);
        let task = Scheduled::once("boost-expiry", delay, move || {
            let mut state = lock(&inner.state);
            // Only clear the boost this timer was armed for; a newer boost
            // carries its own timer.
            if state.active_boost == Some(boost) {
                state.active_boost = None;
                debug!(address = %inner.address, "mining boost expired");
            }
        });
        // Replacing the slot drops (and thereby aborts) any stale timer.
        lock(&self.inner.timers).boost = Some(task);
    }

    /// Fire-and-forget checkpoint write after a balance mutation. Detached:
    /// the write must be able to outlive the session on disconnect.
    fn save_soon(&self, reason: &'static str) {
        let inner = Arc::clone(&self.inner);
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            debug!(reason, "checkpointing after mutation");
            save_checkpoint(&inner, store.as_ref()).await;
        });
    }
}

/// Start the checkpoint cycle and, if the rate allows, the accrual clock.
/// Called once reconciliation lands in `Loaded`.
fn start_timers<S: CheckpointStore>(inner: &Arc<Inner>, store: &Arc<S>) {
    sync_clock(inner);
    let mut timers = lock(&inner.timers);
    if timers.saver.is_none() {
        let period = inner.config.checkpoint_period;
        let inner = Arc::clone(inner);
        let store = Arc::clone(store);
        timers.saver = Some(Scheduled::every_async("checkpoint", period, move || {
            let inner = Arc::clone(&inner);
            let store = Arc::clone(&store);
            async move {
                save_checkpoint(&inner, store.as_ref()).await;
            }
        }));
    }
}

/// Start or stop the accrual clock to match the current rate. At most one
/// clock runs per session; both directions are idempotent.
fn sync_clock(inner: &Arc<Inner>) {
    let (phase, rate) = {
        let state = lock(&inner.state);
        (state.phase, state.effective_rate(&inner.config, Utc::now()))
    };
    let mut timers = lock(&inner.timers);
    if phase == Phase::Loaded && rate > 0.0 {
        if timers.clock.is_none() {
            let period = inner.config.tick_period;
            let inner = Arc::clone(inner);
            timers.clock = Some(Scheduled::every("accrual", period, move || {
                let mut state = lock(&inner.state);
                state.accrue(&inner.config, Utc::now());
            }));
            debug!("accrual clock started");
        }
    } else if let Some(clock) = timers.clock.take() {
        clock.cancel();
        debug!("accrual clock stopped");
    }
}

async fn save_checkpoint<S: CheckpointStore>(inner: &Arc<Inner>, store: &S) {
    let checkpoint = {
        let state = lock(&inner.state);
        if state.phase != Phase::Loaded {
            return;
        }
        state.checkpoint(&inner.config, Utc::now())
    };
    match store.save(&inner.address, &checkpoint).await {
        Ok(()) => debug!(
            address = %inner.address,
            balance = checkpoint.balance,
            "checkpoint saved"
        ),
        Err(err) => warn!(
            address = %inner.address,
            %err,
            "checkpoint save failed, will retry next cycle"
        ),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
