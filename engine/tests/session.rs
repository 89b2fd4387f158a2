//! End-to-end session behavior under paused time: reconciliation ordering,
//! clock start/stop, checkpoint cadence, boosts, and account switching.

use std::time::Duration;

use chrono::Utc;
use garg_engine::prelude::*;
use tokio::task::yield_now;
use tokio::time::advance;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// One GARG per asset per second keeps the arithmetic readable.
fn test_config() -> EngineConfig {
    EngineConfig {
        per_asset_rate: 1.0,
        ..EngineConfig::default()
    }
}

/// Let spawned tasks (reconciliation, detached saves) run to completion.
async fn settle() {
    for _ in 0..10 {
        yield_now().await;
    }
}

fn checkpoint(balance: f64, rate: f64, age: Duration) -> Checkpoint {
    Checkpoint {
        balance,
        rate,
        timestamp: Utc::now() - age,
        last_daily_claim: None,
    }
}

#[tokio::test(start_paused = true)]
async fn fresh_account_accrues_after_reconciliation() {
    let mut engine = Engine::new(MemoryStore::new(), test_config());
    engine.connect("wallet-a", 2);
    settle().await;

    let snapshot = engine.session().unwrap().snapshot();
    assert_eq!(snapshot.phase, Phase::Loaded);
    assert_eq!(snapshot.balance, 0.0);
    assert_eq!(snapshot.effective_rate, 2.0);
    assert!(engine.session().unwrap().clock_running());

    advance(Duration::from_secs(10)).await;
    settle().await;
    assert_eq!(engine.session().unwrap().snapshot().balance, 20.0);
}

#[tokio::test(start_paused = true)]
async fn restores_checkpoint_plus_offline_accrual() {
    let store = MemoryStore::new();
    store.seed("wallet-a", checkpoint(10.0, 2.0, Duration::from_secs(5)));

    let mut engine = Engine::new(store, test_config());
    engine.connect("wallet-a", 0);
    settle().await;

    let snapshot = engine.session().unwrap().snapshot();
    assert_eq!(snapshot.phase, Phase::Loaded);
    // 10 + 5 s offline × 2 GARG/s, plus a sliver of real elapsed time.
    assert!(snapshot.balance >= 20.0 && snapshot.balance < 20.5);
}

#[tokio::test(start_paused = true)]
async fn failed_load_pauses_accrual_until_reconnect() {
    let store = MemoryStore::new();
    store.set_unavailable(true);

    let mut engine = Engine::new(store, test_config());
    engine.connect("wallet-a", 2);
    settle().await;

    let session = engine.session().unwrap();
    assert_eq!(session.snapshot().phase, Phase::Failed);
    assert!(!session.clock_running());
    assert_eq!(session.purchase("raffle"), Err(EngineError::NotReady));
    assert_eq!(session.claim_daily(), Err(EngineError::NotReady));

    advance(Duration::from_secs(30)).await;
    settle().await;
    assert_eq!(engine.session().unwrap().snapshot().balance, 0.0);

    // Reconnecting the account is the retry path.
    engine.store().set_unavailable(false);
    engine.connect("wallet-a", 2);
    settle().await;
    assert_eq!(engine.session().unwrap().snapshot().phase, Phase::Loaded);
    assert!(engine.session().unwrap().clock_running());
}

#[tokio::test(start_paused = true)]
async fn load_failure_can_fall_back_to_a_fresh_balance() {
    let store = MemoryStore::new();
    store.set_unavailable(true);

    let config = EngineConfig {
        start_fresh_on_load_failure: true,
        ..test_config()
    };
    let mut engine = Engine::new(store, config);
    engine.connect("wallet-a", 1);
    settle().await;

    assert_eq!(engine.session().unwrap().snapshot().phase, Phase::Loaded);
    advance(Duration::from_secs(4)).await;
    settle().await;
    assert_eq!(engine.session().unwrap().snapshot().balance, 4.0);
}

#[tokio::test(start_paused = true)]
async fn clock_stop_is_idempotent() {
    let mut engine = Engine::new(MemoryStore::new(), test_config());
    engine.connect("wallet-a", 2);
    settle().await;
    assert!(engine.session().unwrap().clock_running());

    advance(Duration::from_secs(3)).await;
    settle().await;
    let session = engine.session().unwrap();
    assert_eq!(session.snapshot().balance, 6.0);

    session.set_owned_assets(0);
    assert!(!session.clock_running());
    // Stopping an already-stopped clock changes nothing; a negative feed
    // value counts as zero assets.
    session.set_owned_assets(-1);
    assert!(!session.clock_running());

    advance(Duration::from_secs(60)).await;
    settle().await;
    assert_eq!(engine.session().unwrap().snapshot().balance, 6.0);

    // Rate back above zero resumes accrual.
    engine.session().unwrap().set_owned_assets(3);
    settle().await;
    advance(Duration::from_secs(2)).await;
    settle().await;
    assert_eq!(engine.session().unwrap().snapshot().balance, 12.0);
}

#[tokio::test(start_paused = true)]
async fn boost_doubles_accrual_and_expires() {
    let store = MemoryStore::new();
    store.seed("wallet-a", checkpoint(100.0, 0.0, Duration::from_secs(60)));

    let mut engine = Engine::new(store, test_config());
    engine.connect("wallet-a", 0);
    settle().await;

    let session = engine.session().unwrap();
    assert_eq!(session.snapshot().balance, 100.0);

    session.purchase("boost").unwrap();
    let snapshot = session.snapshot();
    assert_eq!(snapshot.balance, 50.0);
    assert!(snapshot.active_boost.is_some());
    assert_eq!(session.purchase("boost"), Err(EngineError::BoostAlreadyActive));
    assert_eq!(session.snapshot().balance, 50.0);

    session.set_owned_assets(5);
    assert_eq!(session.snapshot().effective_rate, 10.0);

    settle().await;
    advance(DAY + Duration::from_secs(1)).await;
    settle().await;
    let snapshot = engine.session().unwrap().snapshot();
    assert!(snapshot.active_boost.is_none());
    assert_eq!(snapshot.effective_rate, 5.0);

    // With the boost gone a new one may be bought.
    engine.session().unwrap().purchase("boost").unwrap();
    assert!(engine.session().unwrap().snapshot().active_boost.is_some());
}

#[tokio::test(start_paused = true)]
async fn purchases_validate_funds_and_catalog() {
    let mut engine = Engine::new(MemoryStore::new(), test_config());
    engine.connect("wallet-a", 0);
    settle().await;

    let session = engine.session().unwrap();
    assert_eq!(
        session.purchase("raffle"),
        Err(EngineError::InsufficientFunds {
            balance: 0.0,
            price: 100.0
        })
    );
    assert_eq!(
        session.purchase("jetpack"),
        Err(EngineError::UnknownItem("jetpack".into()))
    );
    assert_eq!(session.snapshot().balance, 0.0);
}

#[tokio::test(start_paused = true)]
async fn checkpoints_are_written_on_the_save_cadence() {
    let mut engine = Engine::new(MemoryStore::new(), test_config());
    engine.connect("wallet-a", 2);
    settle().await;

    advance(Duration::from_secs(15)).await;
    settle().await;

    let record = engine.store().get("wallet-a").unwrap();
    // The 15 s save and the 15th accrual tick race benignly.
    assert!(record.balance >= 28.0);
    assert_eq!(record.rate, 2.0);
}

#[tokio::test(start_paused = true)]
async fn save_failures_never_stop_accrual() {
    let mut engine = Engine::new(MemoryStore::new(), test_config());
    engine.connect("wallet-a", 2);
    settle().await;

    engine.store().set_unavailable(true);
    advance(Duration::from_secs(20)).await;
    settle().await;
    assert_eq!(engine.session().unwrap().snapshot().balance, 40.0);
    // Only the save right after reconciliation made it through.
    assert_eq!(engine.store().get("wallet-a").unwrap().balance, 0.0);

    // The next cycle retries once the store recovers.
    engine.store().set_unavailable(false);
    advance(Duration::from_secs(15)).await;
    settle().await;
    let record = engine.store().get("wallet-a").unwrap();
    assert!(record.balance >= 40.0);
}

#[tokio::test(start_paused = true)]
async fn switching_accounts_never_bleeds_state() {
    let mut engine = Engine::new(MemoryStore::new(), test_config());
    engine.connect("wallet-a", 2);
    settle().await;
    advance(Duration::from_secs(5)).await;
    settle().await;
    assert_eq!(engine.session().unwrap().snapshot().balance, 10.0);

    engine.connect("wallet-b", 1);
    settle().await;

    // The old session flushed a final checkpoint on teardown.
    let record = engine.store().get("wallet-a").unwrap();
    assert!(record.balance >= 10.0);

    advance(Duration::from_secs(10)).await;
    settle().await;
    let snapshot = engine.session().unwrap().snapshot();
    assert_eq!(snapshot.address, "wallet-b");
    assert_eq!(snapshot.owned_assets, 1);
    assert_eq!(snapshot.balance, 10.0);

    // wallet-a's clock is gone; its record no longer advances.
    let stale = engine.store().get("wallet-a").unwrap();
    assert_eq!(stale.balance, record.balance);
}

#[tokio::test(start_paused = true)]
async fn daily_claim_credits_and_persists_the_cooldown() {
    let mut engine = Engine::new(MemoryStore::new(), test_config());
    engine.connect("wallet-a", 0);
    settle().await;

    let session = engine.session().unwrap();
    assert!(session.snapshot().daily_claim_ready);
    assert_eq!(session.claim_daily(), Ok(1.0));
    assert_eq!(session.snapshot().balance, 1.0);
    assert!(!session.snapshot().daily_claim_ready);
    assert!(matches!(
        session.claim_daily(),
        Err(EngineError::ClaimNotReady { .. })
    ));
    assert_eq!(session.snapshot().balance, 1.0);

    settle().await;
    let record = engine.store().get("wallet-a").unwrap();
    assert!(record.last_daily_claim.is_some());
    assert_eq!(record.balance, 1.0);

    // A new session for the same wallet inherits the cooldown.
    engine.connect("wallet-a", 0);
    settle().await;
    assert!(!engine.session().unwrap().snapshot().daily_claim_ready);
    assert!(matches!(
        engine.session().unwrap().claim_daily(),
        Err(EngineError::ClaimNotReady { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn disconnect_cancels_all_scheduled_work() {
    let mut engine = Engine::new(MemoryStore::new(), test_config());
    engine.connect("wallet-a", 2);
    settle().await;
    advance(Duration::from_secs(2)).await;
    settle().await;

    engine.disconnect();
    settle().await;
    assert!(engine.session().is_none());

    let flushed = engine.store().get("wallet-a").unwrap();
    advance(Duration::from_secs(60)).await;
    settle().await;
    // No timer survived the teardown: the record stays exactly as flushed.
    assert_eq!(engine.store().get("wallet-a").unwrap(), flushed);
}
