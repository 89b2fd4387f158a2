use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::rate;
use crate::reconcile::{self, Phase};
use crate::shop::{ItemEffect, ShopItem};
use crate::state::{Boost, Checkpoint};

/// Mutable session state for one connected wallet.
///
/// All mutation methods take the current time explicitly so the ledger logic
/// stays deterministic under test.
#[derive(Clone, Debug)]
pub struct AccountState {
    /// The wallet address this state belongs to.
    pub address: String,

    /// Owned OG assets, as last reported by the asset feed.
    pub owned_assets: i64,

    /// Unclaimed GARG. Non-decreasing except for purchases.
    pub balance: f64,

    /// The active rate boost, if any.
    pub active_boost: Option<Boost>,

    /// Last successful daily claim.
    pub last_daily_claim: Option<DateTime<Utc>>,

    /// Purchases tallied per shop item id. Repeat purchases of one-time
    /// items are counted, not rejected.
    pub purchases: HashMap<&'static str, u32>,

    /// Reconciliation progress. Accrual and ledger operations require
    /// `Loaded`.
    pub phase: Phase,
}

impl AccountState {
    pub fn new(address: String, owned_assets: i64) -> Self {
        Self {
            address,
            owned_assets,
            balance: 0.0,
            active_boost: None,
            last_daily_claim: None,
            purchases: HashMap::new(),
            phase: Phase::Idle,
        }
    }

    pub fn base_rate(&self, config: &EngineConfig) -> f64 {
        rate::base_rate(self.owned_assets, config.per_asset_rate)
    }

    /// The boost in effect at `now`. A boost that has lapsed but not yet
    /// been swept by its expiry task counts as absent.
    pub fn boost_at(&self, now: DateTime<Utc>) -> Option<&Boost> {
        self.active_boost.as_ref().filter(|b| !b.is_expired(now))
    }

    pub fn effective_rate(&self, config: &EngineConfig, now: DateTime<Utc>) -> f64 {
        rate::effective_rate(self.base_rate(config), self.boost_at(now))
    }

    /// Advance the balance by one accrual tick. Credits `rate × tick_period`
    /// rather than the wall-clock delta, so drift accumulates only at rate
    /// granularity.
    pub fn accrue(&mut self, config: &EngineConfig, now: DateTime<Utc>) {
        let rate = self.effective_rate(config, now);
        if rate > 0.0 {
            self.balance += rate * config.tick_period.as_secs_f64();
        }
    }

    /// Buy `item`, deducting its price and applying its effect. Returns the
    /// installed boost when the item carries one.
    ///
    /// The boost-conflict check runs before the deduction; a rejected
    /// purchase never moves funds.
    pub fn purchase(
        &mut self,
        item: &ShopItem,
        now: DateTime<Utc>,
    ) -> Result<Option<Boost>, EngineError> {
        if matches!(item.effect, ItemEffect::Boost { .. }) && self.boost_at(now).is_some() {
            return Err(EngineError::BoostAlreadyActive);
        }
        if self.balance < item.price {
            return Err(EngineError::InsufficientFunds {
                balance: self.balance,
                price: item.price,
            });
        }

        self.balance -= item.price;
        *self.purchases.entry(item.id).or_insert(0) += 1;

        match item.effect {
            ItemEffect::Boost {
                multiplier,
                duration,
            } => {
                let boost = Boost {
                    multiplier,
                    expires_at: now + duration,
                };
                self.active_boost = Some(boost);
                Ok(Some(boost))
            }
            ItemEffect::Collectible => Ok(None),
        }
    }

    /// Whether the daily bonus can be claimed at `now`.
    pub fn daily_claim_ready(&self, config: &EngineConfig, now: DateTime<Utc>) -> bool {
        self.last_daily_claim
            .map_or(true, |last| now >= last + config.daily_claim_cooldown)
    }

    /// Credit the daily bonus. Returns the credited amount.
    pub fn claim_daily(
        &mut self,
        config: &EngineConfig,
        now: DateTime<Utc>,
    ) -> Result<f64, EngineError> {
        if let Some(last) = self.last_daily_claim {
            let ready_at = last + config.daily_claim_cooldown;
            if now < ready_at {
                return Err(EngineError::ClaimNotReady { ready_at });
            }
        }
        self.balance += config.daily_claim_amount;
        self.last_daily_claim = Some(now);
        Ok(config.daily_claim_amount)
    }

    /// Snapshot the current progress for persistence.
    pub fn checkpoint(&self, config: &EngineConfig, now: DateTime<Utc>) -> Checkpoint {
        Checkpoint {
            balance: self.balance,
            rate: self.effective_rate(config, now),
            timestamp: now,
            last_daily_claim: self.last_daily_claim,
        }
    }

    /// Restore from a stored checkpoint, crediting offline accrual.
    pub fn restore(&mut self, checkpoint: &Checkpoint, now: DateTime<Utc>) {
        self.balance = reconcile::restored_balance(checkpoint, now);
        self.last_daily_claim = checkpoint.last_daily_claim;
    }
}
