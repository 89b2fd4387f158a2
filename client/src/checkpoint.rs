//! Checkpoint store backed by the hosted mining API.

use chrono::{DateTime, Utc};
use garg_engine::state::Checkpoint;
use garg_engine::store::{CheckpointStore, StoreError};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Remote checkpoint store.
///
/// `GET {base}/api/mining?walletAddress=…` returns the stored record, or 404
/// for an account that has never checkpointed; `POST {base}/api/mining/start`
/// supersedes the record.
#[derive(Clone, Debug)]
pub struct HttpCheckpointStore {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct MiningRecord {
    #[serde(rename = "miningBalance")]
    mining_balance: f64,
    #[serde(rename = "miningRate")]
    mining_rate: f64,
    #[serde(rename = "updatedAt")]
    updated_at: DateTime<Utc>,
    #[serde(rename = "lastDailyClaim", default)]
    last_daily_claim: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
struct SaveRequest<'a> {
    #[serde(rename = "walletAddress")]
    wallet_address: &'a str,
    #[serde(rename = "miningBalance")]
    mining_balance: f64,
    #[serde(rename = "miningRate")]
    mining_rate: f64,
    #[serde(rename = "updatedAt")]
    updated_at: DateTime<Utc>,
    #[serde(rename = "lastDailyClaim", skip_serializing_if = "Option::is_none")]
    last_daily_claim: Option<DateTime<Utc>>,
}

impl HttpCheckpointStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Reuse an existing client so collaborators share a connection pool.
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }
}

impl CheckpointStore for HttpCheckpointStore {
    async fn load(&self, address: &str) -> Result<Option<Checkpoint>, StoreError> {
        let url = format!("{}/api/mining", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("walletAddress", address)])
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(StoreError::Unavailable(format!(
                "mining fetch returned {}",
                response.status()
            )));
        }

        let record: MiningRecord = response
            .json()
            .await
            .map_err(|e| StoreError::Malformed(e.to_string()))?;
        Ok(Some(Checkpoint {
            balance: record.mining_balance,
            rate: record.mining_rate,
            timestamp: record.updated_at,
            last_daily_claim: record.last_daily_claim,
        }))
    }

    async fn save(&self, address: &str, checkpoint: &Checkpoint) -> Result<(), StoreError> {
        let url = format!("{}/api/mining/start", self.base_url);
        let body = SaveRequest {
            wallet_address: address,
            mining_balance: checkpoint.balance,
            mining_rate: checkpoint.rate,
            updated_at: checkpoint.timestamp,
            last_daily_claim: checkpoint.last_daily_claim,
        };
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StoreError::Unavailable(format!(
                "mining save returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}
