//! Top-miners leaderboard: one-shot fetch and a polling watcher.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use garg_engine::store::StoreError;
use garg_engine::task::Scheduled;
use serde::Deserialize;
use tokio::sync::watch;
use tracing::warn;

/// Product default refresh cadence. The service has always been polled at
/// this interval; pass something else to [`LeaderboardWatcher::spawn`] if a
/// different staleness tradeoff is wanted.
pub const DEFAULT_REFRESH: Duration = Duration::from_secs(60);

/// Rows beyond this rank are dropped.
const MAX_ENTRIES: usize = 100;

/// One row of the top-miners table.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct LeaderboardEntry {
    /// 1-based rank, assigned after sorting.
    #[serde(skip)]
    pub rank: usize,

    #[serde(rename = "walletAddress")]
    pub address: String,

    /// Owned OG assets.
    #[serde(rename = "ownedCount", default)]
    pub owned_count: u32,

    /// Total GARG mined.
    #[serde(rename = "miningBalance", default)]
    pub mined: f64,
}

#[derive(Deserialize)]
struct LeaderboardResponse {
    #[serde(default)]
    leaderboard: Vec<LeaderboardEntry>,
}

/// Fetch the leaderboard: sorted by mined GARG descending, ranked, top 100.
pub async fn fetch_leaderboard(
    client: &reqwest::Client,
    base_url: &str,
) -> Result<Vec<LeaderboardEntry>, StoreError> {
    let url = format!("{}/api/leaderboard", base_url);
    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

    if !response.status().is_success() {
        return Err(StoreError::Unavailable(format!(
            "leaderboard returned {}",
            response.status()
        )));
    }

    let payload: LeaderboardResponse = response
        .json()
        .await
        .map_err(|e| StoreError::Malformed(e.to_string()))?;
    Ok(rank_entries(payload.leaderboard))
}

fn rank_entries(mut entries: Vec<LeaderboardEntry>) -> Vec<LeaderboardEntry> {
    entries.sort_by(|a, b| b.mined.partial_cmp(&a.mined).unwrap_or(Ordering::Equal));
    entries.truncate(MAX_ENTRIES);
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = i + 1;
    }
    entries
}

/// Periodically refreshed leaderboard, published on a watch channel.
///
/// A failed refresh keeps the last good value; subscribers only ever see
/// successful fetches.
pub struct LeaderboardWatcher {
    receiver: watch::Receiver<Vec<LeaderboardEntry>>,
    _task: Scheduled,
}

impl LeaderboardWatcher {
    /// Start polling immediately and then every `refresh`.
    pub fn spawn(
        client: reqwest::Client,
        base_url: impl Into<String>,
        refresh: Duration,
    ) -> Self {
        let base_url = base_url.into();
        let (sender, receiver) = watch::channel(Vec::new());
        let sender = Arc::new(sender);
        let task = Scheduled::every_async("leaderboard", refresh, move || {
            let client = client.clone();
            let base_url = base_url.clone();
            let sender = Arc::clone(&sender);
            async move {
                match fetch_leaderboard(&client, &base_url).await {
                    Ok(entries) => {
                        let _ = sender.send(entries);
                    }
                    Err(err) => warn!(%err, "leaderboard refresh failed, keeping last value"),
                }
            }
        });
        Self {
            receiver,
            _task: task,
        }
    }

    /// Subscribe to refreshes.
    pub fn subscribe(&self) -> watch::Receiver<Vec<LeaderboardEntry>> {
        self.receiver.clone()
    }

    /// The most recently fetched leaderboard.
    pub fn current(&self) -> Vec<LeaderboardEntry> {
        self.receiver.borrow().clone()
    }
}
