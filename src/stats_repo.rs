// Interface counters via sysinfo

use crate::models::{IoStat, IoStats};
use std::future::Future;
use std::sync::{Arc, Mutex};
use sysinfo::Networks;
use thiserror::Error;
use tracing::instrument;

#[derive(Debug, Error, Clone)]
#[error("{message}")]
pub struct StatsError {
    message: String,
}

impl StatsError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Produces a snapshot of all interfaces' cumulative byte counters.
pub trait StatsSource {
    fn collect_stats(&mut self) -> impl Future<Output = Result<IoStats, StatsError>> + Send;
}

/// Reads OS counters through `sysinfo::Networks`. Records are sorted by interface name.
pub struct SysinfoStatsSource {
    networks: Arc<Mutex<Networks>>,
    only: Option<Vec<String>>,
}

impl Default for SysinfoStatsSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoStatsSource {
    pub fn new() -> Self {
        Self {
            networks: Arc::new(Mutex::new(Networks::new_with_refreshed_list())),
            only: None,
        }
    }

    /// Restrict snapshots to the named interfaces, in the given order.
    pub fn only(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.only = Some(names.into_iter().map(Into::into).collect());
        self
    }
}

impl StatsSource for SysinfoStatsSource {
    #[instrument(skip(self), fields(repo = "sysinfo", operation = "collect_stats"))]
    async fn collect_stats(&mut self) -> Result<IoStats, StatsError> {
        let networks = self.networks.clone();
        let stats = tokio::task::spawn_blocking(move || {
            let mut guard = networks
                .lock()
                .map_err(|e| StatsError::new(format!("sysinfo networks lock poisoned: {}", e)))?;
            // true: drop interfaces that disappeared, pick up new ones
            guard.refresh(true);
            let mut stats: Vec<IoStat> = guard
                .list()
                .iter()
                .map(|(name, data)| {
                    IoStat::new(name.clone(), data.total_received(), data.total_transmitted())
                })
                .collect();
            stats.sort_by(|a, b| a.name.cmp(&b.name));
            Ok::<_, StatsError>(IoStats::new(stats))
        })
        .await
        .map_err(|e| StatsError::new(format!("sysinfo task join: {}", e)))??;

        Ok(match &self.only {
            Some(names) => stats.filter(names),
            None => stats,
        })
    }
}
