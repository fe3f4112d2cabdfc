// Shared test helpers: scripted stats source and a recording launcher

#![allow(dead_code)]

use ripcord::config::{InterfaceConfig, InterfaceConfigs, ReactionFailurePolicy};
use ripcord::models::{IoStat, IoStats, Reaction};
use ripcord::reaction::{ProcessLauncher, ReactionError};
use ripcord::stats_repo::{StatsError, StatsSource};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TICK: Duration = Duration::from_millis(20);

pub fn rule(name: &str, max_bytes_recv: u64, max_bytes_sent: u64) -> InterfaceConfig {
    InterfaceConfig {
        name: name.into(),
        max_bytes_recv,
        max_bytes_sent,
        instructions: vec![],
    }
}

pub fn rule_with_instructions(
    name: &str,
    max_bytes_recv: u64,
    max_bytes_sent: u64,
    instructions: &[&str],
) -> InterfaceConfig {
    InterfaceConfig {
        instructions: instructions.iter().map(|s| s.to_string()).collect(),
        ..rule(name, max_bytes_recv, max_bytes_sent)
    }
}

pub fn configs(interfaces: Vec<InterfaceConfig>, policy: ReactionFailurePolicy) -> InterfaceConfigs {
    InterfaceConfigs {
        check_interval: TICK,
        on_reaction_failure: policy,
        interfaces,
    }
}

pub fn stats(entries: &[(&str, u64, u64)]) -> IoStats {
    entries
        .iter()
        .map(|(name, recv, sent)| IoStat::new(*name, *recv, *sent))
        .collect()
}

/// Replays a fixed sequence of results. The last entry repeats once the rest are used up.
pub struct ScriptedSource {
    script: VecDeque<Result<IoStats, StatsError>>,
    pub calls: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub fn new(script: Vec<Result<IoStats, StatsError>>) -> Self {
        Self {
            script: script.into(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn ok(snapshots: Vec<IoStats>) -> Self {
        Self::new(snapshots.into_iter().map(Ok).collect())
    }
}

impl StatsSource for ScriptedSource {
    async fn collect_stats(&mut self) -> Result<IoStats, StatsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.script.len() > 1 {
            return self.script.pop_front().unwrap();
        }
        self.script
            .front()
            .cloned()
            .unwrap_or_else(|| Err(StatsError::new("script empty")))
    }
}

/// Records every reaction instead of running it.
#[derive(Clone, Default)]
pub struct RecordingLauncher {
    pub launched: Arc<Mutex<Vec<Reaction>>>,
    pub completed: Arc<AtomicUsize>,
    pub fail: bool,
    pub delay: Option<Duration>,
}

impl RecordingLauncher {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn launched(&self) -> Vec<Reaction> {
        self.launched.lock().unwrap().clone()
    }
}

impl ProcessLauncher for RecordingLauncher {
    async fn launch(&self, reaction: &Reaction) -> Result<(), ReactionError> {
        self.launched.lock().unwrap().push(reaction.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.completed.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ReactionError::Spawn {
                program: reaction.program.clone(),
                source: std::io::Error::other("launcher configured to fail"),
            });
        }
        Ok(())
    }
}

/// Polls `cond` until it holds or a few seconds pass.
pub async fn eventually(mut cond: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !cond() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met in time"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
