// Polling loop: sample counters every check interval, compare against thresholds, react.
// One background task owns the previous snapshot; ticks never overlap.

use crate::config::{InterfaceConfigs, ReactionFailurePolicy};
use crate::error::RunnerError;
use crate::models::IoStats;
use crate::reaction::{Dispatcher, ProcessLauncher};
use crate::stats_repo::StatsSource;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{Instrument, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    /// Constructed, not started.
    Idle,
    /// Polling loop active.
    Running,
    /// Loop exited, either stopped or failed. Terminal.
    Stopped,
}

pub struct Runner<S, L> {
    source: S,
    configs: InterfaceConfigs,
    dispatcher: Dispatcher<L>,
    span: Span,
    state_tx: watch::Sender<RunnerState>,
}

impl<S, L> Runner<S, L>
where
    S: StatsSource + Send + 'static,
    L: ProcessLauncher + Send + Sync + 'static,
{
    pub fn new(source: S, configs: InterfaceConfigs, launcher: L) -> Self {
        let (state_tx, _) = watch::channel(RunnerState::Idle);
        Self {
            source,
            configs,
            dispatcher: Dispatcher::new(launcher),
            span: tracing::info_span!("runner"),
            state_tx,
        }
    }

    /// Parent span for everything the loop logs. Defaults to `info_span!("runner")`.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn state(&self) -> RunnerState {
        *self.state_tx.borrow()
    }

    /// Takes the baseline snapshot, then spawns the polling loop.
    ///
    /// A failing baseline collection is returned here and the runner never enters `Running`.
    pub async fn start(mut self) -> Result<RunnerHandle, RunnerError> {
        let span = self.span.clone();
        let prev = match self.source.collect_stats().instrument(span.clone()).await {
            Ok(stats) => stats,
            Err(e) => {
                span.in_scope(|| {
                    tracing::error!(error = %e, operation = "collect_stats", "initial stats collection failed")
                });
                self.state_tx.send_replace(RunnerState::Stopped);
                return Err(e.into());
            }
        };

        let (stop_tx, stop_rx) = oneshot::channel();
        let state_rx = self.state_tx.subscribe();
        self.state_tx.send_replace(RunnerState::Running);

        let join = tokio::spawn(self.run(prev, stop_rx).instrument(span));

        Ok(RunnerHandle {
            stop_tx: Some(stop_tx),
            state_rx,
            join,
        })
    }

    async fn run(
        mut self,
        mut prev: IoStats,
        mut stop_rx: oneshot::Receiver<()>,
    ) -> Result<(), RunnerError> {
        let period = self.configs.check_interval;
        // interval_at so the first comparison happens one full period after the baseline
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            interfaces = self.configs.interfaces.len(),
            check_interval = ?period,
            on_reaction_failure = ?self.configs.on_reaction_failure,
            "runner started"
        );

        let result = loop {
            tokio::select! {
                biased;
                _ = &mut stop_rx => {
                    tracing::info!("runner stopped");
                    break Ok(());
                }
                _ = ticker.tick() => {
                    match self.tick(&prev).await {
                        Ok(curr) => prev = curr,
                        Err(e) => break Err(e),
                    }
                }
            }
        };

        self.state_tx.send_replace(RunnerState::Stopped);
        result
    }

    /// One fetch, compare, react cycle. Returns the snapshot that becomes the new baseline.
    async fn tick(&mut self, prev: &IoStats) -> Result<IoStats, RunnerError> {
        let curr = match self.source.collect_stats().await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::error!(error = %e, operation = "collect_stats", "stats collection failed");
                return Err(e.into());
            }
        };

        let watched = curr.filter(&self.configs.names());
        for name in watched.counter_resets(prev) {
            tracing::info!(interface = name, "counter reset detected");
        }

        let breach = match self.configs.compare_stats(prev, &curr) {
            Ok(()) => {
                tracing::debug!(interfaces = curr.len(), "no breach detected");
                return Ok(curr);
            }
            Err(breach) => breach,
        };

        tracing::error!(
            error = %breach,
            interface = breach.interface(),
            direction = breach.direction(),
            delta = breach.delta(),
            amount = breach.amount(),
            "breach detected"
        );

        if let Err(e) = self.dispatcher.dispatch(&breach).await {
            match self.configs.on_reaction_failure {
                ReactionFailurePolicy::Halt => {
                    tracing::error!(error = %e, interface = breach.interface(), "reaction failed, stopping runner");
                    return Err(e.into());
                }
                ReactionFailurePolicy::Continue => {
                    tracing::warn!(error = %e, interface = breach.interface(), "reaction failed");
                }
            }
        }

        Ok(curr)
    }
}

/// Control handle for a started runner. Dropping it also stops the loop.
pub struct RunnerHandle {
    stop_tx: Option<oneshot::Sender<()>>,
    state_rx: watch::Receiver<RunnerState>,
    join: JoinHandle<Result<(), RunnerError>>,
}

impl RunnerHandle {
    /// Asks the loop to exit at its next scheduling point. A reaction already running
    /// completes first. Repeated calls, or calls after the loop exited, do nothing.
    pub fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
    }

    pub fn state(&self) -> RunnerState {
        *self.state_rx.borrow()
    }

    /// Resolves once the loop has exited, for whatever reason.
    pub async fn stopped(&self) {
        let mut rx = self.state_rx.clone();
        let _ = rx.wait_for(|s| *s == RunnerState::Stopped).await;
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Waits for the loop to exit: `Ok(())` after [`stop`](Self::stop), otherwise the error that ended it.
    pub async fn wait(self) -> Result<(), RunnerError> {
        let RunnerHandle {
            stop_tx: _stop_tx,
            join,
            ..
        } = self;
        join.await?
    }

    /// Convenience for `stop` followed by `wait`.
    pub async fn shutdown(mut self) -> Result<(), RunnerError> {
        self.stop();
        self.wait().await
    }
}
