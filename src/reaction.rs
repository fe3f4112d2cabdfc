// Reaction dispatch: turns a breach into an optional external command.

use crate::models::{BreachEvent, Reaction};
use std::future::Future;
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::process::Command;
use tracing::instrument;

#[derive(Debug, Error)]
pub enum ReactionError {
    #[error("failed to launch reaction {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("failed waiting for reaction {program}: {source}")]
    Wait {
        program: String,
        source: std::io::Error,
    },
    #[error("reaction {program} failed with {status}")]
    Exit { program: String, status: ExitStatus },
}

/// Runs a reaction to completion. The core only supplies program and arguments.
pub trait ProcessLauncher {
    fn launch(&self, reaction: &Reaction) -> impl Future<Output = Result<(), ReactionError>> + Send;
}

/// Launches reactions as child processes sharing this process's stdin/stdout/stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandLauncher;

impl ProcessLauncher for CommandLauncher {
    async fn launch(&self, reaction: &Reaction) -> Result<(), ReactionError> {
        let mut child = Command::new(&reaction.program)
            .args(&reaction.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| ReactionError::Spawn {
                program: reaction.program.clone(),
                source,
            })?;

        let status = child.wait().await.map_err(|source| ReactionError::Wait {
            program: reaction.program.clone(),
            source,
        })?;

        if !status.success() {
            return Err(ReactionError::Exit {
                program: reaction.program.clone(),
                status,
            });
        }
        Ok(())
    }
}

/// Outcome of a successful dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    /// The breached rule has no instructions; nothing was run.
    Skipped,
    /// The reaction ran and exited successfully.
    Executed,
}

pub struct Dispatcher<L> {
    launcher: L,
}

impl<L: ProcessLauncher> Dispatcher<L> {
    pub fn new(launcher: L) -> Self {
        Self { launcher }
    }

    /// Waits for the reaction to finish; there is no timeout or cancellation.
    #[instrument(skip(self, breach), fields(interface = breach.interface(), direction = breach.direction()))]
    pub async fn dispatch(&self, breach: &BreachEvent) -> Result<Dispatched, ReactionError> {
        let Some(reaction) = breach.reaction() else {
            return Ok(Dispatched::Skipped);
        };
        tracing::info!(command = %reaction, "executing reaction");
        self.launcher.launch(reaction).await?;
        tracing::debug!(program = %reaction.program, "reaction completed");
        Ok(Dispatched::Executed)
    }
}
