// Errors that end a runner

use crate::reaction::ReactionError;
use crate::stats_repo::StatsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("stats collection failed: {0}")]
    Stats(#[from] StatsError),
    #[error(transparent)]
    Reaction(#[from] ReactionError),
    #[error("runner task join: {0}")]
    Join(#[from] tokio::task::JoinError),
}
