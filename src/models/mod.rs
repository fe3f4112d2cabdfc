// Domain models

mod breach;
mod network;

pub use breach::{BreachEvent, Reaction};
pub use network::{IoStat, IoStats};
