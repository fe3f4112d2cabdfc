// Threshold comparison between two consecutive snapshots.
// Pure functions: no I/O, no state carried between calls.

use crate::config::{InterfaceConfig, InterfaceConfigs};
use crate::models::{BreachEvent, IoStat, IoStats};

/// Compares one interface's previous and current readings against its rule.
///
/// Only upward movement counts: each direction is guarded on its own, so a counter that
/// went backwards (interface restart, wraparound) is skipped for this tick while the other
/// direction is still checked. A missing reading on either side skips the comparison.
/// Received bytes are checked first, so a tick that breaches both yields `RecvExceeded`.
pub fn detect(rule: &InterfaceConfig, prev: &IoStat, curr: &IoStat) -> Option<BreachEvent> {
    if prev.is_missing() || curr.is_missing() {
        return None;
    }

    if curr.bytes_recv > prev.bytes_recv {
        let delta = curr.bytes_recv - prev.bytes_recv;
        if delta > rule.max_bytes_recv {
            return Some(BreachEvent::recv_exceeded(rule, delta));
        }
    }

    if curr.bytes_sent > prev.bytes_sent {
        let delta = curr.bytes_sent - prev.bytes_sent;
        if delta > rule.max_bytes_sent {
            return Some(BreachEvent::sent_exceeded(rule, delta));
        }
    }

    None
}

impl InterfaceConfig {
    /// Single-rule comparison in `Result` form.
    pub fn compare_stat(&self, prev: &IoStat, curr: &IoStat) -> Result<(), BreachEvent> {
        match detect(self, prev, curr) {
            Some(breach) => Err(breach),
            None => Ok(()),
        }
    }
}

impl InterfaceConfigs {
    /// Runs every rule in declaration order and returns the first breach.
    /// Rules after the first breach are not evaluated.
    pub fn compare_stats(&self, prev: &IoStats, curr: &IoStats) -> Result<(), BreachEvent> {
        compare_all(&self.interfaces, prev, curr)
    }
}

/// Batch form of [`detect`] over an ordered rule set; fails fast on the first breach.
pub fn compare_all(
    rules: &[InterfaceConfig],
    prev: &IoStats,
    curr: &IoStats,
) -> Result<(), BreachEvent> {
    for rule in rules {
        let p = prev.find(&rule.name);
        let c = curr.find(&rule.name);
        rule.compare_stat(&p, &c)?;
    }
    Ok(())
}
