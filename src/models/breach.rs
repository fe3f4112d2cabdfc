// Breach events and the reactions they carry

use thiserror::Error;

use crate::config::InterfaceConfig;

/// External command attached to a rule: `instructions[0]` is the program, the rest are arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub program: String,
    pub args: Vec<String>,
}

impl Reaction {
    /// None when the instruction list is empty.
    pub fn from_instructions(instructions: &[String]) -> Option<Self> {
        let (program, args) = instructions.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl std::fmt::Display for Reaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// A per-interval delta that went over its configured ceiling.
///
/// `amount` is the overage (delta minus ceiling); `delta` is the full observed traffic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BreachEvent {
    #[error("{interface} bytes recv exceeded by {amount}")]
    RecvExceeded {
        interface: String,
        amount: u64,
        delta: u64,
        rule: InterfaceConfig,
        reaction: Option<Reaction>,
    },
    #[error("{interface} bytes sent exceeded by {amount}")]
    SentExceeded {
        interface: String,
        amount: u64,
        delta: u64,
        rule: InterfaceConfig,
        reaction: Option<Reaction>,
    },
}

impl BreachEvent {
    pub fn recv_exceeded(rule: &InterfaceConfig, delta: u64) -> Self {
        Self::RecvExceeded {
            interface: rule.name.clone(),
            amount: delta.saturating_sub(rule.max_bytes_recv),
            delta,
            rule: rule.clone(),
            reaction: Reaction::from_instructions(&rule.instructions),
        }
    }

    pub fn sent_exceeded(rule: &InterfaceConfig, delta: u64) -> Self {
        Self::SentExceeded {
            interface: rule.name.clone(),
            amount: delta.saturating_sub(rule.max_bytes_sent),
            delta,
            rule: rule.clone(),
            reaction: Reaction::from_instructions(&rule.instructions),
        }
    }

    pub fn interface(&self) -> &str {
        match self {
            Self::RecvExceeded { interface, .. } | Self::SentExceeded { interface, .. } => interface,
        }
    }

    pub fn amount(&self) -> u64 {
        match self {
            Self::RecvExceeded { amount, .. } | Self::SentExceeded { amount, .. } => *amount,
        }
    }

    pub fn delta(&self) -> u64 {
        match self {
            Self::RecvExceeded { delta, .. } | Self::SentExceeded { delta, .. } => *delta,
        }
    }

    pub fn rule(&self) -> &InterfaceConfig {
        match self {
            Self::RecvExceeded { rule, .. } | Self::SentExceeded { rule, .. } => rule,
        }
    }

    pub fn reaction(&self) -> Option<&Reaction> {
        match self {
            Self::RecvExceeded { reaction, .. } | Self::SentExceeded { reaction, .. } => {
                reaction.as_ref()
            }
        }
    }

    /// "recv" or "sent", for log fields.
    pub fn direction(&self) -> &'static str {
        match self {
            Self::RecvExceeded { .. } => "recv",
            Self::SentExceeded { .. } => "sent",
        }
    }
}
