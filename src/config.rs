use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

/// Full watchdog configuration: one global cadence plus per-interface thresholds.
#[derive(Debug, Clone, Deserialize)]
pub struct InterfaceConfigs {
    #[serde(alias = "checkInterval", deserialize_with = "deserialize_duration")]
    pub check_interval: Duration,
    #[serde(alias = "onReactionFailure", default)]
    pub on_reaction_failure: ReactionFailurePolicy,
    pub interfaces: Vec<InterfaceConfig>,
}

/// Thresholds for a single interface, matched exactly against OS interface names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceConfig {
    pub name: String,
    /// Max bytes received per check interval.
    #[serde(alias = "maxBytesRecv")]
    pub max_bytes_recv: u64,
    /// Max bytes sent per check interval.
    #[serde(alias = "maxBytesSent")]
    pub max_bytes_sent: u64,
    /// Optional command run on breach: program followed by its arguments.
    #[serde(default)]
    pub instructions: Vec<String>,
}

/// What the runner does when a reaction command can't be launched or exits non-zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionFailurePolicy {
    /// Stop the runner and surface the error.
    #[default]
    Halt,
    /// Log the failure and keep polling.
    Continue,
}

impl InterfaceConfigs {
    /// Reads `CONFIG_FILE` (default `config.toml`).
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        Self::load_from_path(&path)
    }

    /// `.json` files are parsed as JSON, everything else as TOML.
    pub fn load_from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {}", path.display(), e))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::load_from_json_str(&s),
            _ => Self::load_from_str(&s),
        }
    }

    /// Parse and validate TOML config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: InterfaceConfigs = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate JSON config from a string.
    pub fn load_from_json_str(s: &str) -> anyhow::Result<Self> {
        let config: InterfaceConfigs = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn names(&self) -> Vec<&str> {
        self.interfaces.iter().map(|i| i.name.as_str()).collect()
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.check_interval.is_zero(),
            "check_interval must be > 0"
        );
        anyhow::ensure!(
            !self.interfaces.is_empty(),
            "interfaces must contain at least one entry"
        );
        let mut seen = HashSet::new();
        for (i, iface) in self.interfaces.iter().enumerate() {
            anyhow::ensure!(
                !iface.name.is_empty(),
                "interfaces[{}].name must be non-empty",
                i
            );
            anyhow::ensure!(
                seen.insert(iface.name.as_str()),
                "interfaces[{}].name {:?} is duplicated",
                i,
                iface.name
            );
            anyhow::ensure!(
                iface.instructions.first().is_none_or(|p| !p.is_empty()),
                "interfaces[{}].instructions must start with a program name",
                i
            );
        }
        Ok(())
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_duration(&s).map_err(serde::de::Error::custom)
}

/// Parses durations such as `"5s"`, `"250ms"`, `"1h30m40s"` or `"1.5m"`.
pub fn parse_duration(s: &str) -> anyhow::Result<Duration> {
    let s = s.trim();
    anyhow::ensure!(!s.is_empty(), "empty duration");

    let mut total = Duration::ZERO;
    let mut rest = s;
    while !rest.is_empty() {
        let num_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| anyhow::anyhow!("missing unit in duration {:?}", s))?;
        anyhow::ensure!(num_len > 0, "invalid duration {:?}", s);
        let value: f64 = rest[..num_len]
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid number in duration {:?}", s))?;
        rest = &rest[num_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let nanos_per_unit: f64 = match &rest[..unit_len] {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            unit => anyhow::bail!("unknown unit {:?} in duration {:?}", unit, s),
        };
        rest = &rest[unit_len..];

        total += Duration::from_nanos((value * nanos_per_unit).round() as u64);
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_compound_duration() {
        assert_eq!(
            parse_duration("1h30m40s").unwrap(),
            Duration::from_secs(3600 + 30 * 60 + 40)
        );
    }

    #[test]
    fn parses_sub_second_and_fractional_units() {
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("1.5m").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration("10us").unwrap(), Duration::from_micros(10));
    }

    #[test]
    fn rejects_malformed_durations() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("5").is_err());
        assert!(parse_duration("s").is_err());
        assert!(parse_duration("5 days").is_err());
        assert!(parse_duration("5d").is_err());
    }
}
