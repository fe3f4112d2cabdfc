// Per-interface byte counter snapshots

use serde::{Deserialize, Serialize};

/// Cumulative counters for one network interface at one point in time.
///
/// `IoStat::default()` is the "not found" record: empty name, zero counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IoStat {
    pub name: String,
    pub bytes_recv: u64,
    pub bytes_sent: u64,
}

impl IoStat {
    pub fn new(name: impl Into<String>, bytes_recv: u64, bytes_sent: u64) -> Self {
        Self {
            name: name.into(),
            bytes_recv,
            bytes_sent,
        }
    }

    /// True for the sentinel returned by [`IoStats::find`] on a miss.
    pub fn is_missing(&self) -> bool {
        self.name.is_empty()
    }
}

/// One poll's worth of interface readings, in the order the source reported them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IoStats(Vec<IoStat>);

impl IoStats {
    pub fn new(stats: Vec<IoStat>) -> Self {
        Self(stats)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IoStat> {
        self.0.iter()
    }

    /// First record whose name matches exactly, or the empty sentinel.
    pub fn find(&self, name: &str) -> IoStat {
        self.0
            .iter()
            .find(|s| s.name == name)
            .cloned()
            .unwrap_or_default()
    }

    /// Keeps the records named in `names`, in the order of `names`. Unknown names are dropped.
    pub fn filter<S: AsRef<str>>(&self, names: &[S]) -> IoStats {
        let filtered = names
            .iter()
            .map(|name| self.find(name.as_ref()))
            .filter(|stat| !stat.is_missing())
            .collect();
        IoStats(filtered)
    }

    /// Interfaces present in both snapshots whose recv or sent counter went backwards.
    pub fn counter_resets<'a>(&'a self, prev: &IoStats) -> Vec<&'a str> {
        self.0
            .iter()
            .filter(|curr| {
                let p = prev.find(&curr.name);
                !p.is_missing() && (curr.bytes_recv < p.bytes_recv || curr.bytes_sent < p.bytes_sent)
            })
            .map(|s| s.name.as_str())
            .collect()
    }
}

impl From<Vec<IoStat>> for IoStats {
    fn from(stats: Vec<IoStat>) -> Self {
        Self(stats)
    }
}

impl FromIterator<IoStat> for IoStats {
    fn from_iter<I: IntoIterator<Item = IoStat>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a IoStats {
    type Item = &'a IoStat;
    type IntoIter = std::slice::Iter<'a, IoStat>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
