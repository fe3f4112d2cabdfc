// Real OS counters via sysinfo

use ripcord::stats_repo::{StatsSource, SysinfoStatsSource};

#[tokio::test]
async fn collects_sorted_snapshot() {
    let mut source = SysinfoStatsSource::new();
    let stats = source.collect_stats().await.expect("collect_stats");
    let names: Vec<&str> = stats.iter().map(|s| s.name.as_str()).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
    assert!(stats.iter().all(|s| !s.is_missing()));
}

#[tokio::test]
async fn only_restricts_to_named_interfaces() {
    let mut source = SysinfoStatsSource::new().only(["ripcord-test-no-such-iface"]);
    let stats = source.collect_stats().await.expect("collect_stats");
    assert!(stats.is_empty());
}
