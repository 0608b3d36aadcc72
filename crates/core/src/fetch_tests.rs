use super::*;
use crate::test_support::{commit, detail, repository, Failure, MockProvider};
use chrono::{TimeZone, Utc};
use repo_tally_developer_platforms::clock::ManualClock;
use std::time::Duration;

fn query() -> CommitQuery {
    CommitQuery {
        author: "octocat".to_string(),
        since: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        until: Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap(),
    }
}

fn small_pages() -> FetchSettings {
    FetchSettings {
        page_size: 2,
        ..FetchSettings::default()
    }
}

fn commits(count: usize) -> Vec<Commit> {
    (0..count).map(|i| commit(&format!("sha{}", i))).collect()
}

#[test]
fn test_default_settings() {
    let settings = FetchSettings::default();

    assert_eq!(settings.listing_retry, RetryPolicy::page_listing());
    assert_eq!(settings.stats_retry, RetryPolicy::commit_stats());
    assert_eq!(settings.max_commits, 5000);
    assert_eq!(settings.page_size, 100);
}

#[tokio::test]
async fn test_fetch_commits_pages_until_empty() {
    let provider = MockProvider::new()
        .with_repositories(vec![repository("octocat", "app")])
        .with_commits("octocat/app", commits(5));
    let clock = ManualClock::new();

    let result = fetch_commits(&provider, &clock, &small_pages(), "octocat", "app", &query()).await;

    let shas: Vec<&str> = result.iter().map(|c| c.sha.as_str()).collect();
    assert_eq!(shas, vec!["sha0", "sha1", "sha2", "sha3", "sha4"]);
}

#[tokio::test]
async fn test_fetch_commits_for_repository_without_commits() {
    let provider = MockProvider::new();
    let clock = ManualClock::new();

    let result = fetch_commits(&provider, &clock, &small_pages(), "octocat", "empty", &query()).await;

    assert!(result.is_empty());
}

#[tokio::test]
async fn test_fetch_commits_stops_at_limit() {
    let provider = MockProvider::new().with_commits("octocat/app", commits(9));
    let clock = ManualClock::new();
    let settings = FetchSettings {
        page_size: 2,
        max_commits: 5,
        ..FetchSettings::default()
    };

    let result = fetch_commits(&provider, &clock, &settings, "octocat", "app", &query()).await;

    assert_eq!(result.len(), 5);
    assert_eq!(result[4].sha, "sha4");
}

#[tokio::test]
async fn test_fetch_commits_keeps_partial_results_on_page_error() {
    let provider = MockProvider::new()
        .with_commits("octocat/app", commits(6))
        .failing_commit_page("octocat/app", 2);
    let clock = ManualClock::new();

    let result = fetch_commits(&provider, &clock, &small_pages(), "octocat", "app", &query()).await;

    let shas: Vec<&str> = result.iter().map(|c| c.sha.as_str()).collect();
    assert_eq!(shas, vec!["sha0", "sha1"]);
    assert!(clock.sleeps().is_empty());
}

#[tokio::test]
async fn test_fetch_commits_retries_pages_when_configured() {
    let provider = MockProvider::new()
        .with_commits("octocat/app", commits(2))
        .failing_commit_page("octocat/app", 2);
    let clock = ManualClock::new();
    let settings = FetchSettings {
        page_size: 2,
        listing_retry: RetryPolicy {
            max_attempts: 2,
            backoff_step: Duration::from_secs(1),
        },
        ..FetchSettings::default()
    };

    let result = fetch_commits(&provider, &clock, &settings, "octocat", "app", &query()).await;

    assert_eq!(result.len(), 2);
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(1)]);
}

#[tokio::test]
async fn test_fetch_commit_stats_success() {
    let provider = MockProvider::new().with_detail(detail(
        "abc",
        &[("src/main.rs", 10, 2), ("README.md", 3, 0)],
    ));
    let clock = ManualClock::new();

    let stats = fetch_commit_stats(&provider, &clock, &FetchSettings::default(), "octocat", "app", "abc").await;

    assert_eq!(stats.additions, 13);
    assert_eq!(stats.deletions, 2);
    assert_eq!(stats.total, 15);
    assert_eq!(stats.files.len(), 2);
    assert!(!stats.truncated);
}

#[tokio::test]
async fn test_fetch_commit_stats_detects_truncation() {
    let files: Vec<(String, u64, u64)> = (0..300).map(|i| (format!("f{}.rs", i), 1, 0)).collect();
    let file_refs: Vec<(&str, u64, u64)> = files.iter().map(|(n, a, d)| (n.as_str(), *a, *d)).collect();
    let provider = MockProvider::new().with_detail(detail("big", &file_refs));
    let clock = ManualClock::new();

    let stats = fetch_commit_stats(&provider, &clock, &FetchSettings::default(), "octocat", "app", "big").await;

    assert!(stats.truncated);
    assert_eq!(stats.files.len(), 300);
}

#[tokio::test]
async fn test_fetch_commit_stats_not_found_is_not_retried() {
    let provider = MockProvider::new();
    let clock = ManualClock::new();

    let stats = fetch_commit_stats(&provider, &clock, &FetchSettings::default(), "octocat", "app", "gone").await;

    assert_eq!(stats, CommitStats::empty());
    assert_eq!(provider.get_commit_calls("gone"), 1);
    assert!(clock.sleeps().is_empty());
}

#[tokio::test]
async fn test_fetch_commit_stats_conflict_is_not_retried() {
    let provider = MockProvider::new()
        .with_detail(detail("merge", &[("src/a.rs", 1, 1)]))
        .with_failures("merge", vec![Failure::Conflict]);
    let clock = ManualClock::new();

    let stats = fetch_commit_stats(&provider, &clock, &FetchSettings::default(), "octocat", "app", "merge").await;

    assert_eq!(stats, CommitStats::empty());
    assert!(!stats.truncated);
    assert_eq!(provider.get_commit_calls("merge"), 1);
}

#[tokio::test]
async fn test_fetch_commit_stats_recovers_from_transient_errors() {
    let provider = MockProvider::new()
        .with_detail(detail("flaky", &[("src/a.rs", 4, 1)]))
        .with_failures("flaky", vec![Failure::Transient, Failure::Transient]);
    let clock = ManualClock::new();

    let stats = fetch_commit_stats(&provider, &clock, &FetchSettings::default(), "octocat", "app", "flaky").await;

    assert_eq!(stats.additions, 4);
    assert_eq!(provider.get_commit_calls("flaky"), 3);
    assert_eq!(
        clock.sleeps(),
        vec![Duration::from_secs(2), Duration::from_secs(4)]
    );
}

#[tokio::test]
async fn test_fetch_commit_stats_exhausted_retries_yield_empty_stats() {
    let provider = MockProvider::new()
        .with_detail(detail("broken", &[("src/a.rs", 4, 1)]))
        .with_failures(
            "broken",
            vec![Failure::Transient, Failure::Transient, Failure::Transient],
        );
    let clock = ManualClock::new();

    let stats = fetch_commit_stats(&provider, &clock, &FetchSettings::default(), "octocat", "app", "broken").await;

    assert_eq!(stats, CommitStats::empty());
    assert!(!stats.truncated);
    assert_eq!(provider.get_commit_calls("broken"), 3);
}
