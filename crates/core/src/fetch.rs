//! Paged commit listing and per-commit statistics.
//!
//! Both fetchers degrade instead of failing: a listing that breaks off keeps
//! the commits collected so far, and a commit whose statistics cannot be read
//! counts as zero lines.

use repo_tally_developer_platforms::clock::Clock;
use repo_tally_developer_platforms::models::Commit;
use repo_tally_developer_platforms::{CommitQuery, CommitStatsProvider};
use tracing::{debug, error, info, warn};

use crate::config::{MAX_COMMITS_PER_REPOSITORY, PAGE_SIZE};
use crate::retry::RetryPolicy;
use crate::stats::CommitStats;

#[cfg(test)]
#[path = "fetch_tests.rs"]
mod tests;

/// Limits and retry behaviour of the fetchers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    /// Retry policy for each page of a listing
    pub listing_retry: RetryPolicy,

    /// Retry policy for reading the statistics of one commit
    pub stats_retry: RetryPolicy,

    /// Maximum number of commits collected for one repository
    pub max_commits: usize,

    pub page_size: u32,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            listing_retry: RetryPolicy::page_listing(),
            stats_retry: RetryPolicy::commit_stats(),
            max_commits: MAX_COMMITS_PER_REPOSITORY,
            page_size: PAGE_SIZE,
        }
    }
}

/// Collects the commits of a repository that match the query.
///
/// Pages are requested until one comes back empty or `max_commits` commits
/// have been collected. A page that cannot be fetched ends the listing and
/// the commits gathered so far are returned.
pub async fn fetch_commits<P>(
    provider: &P,
    clock: &dyn Clock,
    settings: &FetchSettings,
    repo_owner: &str,
    repo_name: &str,
    query: &CommitQuery,
) -> Vec<Commit>
where
    P: CommitStatsProvider + ?Sized,
{
    let mut commits: Vec<Commit> = Vec::new();
    let mut page = 1;

    while commits.len() < settings.max_commits {
        let result = settings
            .listing_retry
            .run(clock, |_| {
                provider.list_commits(repo_owner, repo_name, query, page, settings.page_size)
            })
            .await;

        match result {
            Ok(batch) if batch.is_empty() => break,
            Ok(batch) => {
                debug!(
                    repository_owner = repo_owner,
                    repository = repo_name,
                    page,
                    count = batch.len(),
                    "Fetched a page of commits"
                );
                commits.extend(batch);
                page += 1;
            }
            Err(e) => {
                warn!(
                    repository_owner = repo_owner,
                    repository = repo_name,
                    page,
                    collected = commits.len(),
                    error_message = e.to_string(),
                    "Failed to fetch a page of commits. Continuing with the commits collected so far."
                );
                break;
            }
        }
    }

    if commits.len() > settings.max_commits {
        info!(
            repository_owner = repo_owner,
            repository = repo_name,
            limit = settings.max_commits,
            "Commit limit reached. Ignoring the remaining commits."
        );
        commits.truncate(settings.max_commits);
    }

    commits
}

/// Reads the line statistics of a single commit.
///
/// Missing and conflicting commits yield zero-valued statistics immediately.
/// Other failures are retried according to `stats_retry` and yield zero-valued
/// statistics once the attempts are used up.
pub async fn fetch_commit_stats<P>(
    provider: &P,
    clock: &dyn Clock,
    settings: &FetchSettings,
    repo_owner: &str,
    repo_name: &str,
    sha: &str,
) -> CommitStats
where
    P: CommitStatsProvider + ?Sized,
{
    let result = settings
        .stats_retry
        .run(clock, |_| provider.get_commit(repo_owner, repo_name, sha))
        .await;

    match result {
        Ok(detail) => {
            let stats = CommitStats::from(detail);
            if stats.truncated {
                info!(
                    repository_owner = repo_owner,
                    repository = repo_name,
                    sha = sha,
                    files = stats.files.len(),
                    total = stats.total,
                    "Commit statistics are truncated. The per-file breakdown may be incomplete."
                );
            }
            stats
        }
        Err(e) if !e.is_retryable() => {
            warn!(
                repository_owner = repo_owner,
                repository = repo_name,
                sha = sha,
                error_message = e.to_string(),
                "Commit statistics are not available. Counting the commit as empty."
            );
            CommitStats::empty()
        }
        Err(e) => {
            error!(
                repository_owner = repo_owner,
                repository = repo_name,
                sha = sha,
                attempts = settings.stats_retry.max_attempts,
                error_message = e.to_string(),
                "Failed to fetch commit statistics. Counting the commit as empty."
            );
            CommitStats::empty()
        }
    }
}
