//! # Repository processing
//!
//! Turns the commits of one repository into a [`RepoResult`].

use std::sync::Arc;

use async_trait::async_trait;
use repo_tally_developer_platforms::clock::Clock;
use repo_tally_developer_platforms::models::Repository;
use repo_tally_developer_platforms::{CommitQuery, CommitStatsProvider};
use tracing::{debug, info, instrument, trace};

use crate::classifier::{file_extension, FileClassifier};
use crate::config::AnalysisPeriod;
use crate::errors::TallyError;
use crate::fetch::{fetch_commit_stats, fetch_commits, FetchSettings};
use crate::stats::{CommitStats, RepoResult};

#[cfg(test)]
#[path = "processor_tests.rs"]
mod tests;

/// Produces the statistics of a single repository.
///
/// An `Err` marks the whole repository as failed; no partial statistics are
/// reported for it.
#[async_trait]
pub trait RepositoryProcessor: Send + Sync {
    async fn process(
        &self,
        repository: &Repository,
        period: &AnalysisPeriod,
    ) -> Result<RepoResult, TallyError>;
}

/// Adds the statistics of one commit to a repository result.
///
/// Only files accepted by the classifier are counted. When the platform
/// reported no files at all for a commit that did change lines, the commit's
/// own totals are used instead.
pub fn tally_commit(
    result: &mut RepoResult,
    stats: &CommitStats,
    classifier: &FileClassifier,
) -> Result<(), TallyError> {
    result.commits += 1;
    if stats.truncated {
        result.truncated_commits += 1;
    }

    if stats.lacks_file_breakdown() {
        return result.add_lines(stats.additions, stats.deletions);
    }

    for file in &stats.files {
        if let Some(rule) = classifier.excluded_by(&file.filename) {
            trace!(file = file.filename.as_str(), rule, "Excluded file");
            continue;
        }

        result.add_lines(file.additions, file.deletions)?;
        result.add_file_type(
            file_extension(&file.filename),
            file.additions,
            file.deletions,
        );
    }

    Ok(())
}

/// Tallies the commits an author made to a repository.
///
/// Repositories are read one commit at a time, in the order the platform
/// lists them.
#[derive(Debug)]
pub struct CommitTallyProcessor<P: CommitStatsProvider + ?Sized> {
    author: String,
    classifier: FileClassifier,
    clock: Arc<dyn Clock>,
    provider: Arc<P>,
    settings: FetchSettings,
}

impl<P: CommitStatsProvider + ?Sized> CommitTallyProcessor<P> {
    pub fn new(
        provider: Arc<P>,
        clock: Arc<dyn Clock>,
        author: &str,
        classifier: FileClassifier,
        settings: FetchSettings,
    ) -> Self {
        Self {
            author: author.to_string(),
            classifier,
            clock,
            provider,
            settings,
        }
    }
}

#[async_trait]
impl<P: CommitStatsProvider + ?Sized> RepositoryProcessor for CommitTallyProcessor<P> {
    #[instrument(skip(self, repository, period), fields(repository = repository.full_name.as_str()))]
    async fn process(
        &self,
        repository: &Repository,
        period: &AnalysisPeriod,
    ) -> Result<RepoResult, TallyError> {
        let query = CommitQuery {
            author: self.author.clone(),
            since: period.since,
            until: period.until,
        };

        let commits = fetch_commits(
            self.provider.as_ref(),
            self.clock.as_ref(),
            &self.settings,
            &repository.owner,
            &repository.name,
            &query,
        )
        .await;

        info!(
            repository = repository.full_name.as_str(),
            commits = commits.len(),
            "Found commits by author"
        );

        let mut result = RepoResult::new(&repository.full_name);
        for commit in &commits {
            if let Some(authored_at) = commit.authored_at {
                if !period.contains(&authored_at) {
                    debug!(
                        sha = commit.sha.as_str(),
                        authored_at = authored_at.to_rfc3339(),
                        "Skipping commit outside the analysis period"
                    );
                    continue;
                }
            }

            let stats = fetch_commit_stats(
                self.provider.as_ref(),
                self.clock.as_ref(),
                &self.settings,
                &repository.owner,
                &repository.name,
                &commit.sha,
            )
            .await;

            tally_commit(&mut result, &stats, &self.classifier)?;
        }

        info!(
            repository = repository.full_name.as_str(),
            additions = result.additions,
            deletions = result.deletions,
            commits = result.commits,
            truncated_commits = result.truncated_commits,
            "Processed repository"
        );

        Ok(result)
    }
}
