//! # Repo Tally Core
//!
//! Core logic for tallying the lines an author added and removed across the
//! repositories of a developer platform account.
//!
//! A run resolves the repositories to analyse, processes them one after the
//! other and merges the per-repository results into a [`stats::RunResult`].
//! A repository that fails is recorded as a failure; it never aborts the run.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use repo_tally_core::{classifier::FileClassifier, config::AnalysisPeriod, RepoTally};
//! use repo_tally_developer_platforms::clock::{Clock, TokioClock};
//! use repo_tally_developer_platforms::github::GitHubProvider;
//! use repo_tally_developer_platforms::throttle::{Throttle, ThrottleConfig};
//!
//! async fn tally(token: &str) -> Result<(), Box<dyn std::error::Error>> {
//!     let clock: Arc<dyn Clock> = Arc::new(TokioClock);
//!     let throttle = Arc::new(Throttle::new(ThrottleConfig::default(), clock.clone()));
//!     let provider = Arc::new(GitHubProvider::new(token, throttle)?);
//!
//!     let tally = RepoTally::for_provider(provider, clock, "octocat", FileClassifier::default());
//!     let result = tally.run(None, &AnalysisPeriod::for_year(2024)?).await?;
//!
//!     println!("{} lines added", result.total_additions);
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use chrono::Utc;
use repo_tally_developer_platforms::clock::Clock;
use repo_tally_developer_platforms::models::Repository;
use repo_tally_developer_platforms::CommitStatsProvider;
use tracing::{error, info, instrument, warn};

pub mod classifier;
use classifier::FileClassifier;

pub mod config;
use config::AnalysisPeriod;

pub mod errors;
use errors::TallyError;

pub mod fetch;
use fetch::FetchSettings;

pub mod processor;
use processor::{CommitTallyProcessor, RepositoryProcessor};

pub mod report;
pub mod resolver;
use resolver::RepositoryResolver;

pub mod retry;
pub mod stats;
use stats::RunResult;

#[cfg(test)]
mod test_support;

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Runs a tally over one or all repositories of an account.
///
/// Repositories are processed sequentially, in the order the resolver returns
/// them.
#[derive(Debug)]
pub struct RepoTally<P: CommitStatsProvider + ?Sized, R: RepositoryProcessor> {
    processor: R,
    resolver: RepositoryResolver<P>,
}

impl<P: CommitStatsProvider + ?Sized> RepoTally<P, CommitTallyProcessor<P>> {
    /// Creates a tally that reads commits through `provider`.
    ///
    /// The account doubles as the commit author that is counted.
    pub fn for_provider(
        provider: Arc<P>,
        clock: Arc<dyn Clock>,
        account: &str,
        classifier: FileClassifier,
    ) -> Self {
        let resolver = RepositoryResolver::new(provider.clone(), clock.clone(), account);
        let processor = CommitTallyProcessor::new(
            provider,
            clock,
            account,
            classifier,
            FetchSettings::default(),
        );
        Self::new(resolver, processor)
    }
}

impl<P: CommitStatsProvider + ?Sized, R: RepositoryProcessor> RepoTally<P, R> {
    pub fn new(resolver: RepositoryResolver<P>, processor: R) -> Self {
        Self {
            processor,
            resolver,
        }
    }

    /// Tallies the commits of the account over the period.
    ///
    /// With a `target` only that repository is processed, otherwise every
    /// repository the account can see.
    ///
    /// # Errors
    ///
    /// Returns `TallyError::RepositoryNotFound` when `target` does not name a
    /// repository of the account. Failures of individual repositories are
    /// recorded in the result instead.
    #[instrument(skip(self, period), fields(account = self.resolver.account(), year = period.year))]
    pub async fn run(
        &self,
        target: Option<&str>,
        period: &AnalysisPeriod,
    ) -> Result<RunResult, TallyError> {
        let repositories: Vec<Repository> = match target {
            Some(name) => vec![self.resolver.find_by_name(name).await?],
            None => self.resolver.list_all().await,
        };

        info!(
            count = repositories.len(),
            since = period.since.to_rfc3339(),
            until = period.until.to_rfc3339(),
            "Processing repositories"
        );
        if repositories.is_empty() {
            warn!("No repositories to process");
        }

        let mut result = RunResult::new(self.resolver.account(), *period, Utc::now());
        for (index, repository) in repositories.iter().enumerate() {
            info!(
                repository = repository.full_name.as_str(),
                position = index + 1,
                total = repositories.len(),
                "Processing repository"
            );

            match self.processor.process(repository, period).await {
                Ok(repo_result) => result.record_success(repo_result),
                Err(e) => {
                    error!(
                        repository = repository.full_name.as_str(),
                        error_message = e.to_string(),
                        "Failed to process repository"
                    );
                    result.record_failure(&repository.full_name, &e.to_string());
                }
            }
        }

        info!(
            successful = result.processing_status.successful,
            failed = result.processing_status.failed,
            total_additions = result.total_additions,
            total_deletions = result.total_deletions,
            net_lines = result.net_lines,
            total_commits = result.total_commits,
            "Finished processing repositories"
        );

        Ok(result)
    }
}
