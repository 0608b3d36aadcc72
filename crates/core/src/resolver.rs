//! # Repository resolution
//!
//! Lists the repositories an account can reach and finds one by name.

use std::sync::Arc;

use repo_tally_developer_platforms::clock::Clock;
use repo_tally_developer_platforms::models::Repository;
use repo_tally_developer_platforms::CommitStatsProvider;
use tracing::{debug, info, instrument, warn};

use crate::config::{MAX_REPOSITORY_PAGES, PAGE_SIZE};
use crate::errors::TallyError;
use crate::retry::RetryPolicy;

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;

/// Enumerates and looks up the repositories of an account.
#[derive(Debug)]
pub struct RepositoryResolver<P: CommitStatsProvider + ?Sized> {
    account: String,
    clock: Arc<dyn Clock>,
    max_pages: u32,
    page_size: u32,
    provider: Arc<P>,
    retry: RetryPolicy,
}

impl<P: CommitStatsProvider + ?Sized> RepositoryResolver<P> {
    pub fn new(provider: Arc<P>, clock: Arc<dyn Clock>, account: &str) -> Self {
        Self {
            account: account.to_string(),
            clock,
            max_pages: MAX_REPOSITORY_PAGES,
            page_size: PAGE_SIZE,
            provider,
            retry: RetryPolicy::page_listing(),
        }
    }

    /// Overrides the paging limits, mostly useful for tests.
    pub fn with_paging(mut self, page_size: u32, max_pages: u32) -> Self {
        self.page_size = page_size;
        self.max_pages = max_pages;
        self
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    /// Collects every repository visible to the account.
    ///
    /// Pages are requested until one comes back empty or `max_pages` pages
    /// have been read. A page that fails ends the listing; the repositories
    /// collected so far are still returned.
    #[instrument(skip(self), fields(account = self.account.as_str()))]
    pub async fn list_all(&self) -> Vec<Repository> {
        let mut repositories = Vec::new();

        for page in 1..=self.max_pages {
            let result = self
                .retry
                .run(self.clock.as_ref(), |_| {
                    self.provider.list_repositories(page, self.page_size)
                })
                .await;

            match result {
                Ok(batch) if batch.is_empty() => {
                    info!(count = repositories.len(), "Listed repositories");
                    return repositories;
                }
                Ok(batch) => {
                    debug!(page, count = batch.len(), "Fetched a page of repositories");
                    repositories.extend(batch);
                }
                Err(e) => {
                    warn!(
                        page,
                        collected = repositories.len(),
                        error_message = e.to_string(),
                        "Failed to fetch a page of repositories. Continuing with the repositories collected so far."
                    );
                    return repositories;
                }
            }
        }

        warn!(
            max_pages = self.max_pages,
            count = repositories.len(),
            "Stopped listing repositories at the page limit"
        );
        repositories
    }

    /// Finds a repository by `name` or `owner/name`.
    ///
    /// An exact `owner/name` match wins, then a repository owned by the
    /// account, then the first repository with that bare name.
    ///
    /// # Errors
    ///
    /// Returns `TallyError::RepositoryNotFound` when nothing matches.
    #[instrument(skip(self), fields(account = self.account.as_str()))]
    pub async fn find_by_name(&self, query: &str) -> Result<Repository, TallyError> {
        let repositories = self.list_all().await;
        let owned = format!("{}/{}", self.account, query);

        let found = repositories
            .iter()
            .find(|r| r.full_name == query)
            .or_else(|| repositories.iter().find(|r| r.full_name == owned))
            .or_else(|| repositories.iter().find(|r| r.name == query));

        match found {
            Some(repository) => {
                debug!(
                    repository = repository.full_name.as_str(),
                    "Resolved repository"
                );
                Ok(repository.clone())
            }
            None => Err(TallyError::RepositoryNotFound(query.to_string())),
        }
    }
}
