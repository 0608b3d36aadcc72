//! # Developer platforms
//!
//! Read-only access to repository and commit statistics hosted on developer
//! platforms. The [`CommitStatsProvider`] trait is the seam between the
//! statistics pipeline and a concrete platform; [`github::GitHubProvider`] is
//! the GitHub REST implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub mod clock;

pub mod errors;

pub mod github;

pub mod models;

pub mod throttle;

use errors::Error;
use models::{Commit, CommitDetail, Repository};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Filters applied when listing the commits of a repository.
///
/// Both bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitQuery {
    /// The platform login of the commit author
    pub author: String,

    /// Only commits authored at or after this instant are returned
    pub since: DateTime<Utc>,

    /// Only commits authored at or before this instant are returned
    pub until: DateTime<Utc>,
}

/// Trait for developer platforms that can report repositories and commit statistics.
///
/// All listing operations are paged. Page numbers start at 1 and an empty page
/// marks the end of the collection.
///
/// # Example Implementation
///
/// ```rust,no_run
/// use repo_tally_developer_platforms::{CommitQuery, CommitStatsProvider, errors::Error};
/// use repo_tally_developer_platforms::models::{Commit, CommitDetail, Repository};
/// use async_trait::async_trait;
///
/// #[derive(Debug)]
/// struct StaticProvider {
///     repositories: Vec<Repository>,
/// }
///
/// #[async_trait]
/// impl CommitStatsProvider for StaticProvider {
///     async fn list_repositories(&self, page: u32, _per_page: u32) -> Result<Vec<Repository>, Error> {
///         if page == 1 {
///             Ok(self.repositories.clone())
///         } else {
///             Ok(Vec::new())
///         }
///     }
///
///     // Implement other required methods...
///     # async fn list_commits(&self, _: &str, _: &str, _: &CommitQuery, _: u32, _: u32) -> Result<Vec<Commit>, Error> { unimplemented!() }
///     # async fn get_commit(&self, _: &str, _: &str, _: &str) -> Result<CommitDetail, Error> { unimplemented!() }
/// }
/// ```
#[async_trait]
pub trait CommitStatsProvider: Send + Sync {
    /// Lists one page of the repositories visible to the authenticated account.
    ///
    /// # Arguments
    ///
    /// * `page` - The 1-based page number
    /// * `per_page` - The maximum number of repositories on the page
    async fn list_repositories(&self, page: u32, per_page: u32) -> Result<Vec<Repository>, Error>;

    /// Lists one page of the commits of a repository matching the query.
    ///
    /// # Arguments
    ///
    /// * `repo_owner` - The owner of the repository
    /// * `repo_name` - The name of the repository
    /// * `query` - The author and date filters
    /// * `page` - The 1-based page number
    /// * `per_page` - The maximum number of commits on the page
    async fn list_commits(
        &self,
        repo_owner: &str,
        repo_name: &str,
        query: &CommitQuery,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Commit>, Error>;

    /// Gets the line statistics and the changed files of a single commit.
    ///
    /// # Arguments
    ///
    /// * `repo_owner` - The owner of the repository
    /// * `repo_name` - The name of the repository
    /// * `sha` - The commit hash
    async fn get_commit(
        &self,
        repo_owner: &str,
        repo_name: &str,
        sha: &str,
    ) -> Result<CommitDetail, Error>;
}
