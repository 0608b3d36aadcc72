//! # Models
//!
//! This module contains the data models returned by developer platform providers.
//!
//! The models are deliberately small: they carry only the fields the statistics
//! pipeline needs, and they own their data so that they can outlive the HTTP
//! response they were decoded from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;

/// Represents a repository on the developer platform.
///
/// # Examples
///
/// ```
/// use repo_tally_developer_platforms::models::Repository;
///
/// let repo = Repository {
///     id: 42,
///     owner: "octocat".to_string(),
///     name: "hello-world".to_string(),
///     full_name: "octocat/hello-world".to_string(),
///     size: 108,
/// };
/// assert_eq!(repo.full_name, format!("{}/{}", repo.owner, repo.name));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// The unique identifier of the repository
    pub id: u64,

    /// The login of the repository owner
    pub owner: String,

    /// The short name of the repository
    pub name: String,

    /// The `owner/name` form of the repository name
    pub full_name: String,

    /// The size of the repository in kilobytes, as reported by the platform
    pub size: u64,
}

/// A commit as returned by the commit listing.
///
/// Only the identifier is required to fetch statistics. The author details are
/// kept for logging and for filtering on the author date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// The commit hash
    pub sha: String,

    /// The platform login of the author, when the commit is linked to an account
    pub author_login: Option<String>,

    /// The author date recorded in the commit
    pub authored_at: Option<DateTime<Utc>>,
}

/// The line counts for a single file touched by a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    /// The path of the file, relative to the repository root
    pub filename: String,

    /// Number of lines added to the file
    pub additions: u64,

    /// Number of lines removed from the file
    pub deletions: u64,
}

/// The full statistics of a single commit as reported by the platform.
///
/// The platform caps the file list (GitHub stops at 300 entries) so `files`
/// may not account for all of `additions` and `deletions`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommitDetail {
    /// The commit hash
    pub sha: String,

    /// Total lines added by the commit
    pub additions: u64,

    /// Total lines removed by the commit
    pub deletions: u64,

    /// Total lines changed by the commit
    pub total: u64,

    /// The per-file changes, possibly truncated
    pub files: Vec<FileChange>,
}
