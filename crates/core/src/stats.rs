//! # Statistics model
//!
//! The per-commit, per-repository and per-run statistics produced by a tally.
//!
//! Run level results are built incrementally: every processed repository is
//! recorded as either a success or a failure, and the totals are kept in step
//! so that `net_lines == total_additions - total_deletions` at all times.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use repo_tally_developer_platforms::models::{CommitDetail, FileChange};
use serde::{Deserialize, Serialize};

use crate::config::{AnalysisPeriod, TRUNCATED_FILE_COUNT, TRUNCATED_TOTAL_CHANGES};
use crate::errors::TallyError;

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;

/// The line statistics of one commit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommitStats {
    /// Lines added by the commit across all files
    pub additions: u64,

    /// Lines removed by the commit across all files
    pub deletions: u64,

    /// Lines changed by the commit across all files
    pub total: u64,

    /// The per-file breakdown, possibly incomplete
    pub files: Vec<FileChange>,

    /// Set when the per-file breakdown may not account for every changed line
    pub truncated: bool,
}

impl CommitStats {
    /// Zero-valued statistics, used when a commit cannot be read.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the platform stops short of reporting every file of the commit.
    ///
    /// # Examples
    ///
    /// ```
    /// use repo_tally_core::stats::CommitStats;
    ///
    /// assert!(CommitStats::is_truncated(300, 10));
    /// assert!(CommitStats::is_truncated(1, 60_000));
    /// assert!(!CommitStats::is_truncated(10, 40));
    /// ```
    pub fn is_truncated(file_count: usize, total_changes: u64) -> bool {
        file_count >= TRUNCATED_FILE_COUNT || total_changes > TRUNCATED_TOTAL_CHANGES
    }

    /// Whether the per-file breakdown is missing even though lines changed.
    pub fn lacks_file_breakdown(&self) -> bool {
        self.files.is_empty() && self.total > 0
    }
}

impl From<CommitDetail> for CommitStats {
    fn from(detail: CommitDetail) -> Self {
        let truncated = Self::is_truncated(detail.files.len(), detail.total);
        Self {
            additions: detail.additions,
            deletions: detail.deletions,
            total: detail.total,
            files: detail.files,
            truncated,
        }
    }
}

/// Line statistics for one file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileTypeStats {
    pub additions: u64,
    pub deletions: u64,

    /// The number of file changes attributed to the extension
    pub files: u64,
}

impl FileTypeStats {
    fn merge(&mut self, other: &FileTypeStats) {
        self.additions = self.additions.saturating_add(other.additions);
        self.deletions = self.deletions.saturating_add(other.deletions);
        self.files = self.files.saturating_add(other.files);
    }
}

/// The accumulated statistics of one repository.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoResult {
    /// The `owner/name` of the repository
    pub repository: String,

    pub additions: u64,
    pub deletions: u64,
    pub commits: u64,
    pub net_lines: i64,

    /// Commits whose per-file breakdown was truncated by the platform
    pub truncated_commits: u64,

    /// Per-extension statistics of the included files
    pub file_type_stats: BTreeMap<String, FileTypeStats>,
}

impl RepoResult {
    pub fn new(repository: &str) -> Self {
        Self {
            repository: repository.to_string(),
            ..Self::default()
        }
    }

    /// Adds lines to the totals, failing instead of wrapping on overflow.
    pub fn add_lines(&mut self, additions: u64, deletions: u64) -> Result<(), TallyError> {
        let overflow = || TallyError::Overflow(self.repository.clone());
        let new_additions = self.additions.checked_add(additions).ok_or_else(overflow)?;
        let new_deletions = self.deletions.checked_add(deletions).ok_or_else(overflow)?;

        self.additions = new_additions;
        self.deletions = new_deletions;
        self.net_lines = net_lines(self.additions, self.deletions);
        Ok(())
    }

    /// Attributes an included file change to its extension.
    pub fn add_file_type(&mut self, extension: String, additions: u64, deletions: u64) {
        let entry = self.file_type_stats.entry(extension).or_default();
        entry.merge(&FileTypeStats {
            additions,
            deletions,
            files: 1,
        });
    }
}

/// A repository that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoFailure {
    pub repository: String,
    pub error: String,
}

/// How many repositories were processed and which ones failed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingStatus {
    pub successful: usize,
    pub failed: usize,

    /// Full names of the failed repositories, in processing order
    pub failed_repos: Vec<String>,

    /// The failure message of every failed repository
    pub failures: Vec<RepoFailure>,
}

/// The outcome of a complete run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub account: String,
    pub year: i32,
    pub period: AnalysisPeriod,
    pub total_additions: u64,
    pub total_deletions: u64,
    pub net_lines: i64,
    pub total_commits: u64,
    pub truncated_commits: u64,

    /// Results of the successfully processed repositories, in processing order
    pub repo_stats: Vec<RepoResult>,
    pub processing_status: ProcessingStatus,

    /// Per-extension statistics merged over all successful repositories
    pub file_type_stats: BTreeMap<String, FileTypeStats>,
    pub timestamp: DateTime<Utc>,
}

impl RunResult {
    pub fn new(account: &str, period: AnalysisPeriod, timestamp: DateTime<Utc>) -> Self {
        Self {
            account: account.to_string(),
            year: period.year,
            period,
            total_additions: 0,
            total_deletions: 0,
            net_lines: 0,
            total_commits: 0,
            truncated_commits: 0,
            repo_stats: Vec::new(),
            processing_status: ProcessingStatus::default(),
            file_type_stats: BTreeMap::new(),
            timestamp,
        }
    }

    /// Merges a successfully processed repository into the run totals.
    pub fn record_success(&mut self, result: RepoResult) {
        self.total_additions = self.total_additions.saturating_add(result.additions);
        self.total_deletions = self.total_deletions.saturating_add(result.deletions);
        self.total_commits = self.total_commits.saturating_add(result.commits);
        self.truncated_commits = self
            .truncated_commits
            .saturating_add(result.truncated_commits);
        self.net_lines = net_lines(self.total_additions, self.total_deletions);

        for (extension, stats) in &result.file_type_stats {
            self.file_type_stats
                .entry(extension.clone())
                .or_default()
                .merge(stats);
        }

        self.processing_status.successful += 1;
        self.repo_stats.push(result);
    }

    /// Records a repository that failed. Nothing is added to the totals.
    pub fn record_failure(&mut self, repository: &str, error: &str) {
        self.processing_status.failed += 1;
        self.processing_status
            .failed_repos
            .push(repository.to_string());
        self.processing_status.failures.push(RepoFailure {
            repository: repository.to_string(),
            error: error.to_string(),
        });
    }

    /// The repositories with the most added lines, largest first.
    pub fn top_repositories(&self, count: usize) -> Vec<&RepoResult> {
        let mut repos: Vec<&RepoResult> = self.repo_stats.iter().collect();
        repos.sort_by(|a, b| b.additions.cmp(&a.additions));
        repos.truncate(count);
        repos
    }

    /// The file extensions with the most added lines, largest first.
    ///
    /// Ties are broken by extension name.
    pub fn top_file_types(&self, count: usize) -> Vec<(&str, &FileTypeStats)> {
        let mut types: Vec<(&str, &FileTypeStats)> = self
            .file_type_stats
            .iter()
            .map(|(k, v)| (k.as_str(), v))
            .collect();
        types.sort_by(|a, b| b.1.additions.cmp(&a.1.additions));
        types.truncate(count);
        types
    }
}

fn net_lines(additions: u64, deletions: u64) -> i64 {
    (additions as i128 - deletions as i128).clamp(i64::MIN as i128, i64::MAX as i128) as i64
}
