//! In-memory developer platform used by the unit tests of this crate.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use repo_tally_developer_platforms::errors::Error;
use repo_tally_developer_platforms::models::{Commit, CommitDetail, FileChange, Repository};
use repo_tally_developer_platforms::{CommitQuery, CommitStatsProvider};

/// The kinds of failure a mock call can be scripted to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Conflict,
    NotFound,
    Transient,
}

impl Failure {
    fn into_error(self, resource: &str) -> Error {
        match self {
            Failure::Conflict => Error::Conflict(resource.to_string()),
            Failure::NotFound => Error::NotFound(resource.to_string()),
            Failure::Transient => Error::ServerError(502),
        }
    }
}

#[derive(Debug, Default)]
pub struct MockProvider {
    repositories: Vec<Repository>,
    failing_repository_page: Option<u32>,
    commits: HashMap<String, Vec<Commit>>,
    failing_commit_page: HashMap<String, u32>,
    details: HashMap<String, CommitDetail>,
    scripted_failures: Mutex<HashMap<String, VecDeque<Failure>>>,
    get_commit_calls: Mutex<HashMap<String, u32>>,
    repository_pages_requested: Mutex<Vec<u32>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repositories(mut self, repositories: Vec<Repository>) -> Self {
        self.repositories = repositories;
        self
    }

    pub fn failing_repository_page(mut self, page: u32) -> Self {
        self.failing_repository_page = Some(page);
        self
    }

    pub fn with_commits(mut self, full_name: &str, commits: Vec<Commit>) -> Self {
        self.commits.insert(full_name.to_string(), commits);
        self
    }

    pub fn failing_commit_page(mut self, full_name: &str, page: u32) -> Self {
        self.failing_commit_page.insert(full_name.to_string(), page);
        self
    }

    pub fn with_detail(mut self, detail: CommitDetail) -> Self {
        self.details.insert(detail.sha.clone(), detail);
        self
    }

    /// The next `get_commit` calls for `sha` fail in the given order.
    pub fn with_failures(self, sha: &str, failures: Vec<Failure>) -> Self {
        self.scripted_failures
            .lock()
            .unwrap()
            .insert(sha.to_string(), failures.into());
        self
    }

    pub fn get_commit_calls(&self, sha: &str) -> u32 {
        *self.get_commit_calls.lock().unwrap().get(sha).unwrap_or(&0)
    }

    pub fn repository_pages_requested(&self) -> Vec<u32> {
        self.repository_pages_requested.lock().unwrap().clone()
    }
}

fn page_of<T: Clone>(items: &[T], page: u32, per_page: u32) -> Vec<T> {
    let start = (page.saturating_sub(1) as usize) * per_page as usize;
    items
        .iter()
        .skip(start)
        .take(per_page as usize)
        .cloned()
        .collect()
}

#[async_trait]
impl CommitStatsProvider for MockProvider {
    async fn list_repositories(&self, page: u32, per_page: u32) -> Result<Vec<Repository>, Error> {
        self.repository_pages_requested.lock().unwrap().push(page);
        if self.failing_repository_page == Some(page) {
            return Err(Error::ServerError(500));
        }

        Ok(page_of(&self.repositories, page, per_page))
    }

    async fn list_commits(
        &self,
        repo_owner: &str,
        repo_name: &str,
        _query: &CommitQuery,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Commit>, Error> {
        let full_name = format!("{}/{}", repo_owner, repo_name);
        if self.failing_commit_page.get(&full_name) == Some(&page) {
            return Err(Error::Network("connection reset".to_string()));
        }

        let commits = self.commits.get(&full_name).cloned().unwrap_or_default();
        Ok(page_of(&commits, page, per_page))
    }

    async fn get_commit(
        &self,
        _repo_owner: &str,
        _repo_name: &str,
        sha: &str,
    ) -> Result<CommitDetail, Error> {
        *self
            .get_commit_calls
            .lock()
            .unwrap()
            .entry(sha.to_string())
            .or_insert(0) += 1;

        let scripted = self
            .scripted_failures
            .lock()
            .unwrap()
            .get_mut(sha)
            .and_then(|q| q.pop_front());
        if let Some(failure) = scripted {
            return Err(failure.into_error(sha));
        }

        self.details
            .get(sha)
            .cloned()
            .ok_or_else(|| Error::NotFound(sha.to_string()))
    }
}

pub fn repository(owner: &str, name: &str) -> Repository {
    Repository {
        id: name.len() as u64,
        owner: owner.to_string(),
        name: name.to_string(),
        full_name: format!("{}/{}", owner, name),
        size: 1,
    }
}

pub fn commit(sha: &str) -> Commit {
    commit_at(sha, Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap())
}

pub fn commit_at(sha: &str, authored_at: DateTime<Utc>) -> Commit {
    Commit {
        sha: sha.to_string(),
        author_login: Some("octocat".to_string()),
        authored_at: Some(authored_at),
    }
}

/// A commit whose totals equal the sum of the given files.
pub fn detail(sha: &str, files: &[(&str, u64, u64)]) -> CommitDetail {
    let additions: u64 = files.iter().map(|f| f.1).sum();
    let deletions: u64 = files.iter().map(|f| f.2).sum();
    CommitDetail {
        sha: sha.to_string(),
        additions,
        deletions,
        total: additions + deletions,
        files: files
            .iter()
            .map(|(name, a, d)| FileChange {
                filename: name.to_string(),
                additions: *a,
                deletions: *d,
            })
            .collect(),
    }
}
