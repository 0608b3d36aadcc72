use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, instrument, warn};

use crate::{
    errors::Error,
    models::{Commit, CommitDetail, FileChange, Repository},
    throttle::Throttle,
    CommitQuery, CommitStatsProvider,
};

#[cfg(test)]
#[path = "github_tests.rs"]
mod tests;

/// The public GitHub REST endpoint.
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// The REST API version the wire models are written against.
const GITHUB_API_VERSION: &str = "2022-11-28";

const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";

const REPO_TALLY_USER_AGENT: &str = "repo-tally";

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiAccount {
    login: String,
}

#[derive(Debug, Deserialize)]
struct ApiRepository {
    id: u64,
    name: String,
    full_name: String,
    owner: ApiAccount,
    #[serde(default)]
    size: u64,
}

impl From<ApiRepository> for Repository {
    fn from(repo: ApiRepository) -> Self {
        Repository {
            id: repo.id,
            owner: repo.owner.login,
            name: repo.name,
            full_name: repo.full_name,
            size: repo.size,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiSignature {
    date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct ApiGitCommit {
    author: Option<ApiSignature>,
}

#[derive(Debug, Deserialize)]
struct ApiCommitSummary {
    sha: String,
    author: Option<ApiAccount>,
    commit: ApiGitCommit,
}

impl From<ApiCommitSummary> for Commit {
    fn from(summary: ApiCommitSummary) -> Self {
        Commit {
            sha: summary.sha,
            author_login: summary.author.map(|a| a.login),
            authored_at: summary.commit.author.and_then(|a| a.date),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ApiCommitStats {
    #[serde(default)]
    additions: u64,
    #[serde(default)]
    deletions: u64,
    #[serde(default)]
    total: u64,
}

#[derive(Debug, Deserialize)]
struct ApiFile {
    filename: String,
    #[serde(default)]
    additions: u64,
    #[serde(default)]
    deletions: u64,
}

#[derive(Debug, Deserialize)]
struct ApiCommitDetail {
    sha: String,
    #[serde(default)]
    stats: Option<ApiCommitStats>,
    #[serde(default)]
    files: Vec<ApiFile>,
}

impl From<ApiCommitDetail> for CommitDetail {
    fn from(detail: ApiCommitDetail) -> Self {
        let stats = detail.stats.unwrap_or_default();
        CommitDetail {
            sha: detail.sha,
            additions: stats.additions,
            deletions: stats.deletions,
            total: stats.total,
            files: detail
                .files
                .into_iter()
                .map(|f| FileChange {
                    filename: f.filename,
                    additions: f.additions,
                    deletions: f.deletions,
                })
                .collect(),
        }
    }
}

/// Maps a non-success HTTP status onto the error taxonomy.
///
/// A 403 only counts as a rate limit when the remaining quota header reads zero;
/// otherwise it is a permission problem.
fn error_for_status(
    status: StatusCode,
    rate_limit_remaining: Option<&str>,
    resource: &str,
    message: String,
) -> Error {
    match status {
        StatusCode::UNAUTHORIZED => Error::AuthError(message),
        StatusCode::FORBIDDEN if rate_limit_remaining.map(str::trim) == Some("0") => {
            Error::RateLimitExceeded
        }
        StatusCode::FORBIDDEN => Error::AuthError(message),
        StatusCode::TOO_MANY_REQUESTS => Error::RateLimitExceeded,
        StatusCode::NOT_FOUND => Error::NotFound(resource.to_string()),
        StatusCode::CONFLICT => Error::Conflict(resource.to_string()),
        s if s.is_server_error() => Error::ServerError(s.as_u16()),
        s => Error::UnexpectedStatus(s.as_u16(), message),
    }
}

fn format_timestamp(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Reads repositories and commit statistics from the GitHub REST API.
///
/// Every request is paced by the shared [`Throttle`].
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use repo_tally_developer_platforms::clock::TokioClock;
/// use repo_tally_developer_platforms::github::GitHubProvider;
/// use repo_tally_developer_platforms::throttle::{Throttle, ThrottleConfig};
/// use repo_tally_developer_platforms::CommitStatsProvider;
///
/// # async fn demo() -> Result<(), repo_tally_developer_platforms::errors::Error> {
/// let throttle = Arc::new(Throttle::new(ThrottleConfig::default(), Arc::new(TokioClock)));
/// let provider = GitHubProvider::new("ghp_example", throttle)?;
///
/// let first_page = provider.list_repositories(1, 100).await?;
/// println!("Found {} repositories", first_page.len());
/// # Ok(())
/// # }
/// ```
pub struct GitHubProvider {
    base_url: String,
    client: reqwest::Client,
    throttle: Arc<Throttle>,
    token: String,
}

impl std::fmt::Debug for GitHubProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubProvider")
            .field("base_url", &self.base_url)
            .field("calls_made", &self.throttle.calls_made())
            .finish_non_exhaustive()
    }
}

impl GitHubProvider {
    /// Creates a provider that authenticates with a personal access token.
    ///
    /// # Errors
    ///
    /// Returns `Error::Network` if the underlying HTTP client cannot be built.
    pub fn new(token: &str, throttle: Arc<Throttle>) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(REPO_TALLY_USER_AGENT));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| {
                error!(error = e.to_string(), "Failed to build the HTTP client");
                Error::Network(e.to_string())
            })?;

        Ok(Self {
            base_url: GITHUB_API_URL.to_string(),
            client,
            throttle,
            token: token.to_string(),
        })
    }

    /// Points the provider at a different API root, e.g. a GitHub Enterprise host.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, Error> {
        self.throttle.throttle().await;

        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                warn!(
                    path = path,
                    error_message = e.to_string(),
                    "Request to GitHub failed before a response was received"
                );
                Error::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let remaining = response
                .headers()
                .get(RATE_LIMIT_REMAINING_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or(body);

            warn!(
                path = path,
                status = status.as_u16(),
                error_message = message.as_str(),
                "Received an error from GitHub"
            );
            return Err(error_for_status(
                status,
                remaining.as_deref(),
                path,
                message,
            ));
        }

        response.json::<T>().await.map_err(|e| {
            error!(
                path = path,
                error_message = e.to_string(),
                "Failed to decode the GitHub response"
            );
            Error::InvalidResponse(e.to_string())
        })
    }
}

#[async_trait]
impl CommitStatsProvider for GitHubProvider {
    #[instrument(skip(self))]
    async fn list_repositories(&self, page: u32, per_page: u32) -> Result<Vec<Repository>, Error> {
        let repos: Vec<ApiRepository> = self
            .get_json(
                "/user/repos",
                &[
                    (
                        "affiliation",
                        "owner,collaborator,organization_member".to_string(),
                    ),
                    ("sort", "updated".to_string()),
                    ("per_page", per_page.to_string()),
                    ("page", page.to_string()),
                ],
            )
            .await?;

        debug!(page, count = repos.len(), "Listed repositories");
        Ok(repos.into_iter().map(Repository::from).collect())
    }

    #[instrument(skip(self, query), fields(author = query.author.as_str()))]
    async fn list_commits(
        &self,
        repo_owner: &str,
        repo_name: &str,
        query: &CommitQuery,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Commit>, Error> {
        let path = format!(
            "/repos/{}/{}/commits",
            urlencoding::encode(repo_owner),
            urlencoding::encode(repo_name)
        );
        let commits: Vec<ApiCommitSummary> = self
            .get_json(
                &path,
                &[
                    ("author", query.author.clone()),
                    ("since", format_timestamp(&query.since)),
                    ("until", format_timestamp(&query.until)),
                    ("per_page", per_page.to_string()),
                    ("page", page.to_string()),
                ],
            )
            .await?;

        debug!(
            repository_owner = repo_owner,
            repository = repo_name,
            page,
            count = commits.len(),
            "Listed commits"
        );
        Ok(commits.into_iter().map(Commit::from).collect())
    }

    #[instrument(skip(self))]
    async fn get_commit(
        &self,
        repo_owner: &str,
        repo_name: &str,
        sha: &str,
    ) -> Result<CommitDetail, Error> {
        let path = format!(
            "/repos/{}/{}/commits/{}",
            urlencoding::encode(repo_owner),
            urlencoding::encode(repo_name),
            urlencoding::encode(sha)
        );
        let detail: ApiCommitDetail = self.get_json(&path, &[]).await?;

        Ok(CommitDetail::from(detail))
    }
}
