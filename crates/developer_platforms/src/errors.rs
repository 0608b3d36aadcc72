#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Error types for developer platform operations.
///
/// This enum represents the failures that can occur when reading repository
/// and commit data from a developer platform like GitHub. The variants mirror
/// the HTTP outcomes the platform reports so that callers can decide whether
/// an operation is worth retrying.
///
/// # Examples
///
/// ```rust
/// use repo_tally_developer_platforms::errors::Error;
///
/// let not_found = Error::NotFound("repos/octo/missing".to_string());
/// assert!(!not_found.is_retryable());
///
/// let rate_limit = Error::RateLimitExceeded;
/// assert_eq!(rate_limit.to_string(), "Rate limit exceeded");
/// assert!(rate_limit.is_retryable());
/// ```
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Authentication failed with the platform.
    ///
    /// The access token was rejected, has expired, or lacks the scopes
    /// needed to read the requested resource.
    #[error("Authentication failed: {0}")]
    AuthError(String),

    /// The platform reported a conflict for the requested resource.
    ///
    /// GitHub answers 409 for commits whose diff cannot be computed, for
    /// example on empty repositories or some merge commits.
    #[error("Conflict reported for: {0}")]
    Conflict(String),

    /// Invalid response format from platform API.
    ///
    /// The body could not be decoded into the expected structure.
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    /// The request never produced a response (DNS, TLS, connection resets, timeouts).
    #[error("Network error: {0}")]
    Network(String),

    /// The requested resource does not exist or is not visible to the caller.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Platform rate limit exceeded.
    ///
    /// GitHub allows 5000 requests per hour for authenticated requests and
    /// reports exhaustion through a 403 with a zero remaining quota, or a 429.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// The platform failed to serve the request (5xx).
    #[error("Server error: HTTP {0}")]
    ServerError(u16),

    /// Any other non-success status code.
    #[error("Unexpected response: HTTP {0}: {1}")]
    UnexpectedStatus(u16, String),
}

impl Error {
    /// Indicates whether repeating the same request could succeed.
    ///
    /// Missing resources and conflicts are permanent for a given commit, every
    /// other failure is treated as transient.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Error::NotFound(_) | Error::Conflict(_))
    }
}
