use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

#[derive(Error, Debug)]
pub enum TallyError {
    #[error("Invalid exclusion pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid analysis period: {0}")]
    InvalidPeriod(String),

    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Line counts overflowed while processing '{0}'")]
    Overflow(String),

    #[error("Developer platform error: {0}")]
    Provider(#[from] repo_tally_developer_platforms::errors::Error),

    #[error("Repository not found: {0}")]
    RepositoryNotFound(String),

    #[error("Failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}
