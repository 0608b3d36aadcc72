use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The reports could not be written
    #[error("Failed to write reports: {0}")]
    ReportFailed(String),

    /// The tally could not be completed
    #[error("Run failed: {0}")]
    RunFailed(String),
}

impl std::process::Termination for CliError {
    fn report(self) -> std::process::ExitCode {
        match self {
            CliError::ConfigError(_) | CliError::ReportFailed(_) | CliError::RunFailed(_) => {
                std::process::ExitCode::FAILURE
            }
        }
    }
}
