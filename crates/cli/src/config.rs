use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use repo_tally_core::config::DEFAULT_ANALYSIS_YEAR;
use repo_tally_developer_platforms::github::GITHUB_API_URL;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::CliError;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = ".repo-tally.toml";

/// Directory the reports are written to when none is configured
pub const DEFAULT_REPORTS_DIRECTORY: &str = "reports";

pub const TOKEN_VARIABLE: &str = "GITHUB_TOKEN";
pub const ACCOUNT_VARIABLE: &str = "GITHUB_USERNAME";
pub const YEAR_VARIABLE: &str = "ANALYSIS_YEAR";

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Contents of the optional configuration file
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub throttle: ThrottleSection,

    #[serde(default)]
    pub classifier: ClassifierSection,

    #[serde(default)]
    pub reports: ReportsSection,
}

impl AppConfig {
    /// Load configuration from the specified file.
    ///
    /// A missing file yields the default configuration.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        if !path.exists() {
            debug!("No configuration file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        debug!("Loading configuration from {:?}", path);
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::ConfigError(format!("Failed to read configuration file: {}", e))
        })?;

        toml::from_str(&content).map_err(|e| {
            CliError::ConfigError(format!("Failed to parse configuration file: {}", e))
        })
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct ThrottleSection {
    /// Ceiling on the sustained API call rate
    #[serde(default = "default_max_calls_per_hour")]
    pub max_calls_per_hour: u64,
}

impl Default for ThrottleSection {
    fn default() -> Self {
        Self {
            max_calls_per_hour: default_max_calls_per_hour(),
        }
    }
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassifierSection {
    /// Regular expressions excluding additional paths from the totals
    #[serde(default)]
    pub extra_exclusions: Vec<String>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportsSection {
    #[serde(default = "default_reports_directory")]
    pub directory: PathBuf,
}

impl Default for ReportsSection {
    fn default() -> Self {
        Self {
            directory: default_reports_directory(),
        }
    }
}

/// Values given on the command line, which take precedence over the environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub repository: Option<String>,
    pub reports_dir: Option<PathBuf>,
    pub year: Option<i32>,
}

/// The settings of one run, merged from the command line, the environment and
/// the configuration file.
pub struct Settings {
    pub account: String,
    pub api_url: String,
    pub extra_exclusions: Vec<String>,
    pub max_calls_per_hour: u64,
    pub reports_dir: PathBuf,
    pub repository: Option<String>,
    pub token: String,
    pub year: i32,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("account", &self.account)
            .field("api_url", &self.api_url)
            .field("extra_exclusions", &self.extra_exclusions)
            .field("max_calls_per_hour", &self.max_calls_per_hour)
            .field("reports_dir", &self.reports_dir)
            .field("repository", &self.repository)
            .field("year", &self.year)
            .finish_non_exhaustive()
    }
}

impl Settings {
    /// Merges the sources of configuration.
    ///
    /// `env` looks up environment variables. Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns `CliError::ConfigError` when the token or account is missing or
    /// the year is not a number.
    pub fn resolve<F>(overrides: Overrides, config: AppConfig, env: F) -> Result<Self, CliError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| env(name).filter(|v| !v.trim().is_empty());

        let token = lookup(TOKEN_VARIABLE).ok_or_else(|| {
            CliError::ConfigError(format!("{} environment variable is required", TOKEN_VARIABLE))
        })?;
        let account = lookup(ACCOUNT_VARIABLE).ok_or_else(|| {
            CliError::ConfigError(format!(
                "{} environment variable is required",
                ACCOUNT_VARIABLE
            ))
        })?;

        let year = match overrides.year {
            Some(year) => year,
            None => match lookup(YEAR_VARIABLE) {
                Some(value) => value.trim().parse::<i32>().map_err(|e| {
                    CliError::ConfigError(format!(
                        "{} must be a year, got '{}': {}",
                        YEAR_VARIABLE, value, e
                    ))
                })?,
                None => DEFAULT_ANALYSIS_YEAR,
            },
        };

        Ok(Self {
            account: account.trim().to_string(),
            api_url: overrides
                .api_url
                .unwrap_or_else(|| GITHUB_API_URL.to_string()),
            extra_exclusions: config.classifier.extra_exclusions,
            max_calls_per_hour: config.throttle.max_calls_per_hour,
            reports_dir: overrides.reports_dir.unwrap_or(config.reports.directory),
            repository: overrides.repository,
            token: token.trim().to_string(),
            year,
        })
    }
}

/// Get the path to the configuration file
pub fn get_config_path(config_path: Option<&Path>) -> PathBuf {
    if let Some(path) = config_path {
        path.to_path_buf()
    } else {
        let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        current_dir.join(DEFAULT_CONFIG_FILENAME)
    }
}

fn default_max_calls_per_hour() -> u64 {
    5000
}

fn default_reports_directory() -> PathBuf {
    PathBuf::from(DEFAULT_REPORTS_DIRECTORY)
}
