//! # Repo Tally CLI
//!
//! Command-line interface for tallying the lines an author added and removed
//! across their GitHub repositories in a calendar year.
//!
//! The account and token are read from the `GITHUB_USERNAME` and
//! `GITHUB_TOKEN` environment variables. Results are written to a JSON report
//! and a text summary in the reports directory.
//!
//! # Examples
//!
//! ```bash
//! # Tally every repository the account can see
//! repo-tally --year 2024
//!
//! # Tally a single repository
//! repo-tally octocat/hello-world
//! ```

#![deny(missing_docs)]

use std::path::PathBuf;
use std::process::{ExitCode, Termination};
use std::sync::Arc;

use clap::Parser;
use repo_tally_core::classifier::FileClassifier;
use repo_tally_core::config::AnalysisPeriod;
use repo_tally_core::report::write_reports;
use repo_tally_core::RepoTally;
use repo_tally_developer_platforms::clock::{Clock, TokioClock};
use repo_tally_developer_platforms::github::GitHubProvider;
use repo_tally_developer_platforms::throttle::{Throttle, ThrottleConfig};
use tracing::{error, info, instrument};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Configuration management for the CLI.
mod config;

/// Error types specific to the CLI.
mod errors;

use config::{get_config_path, AppConfig, Overrides, Settings};
use errors::CliError;

/// Environment variable holding the log filter
const LOG_FILTER_VARIABLE: &str = "REPO_TALLY_LOG";

/// Command-line interface structure for Repo Tally.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Only tally this repository, given as `name` or `owner/name`
    repository: Option<String>,

    /// The calendar year to analyse. Overrides ANALYSIS_YEAR.
    #[arg(long)]
    year: Option<i32>,

    /// Directory the reports are written to
    #[arg(long)]
    reports_dir: Option<PathBuf>,

    /// Alternate config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Root URL of the GitHub API, e.g. for GitHub Enterprise
    #[arg(long)]
    api_url: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Main entry point for the Repo Tally CLI.
///
/// Initializes logging, runs the tally and maps failures to the exit code.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_FILTER_VARIABLE)
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(fmt::layer().pretty())
        .with(filter)
        .init();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e);
            e.report()
        }
    }
}

/// Resolves the settings, tallies the repositories and writes the reports.
#[instrument(skip(cli))]
async fn run(cli: Cli) -> Result<(), CliError> {
    let config = AppConfig::load(&get_config_path(cli.config.as_deref()))?;
    let overrides = Overrides {
        api_url: cli.api_url,
        repository: cli.repository,
        reports_dir: cli.reports_dir,
        year: cli.year,
    };
    let settings = Settings::resolve(overrides, config, |name| std::env::var(name).ok())?;

    let period = AnalysisPeriod::for_year(settings.year)
        .map_err(|e| CliError::ConfigError(e.to_string()))?;
    let classifier = FileClassifier::new(&settings.extra_exclusions)
        .map_err(|e| CliError::ConfigError(e.to_string()))?;

    info!(
        account = settings.account.as_str(),
        year = settings.year,
        repository = settings.repository.as_deref().unwrap_or("(all)"),
        "Starting tally"
    );

    let clock: Arc<dyn Clock> = Arc::new(TokioClock);
    let throttle = Arc::new(Throttle::new(
        ThrottleConfig {
            max_calls_per_hour: settings.max_calls_per_hour,
            ..ThrottleConfig::default()
        },
        clock.clone(),
    ));
    let provider = GitHubProvider::new(&settings.token, throttle.clone())
        .map_err(|e| CliError::RunFailed(e.to_string()))?
        .with_base_url(&settings.api_url);

    let tally = RepoTally::for_provider(Arc::new(provider), clock, &settings.account, classifier);
    let result = tally
        .run(settings.repository.as_deref(), &period)
        .await
        .map_err(|e| CliError::RunFailed(e.to_string()))?;

    let paths = write_reports(&settings.reports_dir, &result)
        .map_err(|e| CliError::ReportFailed(e.to_string()))?;

    info!(
        api_calls = throttle.calls_made(),
        successful = result.processing_status.successful,
        failed = result.processing_status.failed,
        "Tally complete"
    );
    println!(
        "{}: +{} -{} (net {}) over {} commits in {}",
        result.account,
        result.total_additions,
        result.total_deletions,
        result.net_lines,
        result.total_commits,
        result.year
    );
    println!("Statistics: {}", paths.json.display());
    println!("Summary:    {}", paths.summary.display());

    Ok(())
}
