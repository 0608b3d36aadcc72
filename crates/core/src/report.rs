//! # Reports
//!
//! Writes the outcome of a run to disk as a JSON document and a plain text
//! summary.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use indoc::formatdoc;
use tracing::info;

use crate::config::SUMMARY_TOP_N;
use crate::errors::TallyError;
use crate::stats::RunResult;

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;

/// Format of the timestamp embedded in report file names
pub const REPORT_STAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";

/// The files produced for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub json: PathBuf,
    pub summary: PathBuf,
}

fn file_stem(result: &RunResult, kind: &str) -> String {
    format!(
        "{}-{}-{}-{}",
        result.account,
        result.year,
        kind,
        result.timestamp.format(REPORT_STAMP_FORMAT)
    )
}

/// Writes both reports into `directory`, creating it when needed.
///
/// # Errors
///
/// Returns `TallyError::Io` when the directory or a file cannot be written and
/// `TallyError::Serialization` when the result cannot be encoded.
pub fn write_reports(directory: &Path, result: &RunResult) -> Result<ReportPaths, TallyError> {
    fs::create_dir_all(directory)?;

    let json = write_json_report(directory, result)?;
    let summary = write_summary_report(directory, result)?;

    info!(
        json = %json.display(),
        summary = %summary.display(),
        "Wrote reports"
    );
    Ok(ReportPaths { json, summary })
}

pub fn write_json_report(directory: &Path, result: &RunResult) -> Result<PathBuf, TallyError> {
    let path = directory.join(format!("{}.json", file_stem(result, "stats")));
    let body = serde_json::to_string_pretty(result)?;
    fs::write(&path, body)?;
    Ok(path)
}

pub fn write_summary_report(directory: &Path, result: &RunResult) -> Result<PathBuf, TallyError> {
    let path = directory.join(format!("{}.txt", file_stem(result, "summary")));
    fs::write(&path, render_summary(result))?;
    Ok(path)
}

/// Renders the human readable summary of a run.
pub fn render_summary(result: &RunResult) -> String {
    let status = &result.processing_status;
    let mut text = formatdoc!(
        "
        Commit statistics for {account} ({year})
        Period: {since} to {until}
        Generated: {generated}

        Totals
          Lines added:       {additions}
          Lines deleted:     {deletions}
          Net lines:         {net}
          Commits:           {commits}
          Truncated commits: {truncated}

        Processing status
          Successful repositories: {successful}
          Failed repositories:     {failed}
        ",
        account = result.account,
        year = result.year,
        since = result.period.since.format("%Y-%m-%d"),
        until = result.period.until.format("%Y-%m-%d"),
        generated = result.timestamp.to_rfc3339(),
        additions = result.total_additions,
        deletions = result.total_deletions,
        net = result.net_lines,
        commits = result.total_commits,
        truncated = result.truncated_commits,
        successful = status.successful,
        failed = status.failed,
    );

    if !status.failures.is_empty() {
        text.push_str("\nFailed repositories\n");
        for failure in &status.failures {
            let _ = writeln!(text, "  {}: {}", failure.repository, failure.error);
        }
    }

    let top_repositories = result.top_repositories(SUMMARY_TOP_N);
    if !top_repositories.is_empty() {
        let _ = writeln!(text, "\nTop {} repositories by lines added", SUMMARY_TOP_N);
        for (rank, repo) in top_repositories.iter().enumerate() {
            let _ = writeln!(
                text,
                "  {:>2}. {}: +{} -{} ({} commits)",
                rank + 1,
                repo.repository,
                repo.additions,
                repo.deletions,
                repo.commits
            );
        }
    }

    let top_types = result.top_file_types(SUMMARY_TOP_N);
    if !top_types.is_empty() {
        let _ = writeln!(text, "\nTop {} file types by lines added", SUMMARY_TOP_N);
        for (rank, (extension, stats)) in top_types.iter().enumerate() {
            let _ = writeln!(
                text,
                "  {:>2}. {}: +{} -{} ({} files)",
                rank + 1,
                extension,
                stats.additions,
                stats.deletions,
                stats.files
            );
        }
    }

    text
}
