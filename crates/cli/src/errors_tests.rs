use super::*;
use std::process::{ExitCode, Termination};

#[test]
fn test_config_error_display() {
    let err = CliError::ConfigError("GITHUB_TOKEN is not set".to_string());
    assert_eq!(format!("{}", err), "Configuration error: GITHUB_TOKEN is not set");
}

#[test]
fn test_report_failed_display() {
    let err = CliError::ReportFailed("disk full".to_string());
    assert_eq!(format!("{}", err), "Failed to write reports: disk full");
}

#[test]
fn test_run_failed_display() {
    let err = CliError::RunFailed("Repository not found: nope".to_string());
    assert_eq!(format!("{}", err), "Run failed: Repository not found: nope");
}

#[test]
fn test_every_error_exits_with_failure() {
    let errors = vec![
        CliError::ConfigError("a".to_string()),
        CliError::ReportFailed("b".to_string()),
        CliError::RunFailed("c".to_string()),
    ];

    for err in errors {
        assert_eq!(
            format!("{:?}", err.report()),
            format!("{:?}", ExitCode::FAILURE)
        );
    }
}
