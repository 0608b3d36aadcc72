use super::*;
use repo_tally_developer_platforms::errors::Error as PlatformError;
use std::error::Error as StdError;

#[test]
fn test_repository_not_found_display() {
    let err = TallyError::RepositoryNotFound("octocat/missing".to_string());
    assert_eq!(err.to_string(), "Repository not found: octocat/missing");
}

#[test]
fn test_invalid_pattern_keeps_source() {
    let source = regex::Regex::new("(unclosed").unwrap_err();
    let err = TallyError::InvalidPattern {
        pattern: "(unclosed".to_string(),
        source,
    };

    assert!(err.to_string().starts_with("Invalid exclusion pattern '(unclosed'"));
    assert!(err.source().is_some());
}

#[test]
fn test_provider_error_conversion() {
    let err: TallyError = PlatformError::RateLimitExceeded.into();
    assert_eq!(
        err.to_string(),
        "Developer platform error: Rate limit exceeded"
    );
}

#[test]
fn test_io_error_conversion() {
    let err: TallyError = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
    assert_eq!(err.to_string(), "Failed to write report: denied");
}

#[test]
fn test_overflow_display() {
    let err = TallyError::Overflow("octocat/huge".to_string());
    assert_eq!(
        err.to_string(),
        "Line counts overflowed while processing 'octocat/huge'"
    );
}
