use super::*;
use std::error::Error as StdError;

#[test]
fn test_auth_error() {
    let error = Error::AuthError("Bad credentials".to_string());

    assert_eq!(error.to_string(), "Authentication failed: Bad credentials");
    assert!(error.source().is_none());
    assert!(error.is_retryable());
}

#[test]
fn test_conflict_error() {
    let error = Error::Conflict("repos/octo/app/commits/abc".to_string());

    assert_eq!(
        error.to_string(),
        "Conflict reported for: repos/octo/app/commits/abc"
    );
    assert!(!error.is_retryable());
}

#[test]
fn test_invalid_response_error() {
    let error = Error::InvalidResponse("missing field `sha`".to_string());

    assert_eq!(
        error.to_string(),
        "Invalid response format: missing field `sha`"
    );
    assert!(error.is_retryable());
}

#[test]
fn test_network_error() {
    let error = Error::Network("connection reset".to_string());

    assert_eq!(error.to_string(), "Network error: connection reset");
    assert!(error.is_retryable());
}

#[test]
fn test_not_found_error() {
    let error = Error::NotFound("repos/octo/missing".to_string());

    assert_eq!(error.to_string(), "Resource not found: repos/octo/missing");
    assert!(!error.is_retryable());
}

#[test]
fn test_rate_limit_exceeded_error() {
    let error = Error::RateLimitExceeded;

    assert_eq!(error.to_string(), "Rate limit exceeded");
    assert!(error.source().is_none());
    assert!(error.is_retryable());
}

#[test]
fn test_server_error() {
    let error = Error::ServerError(502);

    assert_eq!(error.to_string(), "Server error: HTTP 502");
    assert!(error.is_retryable());
}

#[test]
fn test_unexpected_status_error() {
    let error = Error::UnexpectedStatus(422, "Validation Failed".to_string());

    assert_eq!(
        error.to_string(),
        "Unexpected response: HTTP 422: Validation Failed"
    );
    assert!(error.is_retryable());
}

#[test]
fn test_error_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Error>();
}
