//! Unit tests for error module.

use super::*;

#[test]
fn test_api_error_display() {
    let error = Error::Api {
        status: 400,
        code: "VALIDATION_ERROR".to_string(),
        message: "Validation error: name: This field is required.".to_string(),
    };

    let display = format!("{}", error);
    assert!(display.contains("400"));
    assert!(display.contains("VALIDATION_ERROR"));
    assert!(display.contains("This field is required."));
}

#[test]
fn test_not_found_error_display() {
    let error = Error::NotFound("IPO 7".to_string());

    let display = format!("{}", error);
    assert!(display.contains("Not found"));
    assert!(display.contains("IPO 7"));
}

#[test]
fn test_invalid_request_error_display() {
    let error = Error::InvalidRequest("company id must be positive".to_string());
    assert!(error.to_string().contains("Invalid request"));
}

#[test]
fn test_status_and_code() {
    let error = Error::Api {
        status: 401,
        code: "AUTHENTICATION_FAILED".to_string(),
        message: "Authentication failed: Invalid API key".to_string(),
    };
    assert_eq!(error.status(), Some(401));
    assert_eq!(error.code(), Some("AUTHENTICATION_FAILED"));

    let error = Error::Api {
        status: 502,
        code: String::new(),
        message: "Bad gateway".to_string(),
    };
    assert_eq!(error.code(), None);

    assert_eq!(Error::NotFound("x".into()).status(), Some(404));
    assert_eq!(Error::InvalidRequest("x".into()).status(), None);
}
