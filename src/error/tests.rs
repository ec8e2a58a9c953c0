//! Unit tests for error module.

use super::*;
use axum::body::to_bytes;

// ============================================================================
// ErrorResponse Tests
// ============================================================================

#[test]
fn test_error_response_serialization() {
    let response = ErrorResponse {
        error: "Something went wrong".to_string(),
        code: "INTERNAL_ERROR".to_string(),
    };

    let json = serde_json::to_string(&response).unwrap();
    assert!(json.contains("\"error\":\"Something went wrong\""));
    assert!(json.contains("\"code\":\"INTERNAL_ERROR\""));
}

// ============================================================================
// ApiError Status Tests
// ============================================================================

#[test]
fn test_status_and_code() {
    let cases = [
        (
            ApiError::AuthenticationFailed("Invalid API key".into()),
            StatusCode::UNAUTHORIZED,
            "AUTHENTICATION_FAILED",
        ),
        (
            ApiError::NotAuthenticated,
            StatusCode::UNAUTHORIZED,
            "NOT_AUTHENTICATED",
        ),
        (
            ApiError::PermissionDenied("staff only".into()),
            StatusCode::FORBIDDEN,
            "PERMISSION_DENIED",
        ),
        (
            ApiError::NotFound("ipo 9".into()),
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
        ),
        (
            ApiError::Validation("bad".into()),
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
        ),
        (
            ApiError::Database("down".into()),
            StatusCode::INTERNAL_SERVER_ERROR,
            "DATABASE_ERROR",
        ),
        (
            ApiError::Internal("oops".into()),
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
        ),
    ];

    for (err, status, code) in cases {
        assert_eq!(err.status_and_code(), (status, code), "{err}");
    }
}

#[test]
fn test_error_display() {
    assert_eq!(
        ApiError::AuthenticationFailed("Invalid API key".into()).to_string(),
        "Authentication failed: Invalid API key"
    );
    assert_eq!(
        ApiError::NotAuthenticated.to_string(),
        "Authentication credentials were not provided"
    );
    assert_eq!(
        ApiError::NotFound("company 3".into()).to_string(),
        "Not found: company 3"
    );
}

#[tokio::test]
async fn test_into_response_body() {
    let response = ApiError::Validation("name: This field is required.".into()).into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(
        body["error"],
        "Validation error: name: This field is required."
    );
}

// ============================================================================
// Conversion Tests
// ============================================================================

#[test]
fn test_from_store_error() {
    let err: ApiError = StoreError::duplicate_company_name().into();
    assert!(
        matches!(err, ApiError::Validation(ref m) if m == "name: company with this name already exists.")
    );

    let err: ApiError = StoreError::InvalidReference {
        field: "company",
        id: 42,
    }
    .into();
    assert!(
        matches!(err, ApiError::Validation(ref m) if m == "company: Invalid pk \"42\" - object does not exist.")
    );

    let err: ApiError = StoreError::NotFound("user 1".into()).into();
    assert!(matches!(err, ApiError::NotFound(_)));

    let err: ApiError = StoreError::Database("connection reset".into()).into();
    assert!(matches!(err, ApiError::Database(_)));
}

// ============================================================================
// FieldErrors Tests
// ============================================================================

#[test]
fn test_field_errors_empty_is_ok() {
    let errors = FieldErrors::new();
    assert!(errors.is_empty());
    assert!(errors.into_result().is_ok());
}

#[test]
fn test_field_errors_joined() {
    let mut errors = FieldErrors::new();
    errors.add("price_band_min", "Ensure this value is greater than or equal to 0.");
    errors.add("issue_type", "This field is required.");
    assert!(!errors.is_empty());

    let err = errors.into_result().unwrap_err();
    assert_eq!(
        err.to_string(),
        "Validation error: price_band_min: Ensure this value is greater than or equal to 0.; \
         issue_type: This field is required."
    );
}
