//! Unit tests for client module.

use super::*;

// ============================================================================
// ClientConfig Tests
// ============================================================================

#[test]
fn test_client_config_default() {
    let config = ClientConfig::default();

    assert_eq!(config.base_url, "http://localhost:8080");
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert!(config.api_key.is_none());
}

// ============================================================================
// IpoClient Creation Tests
// ============================================================================

#[test]
fn test_ipo_client_new() {
    let client = IpoClient::new(ClientConfig::default());
    assert!(client.is_ok());
}

#[test]
fn test_ipo_client_invalid_base_url() {
    let result = IpoClient::with_base_url("not a url");
    assert!(matches!(result, Err(Error::InvalidUrl(_))));
}

#[test]
fn test_ipo_client_with_api_key() {
    let client = IpoClient::with_base_url("http://localhost:8080").unwrap();
    assert!(client.api_key.is_none());

    let keyed = client.with_api_key("0123456789abcdef0123456789abcdef");
    assert_eq!(
        keyed.api_key.as_deref(),
        Some("0123456789abcdef0123456789abcdef")
    );
}

// ============================================================================
// URL Building Tests
// ============================================================================

#[test]
fn test_url_joins_paths() {
    let client = IpoClient::with_base_url("http://localhost:8080/").unwrap();
    assert_eq!(
        client.url("ipos/3/").unwrap().as_str(),
        "http://localhost:8080/ipos/3/"
    );
    assert_eq!(
        client.url("/health").unwrap().as_str(),
        "http://localhost:8080/health"
    );
}

#[test]
fn test_url_keeps_base_path_prefix() {
    let client = IpoClient::with_base_url("https://example.com/api").unwrap();
    assert_eq!(
        client.url("companies/").unwrap().as_str(),
        "https://example.com/api/companies/"
    );
}

#[test]
fn test_with_query() {
    assert_eq!(
        IpoClient::with_query("ipos/", &IpoFilter::default()).unwrap(),
        "ipos/"
    );
    let filter = IpoFilter {
        company: Some(4),
        ..IpoFilter::default()
    };
    assert_eq!(
        IpoClient::with_query("ipos/", &filter).unwrap(),
        "ipos/?company=4"
    );
}

// ============================================================================
// Error Mapping Tests
// ============================================================================

#[test]
fn test_api_error_parses_body() {
    let err = IpoClient::api_error(
        401,
        r#"{"error":"Authentication failed: Invalid API key","code":"AUTHENTICATION_FAILED"}"#,
    );
    match err {
        Error::Api {
            status,
            code,
            message,
        } => {
            assert_eq!(status, 401);
            assert_eq!(code, "AUTHENTICATION_FAILED");
            assert_eq!(message, "Authentication failed: Invalid API key");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_api_error_not_found() {
    let err = IpoClient::api_error(404, r#"{"error":"Not found: IPO 9","code":"NOT_FOUND"}"#);
    assert!(matches!(err, Error::NotFound(ref m) if m == "Not found: IPO 9"));
}

#[test]
fn test_api_error_plain_text() {
    let err = IpoClient::api_error(502, "Bad Gateway");
    assert!(matches!(
        err,
        Error::Api { status: 502, ref code, ref message } if code.is_empty() && message == "Bad Gateway"
    ));
}
