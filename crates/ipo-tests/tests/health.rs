//! Health check tests.

use ipo_tests::create_anonymous_client;

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_health_check() {
    let client = create_anonymous_client().expect("Failed to create client");

    let health = client.health_check().await.expect("Health check failed");

    assert_eq!(health.status, "healthy");
    assert!(!health.version.is_empty());
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_health_check_ignores_bad_key() {
    let client = create_anonymous_client()
        .expect("Failed to create client")
        .with_api_key("not-a-real-key");

    let health = client.health_check().await.expect("Health check failed");
    assert_eq!(health.status, "healthy");
}
