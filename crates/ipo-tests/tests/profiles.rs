//! Profile visibility tests.

use ipo_tests::{create_anonymous_client, create_test_client};

#[tokio::test]
#[ignore = "requires a running server and API_KEY"]
async fn test_own_profile_visible() {
    let client = create_test_client().expect("Failed to create client");

    let profiles = client
        .list_profiles()
        .await
        .expect("Failed to list profiles");
    assert!(!profiles.is_empty());

    let key = ipo_tests::get_api_key().expect("API_KEY not set");
    let own = profiles
        .iter()
        .find(|p| p.api_key == key)
        .expect("own profile missing");
    assert!(own.is_client);

    let fetched = client
        .get_profile(own.id)
        .await
        .expect("Failed to get profile");
    assert_eq!(fetched.user.username, own.user.username);
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_anonymous_profiles_rejected() {
    let client = create_anonymous_client().expect("Failed to create client");

    let err = client.list_profiles().await.unwrap_err();
    assert_eq!(err.status(), Some(401));
}
