//! Company CRUD tests.

use ipo_client::{CompanyFilter, CompanyRequest, Error};
use ipo_tests::{create_anonymous_client, create_test_client, unique_name};

#[tokio::test]
#[ignore = "requires a running server and API_KEY"]
async fn test_company_lifecycle() {
    let client = create_test_client().expect("Failed to create client");
    let name = unique_name("Lifecycle Ltd");

    // Create
    let created = client
        .create_company(&CompanyRequest::named(&name))
        .await
        .expect("Failed to create company");
    assert_eq!(created.name, name);
    assert!(created.logo.is_none());

    // Search finds it
    let found = client
        .list_companies(&CompanyFilter {
            search: Some(name.to_lowercase()),
        })
        .await
        .expect("Failed to list companies");
    assert!(found.iter().any(|c| c.id == created.id));

    // Patch the logo only
    let patched = client
        .patch_company(
            created.id,
            &CompanyRequest {
                name: None,
                logo: Some(Some("logos/lifecycle.png".to_string())),
            },
        )
        .await
        .expect("Failed to patch company");
    assert_eq!(patched.name, name);
    assert_eq!(patched.logo.as_deref(), Some("logos/lifecycle.png"));

    // Delete, then it is gone
    client
        .delete_company(created.id)
        .await
        .expect("Failed to delete company");
    let err = client.get_company(created.id).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
#[ignore = "requires a running server and API_KEY"]
async fn test_duplicate_company_name_rejected() {
    let client = create_test_client().expect("Failed to create client");
    let name = unique_name("Dup Corp");

    let created = client
        .create_company(&CompanyRequest::named(&name))
        .await
        .expect("Failed to create company");

    let err = client
        .create_company(&CompanyRequest::named(&name))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(400));

    client.delete_company(created.id).await.ok();
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_anonymous_write_rejected() {
    let client = create_anonymous_client().expect("Failed to create client");

    let err = client
        .create_company(&CompanyRequest::named(unique_name("Anon")))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.code(), Some("NOT_AUTHENTICATED"));
}
