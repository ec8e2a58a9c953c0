//! IPO CRUD and listing tests.

use chrono::NaiveDate;
use ipo_client::{CompanyRequest, Error, IpoClient, IpoFilter, IpoRequest, IpoStatus};
use ipo_tests::{create_test_client, unique_name};
use rust_decimal::Decimal;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn listed_request(company: i64) -> IpoRequest {
    IpoRequest {
        company: Some(company),
        price_band_min: Some(Decimal::new(9500, 2)),
        price_band_max: Some(Decimal::new(10000, 2)),
        open_date: Some(date(2024, 5, 1)),
        close_date: Some(date(2024, 5, 3)),
        listing_date: Some(Some(date(2024, 5, 10))),
        issue_size: Some(Decimal::new(50_000_000, 0)),
        issue_type: Some("Book Built Issue".to_string()),
        status: Some(IpoStatus::Listed),
        ipo_price: Some(Some(Decimal::new(100, 0))),
        listing_price: Some(Some(Decimal::new(150, 0))),
        current_market_price: Some(Some(Decimal::new(90, 0))),
        ..IpoRequest::default()
    }
}

async fn create_company(client: &IpoClient) -> i64 {
    client
        .create_company(&CompanyRequest::named(unique_name("Issuer")))
        .await
        .expect("Failed to create company")
        .id
}

#[tokio::test]
#[ignore = "requires a running server and API_KEY"]
async fn test_ipo_lifecycle_and_derived_fields() {
    let client = create_test_client().expect("Failed to create client");
    let company = create_company(&client).await;

    let created = client
        .create_ipo(&listed_request(company))
        .await
        .expect("Failed to create IPO");
    assert_eq!(created.company, company);
    assert_eq!(created.price_band, "₹95.00 - ₹100.00");
    assert_eq!(created.listing_gain, Some(50.0));
    assert_eq!(created.current_return, Some(-10.0));

    // Clearing the market price clears the return
    let patched = client
        .patch_ipo(
            created.id,
            &IpoRequest {
                current_market_price: Some(None),
                ..IpoRequest::default()
            },
        )
        .await
        .expect("Failed to patch IPO");
    assert!(patched.current_market_price.is_none());
    assert!(patched.current_return.is_none());
    assert_eq!(patched.listing_gain, Some(50.0));

    // Company filter returns only this issuer's IPO
    let listed = client
        .list_ipos(&IpoFilter {
            company: Some(company),
            ..IpoFilter::default()
        })
        .await
        .expect("Failed to list IPOs");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, created.id);

    // Deleting the company cascades
    client
        .delete_company(company)
        .await
        .expect("Failed to delete company");
    let err = client.get_ipo(created.id).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
#[ignore = "requires a running server and API_KEY"]
async fn test_status_filter() {
    let client = create_test_client().expect("Failed to create client");
    let company = create_company(&client).await;
    client
        .create_ipo(&listed_request(company))
        .await
        .expect("Failed to create IPO");

    let listed = client
        .list_ipos(&IpoFilter {
            status: Some(IpoStatus::Listed),
            ..IpoFilter::default()
        })
        .await
        .expect("Failed to list IPOs");
    assert!(!listed.is_empty());
    assert!(listed.iter().all(|ipo| ipo.status == IpoStatus::Listed));

    client.delete_company(company).await.ok();
}

#[tokio::test]
#[ignore = "requires a running server and API_KEY"]
async fn test_invalid_ipo_rejected() {
    let client = create_test_client().expect("Failed to create client");
    let company = create_company(&client).await;

    let mut request = listed_request(company);
    request.price_band_min = Some(Decimal::new(-1, 0));
    let err = client.create_ipo(&request).await.unwrap_err();
    assert_eq!(err.status(), Some(400));

    let mut request = listed_request(company);
    request.company = Some(i64::MAX);
    let err = client.create_ipo(&request).await.unwrap_err();
    assert_eq!(err.status(), Some(400));

    client.delete_company(company).await.ok();
}
