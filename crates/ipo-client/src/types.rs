//! Request and response types for the IPO Tracker API.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};


// ============================================================================
// Health
// ============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

// ============================================================================
// Companies
// ============================================================================

/// An issuing company.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Company {
    /// Unique identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Logo reference.
    pub logo: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Company write payload. Unset fields are omitted from the request.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CompanyRequest {
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Logo reference; `Some(None)` clears it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<Option<String>>,
}

impl CompanyRequest {
    /// Payload carrying only a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            logo: None,
        }
    }
}

/// Company list filter.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CompanyFilter {
    /// Terms matched against the name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

// ============================================================================
// IPOs
// ============================================================================

/// IPO lifecycle label.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IpoStatus {
    /// Announced.
    #[default]
    Upcoming,
    /// Open for subscription.
    Open,
    /// Subscription closed.
    Closed,
    /// Trading on the exchange.
    Listed,
}

/// An IPO with its company and derived pricing fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ipo {
    /// Unique identifier.
    pub id: i64,
    /// Owning company id.
    pub company: i64,
    /// Owning company name.
    pub company_name: String,
    /// Owning company logo.
    pub company_logo: Option<String>,
    /// Formatted price band.
    pub price_band: String,
    /// Lower end of the price band.
    pub price_band_min: Decimal,
    /// Upper end of the price band.
    pub price_band_max: Decimal,
    /// Subscription open date.
    pub open_date: NaiveDate,
    /// Subscription close date.
    pub close_date: NaiveDate,
    /// Issue size in rupees.
    pub issue_size: Decimal,
    /// Issue type.
    pub issue_type: String,
    /// Listing date.
    pub listing_date: Option<NaiveDate>,
    /// Lifecycle label.
    pub status: IpoStatus,
    /// Final issue price.
    pub ipo_price: Option<Decimal>,
    /// First-day listing price.
    pub listing_price: Option<Decimal>,
    /// Listing gain in percent.
    pub listing_gain: Option<f64>,
    /// Latest market price.
    pub current_market_price: Option<Decimal>,
    /// Return since issue in percent.
    pub current_return: Option<f64>,
    /// Red Herring Prospectus reference.
    pub rhp_document: Option<String>,
    /// Draft Red Herring Prospectus reference.
    pub drhp_document: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// IPO write payload. Unset fields are omitted; `Some(None)` sends `null`.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct IpoRequest {
    /// Owning company id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<i64>,
    /// Lower end of the price band.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_band_min: Option<Decimal>,
    /// Upper end of the price band.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_band_max: Option<Decimal>,
    /// Subscription open date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_date: Option<NaiveDate>,
    /// Subscription close date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_date: Option<NaiveDate>,
    /// Listing date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_date: Option<Option<NaiveDate>>,
    /// Issue size in rupees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_size: Option<Decimal>,
    /// Issue type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<String>,
    /// Lifecycle label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<IpoStatus>,
    /// Final issue price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipo_price: Option<Option<Decimal>>,
    /// First-day listing price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_price: Option<Option<Decimal>>,
    /// Latest market price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_market_price: Option<Option<Decimal>>,
    /// Red Herring Prospectus reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rhp_document: Option<Option<String>>,
    /// Draft Red Herring Prospectus reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drhp_document: Option<Option<String>>,
}

/// IPO list filter, encoded as query parameters.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct IpoFilter {
    /// Exact status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<IpoStatus>,
    /// Exact company id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<i64>,
    /// Only IPOs opening today or later.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upcoming: Option<bool>,
    /// Only IPOs whose subscription window contains today.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_now: Option<bool>,
    /// Terms matched against company name and issue type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Comma-separated sort keys, `-` prefix for descending.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordering: Option<String>,
}

// ============================================================================
// Profiles
// ============================================================================

/// Identity nested in a profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileUser {
    /// User id.
    pub id: i64,
    /// Login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
}

/// A user's API-key profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    /// Profile id.
    pub id: i64,
    /// Owning user.
    pub user: ProfileUser,
    /// Phone number.
    pub phone: Option<String>,
    /// Whether the key may authenticate.
    pub is_client: bool,
    /// API key.
    pub api_key: String,
}

/// Error body returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    /// Human-readable message.
    pub error: String,
    /// Machine-readable code.
    pub code: String,
}
