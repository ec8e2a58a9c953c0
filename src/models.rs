//! Domain entities and request/response models for the REST API.

use crate::error::{ApiError, FieldErrors};
use crate::pricing;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;


/// Maximum length of a company name.
pub const COMPANY_NAME_MAX_LEN: usize = 255;
/// Maximum length of a stored file reference (logo or document).
pub const FILE_REF_MAX_LEN: usize = 100;
/// Maximum length of an IPO issue type.
pub const ISSUE_TYPE_MAX_LEN: usize = 100;
/// Maximum length of a username.
pub const USERNAME_MAX_LEN: usize = 150;
/// Maximum length of a profile phone number.
pub const PHONE_MAX_LEN: usize = 15;

/// Decimal places kept on every stored money column.
const MONEY_DP: u32 = 2;

// ============================================================================
// IPO status
// ============================================================================

/// Lifecycle label of an IPO.
///
/// The label is informational only; any status may be written at any time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum IpoStatus {
    /// Announced but not yet open for subscription.
    #[default]
    Upcoming,
    /// Open for subscription.
    Open,
    /// Subscription closed, not yet listed.
    Closed,
    /// Trading on the exchange.
    Listed,
}

impl IpoStatus {
    /// All statuses in declaration order.
    pub const ALL: [IpoStatus; 4] = [
        IpoStatus::Upcoming,
        IpoStatus::Open,
        IpoStatus::Closed,
        IpoStatus::Listed,
    ];

    /// Storage and wire representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Listed => "listed",
        }
    }
}

impl std::fmt::Display for IpoStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IpoStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IpoStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Select a valid choice. {s} is not one of the available choices."))
    }
}

// ============================================================================
// Entities
// ============================================================================

/// Writable company columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyFields {
    /// Unique display name.
    pub name: String,
    /// Optional logo reference.
    pub logo: Option<String>,
}

/// A company that has filed or completed an IPO.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    /// Unique identifier.
    pub id: i64,
    /// Unique display name.
    pub name: String,
    /// Optional logo reference.
    pub logo: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Company {
    /// Returns the writable columns of this company.
    #[must_use]
    pub fn fields(&self) -> CompanyFields {
        CompanyFields {
            name: self.name.clone(),
            logo: self.logo.clone(),
        }
    }
}

/// Writable IPO columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpoFields {
    /// Owning company.
    pub company_id: i64,
    /// Lower end of the price band.
    pub price_band_min: Decimal,
    /// Upper end of the price band.
    pub price_band_max: Decimal,
    /// Subscription open date.
    pub open_date: NaiveDate,
    /// Subscription close date.
    pub close_date: NaiveDate,
    /// Listing date, once known.
    pub listing_date: Option<NaiveDate>,
    /// Issue size in rupees.
    pub issue_size: Decimal,
    /// Issue type, e.g. "Fresh Issue", "OFS", "Combination".
    pub issue_type: String,
    /// Lifecycle label.
    pub status: IpoStatus,
    /// Final issue price.
    pub ipo_price: Option<Decimal>,
    /// First-day listing price.
    pub listing_price: Option<Decimal>,
    /// Latest market price.
    pub current_market_price: Option<Decimal>,
    /// Red Herring Prospectus reference.
    pub rhp_document: Option<String>,
    /// Draft Red Herring Prospectus reference.
    pub drhp_document: Option<String>,
}

/// A stored IPO.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipo {
    /// Unique identifier.
    pub id: i64,
    /// Writable columns.
    pub fields: IpoFields,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// An IPO joined with the company columns its representation needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpoRecord {
    /// The IPO itself.
    pub ipo: Ipo,
    /// Name of the owning company.
    pub company_name: String,
    /// Logo of the owning company.
    pub company_logo: Option<String>,
}

/// Identity fields for a new user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewUser {
    /// Unique login name.
    pub username: String,
    /// Email address (may be empty).
    pub email: String,
    /// Given name (may be empty).
    pub first_name: String,
    /// Family name (may be empty).
    pub last_name: String,
    /// Whether the user may see every profile.
    pub is_staff: bool,
}

impl NewUser {
    /// Checks identity field constraints.
    ///
    /// # Errors
    /// Returns [`ApiError::Validation`] on a blank or overlong username.
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        check_text(&mut errors, "username", &self.username, USERNAME_MAX_LEN);
        errors.into_result()
    }
}

/// Trims a phone number, mapping blank input to `None`.
///
/// # Errors
/// Returns [`ApiError::Validation`] if the number is longer than
/// [`PHONE_MAX_LEN`] characters.
pub fn normalize_phone(phone: Option<String>) -> Result<Option<String>, ApiError> {
    let phone = non_blank(phone);
    let mut errors = FieldErrors::new();
    if let Some(phone) = &phone {
        check_max_len(&mut errors, "phone", phone, PHONE_MAX_LEN);
    }
    errors.into_result()?;
    Ok(phone)
}

/// An identity record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique identifier.
    pub id: i64,
    /// Unique login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Whether the user may see every profile.
    pub is_staff: bool,
    /// Creation timestamp.
    pub date_joined: DateTime<Utc>,
}

/// Per-user profile carrying the API key and the client gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// Unique identifier.
    pub id: i64,
    /// Owning user.
    pub user_id: i64,
    /// Optional phone number.
    pub phone: Option<String>,
    /// Whether the API key may be used for client access.
    pub is_client: bool,
    /// Opaque 32-hex-character API key.
    pub api_key: String,
}

/// A profile joined with its owning user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRecord {
    /// The profile.
    pub profile: UserProfile,
    /// The owning user.
    pub user: User,
}

// ============================================================================
// Write payloads
// ============================================================================

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Request body for creating or updating a company.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CompanyInput {
    /// Unique display name. Required unless patching.
    #[serde(default)]
    pub name: Option<String>,
    /// Logo reference, `null` to clear.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub logo: Option<Option<String>>,
}

impl CompanyInput {
    /// Checks field constraints; `partial` skips required-field checks.
    ///
    /// # Errors
    /// Returns [`ApiError::Validation`] listing every failing field.
    pub fn validate(&self, partial: bool) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        match &self.name {
            Some(name) => check_text(&mut errors, "name", name, COMPANY_NAME_MAX_LEN),
            None if !partial => errors.add("name", REQUIRED),
            None => {}
        }
        if let Some(Some(logo)) = &self.logo {
            check_max_len(&mut errors, "logo", logo, FILE_REF_MAX_LEN);
        }
        errors.into_result()
    }

    /// Validates a full payload and builds the columns for a new company.
    ///
    /// # Errors
    /// Returns [`ApiError::Validation`] if the payload is incomplete or invalid.
    pub fn into_fields(self) -> Result<CompanyFields, ApiError> {
        self.validate(false)?;
        let mut fields = CompanyFields {
            name: String::new(),
            logo: None,
        };
        self.apply_to(&mut fields);
        Ok(fields)
    }

    /// Overwrites the columns present in this payload.
    pub fn apply_to(self, fields: &mut CompanyFields) {
        if let Some(name) = self.name {
            fields.name = name.trim().to_string();
        }
        if let Some(logo) = self.logo {
            fields.logo = non_blank(logo);
        }
    }
}

/// Request body for creating or updating an IPO.
///
/// Price band ordering, date ordering and status/date consistency are not
/// checked.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct IpoInput {
    /// Owning company id.
    #[serde(default)]
    pub company: Option<i64>,
    /// Lower end of the price band.
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub price_band_min: Option<Decimal>,
    /// Upper end of the price band.
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub price_band_max: Option<Decimal>,
    /// Subscription open date.
    #[serde(default)]
    pub open_date: Option<NaiveDate>,
    /// Subscription close date.
    #[serde(default)]
    pub close_date: Option<NaiveDate>,
    /// Listing date, `null` to clear.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub listing_date: Option<Option<NaiveDate>>,
    /// Issue size in rupees.
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub issue_size: Option<Decimal>,
    /// Issue type.
    #[serde(default)]
    pub issue_type: Option<String>,
    /// Lifecycle label (default `upcoming` on create).
    #[serde(default)]
    pub status: Option<IpoStatus>,
    /// Final issue price, `null` to clear.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub ipo_price: Option<Option<Decimal>>,
    /// First-day listing price, `null` to clear.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub listing_price: Option<Option<Decimal>>,
    /// Latest market price, `null` to clear.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub current_market_price: Option<Option<Decimal>>,
    /// Red Herring Prospectus reference, `null` to clear.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub rhp_document: Option<Option<String>>,
    /// Draft Red Herring Prospectus reference, `null` to clear.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub drhp_document: Option<Option<String>>,
}

impl IpoInput {
    /// Checks field constraints; `partial` skips required-field checks.
    ///
    /// # Errors
    /// Returns [`ApiError::Validation`] listing every failing field.
    pub fn validate(&self, partial: bool) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();

        if !partial {
            let required = [
                ("company", self.company.is_none()),
                ("price_band_min", self.price_band_min.is_none()),
                ("price_band_max", self.price_band_max.is_none()),
                ("open_date", self.open_date.is_none()),
                ("close_date", self.close_date.is_none()),
                ("issue_size", self.issue_size.is_none()),
                ("issue_type", self.issue_type.is_none()),
            ];
            for (field, missing) in required {
                if missing {
                    errors.add(field, REQUIRED);
                }
            }
        }

        if let Some(value) = self.price_band_min {
            check_money(&mut errors, "price_band_min", value, 10, true);
        }
        if let Some(value) = self.price_band_max {
            check_money(&mut errors, "price_band_max", value, 10, true);
        }
        if let Some(value) = self.issue_size {
            check_money(&mut errors, "issue_size", value, 20, false);
        }
        if let Some(issue_type) = &self.issue_type {
            check_text(&mut errors, "issue_type", issue_type, ISSUE_TYPE_MAX_LEN);
        }
        for (field, value) in [
            ("ipo_price", self.ipo_price),
            ("listing_price", self.listing_price),
            ("current_market_price", self.current_market_price),
        ] {
            if let Some(Some(value)) = value {
                check_money(&mut errors, field, value, 10, true);
            }
        }
        for (field, value) in [
            ("rhp_document", &self.rhp_document),
            ("drhp_document", &self.drhp_document),
        ] {
            if let Some(Some(value)) = value {
                check_max_len(&mut errors, field, value, FILE_REF_MAX_LEN);
            }
        }

        errors.into_result()
    }

    /// Validates a full payload and builds the columns for a new IPO.
    ///
    /// # Errors
    /// Returns [`ApiError::Validation`] if the payload is incomplete or invalid.
    pub fn into_fields(self) -> Result<IpoFields, ApiError> {
        self.validate(false)?;
        let missing = |field: &str| ApiError::Validation(format!("{field}: {REQUIRED}"));

        let mut fields = IpoFields {
            company_id: self.company.ok_or_else(|| missing("company"))?,
            price_band_min: self.price_band_min.ok_or_else(|| missing("price_band_min"))?,
            price_band_max: self.price_band_max.ok_or_else(|| missing("price_band_max"))?,
            open_date: self.open_date.ok_or_else(|| missing("open_date"))?,
            close_date: self.close_date.ok_or_else(|| missing("close_date"))?,
            listing_date: None,
            issue_size: self.issue_size.ok_or_else(|| missing("issue_size"))?,
            issue_type: String::new(),
            status: IpoStatus::default(),
            ipo_price: None,
            listing_price: None,
            current_market_price: None,
            rhp_document: None,
            drhp_document: None,
        };
        self.apply_to(&mut fields);
        Ok(fields)
    }

    /// Overwrites the columns present in this payload.
    pub fn apply_to(self, fields: &mut IpoFields) {
        if let Some(company) = self.company {
            fields.company_id = company;
        }
        if let Some(value) = self.price_band_min {
            fields.price_band_min = money(value);
        }
        if let Some(value) = self.price_band_max {
            fields.price_band_max = money(value);
        }
        if let Some(value) = self.open_date {
            fields.open_date = value;
        }
        if let Some(value) = self.close_date {
            fields.close_date = value;
        }
        if let Some(value) = self.listing_date {
            fields.listing_date = value;
        }
        if let Some(value) = self.issue_size {
            fields.issue_size = money(value);
        }
        if let Some(value) = self.issue_type {
            fields.issue_type = value.trim().to_string();
        }
        if let Some(value) = self.status {
            fields.status = value;
        }
        if let Some(value) = self.ipo_price {
            fields.ipo_price = value.map(money);
        }
        if let Some(value) = self.listing_price {
            fields.listing_price = value.map(money);
        }
        if let Some(value) = self.current_market_price {
            fields.current_market_price = value.map(money);
        }
        if let Some(value) = self.rhp_document {
            fields.rhp_document = non_blank(value);
        }
        if let Some(value) = self.drhp_document {
            fields.drhp_document = non_blank(value);
        }
    }
}

const REQUIRED: &str = "This field is required.";

fn check_text(errors: &mut FieldErrors, field: &'static str, value: &str, max_len: usize) {
    if value.trim().is_empty() {
        errors.add(field, "This field may not be blank.");
    } else {
        check_max_len(errors, field, value.trim(), max_len);
    }
}

fn check_max_len(errors: &mut FieldErrors, field: &'static str, value: &str, max_len: usize) {
    if value.chars().count() > max_len {
        errors.add(
            field,
            format!("Ensure this field has no more than {max_len} characters."),
        );
    }
}

/// Enforces a `NUMERIC(max_digits, 2)` column and, optionally, a zero floor.
fn check_money(
    errors: &mut FieldErrors,
    field: &'static str,
    value: Decimal,
    max_digits: u32,
    non_negative: bool,
) {
    if non_negative && value.is_sign_negative() && !value.is_zero() {
        errors.add(field, "Ensure this value is greater than or equal to 0.");
    }

    let normalized = value.normalize();
    let decimals = normalized.scale();
    let digits = normalized.mantissa().unsigned_abs().to_string().len() as u32;
    let whole_digits = digits.saturating_sub(decimals);

    if decimals > MONEY_DP {
        errors.add(
            field,
            format!("Ensure that there are no more than {MONEY_DP} decimal places."),
        );
    } else if whole_digits > max_digits - MONEY_DP {
        errors.add(
            field,
            format!(
                "Ensure that there are no more than {} digits before the decimal point.",
                max_digits - MONEY_DP
            ),
        );
    }
}

/// Brings a validated amount to the stored two-decimal scale.
fn money(mut value: Decimal) -> Decimal {
    value.rescale(MONEY_DP);
    value
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ============================================================================
// Responses
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Company representation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompanyResponse {
    /// Unique identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Logo reference.
    pub logo: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&Company> for CompanyResponse {
    fn from(company: &Company) -> Self {
        Self {
            id: company.id,
            name: company.name.clone(),
            logo: company.logo.clone(),
            created_at: company.created_at,
        }
    }
}

/// IPO representation including the derived pricing fields.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IpoResponse {
    /// Unique identifier.
    pub id: i64,
    /// Owning company id.
    pub company: i64,
    /// Owning company name.
    pub company_name: String,
    /// Owning company logo.
    pub company_logo: Option<String>,
    /// Formatted price band, e.g. `"₹100.00 - ₹120.00"`.
    pub price_band: String,
    /// Lower end of the price band.
    #[schema(value_type = String)]
    pub price_band_min: Decimal,
    /// Upper end of the price band.
    #[schema(value_type = String)]
    pub price_band_max: Decimal,
    /// Subscription open date.
    pub open_date: NaiveDate,
    /// Subscription close date.
    pub close_date: NaiveDate,
    /// Issue size in rupees.
    #[schema(value_type = String)]
    pub issue_size: Decimal,
    /// Issue type.
    pub issue_type: String,
    /// Listing date.
    pub listing_date: Option<NaiveDate>,
    /// Lifecycle label.
    pub status: IpoStatus,
    /// Final issue price.
    #[schema(value_type = Option<String>)]
    pub ipo_price: Option<Decimal>,
    /// First-day listing price.
    #[schema(value_type = Option<String>)]
    pub listing_price: Option<Decimal>,
    /// Listing gain in percent.
    #[serde(with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    pub listing_gain: Option<Decimal>,
    /// Latest market price.
    #[schema(value_type = Option<String>)]
    pub current_market_price: Option<Decimal>,
    /// Return since issue in percent.
    #[serde(with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    pub current_return: Option<Decimal>,
    /// Red Herring Prospectus reference.
    pub rhp_document: Option<String>,
    /// Draft Red Herring Prospectus reference.
    pub drhp_document: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&IpoRecord> for IpoResponse {
    fn from(record: &IpoRecord) -> Self {
        let ipo = &record.ipo;
        let f = &ipo.fields;
        Self {
            id: ipo.id,
            company: f.company_id,
            company_name: record.company_name.clone(),
            company_logo: record.company_logo.clone(),
            price_band: pricing::price_band(f.price_band_min, f.price_band_max),
            price_band_min: f.price_band_min,
            price_band_max: f.price_band_max,
            open_date: f.open_date,
            close_date: f.close_date,
            issue_size: f.issue_size,
            issue_type: f.issue_type.clone(),
            listing_date: f.listing_date,
            status: f.status,
            ipo_price: f.ipo_price,
            listing_price: f.listing_price,
            listing_gain: pricing::listing_gain(f.ipo_price, f.listing_price),
            current_market_price: f.current_market_price,
            current_return: pricing::current_return(f.ipo_price, f.current_market_price),
            rhp_document: f.rhp_document.clone(),
            drhp_document: f.drhp_document.clone(),
            created_at: ipo.created_at,
        }
    }
}

/// Public identity fields nested in a profile.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    /// Unique identifier.
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

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

/// Profile representation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    /// Unique identifier.
    pub id: i64,
    /// Owning user.
    pub user: UserResponse,
    /// Phone number.
    pub phone: Option<String>,
    /// Whether the key grants client access.
    pub is_client: bool,
    /// API key.
    pub api_key: String,
}

impl From<&ProfileRecord> for ProfileResponse {
    fn from(record: &ProfileRecord) -> Self {
        Self {
            id: record.profile.id,
            user: UserResponse::from(&record.user),
            phone: record.profile.phone.clone(),
            is_client: record.profile.is_client,
            api_key: record.profile.api_key.clone(),
        }
    }
}
