//! Database row types and their conversion into domain entities.

use crate::models::{
    Company, Ipo, IpoFields, IpoRecord, IpoStatus, ProfileRecord, User, UserProfile,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

use super::StoreError;

/// Company row.
#[derive(Debug, Clone, FromRow)]
pub struct CompanyRow {
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

impl From<CompanyRow> for Company {
    fn from(row: CompanyRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            logo: row.logo,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// IPO row joined with its company's name and logo.
#[derive(Debug, Clone, FromRow)]
pub struct IpoRow {
    /// Unique identifier.
    pub id: i64,
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
    /// Listing date.
    pub listing_date: Option<NaiveDate>,
    /// Issue size in rupees.
    pub issue_size: Decimal,
    /// Issue type.
    pub issue_type: String,
    /// Status label as stored.
    pub status: String,
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
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Joined company name.
    pub company_name: String,
    /// Joined company logo.
    pub company_logo: Option<String>,
}

impl TryFrom<IpoRow> for IpoRecord {
    type Error = StoreError;

    fn try_from(row: IpoRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<IpoStatus>()
            .map_err(|e| StoreError::Database(format!("ipo {}: {e}", row.id)))?;

        Ok(Self {
            ipo: Ipo {
                id: row.id,
                fields: IpoFields {
                    company_id: row.company_id,
                    price_band_min: row.price_band_min,
                    price_band_max: row.price_band_max,
                    open_date: row.open_date,
                    close_date: row.close_date,
                    listing_date: row.listing_date,
                    issue_size: row.issue_size,
                    issue_type: row.issue_type,
                    status,
                    ipo_price: row.ipo_price,
                    listing_price: row.listing_price,
                    current_market_price: row.current_market_price,
                    rhp_document: row.rhp_document,
                    drhp_document: row.drhp_document,
                },
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            company_name: row.company_name,
            company_logo: row.company_logo,
        })
    }
}

/// User row.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
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
    /// Staff flag.
    pub is_staff: bool,
    /// Creation timestamp.
    pub date_joined: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            is_staff: row.is_staff,
            date_joined: row.date_joined,
        }
    }
}

/// Profile row joined with its user.
#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    /// Profile identifier.
    pub id: i64,
    /// Owning user.
    pub user_id: i64,
    /// Phone number.
    pub phone: Option<String>,
    /// Client gate.
    pub is_client: bool,
    /// API key.
    pub api_key: String,
    /// Joined user columns.
    #[sqlx(flatten)]
    pub user: JoinedUser,
}

/// User columns selected alongside a profile.
#[derive(Debug, Clone, FromRow)]
pub struct JoinedUser {
    /// Login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Staff flag.
    pub is_staff: bool,
    /// Creation timestamp.
    pub date_joined: DateTime<Utc>,
}

impl From<ProfileRow> for ProfileRecord {
    fn from(row: ProfileRow) -> Self {
        Self {
            profile: UserProfile {
                id: row.id,
                user_id: row.user_id,
                phone: row.phone,
                is_client: row.is_client,
                api_key: row.api_key,
            },
            user: User {
                id: row.user_id,
                username: row.user.username,
                email: row.user.email,
                first_name: row.user.first_name,
                last_name: row.user.last_name,
                is_staff: row.user.is_staff,
                date_joined: row.user.date_joined,
            },
        }
    }
}
