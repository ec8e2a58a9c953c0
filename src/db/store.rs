//! Storage abstraction shared by the PostgreSQL and in-memory backends.

use crate::filters::{CompanyQuery, IpoQuery};
use crate::models::{
    Company, CompanyFields, IpoFields, IpoRecord, NewUser, ProfileRecord, User,
};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Storage error types.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint was violated.
    #[error("{field}: {message}")]
    Conflict {
        /// Column whose uniqueness was violated.
        field: &'static str,
        /// Human-readable explanation.
        message: String,
    },

    /// A foreign key pointed at a missing row.
    #[error("{field}: Invalid pk \"{id}\" - object does not exist.")]
    InvalidReference {
        /// Referencing column.
        field: &'static str,
        /// Missing id.
        id: i64,
    },

    /// A row that had to exist was missing.
    #[error("{0}")]
    NotFound(String),

    /// Backend failure.
    #[error("{0}")]
    Database(String),
}

impl StoreError {
    /// Returns true if this is a uniqueness violation on `field`.
    #[must_use]
    pub fn is_conflict_on(&self, field: &str) -> bool {
        matches!(self, StoreError::Conflict { field: f, .. } if *f == field)
    }

    pub(crate) fn duplicate_company_name() -> Self {
        StoreError::Conflict {
            field: "name",
            message: "company with this name already exists.".to_string(),
        }
    }

    pub(crate) fn duplicate_username() -> Self {
        StoreError::Conflict {
            field: "username",
            message: "A user with that username already exists.".to_string(),
        }
    }

    pub(crate) fn duplicate_api_key() -> Self {
        StoreError::Conflict {
            field: "api_key",
            message: "user profile with this api key already exists.".to_string(),
        }
    }
}

/// Which profiles a caller may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileScope {
    /// Every profile (staff).
    All,
    /// Only the profile owned by this user id.
    Owner(i64),
}

impl ProfileScope {
    /// Returns true if a profile owned by `user_id` is visible.
    #[must_use]
    pub fn permits(self, user_id: i64) -> bool {
        match self {
            ProfileScope::All => true,
            ProfileScope::Owner(owner) => owner == user_id,
        }
    }
}

/// Result of saving a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedUser {
    /// The user with its profile.
    pub record: ProfileRecord,
    /// True if the profile was missing and had to be recreated.
    pub profile_recreated: bool,
}

/// Persistence operations required by the API.
///
/// Every method is a single atomic unit: multi-row writes either fully apply
/// or leave storage untouched.
#[async_trait]
pub trait Store: Send + Sync {
    /// Lists companies matching the filter, ordered by name.
    async fn list_companies(&self, query: &CompanyQuery) -> Result<Vec<Company>, StoreError>;

    /// Fetches a company by id.
    async fn get_company(&self, id: i64) -> Result<Option<Company>, StoreError>;

    /// Inserts a company.
    async fn create_company(&self, fields: CompanyFields) -> Result<Company, StoreError>;

    /// Replaces a company's writable columns. Returns `None` if it does not exist.
    async fn update_company(
        &self,
        id: i64,
        fields: CompanyFields,
    ) -> Result<Option<Company>, StoreError>;

    /// Deletes a company and its IPOs. Returns false if it did not exist.
    async fn delete_company(&self, id: i64) -> Result<bool, StoreError>;

    /// Lists IPOs matching the filter, relative to `today`.
    async fn list_ipos(
        &self,
        query: &IpoQuery,
        today: NaiveDate,
    ) -> Result<Vec<IpoRecord>, StoreError>;

    /// Fetches an IPO by id.
    async fn get_ipo(&self, id: i64) -> Result<Option<IpoRecord>, StoreError>;

    /// Inserts an IPO.
    async fn create_ipo(&self, fields: IpoFields) -> Result<IpoRecord, StoreError>;

    /// Replaces an IPO's writable columns. Returns `None` if it does not exist.
    async fn update_ipo(
        &self,
        id: i64,
        fields: IpoFields,
    ) -> Result<Option<IpoRecord>, StoreError>;

    /// Deletes an IPO. Returns false if it did not exist.
    async fn delete_ipo(&self, id: i64) -> Result<bool, StoreError>;

    /// Inserts a user and its profile (`is_client = false`) together.
    async fn create_user_with_profile(
        &self,
        user: NewUser,
        api_key: &str,
    ) -> Result<ProfileRecord, StoreError>;

    /// Updates a user's identity columns and makes sure a profile exists,
    /// creating one with `replacement_key` if it is missing.
    async fn save_user(&self, user: &User, replacement_key: &str)
    -> Result<SavedUser, StoreError>;

    /// Fetches a user by username.
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Fetches the profile holding exactly this API key.
    async fn find_profile_by_api_key(
        &self,
        api_key: &str,
    ) -> Result<Option<ProfileRecord>, StoreError>;

    /// Fetches the profile of a user.
    async fn find_profile_by_user(&self, user_id: i64)
    -> Result<Option<ProfileRecord>, StoreError>;

    /// Lists visible profiles ordered by id.
    async fn list_profiles(&self, scope: ProfileScope) -> Result<Vec<ProfileRecord>, StoreError>;

    /// Fetches a profile by id if visible in `scope`.
    async fn get_profile(
        &self,
        id: i64,
        scope: ProfileScope,
    ) -> Result<Option<ProfileRecord>, StoreError>;

    /// Sets the client gate on a user's profile.
    async fn set_client_access(
        &self,
        user_id: i64,
        is_client: bool,
    ) -> Result<ProfileRecord, StoreError>;

    /// Sets or clears the phone number on a user's profile.
    async fn set_phone(
        &self,
        user_id: i64,
        phone: Option<&str>,
    ) -> Result<ProfileRecord, StoreError>;

    /// Removes a user's profile, leaving the user in place.
    async fn delete_profile(&self, user_id: i64) -> Result<bool, StoreError>;
}
