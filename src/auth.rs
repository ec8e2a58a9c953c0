//! API-key authentication.
//!
//! Every profile carries a key; only profiles flagged as clients may use it.
//! A request without a key is anonymous and may still read public resources.

use crate::db::{ProfileScope, Store};
use crate::error::ApiError;
use crate::models::User;
use axum::http::HeaderMap;
use tracing::{debug, warn};
use uuid::Uuid;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

const INVALID_KEY: &str = "Invalid API key";
const NOT_A_CLIENT: &str = "API key is not associated with a client account";

/// Generates a fresh API key: 32 lowercase hex characters of UUID v4 randomness.
#[must_use]
pub fn generate_api_key() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Identity bound to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    /// No credentials supplied.
    Anonymous,
    /// Authenticated client user.
    User(User),
}

impl Caller {
    /// Returns the user, if authenticated.
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        match self {
            Caller::Anonymous => None,
            Caller::User(user) => Some(user),
        }
    }

    /// Returns the user or fails with [`ApiError::NotAuthenticated`].
    ///
    /// # Errors
    /// Fails for anonymous callers.
    pub fn require_authenticated(&self) -> Result<&User, ApiError> {
        self.user().ok_or(ApiError::NotAuthenticated)
    }

    /// Profiles this caller may see: all for staff, otherwise only their own.
    ///
    /// # Errors
    /// Fails for anonymous callers.
    pub fn profile_scope(&self) -> Result<ProfileScope, ApiError> {
        let user = self.require_authenticated()?;
        Ok(if user.is_staff {
            ProfileScope::All
        } else {
            ProfileScope::Owner(user.id)
        })
    }
}

/// Reads the API key header. Absent or empty means no key.
///
/// # Errors
/// A value that is not visible ASCII cannot match any key and is rejected.
pub fn api_key_from_headers(headers: &HeaderMap) -> Result<Option<&str>, ApiError> {
    match headers.get(API_KEY_HEADER) {
        None => Ok(None),
        Some(value) => {
            let key = value
                .to_str()
                .map_err(|_| ApiError::AuthenticationFailed(INVALID_KEY.to_string()))?;
            Ok(Some(key).filter(|k| !k.is_empty()))
        }
    }
}

/// Resolves an optional API key to a caller.
///
/// # Errors
/// Returns [`ApiError::AuthenticationFailed`] for unknown keys and for keys
/// whose profile is not a client.
pub async fn authenticate(store: &dyn Store, api_key: Option<&str>) -> Result<Caller, ApiError> {
    let Some(api_key) = api_key else {
        return Ok(Caller::Anonymous);
    };

    let Some(record) = store.find_profile_by_api_key(api_key).await? else {
        warn!("Rejected unknown API key");
        return Err(ApiError::AuthenticationFailed(INVALID_KEY.to_string()));
    };

    if !record.profile.is_client {
        warn!(user = %record.user.username, "Rejected API key of non-client profile");
        return Err(ApiError::AuthenticationFailed(NOT_A_CLIENT.to_string()));
    }

    debug!(user = %record.user.username, "Authenticated API key");
    Ok(Caller::User(record.user))
}
