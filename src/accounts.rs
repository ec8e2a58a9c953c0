//! User provisioning: every user is created together with an API-key profile.

use crate::auth::generate_api_key;
use crate::db::{Store, StoreError};
use crate::error::ApiError;
use crate::models::{NewUser, ProfileRecord, User, normalize_phone};
use tracing::{info, warn};

/// Attempts made before giving up on API-key collisions.
pub const KEY_ATTEMPTS: usize = 3;

/// Creates a user and its profile (`is_client = false`) as one unit.
///
/// A collision on the generated key regenerates it; any other failure aborts
/// the whole create.
///
/// # Errors
/// Returns a validation error for bad input or a duplicate username, and a
/// database error if the store fails.
pub async fn create_user(store: &dyn Store, user: NewUser) -> Result<ProfileRecord, ApiError> {
    user.validate()?;

    let mut last_err = None;
    for attempt in 1..=KEY_ATTEMPTS {
        let api_key = generate_api_key();
        match store.create_user_with_profile(user.clone(), &api_key).await {
            Ok(record) => {
                info!(
                    user_id = record.user.id,
                    username = %record.user.username,
                    "Created user with profile"
                );
                return Ok(record);
            }
            Err(err) if err.is_conflict_on("api_key") => {
                warn!(attempt, "Generated API key collided, retrying");
                last_err = Some(err);
            }
            Err(err) => return Err(err.into()),
        }
    }

    Err(last_err
        .map(ApiError::from)
        .unwrap_or_else(|| ApiError::Internal("API key generation failed".to_string())))
}

/// Persists a user, recreating its profile with a fresh key if it is missing.
///
/// # Errors
/// Returns not-found if the user does not exist, or the store's failure.
pub async fn save_user(store: &dyn Store, user: &User) -> Result<ProfileRecord, ApiError> {
    let mut last_err: Option<StoreError> = None;
    for _ in 0..KEY_ATTEMPTS {
        match store.save_user(user, &generate_api_key()).await {
            Ok(saved) => {
                if saved.profile_recreated {
                    warn!(
                        user_id = user.id,
                        username = %user.username,
                        "User had no profile; created one with a new API key"
                    );
                }
                return Ok(saved.record);
            }
            Err(err) if err.is_conflict_on("api_key") => last_err = Some(err),
            Err(err) => return Err(err.into()),
        }
    }

    Err(last_err
        .map(ApiError::from)
        .unwrap_or_else(|| ApiError::Internal("API key generation failed".to_string())))
}

/// Sets a user's profile phone number; blank input clears it.
///
/// # Errors
/// Returns a validation error for an overlong number, not-found if the user
/// has no profile, or the store's failure.
pub async fn set_phone(
    store: &dyn Store,
    user_id: i64,
    phone: Option<String>,
) -> Result<ProfileRecord, ApiError> {
    let phone = normalize_phone(phone)?;
    let record = store.set_phone(user_id, phone.as_deref()).await?;
    info!(user_id, has_phone = phone.is_some(), "Profile phone updated");
    Ok(record)
}
