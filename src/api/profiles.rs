//! Read-only profile handlers.
//!
//! Staff see every profile. Everyone else sees only their own, and another
//! user's profile is reported as missing.

use crate::auth::Caller;
use crate::error::ApiError;
use crate::models::ProfileResponse;
use crate::state::AppState;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::{Extension, Json};
use std::sync::Arc;

/// List visible profiles.
#[utoipa::path(
    get,
    path = "/profiles/",
    responses(
        (status = 200, description = "Visible profiles", body = Vec<ProfileResponse>),
        (status = 401, description = "Missing or rejected API key")
    ),
    security(("api_key" = [])),
    tag = "Profiles"
)]
pub async fn list_profiles(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Vec<ProfileResponse>>, ApiError> {
    let scope = caller.profile_scope()?;
    let records = state.store.list_profiles(scope).await?;
    Ok(Json(records.iter().map(ProfileResponse::from).collect()))
}

/// Get a visible profile.
#[utoipa::path(
    get,
    path = "/profiles/{id}/",
    params(("id" = i64, Path, description = "Profile id")),
    responses(
        (status = 200, description = "Profile details", body = ProfileResponse),
        (status = 401, description = "Missing or rejected API key"),
        (status = 404, description = "Profile not found or not visible")
    ),
    security(("api_key" = [])),
    tag = "Profiles"
)]
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let scope = caller.profile_scope()?;
    let Path(id) = id?;
    let record = state
        .store
        .get_profile(id, scope)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("profile {id}")))?;
    Ok(Json(ProfileResponse::from(&record)))
}
