//! IPO collection and detail handlers.

use crate::auth::Caller;
use crate::error::ApiError;
use crate::filters::{IpoListParams, IpoQuery};
use crate::models::{IpoInput, IpoResponse};
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use std::sync::Arc;
use tracing::{debug, info};

fn not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("IPO {id}"))
}

/// List IPOs.
///
/// Filters compose conjunctively; `upcoming` and `open_now` are evaluated
/// against the server's current date.
#[utoipa::path(
    get,
    path = "/ipos/",
    params(IpoListParams),
    responses(
        (status = 200, description = "Matching IPOs", body = Vec<IpoResponse>),
        (status = 400, description = "Invalid filter value")
    ),
    tag = "IPOs"
)]
pub async fn list_ipos(
    State(state): State<Arc<AppState>>,
    params: Result<Query<IpoListParams>, QueryRejection>,
) -> Result<Json<Vec<IpoResponse>>, ApiError> {
    let Query(params) = params?;
    let query = IpoQuery::from_params(&params)?;
    let today = state.clock.today();
    debug!(?query, %today, "Listing IPOs");

    let records = state.store.list_ipos(&query, today).await?;
    Ok(Json(records.iter().map(IpoResponse::from).collect()))
}

/// Create an IPO.
#[utoipa::path(
    post,
    path = "/ipos/",
    request_body = IpoInput,
    responses(
        (status = 201, description = "IPO created", body = IpoResponse),
        (status = 400, description = "Invalid payload or unknown company"),
        (status = 401, description = "Missing or rejected API key")
    ),
    security(("api_key" = [])),
    tag = "IPOs"
)]
pub async fn create_ipo(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<IpoInput>, JsonRejection>,
) -> Result<(StatusCode, Json<IpoResponse>), ApiError> {
    caller.require_authenticated()?;
    let Json(input) = payload?;

    let record = state.store.create_ipo(input.into_fields()?).await?;
    info!(
        ipo_id = record.ipo.id,
        company = %record.company_name,
        status = %record.ipo.fields.status,
        "IPO created"
    );
    Ok((StatusCode::CREATED, Json(IpoResponse::from(&record))))
}

/// Get an IPO.
#[utoipa::path(
    get,
    path = "/ipos/{id}/",
    params(("id" = i64, Path, description = "IPO id")),
    responses(
        (status = 200, description = "IPO details", body = IpoResponse),
        (status = 404, description = "IPO not found")
    ),
    tag = "IPOs"
)]
pub async fn get_ipo(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<IpoResponse>, ApiError> {
    let Path(id) = id?;
    let record = state.store.get_ipo(id).await?.ok_or_else(|| not_found(id))?;
    Ok(Json(IpoResponse::from(&record)))
}

async fn write_ipo(
    state: &AppState,
    id: i64,
    input: IpoInput,
    partial: bool,
) -> Result<Json<IpoResponse>, ApiError> {
    input.validate(partial)?;

    let existing = state.store.get_ipo(id).await?.ok_or_else(|| not_found(id))?;
    let mut fields = existing.ipo.fields;
    input.apply_to(&mut fields);

    let record = state
        .store
        .update_ipo(id, fields)
        .await?
        .ok_or_else(|| not_found(id))?;
    info!(ipo_id = id, status = %record.ipo.fields.status, "IPO updated");
    Ok(Json(IpoResponse::from(&record)))
}

/// Replace an IPO.
#[utoipa::path(
    put,
    path = "/ipos/{id}/",
    params(("id" = i64, Path, description = "IPO id")),
    request_body = IpoInput,
    responses(
        (status = 200, description = "IPO updated", body = IpoResponse),
        (status = 400, description = "Invalid payload or unknown company"),
        (status = 401, description = "Missing or rejected API key"),
        (status = 404, description = "IPO not found")
    ),
    security(("api_key" = [])),
    tag = "IPOs"
)]
pub async fn update_ipo(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<IpoInput>, JsonRejection>,
) -> Result<Json<IpoResponse>, ApiError> {
    caller.require_authenticated()?;
    let Path(id) = id?;
    let Json(input) = payload?;
    write_ipo(&state, id, input, false).await
}

/// Partially update an IPO.
#[utoipa::path(
    patch,
    path = "/ipos/{id}/",
    params(("id" = i64, Path, description = "IPO id")),
    request_body = IpoInput,
    responses(
        (status = 200, description = "IPO updated", body = IpoResponse),
        (status = 400, description = "Invalid payload or unknown company"),
        (status = 401, description = "Missing or rejected API key"),
        (status = 404, description = "IPO not found")
    ),
    security(("api_key" = [])),
    tag = "IPOs"
)]
pub async fn partial_update_ipo(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<IpoInput>, JsonRejection>,
) -> Result<Json<IpoResponse>, ApiError> {
    caller.require_authenticated()?;
    let Path(id) = id?;
    let Json(input) = payload?;
    write_ipo(&state, id, input, true).await
}

/// Delete an IPO.
#[utoipa::path(
    delete,
    path = "/ipos/{id}/",
    params(("id" = i64, Path, description = "IPO id")),
    responses(
        (status = 204, description = "IPO deleted"),
        (status = 401, description = "Missing or rejected API key"),
        (status = 404, description = "IPO not found")
    ),
    security(("api_key" = [])),
    tag = "IPOs"
)]
pub async fn delete_ipo(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    caller.require_authenticated()?;
    let Path(id) = id?;
    if !state.store.delete_ipo(id).await? {
        return Err(not_found(id));
    }
    info!(ipo_id = id, "IPO deleted");
    Ok(StatusCode::NO_CONTENT)
}
