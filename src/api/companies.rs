//! Company collection and detail handlers.

use crate::auth::Caller;
use crate::error::ApiError;
use crate::filters::{CompanyListParams, CompanyQuery};
use crate::models::{CompanyInput, CompanyResponse};
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use std::sync::Arc;
use tracing::info;

fn not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("company {id}"))
}

/// List companies.
#[utoipa::path(
    get,
    path = "/companies/",
    params(CompanyListParams),
    responses(
        (status = 200, description = "Companies ordered by name", body = Vec<CompanyResponse>)
    ),
    tag = "Companies"
)]
pub async fn list_companies(
    State(state): State<Arc<AppState>>,
    params: Result<Query<CompanyListParams>, QueryRejection>,
) -> Result<Json<Vec<CompanyResponse>>, ApiError> {
    let Query(params) = params?;
    let query = CompanyQuery::from_params(&params);
    let companies = state.store.list_companies(&query).await?;
    Ok(Json(companies.iter().map(CompanyResponse::from).collect()))
}

/// Create a company.
#[utoipa::path(
    post,
    path = "/companies/",
    request_body = CompanyInput,
    responses(
        (status = 201, description = "Company created", body = CompanyResponse),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Missing or rejected API key")
    ),
    security(("api_key" = [])),
    tag = "Companies"
)]
pub async fn create_company(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<CompanyInput>, JsonRejection>,
) -> Result<(StatusCode, Json<CompanyResponse>), ApiError> {
    caller.require_authenticated()?;
    let Json(input) = payload?;

    let company = state.store.create_company(input.into_fields()?).await?;
    info!(company_id = company.id, name = %company.name, "Company created");
    Ok((StatusCode::CREATED, Json(CompanyResponse::from(&company))))
}

/// Get a company.
#[utoipa::path(
    get,
    path = "/companies/{id}/",
    params(("id" = i64, Path, description = "Company id")),
    responses(
        (status = 200, description = "Company details", body = CompanyResponse),
        (status = 404, description = "Company not found")
    ),
    tag = "Companies"
)]
pub async fn get_company(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<CompanyResponse>, ApiError> {
    let Path(id) = id?;
    let company = state.store.get_company(id).await?.ok_or_else(|| not_found(id))?;
    Ok(Json(CompanyResponse::from(&company)))
}

async fn write_company(
    state: &AppState,
    id: i64,
    input: CompanyInput,
    partial: bool,
) -> Result<Json<CompanyResponse>, ApiError> {
    input.validate(partial)?;

    let existing = state.store.get_company(id).await?.ok_or_else(|| not_found(id))?;
    let mut fields = existing.fields();
    input.apply_to(&mut fields);

    let company = state
        .store
        .update_company(id, fields)
        .await?
        .ok_or_else(|| not_found(id))?;
    info!(company_id = id, "Company updated");
    Ok(Json(CompanyResponse::from(&company)))
}

/// Replace a company.
#[utoipa::path(
    put,
    path = "/companies/{id}/",
    params(("id" = i64, Path, description = "Company id")),
    request_body = CompanyInput,
    responses(
        (status = 200, description = "Company updated", body = CompanyResponse),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Missing or rejected API key"),
        (status = 404, description = "Company not found")
    ),
    security(("api_key" = [])),
    tag = "Companies"
)]
pub async fn update_company(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CompanyInput>, JsonRejection>,
) -> Result<Json<CompanyResponse>, ApiError> {
    caller.require_authenticated()?;
    let Path(id) = id?;
    let Json(input) = payload?;
    write_company(&state, id, input, false).await
}

/// Partially update a company.
#[utoipa::path(
    patch,
    path = "/companies/{id}/",
    params(("id" = i64, Path, description = "Company id")),
    request_body = CompanyInput,
    responses(
        (status = 200, description = "Company updated", body = CompanyResponse),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Missing or rejected API key"),
        (status = 404, description = "Company not found")
    ),
    security(("api_key" = [])),
    tag = "Companies"
)]
pub async fn partial_update_company(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CompanyInput>, JsonRejection>,
) -> Result<Json<CompanyResponse>, ApiError> {
    caller.require_authenticated()?;
    let Path(id) = id?;
    let Json(input) = payload?;
    write_company(&state, id, input, true).await
}

/// Delete a company and its IPOs.
#[utoipa::path(
    delete,
    path = "/companies/{id}/",
    params(("id" = i64, Path, description = "Company id")),
    responses(
        (status = 204, description = "Company deleted"),
        (status = 401, description = "Missing or rejected API key"),
        (status = 404, description = "Company not found")
    ),
    security(("api_key" = [])),
    tag = "Companies"
)]
pub async fn delete_company(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    caller.require_authenticated()?;
    let Path(id) = id?;
    if !state.store.delete_company(id).await? {
        return Err(not_found(id));
    }
    info!(company_id = id, "Company deleted");
    Ok(StatusCode::NO_CONTENT)
}
