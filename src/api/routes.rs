//! Route configuration.

use crate::api::{companies, handlers, ipos, middleware, profiles};
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use std::sync::Arc;

/// Creates the API router.
///
/// Collection and detail paths are served with and without the trailing
/// slash. Every route except `/health` passes through API-key authentication.
pub fn create_router(state: Arc<AppState>) -> Router {
    let companies = get(companies::list_companies).post(companies::create_company);
    let company = get(companies::get_company)
        .put(companies::update_company)
        .patch(companies::partial_update_company)
        .delete(companies::delete_company);

    let ipos = get(ipos::list_ipos).post(ipos::create_ipo);
    let ipo = get(ipos::get_ipo)
        .put(ipos::update_ipo)
        .patch(ipos::partial_update_ipo)
        .delete(ipos::delete_ipo);

    let profiles = get(profiles::list_profiles);
    let profile = get(profiles::get_profile);

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Companies
        .route("/companies/", companies.clone())
        .route("/companies", companies)
        .route("/companies/{id}/", company.clone())
        .route("/companies/{id}", company)
        // IPOs
        .route("/ipos/", ipos.clone())
        .route("/ipos", ipos)
        .route("/ipos/{id}/", ipo.clone())
        .route("/ipos/{id}", ipo)
        // Profiles
        .route("/profiles/", profiles.clone())
        .route("/profiles", profiles)
        .route("/profiles/{id}/", profile.clone())
        .route("/profiles/{id}", profile)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::authenticate,
        ))
        .with_state(state)
}
