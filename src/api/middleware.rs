//! API middleware for authentication.

use crate::auth;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Paths served without looking at credentials.
const EXEMPT_PATHS: [&str; 1] = ["/health"];

/// Resolves the `X-API-Key` header into a [`Caller`](auth::Caller) request extension.
///
/// Requests without a key continue anonymously; a key that is
/// unknown or belongs to a non-client profile is rejected with 401 before
/// reaching any handler.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if EXEMPT_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    let resolved = match auth::api_key_from_headers(request.headers()) {
        Ok(key) => auth::authenticate(state.store.as_ref(), key).await,
        Err(err) => Err(err),
    };

    match resolved {
        Ok(caller) => {
            request.extensions_mut().insert(caller);
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}

