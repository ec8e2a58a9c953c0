//! IPO Tracker Backend Server
//!
//! REST API server for companies, IPOs and API-key profiles.

use ipo_tracker_backend::api::create_router;
use ipo_tracker_backend::auth::API_KEY_HEADER;
use ipo_tracker_backend::config::Config;
use ipo_tracker_backend::db::open_store;
use ipo_tracker_backend::state::AppState;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use ipo_tracker_backend::error::ErrorResponse;
use ipo_tracker_backend::models::{
    CompanyInput, CompanyResponse, HealthResponse, IpoInput, IpoResponse, IpoStatus,
    ProfileResponse, UserResponse,
};

/// Registers the `X-API-Key` header scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(API_KEY_HEADER))),
            );
        }
    }
}

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    paths(
        ipo_tracker_backend::api::handlers::health_check,
        ipo_tracker_backend::api::companies::list_companies,
        ipo_tracker_backend::api::companies::create_company,
        ipo_tracker_backend::api::companies::get_company,
        ipo_tracker_backend::api::companies::update_company,
        ipo_tracker_backend::api::companies::partial_update_company,
        ipo_tracker_backend::api::companies::delete_company,
        ipo_tracker_backend::api::ipos::list_ipos,
        ipo_tracker_backend::api::ipos::create_ipo,
        ipo_tracker_backend::api::ipos::get_ipo,
        ipo_tracker_backend::api::ipos::update_ipo,
        ipo_tracker_backend::api::ipos::partial_update_ipo,
        ipo_tracker_backend::api::ipos::delete_ipo,
        ipo_tracker_backend::api::profiles::list_profiles,
        ipo_tracker_backend::api::profiles::get_profile,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            CompanyInput,
            CompanyResponse,
            IpoInput,
            IpoResponse,
            IpoStatus,
            ProfileResponse,
            UserResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Companies", description = "Issuing companies"),
        (name = "IPOs", description = "Initial public offerings"),
        (name = "Profiles", description = "API-key profiles"),
    ),
    info(
        title = "IPO Tracker API",
        version = "0.1.0",
        description = "REST API for tracking IPOs and their issuing companies",
        license(name = "MIT")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let store = open_store(config.database.as_ref()).await?;
    let addr = config.server.bind_addr();
    let state = Arc::new(AppState::new(store, config));

    info!("Starting IPO Tracker Backend on {}", addr);
    info!("Swagger UI available at http://{}/swagger-ui/", addr);

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the router
    let app = create_router(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start the server
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
