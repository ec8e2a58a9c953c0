//! # IPO Tracker Backend - REST API Server
//!
//! A REST backend that tracks Initial Public Offerings: the issuing companies,
//! each IPO's price band, subscription window, listing outcome and documents,
//! and the API-key profiles that gate write access.
//! Built with [Axum](https://crates.io/crates/axum) for async HTTP handling and
//! provides OpenAPI/Swagger documentation via [utoipa](https://crates.io/crates/utoipa).
//!
//! ## Key Features
//!
//! - **RESTful API**: CRUD over companies and IPOs, read-only profiles.
//!
//! - **Derived Fields**: IPO responses carry a formatted price band, the
//!   listing gain and the current return, computed when serialized.
//!
//! - **Filtering**: status, company, upcoming, open-now, free-text search and
//!   multi-key ordering on the IPO list.
//!
//! - **API-Key Authentication**: `X-API-Key` header resolved against user
//!   profiles; only client profiles are accepted.
//!
//! - **Pluggable Storage**: PostgreSQL through `sqlx`, or an in-memory store
//!   when no database is configured.
//!
//! - **OpenAPI Documentation**: Swagger UI at `/swagger-ui/`.
//!
//! ## Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`accounts`] | User creation with profile provisioning |
//! | [`api`] | Route handlers, middleware and router configuration |
//! | [`auth`] | API-key generation and authentication |
//! | [`clock`] | Injectable source of the current date |
//! | [`config`] | TOML configuration with environment overrides |
//! | [`db`] | `Store` trait with PostgreSQL and in-memory backends |
//! | [`error`] | API error types with `IntoResponse` implementation |
//! | [`filters`] | List query parsing and matching |
//! | [`models`] | Entities, request payloads and response DTOs |
//! | [`pricing`] | Price band, listing gain and current return |
//! | [`state`] | Application state management |
//!
//! ## API Endpoints
//!
//! | Method | Endpoint | Auth |
//! |--------|----------|------|
//! | GET | `/health` | none |
//! | GET, POST | `/companies/` | write requires a key |
//! | GET, PUT, PATCH, DELETE | `/companies/{id}/` | write requires a key |
//! | GET, POST | `/ipos/` | write requires a key |
//! | GET, PUT, PATCH, DELETE | `/ipos/{id}/` | write requires a key |
//! | GET | `/profiles/` | key required |
//! | GET | `/profiles/{id}/` | key required |
//!
//! ## Example Usage
//!
//! ```bash
//! # In-memory store on the default port
//! cargo run
//!
//! # PostgreSQL
//! DATABASE_URL=postgres://localhost/ipo cargo run
//!
//! # Provision a client key
//! cargo run --bin ipo-admin -- create-user --username alice --client
//!
//! # List open IPOs
//! curl 'http://localhost:8080/ipos/?open_now=true&ordering=-issue_size'
//!
//! # Create a company
//! curl -X POST http://localhost:8080/companies/ \
//!   -H "X-API-Key: <key>" -H "Content-Type: application/json" \
//!   -d '{"name": "Acme Industries"}'
//! ```

pub mod accounts;
pub mod api;
pub mod auth;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod models;
pub mod pricing;
pub mod state;
