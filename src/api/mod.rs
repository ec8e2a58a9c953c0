//! API routes module.

pub mod companies;
pub mod handlers;
pub mod ipos;
pub mod middleware;
pub mod profiles;
pub mod routes;

pub use routes::create_router;
