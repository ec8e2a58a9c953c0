//! HTTP client library for the IPO Tracker API.
//!
//! This crate provides a typed HTTP client for the IPO Tracker backend:
//! companies, IPOs with their list filters, and profiles.
//!
//! # Example
//!
//! ```no_run
//! use ipo_client::{ClientConfig, IpoClient, IpoFilter, IpoStatus};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ipo_client::Error> {
//!     let client = IpoClient::new(ClientConfig {
//!         api_key: Some("0123456789abcdef0123456789abcdef".into()),
//!         ..ClientConfig::default()
//!     })?;
//!
//!     let open = client
//!         .list_ipos(&IpoFilter {
//!             status: Some(IpoStatus::Open),
//!             ..IpoFilter::default()
//!         })
//!         .await?;
//!     for ipo in open {
//!         println!("{}: {}", ipo.company_name, ipo.price_band);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::{API_KEY_HEADER, ClientConfig, IpoClient};
pub use error::Error;
pub use types::*;
