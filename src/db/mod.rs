//! Persistence layer: the `Store` abstraction and its backends.

mod memory;
mod pool;
mod postgres;
mod schema;
mod store;

pub use memory::MemoryStore;
pub use pool::DatabasePool;
pub use postgres::PgStore;
pub use schema::*;
pub use store::{ProfileScope, SavedUser, Store, StoreError};

use crate::config::DatabaseConfig;
use std::sync::Arc;
use tracing::{info, warn};

/// Opens the configured backend: PostgreSQL when a database is configured
/// (applying migrations if enabled), otherwise an empty in-memory store.
///
/// # Errors
/// Returns [`StoreError::Database`] if connecting or migrating fails.
pub async fn open_store(config: Option<&DatabaseConfig>) -> Result<Arc<dyn Store>, StoreError> {
    let Some(config) = config else {
        warn!("No database configured, using the in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    };

    let pool = DatabasePool::new(config)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;
    if config.run_migrations {
        pool.run_migrations()
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;
    }
    info!("Using the PostgreSQL store");
    Ok(Arc::new(PgStore::new(pool)))
}
