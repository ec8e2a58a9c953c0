//! Application state management.

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::db::{MemoryStore, Store};
use std::sync::Arc;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Persistence backend.
    pub store: Arc<dyn Store>,
    /// Source of "today" for date filters.
    pub clock: Arc<dyn Clock>,
    /// Application configuration.
    pub config: Config,
}

impl AppState {
    /// Creates state over the given store with the system clock.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            config,
        }
    }

    /// Creates state backed by an empty in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Config::default())
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::in_memory()
    }
}
