//! Application state for the HTTP server.

use std::sync::Arc;

use crate::bus::SyncBus;
use crate::store::DockStore;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The shared queue/bay store for this instance.
    pub store: Arc<DockStore>,
    /// Bus handle for the SSE event feed.
    pub bus: SyncBus,
}

impl AppState {
    /// Create a new application state around an opened store.
    pub fn new(store: Arc<DockStore>) -> Self {
        let bus = store.bus().clone();
        Self { store, bus }
    }
}
