//! Application state for the Axum server.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;

use focusdeck_core::SessionEngine;

/// Shared application state accessible from all route handlers.
///
/// The engine owns a single SQLite connection, so it sits behind an
/// async mutex; every handler does one short synchronous call under the
/// lock and never holds it across an await.
pub struct AppState {
    /// Server start time for uptime tracking.
    pub start_time: Instant,
    /// Session lifecycle engine and its database handle.
    pub engine: Mutex<SessionEngine>,
}

impl AppState {
    /// Create a new application state wrapped in an Arc for sharing.
    pub fn new(engine: SessionEngine) -> Arc<Self> {
        Arc::new(Self {
            start_time: Instant::now(),
            engine: Mutex::new(engine),
        })
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
