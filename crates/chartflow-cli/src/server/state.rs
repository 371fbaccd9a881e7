//! Application state for the web server.

use std::sync::Arc;
use tokio::sync::RwLock;

use chartflow::Session;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The session owning the active dataset, view and charts.
    pub session: Arc<RwLock<Session>>,
}

impl AppState {
    /// Create new application state.
    pub fn new(session: Session) -> Self {
        Self {
            session: Arc::new(RwLock::new(session)),
        }
    }
}
