//! Application state for the web layer.

use std::sync::Arc;

use crate::siri::SiriClient;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Real-time source answering stop monitoring queries
    pub siri: Arc<SiriClient>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(siri: SiriClient) -> Self {
        Self {
            siri: Arc::new(siri),
        }
    }
}
