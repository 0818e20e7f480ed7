use crate::manager::ManagerProvider;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Lazily authenticated vehicle manager
    pub provider: Arc<ManagerProvider>,

    /// The single configured vehicle every action targets
    pub vehicle_id: Arc<str>,
}

impl AppState {
    pub fn new(provider: Arc<ManagerProvider>, vehicle_id: &str) -> Self {
        Self {
            provider,
            vehicle_id: Arc::from(vehicle_id),
        }
    }
}
