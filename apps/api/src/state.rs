use std::sync::Arc;

use crate::schema::publisher::Publisher;
use crate::settings::SettingsStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<dyn SettingsStore>,
    pub publisher: Arc<Publisher>,
    /// Renderer whose schema output this service replaces.
    pub competing_renderer: String,
}
