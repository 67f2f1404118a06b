use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::ChatCompletion;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Model backend. `None` when no credential was configured; extraction
    /// then fails with a configuration error instead of calling out.
    pub llm: Option<Arc<dyn ChatCompletion>>,
    pub config: Config,
}
