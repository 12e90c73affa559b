use std::sync::Arc;

use crate::config::Config;
use crate::generation::store::PaperStore;
use crate::layout::{FontGate, LayoutConfig};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Opens once font metrics are loaded. Generation waits on it.
    pub fonts: FontGate,
    /// Page geometry shared read-only by every layout pass.
    pub layout: Arc<LayoutConfig>,
    pub store: PaperStore,
}
