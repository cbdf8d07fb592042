//! Application state shared across handlers.

use cpmm_engine::AmmEngine;
use std::sync::Arc;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// The engine serving all trading operations.
    pub engine: Arc<AmmEngine>,
}

impl AppState {
    /// Creates state around an engine.
    #[must_use]
    pub fn new(engine: Arc<AmmEngine>) -> Self {
        Self { engine }
    }
}
