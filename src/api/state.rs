//! Shared application state

use std::sync::Arc;

use crate::salience::{SalienceEngine, DEFAULT_GESTALT_THRESHOLD};

/// Number of salience results when a request names no limit
pub const DEFAULT_SALIENCE_LIMIT: usize = 20;

/// Handed to every route. The engine is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SalienceEngine>,
    pub salience_limit: usize,
    pub gestalt_threshold: f64,
}

impl AppState {
    pub fn new(engine: SalienceEngine) -> Self {
        Self {
            engine: Arc::new(engine),
            salience_limit: DEFAULT_SALIENCE_LIMIT,
            gestalt_threshold: DEFAULT_GESTALT_THRESHOLD,
        }
    }

    /// Override the request defaults
    pub fn with_defaults(mut self, salience_limit: usize, gestalt_threshold: f64) -> Self {
        self.salience_limit = salience_limit;
        self.gestalt_threshold = gestalt_threshold;
        self
    }
}
