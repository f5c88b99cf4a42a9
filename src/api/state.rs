//! Application state for shared services

use std::sync::Arc;

use crate::domain::{ModelRegistry, TranslationService};
use crate::infrastructure::{BatchProgress, BatchTranslator, RatingsStore};

/// Shared handles for every endpoint. The translation service is behind a
/// trait object so tests can swap in a scripted backend.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ModelRegistry>,
    pub translator: Arc<dyn TranslationService>,
    pub batch: Arc<BatchTranslator>,
    pub progress: Arc<BatchProgress>,
    pub ratings: Arc<RatingsStore>,
}

impl AppState {
    pub fn new(
        registry: Arc<ModelRegistry>,
        translator: Arc<dyn TranslationService>,
        batch: Arc<BatchTranslator>,
        progress: Arc<BatchProgress>,
        ratings: Arc<RatingsStore>,
    ) -> Self {
        Self {
            registry,
            translator,
            batch,
            progress,
            ratings,
        }
    }
}
