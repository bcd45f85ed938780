use std::sync::Arc;

use crate::matching::service::RecommendationService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The single recommendation facade, owning the process-wide cache.
    pub recommendations: Arc<RecommendationService>,
}
