pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::matching::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Recommendations (cached)
        .route("/api/v1/recommendations", delete(handlers::handle_clear_cache))
        .route(
            "/api/v1/recommendations/:subject_id",
            get(handlers::handle_get_recommendations)
                .delete(handlers::handle_invalidate_recommendations),
        )
        .route(
            "/api/v1/recommendations/:subject_id/all",
            get(handlers::handle_get_all_recommendations),
        )
        // Applications ranked by matching score
        .route(
            "/api/v1/jobs/:job_id/applications",
            get(handlers::handle_ranked_applications),
        )
        .route(
            "/api/v1/applications/recalculate-scores",
            post(handlers::handle_recalculate_scores),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::matching::cache::RecommendationCache;
    use crate::matching::service::RecommendationService;
    use crate::scoring_client::fakes::FakeBackend;

    #[tokio::test]
    async fn test_health_reports_cache() {
        let service = RecommendationService::new(
            Arc::new(FakeBackend::new()),
            Arc::new(RecommendationCache::default()),
        );
        let app = build_router(AppState {
            recommendations: Arc::new(service),
        });

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["cached_entries"], 0);
        assert_eq!(body["cache_ttl_secs"], 300);
    }
}
