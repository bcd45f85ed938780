//! Axum route handlers for the Matching API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::matching::display::{classify, format_score, MatchClass};
use crate::matching::ranking::{rank_applications, SortDirection};
use crate::matching::service::{clamp_limit, DEFAULT_LIMIT};
use crate::models::{Recommendation, ScoredApplication};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct RankingQuery {
    pub min_score: Option<f64>,
    pub order: Option<SortDirection>,
}

/// A recommendation with its display helpers applied.
#[derive(Debug, Serialize)]
pub struct RecommendationView {
    #[serde(flatten)]
    pub recommendation: Recommendation,
    pub score_label: String,
    pub match_class: MatchClass,
    pub match_description: &'static str,
}

impl From<Recommendation> for RecommendationView {
    fn from(recommendation: Recommendation) -> Self {
        let class = classify(recommendation.score);
        Self {
            score_label: format_score(recommendation.score),
            match_class: class,
            match_description: class.description(),
            recommendation,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub subject_id: String,
    pub limit: u32,
    pub stale: bool,
    pub age_secs: u64,
    pub items: Vec<RecommendationView>,
}

#[derive(Debug, Serialize)]
pub struct AllRecommendationsResponse {
    pub subject_id: String,
    pub items: Vec<RecommendationView>,
}

#[derive(Debug, Serialize)]
pub struct ApplicationView {
    #[serde(flatten)]
    pub application: ScoredApplication,
    pub score_label: String,
    pub match_class: MatchClass,
}

impl From<ScoredApplication> for ApplicationView {
    fn from(application: ScoredApplication) -> Self {
        Self {
            score_label: format_score(application.matching_score),
            match_class: classify(application.matching_score),
            application,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RankedApplicationsResponse {
    pub job_id: String,
    pub min_score: f64,
    pub order: &'static str,
    pub count: usize,
    pub applications: Vec<ApplicationView>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/recommendations/:subject_id?limit=N
///
/// Top-N recommendations through the cache. `stale` is set when the backend
/// failed and an expired entry was served instead.
pub async fn handle_get_recommendations(
    State(state): State<AppState>,
    Path(subject_id): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<RecommendationsResponse>, AppError> {
    let limit = clamp_limit(query.limit.unwrap_or(DEFAULT_LIMIT));
    let batch = state
        .recommendations
        .get_recommendations(&subject_id, limit)
        .await?;

    Ok(Json(RecommendationsResponse {
        subject_id: subject_id.trim().to_string(),
        limit,
        stale: batch.stale,
        age_secs: batch.age.as_secs(),
        items: batch.items.into_iter().map(RecommendationView::from).collect(),
    }))
}

/// GET /api/v1/recommendations/:subject_id/all
pub async fn handle_get_all_recommendations(
    State(state): State<AppState>,
    Path(subject_id): Path<String>,
) -> Result<Json<AllRecommendationsResponse>, AppError> {
    let items = state
        .recommendations
        .get_all_recommendations(&subject_id)
        .await?;

    Ok(Json(AllRecommendationsResponse {
        subject_id: subject_id.trim().to_string(),
        items: items.into_iter().map(RecommendationView::from).collect(),
    }))
}

/// DELETE /api/v1/recommendations/:subject_id?limit=N
pub async fn handle_invalidate_recommendations(
    State(state): State<AppState>,
    Path(subject_id): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<StatusCode, AppError> {
    state
        .recommendations
        .invalidate(&subject_id, query.limit.unwrap_or(DEFAULT_LIMIT))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/recommendations
///
/// Drops every cached entry; the next read of any key goes to the backend.
pub async fn handle_clear_cache(State(state): State<AppState>) -> StatusCode {
    state.recommendations.clear_cache().await;
    StatusCode::NO_CONTENT
}

/// GET /api/v1/jobs/:job_id/applications?min_score=&order=
pub async fn handle_ranked_applications(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Query(query): Query<RankingQuery>,
) -> Result<Json<RankedApplicationsResponse>, AppError> {
    let min_score = query.min_score.unwrap_or(0.0);
    if !(0.0..=1.0).contains(&min_score) {
        return Err(AppError::Validation(
            "min_score must be between 0 and 1".to_string(),
        ));
    }
    let order = query.order.unwrap_or_default();

    let applications = state
        .recommendations
        .get_ranked_applications(&job_id)
        .await?;
    let ranked = rank_applications(&applications, min_score, order);

    Ok(Json(RankedApplicationsResponse {
        job_id: job_id.trim().to_string(),
        min_score,
        order: match order {
            SortDirection::Descending => "desc",
            SortDirection::Ascending => "asc",
        },
        count: ranked.len(),
        applications: ranked.into_iter().map(ApplicationView::from).collect(),
    }))
}

/// POST /api/v1/applications/recalculate-scores
///
/// Accepted, not completed: the backend recomputes asynchronously. Callers
/// should clear the cache and refetch later to see the new scores.
pub async fn handle_recalculate_scores(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    state.recommendations.recalculate_scores().await?;
    Ok((StatusCode::ACCEPTED, Json(json!({ "status": "accepted" }))))
}
