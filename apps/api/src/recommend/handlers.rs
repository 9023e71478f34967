use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::analysis::{analyze_profile, ProfileAnalysis};
use crate::engine::ranker::{resolve_top_n, RankOptions, RecommendationResult};
use crate::engine::vector::{Component, ScoreVector};
use crate::errors::AppError;
use crate::models::recommendation::{
    NewRecommendationLog, RecommendationCounts, RecommendationLogRow,
};
use crate::profiles::artifact::BuildStats;
use crate::recommend::samples::{sample_profiles, SampleProfile};
use crate::state::AppState;

const DEFAULT_HISTORY_LIMIT: i64 = 100;
const MAX_HISTORY_LIMIT: i64 = 1000;

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    #[serde(default)]
    pub scores: HashMap<String, Value>,
    /// Anything other than an integer in 1..=20 falls back to the default.
    #[serde(default)]
    pub top_n: Option<Value>,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationItem {
    pub rank: usize,
    pub target: String,
    pub organization: Option<String>,
    pub form: String,
    /// Combined similarity as a percentage, one decimal.
    pub fit_score: f64,
    pub cosine_similarity: f64,
    pub distance_similarity: f64,
}

impl From<&RecommendationResult> for RecommendationItem {
    fn from(result: &RecommendationResult) -> Self {
        Self {
            rank: result.rank,
            target: result.target.to_string(),
            organization: result.target.organization.clone(),
            form: result.target.form.clone(),
            fit_score: round_to(result.combined_score, 1),
            cosine_similarity: round_to(result.cosine_similarity, 3),
            distance_similarity: round_to(result.distance_similarity, 3),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub session_id: String,
    pub model_version: Option<String>,
    pub recommendations: Vec<RecommendationItem>,
    pub total_count: usize,
    pub profile_analysis: ProfileAnalysis,
}

#[derive(Serialize)]
pub struct SampleScoresResponse {
    pub samples: Vec<SampleProfile>,
    pub components: Vec<String>,
}

#[derive(Serialize)]
pub struct StatisticsResponse {
    pub model_version: String,
    pub postings: BuildStats,
    pub recommendations: RecommendationCounts,
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub session_id: Option<String>,
    pub limit: Option<i64>,
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn requested_top_n(raw: Option<&Value>) -> Option<i64> {
    match raw? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// POST /api/v1/recommend
pub async fn handle_recommend(
    State(state): State<AppState>,
    Json(req): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>, AppError> {
    let query = ScoreVector::from_map(&req.scores)?;
    let top_n = resolve_top_n(requested_top_n(req.top_n.as_ref()));
    let session_id = req
        .session_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let published = state.profiles.current();
    let results = match &published {
        Some(set) => set.recommend(
            &query,
            top_n,
            RankOptions {
                standardize: state.settings.standardize_queries,
            },
        )?,
        None => {
            warn!("Recommendation requested before a profile set was published");
            Vec::new()
        }
    };

    let recommendations: Vec<RecommendationItem> =
        results.iter().map(RecommendationItem::from).collect();
    let response = RecommendResponse {
        session_id,
        model_version: published.as_ref().map(|set| set.version.clone()),
        total_count: recommendations.len(),
        recommendations,
        profile_analysis: analyze_profile(&query),
    };

    info!(
        session_id = %response.session_id,
        top_n,
        returned = response.total_count,
        "Recommendation served"
    );
    log_recommendation(&state, &query, &response).await;

    Ok(Json(response))
}

/// Logging failures are reported and swallowed; the caller still gets results.
async fn log_recommendation(state: &AppState, query: &ScoreVector, response: &RecommendResponse) {
    let entry = NewRecommendationLog {
        session_id: response.session_id.clone(),
        user_scores: serde_json::to_value(query).unwrap_or_default(),
        recommendations: serde_json::to_value(&response.recommendations).unwrap_or_default(),
        profile_analysis: serde_json::to_value(&response.profile_analysis).unwrap_or_default(),
        model_version: response.model_version.clone(),
    };
    if let Err(e) = state.store.log_recommendation(&entry).await {
        warn!(session_id = %entry.session_id, "Failed to log recommendation: {e:#}");
    }
}

/// GET /api/v1/sample-scores
pub async fn handle_sample_scores() -> Json<SampleScoresResponse> {
    Json(SampleScoresResponse {
        samples: sample_profiles(),
        components: Component::labels(),
    })
}

/// GET /api/v1/statistics
pub async fn handle_statistics(
    State(state): State<AppState>,
) -> Result<Json<StatisticsResponse>, AppError> {
    let set = state.profiles.current().ok_or(AppError::ModelUnavailable)?;
    let recommendations = state.store.recommendation_counts().await?;
    Ok(Json(StatisticsResponse {
        model_version: set.version.clone(),
        postings: set.stats.clone(),
        recommendations,
    }))
}

/// GET /api/v1/recommendations/history
pub async fn handle_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Vec<RecommendationLogRow>>, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    if !(1..=MAX_HISTORY_LIMIT).contains(&limit) {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {MAX_HISTORY_LIMIT}, got {limit}"
        )));
    }
    let session_id = params.session_id.as_deref().filter(|id| !id.is_empty());
    let history = state.store.recommendation_history(session_id, limit).await?;
    Ok(Json(history))
}
