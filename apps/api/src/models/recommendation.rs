use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecommendationLogRow {
    pub id: i64,
    pub session_id: String,
    pub user_scores: Value,
    pub recommendations: Value,
    pub profile_analysis: Value,
    pub model_version: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A recommendation session about to be logged.
#[derive(Debug, Clone, Serialize)]
pub struct NewRecommendationLog {
    pub session_id: String,
    pub user_scores: Value,
    pub recommendations: Value,
    pub profile_analysis: Value,
    pub model_version: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationCounts {
    pub total: i64,
    pub today: i64,
}
