use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::engine::aggregator::GroupBy;
use crate::engine::auditor::AuditReport;
use crate::errors::AppError;
use crate::profiles::artifact::ProfileSetSummary;
use crate::profiles::service::{
    audit_stored, build_and_publish, reload_latest, BuildOutcome, BuildRequest,
};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct AuditQuery {
    pub group_by: Option<GroupBy>,
}

/// POST /api/v1/profiles/build
pub async fn handle_build(
    State(state): State<AppState>,
    Json(req): Json<BuildRequest>,
) -> Result<Json<BuildOutcome>, AppError> {
    let outcome = build_and_publish(&state, req).await?;
    Ok(Json(outcome))
}

/// GET /api/v1/profiles
pub async fn handle_get_profiles(
    State(state): State<AppState>,
) -> Result<Json<ProfileSetSummary>, AppError> {
    let set = state.profiles.current().ok_or(AppError::ModelUnavailable)?;
    Ok(Json(set.summary()))
}

/// POST /api/v1/profiles/reload
pub async fn handle_reload(
    State(state): State<AppState>,
) -> Result<Json<ProfileSetSummary>, AppError> {
    let set = reload_latest(&state)
        .await?
        .ok_or_else(|| AppError::NotFound("No profile artifact has been built yet".to_string()))?;
    Ok(Json(set.summary()))
}

/// GET /api/v1/profiles/audit
pub async fn handle_audit(
    State(state): State<AppState>,
    Query(params): Query<AuditQuery>,
) -> Result<Json<AuditReport>, AppError> {
    let report = audit_stored(&state, params.group_by).await?;
    Ok(Json(report))
}
