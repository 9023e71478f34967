use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Liveness plus whether a profile set is published.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let current = state.profiles.current();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": env!("CARGO_PKG_NAME"),
        "model_loaded": current.is_some(),
        "model_version": state.profiles.version(),
        "profile_count": current.as_ref().map_or(0, |set| set.profiles.len()),
    }))
}
