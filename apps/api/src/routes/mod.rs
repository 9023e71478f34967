pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::profiles::handlers as profiles;
use crate::recommend::handlers as recommend;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Recommendation API
        .route("/api/v1/recommend", post(recommend::handle_recommend))
        .route("/api/v1/sample-scores", get(recommend::handle_sample_scores))
        .route("/api/v1/statistics", get(recommend::handle_statistics))
        .route(
            "/api/v1/recommendations/history",
            get(recommend::handle_history),
        )
        // Profile set lifecycle
        .route("/api/v1/profiles", get(profiles::handle_get_profiles))
        .route("/api/v1/profiles/build", post(profiles::handle_build))
        .route("/api/v1/profiles/reload", post(profiles::handle_reload))
        .route("/api/v1/profiles/audit", get(profiles::handle_audit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::engine::vector::score_map;
    use crate::test_support::{descriptor, test_state, InMemoryArtifactStore, InMemoryScoreStore};

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn app() -> Router {
        let store = InMemoryScoreStore::with_descriptors(vec![
            descriptor("기관A", "전기직"),
            descriptor("기관B", "전기직"),
            descriptor("기관B", "고객상담"),
        ]);
        build_router(test_state(store, InMemoryArtifactStore::default()))
    }

    #[tokio::test]
    async fn test_health_reports_model_state() {
        let app = app();
        let response = app.clone().oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["model_loaded"], false);
        assert_eq!(body["model_version"], Value::Null);

        let built = app
            .clone()
            .oneshot(post_json("/api/v1/profiles/build", json!({"group_by": "form"})))
            .await
            .unwrap();
        assert_eq!(built.status(), StatusCode::OK);

        let body = body_json(app.oneshot(get_request("/health")).await.unwrap()).await;
        assert_eq!(body["model_loaded"], true);
        assert!(body["model_version"].as_str().unwrap().starts_with('v'));
    }

    #[tokio::test]
    async fn test_build_then_recommend() {
        let app = app();
        let built = app
            .clone()
            .oneshot(post_json(
                "/api/v1/profiles/build",
                json!({"mode": "two_stage", "group_by": "form", "seed": 7}),
            ))
            .await
            .unwrap();
        assert_eq!(built.status(), StatusCode::OK);
        let built = body_json(built).await;
        assert_eq!(built["profile_set"]["group_by"], "form");
        assert_eq!(built["records_written"], 3);

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/v1/recommend",
                json!({
                    "scores": score_map([4, 3, 2, 3, 4, 5, 5, 2, 4, 4, 5, 2, 3, 3, 4, 3]),
                    "top_n": 2,
                    "session_id": "router-test"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["session_id"], "router-test");
        assert_eq!(body["total_count"], 2);
        let first = &body["recommendations"][0];
        assert_eq!(first["rank"], 1);
        assert!(first["fit_score"].as_f64().unwrap() <= 100.0);
        assert!(first["organization"].is_null());
        assert_eq!(body["profile_analysis"]["strengths"].as_array().unwrap().len(), 3);

        let profiles = body_json(app.oneshot(get_request("/api/v1/profiles")).await.unwrap()).await;
        assert_eq!(profiles["profile_count"], 2);
        assert_eq!(profiles["components"].as_array().unwrap().len(), 16);
    }

    #[tokio::test]
    async fn test_recommend_validation_error_shape() {
        let response = app()
            .oneshot(post_json("/api/v1/recommend", json!({"scores": {"성실성": 3}})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["message"].as_str().unwrap().contains("개방성"));
    }

    #[tokio::test]
    async fn test_sample_scores_lists_components() {
        let response = app().oneshot(get_request("/api/v1/sample-scores")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["samples"].as_array().unwrap().len(), 3);
        assert_eq!(body["samples"][0]["name"], "기술직 지향");
        assert_eq!(body["samples"][0]["scores"]["기술전문성"], 5);
        assert_eq!(body["components"][0], "성실성");
    }

    #[tokio::test]
    async fn test_profile_endpoints_before_any_build() {
        let app = app();
        let response = app.clone().oneshot(get_request("/api/v1/profiles")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = app
            .clone()
            .oneshot(post_json("/api/v1/profiles/reload", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(get_request("/api/v1/statistics"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_audit_and_history_routes() {
        let app = app();
        app.clone()
            .oneshot(post_json("/api/v1/profiles/build", json!({"group_by": "form"})))
            .await
            .unwrap();

        let audit = app
            .clone()
            .oneshot(get_request("/api/v1/profiles/audit?group_by=form"))
            .await
            .unwrap();
        assert_eq!(audit.status(), StatusCode::OK);
        let audit = body_json(audit).await;
        assert_eq!(audit["audited_groups"], 1);
        assert_eq!(audit["anomalous_groups"], 0);

        let history = app
            .oneshot(get_request("/api/v1/recommendations/history?limit=5000"))
            .await
            .unwrap();
        assert_eq!(history.status(), StatusCode::BAD_REQUEST);
    }
}
