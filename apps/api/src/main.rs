mod config;
mod db;
mod engine;
mod errors;
mod models;
mod profiles;
mod recommend;
mod routes;
mod state;
mod store;
#[cfg(test)]
mod test_support;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::db::create_pool;
use crate::profiles::service::reload_latest;
use crate::profiles::storage::S3ArtifactStore;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::PgScoreStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Profile Match API v{}", env!("CARGO_PKG_VERSION"));
    info!(
        group_by = config.engine.group_by.as_str(),
        jitter = config.engine.jitter_ratio,
        seed = config.engine.seed,
        standardize = config.engine.standardize_queries,
        "Engine settings"
    );

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized");

    let state = AppState::new(
        Arc::new(PgScoreStore::new(db)),
        Arc::new(S3ArtifactStore::new(s3, config.s3_bucket.clone())),
        config.engine,
    );

    // Serve the last built profile set if there is one; a missing or unreadable
    // artifact only means recommendations stay empty until a build.
    match reload_latest(&state).await {
        Ok(Some(set)) => info!(version = %set.version, "Loaded latest profile set"),
        Ok(None) => warn!("Starting without a profile set; POST /api/v1/profiles/build to create one"),
        Err(e) => warn!("Could not load latest profile set: {e}"),
    }

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "profile-match-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
