use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::EngineSettings;
use crate::profiles::publisher::ProfileCell;
use crate::profiles::storage::ArtifactStore;
use crate::store::ScoreStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Postings, score records and recommendation logs. Default: PgScoreStore.
    pub store: Arc<dyn ScoreStore>,
    /// Built profile sets. Default: S3ArtifactStore.
    pub artifacts: Arc<dyn ArtifactStore>,
    pub profiles: Arc<ProfileCell>,
    /// Serializes builds and reloads so their storage writes never interleave.
    pub build_lock: Arc<Mutex<()>>,
    pub settings: EngineSettings,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ScoreStore>,
        artifacts: Arc<dyn ArtifactStore>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            store,
            artifacts,
            profiles: Arc::new(ProfileCell::default()),
            build_lock: Arc::new(Mutex::new(())),
            settings,
        }
    }
}
