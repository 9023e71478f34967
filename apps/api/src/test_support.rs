//! In-memory stores and state for service and router tests.

use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use crate::config::EngineSettings;
use crate::engine::records::{JobFormDescriptor, PostingScoreRecord};
use crate::engine::vector::{ScoreVector, COMPONENT_COUNT};
use crate::models::recommendation::{
    NewRecommendationLog, RecommendationCounts, RecommendationLogRow,
};
use crate::profiles::artifact::GroupProfileSet;
use crate::profiles::storage::{artifact_key, ArtifactStore};
use crate::state::AppState;
use crate::store::ScoreStore;

pub fn descriptor(org: &str, form: &str) -> JobFormDescriptor {
    JobFormDescriptor::new(org, form).unwrap()
}

pub fn stored_record(org: &str, form: &str, value: u8) -> PostingScoreRecord {
    PostingScoreRecord {
        descriptor: descriptor(org, form),
        scores: ScoreVector::new([value; COMPONENT_COUNT]).unwrap(),
    }
}

#[derive(Default)]
struct ScoreStoreInner {
    descriptors: Vec<JobFormDescriptor>,
    records: Vec<PostingScoreRecord>,
    logs: Vec<RecommendationLogRow>,
    fail_logging: bool,
}

#[derive(Clone, Default)]
pub struct InMemoryScoreStore {
    inner: Arc<Mutex<ScoreStoreInner>>,
}

impl InMemoryScoreStore {
    pub fn with_descriptors(descriptors: Vec<JobFormDescriptor>) -> Self {
        let store = Self::default();
        store.inner.lock().descriptors = descriptors;
        store
    }

    pub fn with_records(records: Vec<PostingScoreRecord>) -> Self {
        let store = Self::default();
        store.inner.lock().records = records;
        store
    }

    pub fn records(&self) -> Vec<PostingScoreRecord> {
        self.inner.lock().records.clone()
    }

    pub fn logs(&self) -> Vec<RecommendationLogRow> {
        self.inner.lock().logs.clone()
    }

    pub fn fail_logging(&self, fail: bool) {
        self.inner.lock().fail_logging = fail;
    }
}

#[async_trait]
impl ScoreStore for InMemoryScoreStore {
    async fn fetch_descriptors(&self) -> Result<Vec<JobFormDescriptor>> {
        Ok(self.inner.lock().descriptors.clone())
    }

    async fn fetch_score_records(&self) -> Result<Vec<PostingScoreRecord>> {
        Ok(self.inner.lock().records.clone())
    }

    async fn replace_score_records(&self, records: &[PostingScoreRecord]) -> Result<u64> {
        self.inner.lock().records = records.to_vec();
        Ok(records.len() as u64)
    }

    async fn log_recommendation(&self, entry: &NewRecommendationLog) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.fail_logging {
            bail!("recommendation_logs is unavailable");
        }
        let id = inner.logs.len() as i64 + 1;
        inner.logs.push(RecommendationLogRow {
            id,
            session_id: entry.session_id.clone(),
            user_scores: entry.user_scores.clone(),
            recommendations: entry.recommendations.clone(),
            profile_analysis: entry.profile_analysis.clone(),
            model_version: entry.model_version.clone(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn recommendation_history(
        &self,
        session_id: Option<&str>,
        limit: i64,
    ) -> Result<Vec<RecommendationLogRow>> {
        Ok(self
            .inner
            .lock()
            .logs
            .iter()
            .rev()
            .filter(|log| session_id.map_or(true, |id| log.session_id == id))
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn recommendation_counts(&self) -> Result<RecommendationCounts> {
        let total = self.inner.lock().logs.len() as i64;
        Ok(RecommendationCounts {
            total,
            today: total,
        })
    }
}

#[derive(Default)]
struct ArtifactInner {
    saved: Vec<GroupProfileSet>,
    latest: Option<GroupProfileSet>,
    fail_saves: bool,
    fail_promotions: bool,
}

#[derive(Clone, Default)]
pub struct InMemoryArtifactStore {
    inner: Arc<Mutex<ArtifactInner>>,
}

impl InMemoryArtifactStore {
    /// Versioned artifacts, in upload order.
    pub fn saved(&self) -> Vec<GroupProfileSet> {
        self.inner.lock().saved.clone()
    }

    pub fn fail_saves(&self, fail: bool) {
        self.inner.lock().fail_saves = fail;
    }

    pub fn fail_promotions(&self, fail: bool) {
        self.inner.lock().fail_promotions = fail;
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn save_version(&self, set: &GroupProfileSet) -> Result<String> {
        let mut inner = self.inner.lock();
        if inner.fail_saves {
            bail!("artifact bucket is unavailable");
        }
        inner.saved.push(set.clone());
        Ok(artifact_key(&set.version))
    }

    async fn promote_latest(&self, set: &GroupProfileSet) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.fail_saves || inner.fail_promotions {
            bail!("latest artifact pointer is unavailable");
        }
        inner.latest = Some(set.clone());
        Ok(())
    }

    async fn load_latest(&self) -> Result<Option<GroupProfileSet>> {
        Ok(self.inner.lock().latest.clone())
    }
}

pub fn test_state(store: InMemoryScoreStore, artifacts: InMemoryArtifactStore) -> AppState {
    AppState::new(Arc::new(store), Arc::new(artifacts), EngineSettings::default())
}
