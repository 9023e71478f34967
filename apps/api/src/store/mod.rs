//! Record source and sink for postings, score records and recommendation logs.

pub mod postgres;

use anyhow::Result;
use async_trait::async_trait;

use crate::engine::records::{JobFormDescriptor, PostingScoreRecord};
use crate::models::recommendation::{
    NewRecommendationLog, RecommendationCounts, RecommendationLogRow,
};

pub use postgres::PgScoreStore;

#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Job-form descriptors expanded from the raw postings.
    async fn fetch_descriptors(&self) -> Result<Vec<JobFormDescriptor>>;

    async fn fetch_score_records(&self) -> Result<Vec<PostingScoreRecord>>;

    /// Replaces every stored score record in one transaction. Returns the number
    /// of rows written.
    async fn replace_score_records(&self, records: &[PostingScoreRecord]) -> Result<u64>;

    async fn log_recommendation(&self, entry: &NewRecommendationLog) -> Result<()>;

    /// Most recent sessions first; `session_id` narrows to one session.
    async fn recommendation_history(
        &self,
        session_id: Option<&str>,
        limit: i64,
    ) -> Result<Vec<RecommendationLogRow>>;

    async fn recommendation_counts(&self) -> Result<RecommendationCounts>;
}
