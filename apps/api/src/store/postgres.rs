use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use crate::engine::records::{JobFormDescriptor, PostingScoreRecord};
use crate::models::posting::{JobPostingRow, ScoreRecordRow};
use crate::models::recommendation::{
    NewRecommendationLog, RecommendationCounts, RecommendationLogRow,
};
use crate::profiles::ingest::expand_postings;
use crate::store::ScoreStore;

/// Postgres-backed store. Expects the tables `job_postings`,
/// `job_posting_scores` (scores as `SMALLINT[]` in component order) and
/// `recommendation_logs` to exist.
#[derive(Clone)]
pub struct PgScoreStore {
    pool: PgPool,
}

impl PgScoreStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScoreStore for PgScoreStore {
    async fn fetch_descriptors(&self) -> Result<Vec<JobFormDescriptor>> {
        let postings = sqlx::query_as::<_, JobPostingRow>(
            "SELECT id, organization, title, forms FROM job_postings ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to load job postings")?;

        Ok(expand_postings(&postings))
    }

    async fn fetch_score_records(&self) -> Result<Vec<PostingScoreRecord>> {
        let rows = sqlx::query_as::<_, ScoreRecordRow>(
            r#"
            SELECT posting_id, organization, title, form, scores
            FROM job_posting_scores
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to load posting scores")?;

        rows.into_iter()
            .map(|row| {
                let form = row.form.clone();
                PostingScoreRecord::try_from(row)
                    .with_context(|| format!("Stored score record for '{form}' is corrupted"))
            })
            .collect()
    }

    async fn replace_score_records(&self, records: &[PostingScoreRecord]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM job_posting_scores")
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let mut written = 0;
        for record in records {
            let d = &record.descriptor;
            written += sqlx::query(
                r#"
                INSERT INTO job_posting_scores (posting_id, organization, title, form, scores)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(d.posting_id)
            .bind(&d.organization)
            .bind(&d.title)
            .bind(&d.form)
            .bind(record.scores.to_i16())
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        tx.commit().await.context("Failed to commit score records")?;
        info!(removed, written, "Replaced stored posting scores");
        Ok(written)
    }

    async fn log_recommendation(&self, entry: &NewRecommendationLog) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO recommendation_logs
                (session_id, user_scores, recommendations, profile_analysis, model_version)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&entry.session_id)
        .bind(&entry.user_scores)
        .bind(&entry.recommendations)
        .bind(&entry.profile_analysis)
        .bind(&entry.model_version)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn recommendation_history(
        &self,
        session_id: Option<&str>,
        limit: i64,
    ) -> Result<Vec<RecommendationLogRow>> {
        Ok(sqlx::query_as::<_, RecommendationLogRow>(
            r#"
            SELECT id, session_id, user_scores, recommendations, profile_analysis,
                   model_version, created_at
            FROM recommendation_logs
            WHERE $1::TEXT IS NULL OR session_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(session_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn recommendation_counts(&self) -> Result<RecommendationCounts> {
        let (total, today): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE created_at >= date_trunc('day', now()))
            FROM recommendation_logs
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(RecommendationCounts { total, today })
    }
}
