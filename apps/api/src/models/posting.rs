use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::engine::error::EngineError;
use crate::engine::records::{JobFormDescriptor, PostingScoreRecord};
use crate::engine::vector::ScoreVector;

/// A raw job posting. `forms` may list several forms separated by commas or
/// newlines.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobPostingRow {
    pub id: i64,
    pub organization: String,
    pub title: Option<String>,
    pub forms: String,
}

/// One stored score record. `scores` holds the 16 components in fixed order.
#[derive(Debug, Clone, FromRow)]
pub struct ScoreRecordRow {
    pub posting_id: Option<i64>,
    pub organization: String,
    pub title: Option<String>,
    pub form: String,
    pub scores: Vec<i16>,
}

impl TryFrom<ScoreRecordRow> for PostingScoreRecord {
    type Error = EngineError;

    fn try_from(row: ScoreRecordRow) -> Result<Self, Self::Error> {
        let mut descriptor = JobFormDescriptor::new(&row.organization, &row.form)?;
        if let Some(id) = row.posting_id {
            descriptor = descriptor.with_posting(id, row.title.as_deref());
        }
        Ok(PostingScoreRecord {
            descriptor,
            scores: ScoreVector::from_slice(&row.scores)?,
        })
    }
}
