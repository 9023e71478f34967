use serde::{Deserialize, Serialize};

use crate::engine::error::EngineError;
use crate::engine::vector::ScoreVector;

/// An (organization, form) pair produced by ingestion, optionally tied to the
/// posting it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFormDescriptor {
    pub posting_id: Option<i64>,
    pub organization: String,
    pub title: Option<String>,
    pub form: String,
}

impl JobFormDescriptor {
    pub fn new(organization: &str, form: &str) -> Result<Self, EngineError> {
        let descriptor = Self {
            posting_id: None,
            organization: organization.trim().to_string(),
            title: None,
            form: form.trim().to_string(),
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    pub fn with_posting(mut self, posting_id: i64, title: Option<&str>) -> Self {
        self.posting_id = Some(posting_id);
        self.title = title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
        self
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.form.trim().is_empty() {
            return Err(EngineError::EmptyForm {
                organization: self.organization.clone(),
            });
        }
        Ok(())
    }

    /// Organization, title and form joined for keyword matching.
    pub fn combined_text(&self) -> String {
        match &self.title {
            Some(title) => format!("{} {} {}", self.organization, title, self.form),
            None => format!("{} {}", self.organization, self.form),
        }
    }
}

/// One posting's score vector, synthesized or supplied by storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostingScoreRecord {
    pub descriptor: JobFormDescriptor,
    pub scores: ScoreVector,
}
