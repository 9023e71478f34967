//! The published Group Profile Set: a versioned, self-describing snapshot of
//! every group profile plus the posting statistics it was built from.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::aggregator::{aggregate, GroupBy, GroupProfile};
use crate::engine::error::EngineError;
use crate::engine::ranker::{rank, RankOptions, RecommendationResult};
use crate::engine::records::PostingScoreRecord;
use crate::engine::synthesizer::SynthesisMode;
use crate::engine::vector::{Component, ScoreVector, COMPONENT_COUNT};

/// Where a build takes its score records from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildMode {
    /// Records already persisted in the score store.
    Stored,
    #[default]
    TwoStage,
    SingleStage,
}

impl BuildMode {
    /// `None` when the build reads stored records instead of synthesizing.
    pub fn synthesis_mode(self) -> Option<SynthesisMode> {
        match self {
            BuildMode::Stored => None,
            BuildMode::TwoStage => Some(SynthesisMode::TwoStage),
            BuildMode::SingleStage => Some(SynthesisMode::SingleStage),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildStats {
    pub total_records: usize,
    pub unique_organizations: usize,
    pub unique_forms: usize,
    pub group_count: usize,
    pub form_distribution: BTreeMap<String, usize>,
    pub organization_distribution: BTreeMap<String, usize>,
}

impl BuildStats {
    fn collect(records: &[PostingScoreRecord], group_count: usize) -> Self {
        let mut form_distribution = BTreeMap::new();
        let mut organization_distribution = BTreeMap::new();
        for record in records {
            let d = &record.descriptor;
            *form_distribution.entry(d.form.clone()).or_insert(0) += 1;
            *organization_distribution
                .entry(d.organization.clone())
                .or_insert(0) += 1;
        }

        Self {
            total_records: records.len(),
            unique_organizations: organization_distribution.len(),
            unique_forms: form_distribution.len(),
            group_count,
            form_distribution,
            organization_distribution,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupProfileSet {
    pub version: String,
    pub built_at: DateTime<Utc>,
    pub group_by: GroupBy,
    pub mode: BuildMode,
    pub components: Vec<String>,
    pub stats: BuildStats,
    pub profiles: Vec<GroupProfile>,
}

/// Metadata of a profile set, without the profile vectors.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileSetSummary {
    pub version: String,
    pub built_at: DateTime<Utc>,
    pub group_by: GroupBy,
    pub mode: BuildMode,
    pub components: Vec<String>,
    pub profile_count: usize,
    pub stats: BuildStats,
}

/// `v` followed by the UTC build timestamp down to milliseconds.
pub fn model_version(at: DateTime<Utc>) -> String {
    format!("v{}", at.format("%Y%m%d_%H%M%S%3f"))
}

/// Aggregates `records` into a new, unpublished profile set.
///
/// An empty record list is a build failure.
pub fn build_profiles(
    records: &[PostingScoreRecord],
    group_by: GroupBy,
    mode: BuildMode,
    built_at: DateTime<Utc>,
) -> Result<GroupProfileSet, EngineError> {
    if records.is_empty() {
        return Err(EngineError::BuildFailure(
            "no score records available to aggregate".to_string(),
        ));
    }

    let profiles: Vec<GroupProfile> = aggregate(records, group_by).into_values().collect();

    Ok(GroupProfileSet {
        version: model_version(built_at),
        built_at,
        group_by,
        mode,
        components: Component::labels(),
        stats: BuildStats::collect(records, profiles.len()),
        profiles,
    })
}

impl GroupProfileSet {
    /// Rejects sets whose component list or profile dimensionality does not
    /// match the current score vector layout.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.components.len() != COMPONENT_COUNT {
            return Err(EngineError::DimensionMismatch {
                target: format!("profile set {}", self.version),
                expected: COMPONENT_COUNT,
                found: self.components.len(),
            });
        }
        for (stored, component) in self.components.iter().zip(Component::ALL) {
            if Component::from_label(stored) != Some(component) {
                return Err(EngineError::UnknownComponent(stored.clone()));
            }
        }
        for profile in &self.profiles {
            if profile.mean.len() != COMPONENT_COUNT {
                return Err(EngineError::DimensionMismatch {
                    target: profile.key.to_string(),
                    expected: COMPONENT_COUNT,
                    found: profile.mean.len(),
                });
            }
        }
        Ok(())
    }

    pub fn recommend(
        &self,
        query: &ScoreVector,
        top_n: usize,
        options: RankOptions,
    ) -> Result<Vec<RecommendationResult>, EngineError> {
        rank(query, &self.profiles, top_n, options)
    }

    pub fn summary(&self) -> ProfileSetSummary {
        ProfileSetSummary {
            version: self.version.clone(),
            built_at: self.built_at,
            group_by: self.group_by,
            mode: self.mode,
            components: self.components.clone(),
            profile_count: self.profiles.len(),
            stats: self.stats.clone(),
        }
    }
}
