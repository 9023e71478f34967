//! Build orchestration: load or synthesize records, aggregate, persist, publish.
//!
//! Every step runs before the publish swap, so a failure anywhere leaves the
//! previously published set serving requests. Stored records are only replaced
//! once the versioned artifact is uploaded, and are put back if the latest
//! pointer cannot be moved.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::engine::aggregator::GroupBy;
use crate::engine::auditor::{audit_report, AuditReport};
use crate::engine::synthesizer::{ProfileSynthesizer, SynthesisConfig};
use crate::errors::AppError;
use crate::profiles::artifact::{build_profiles, BuildMode, GroupProfileSet, ProfileSetSummary};
use crate::state::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildRequest {
    #[serde(default)]
    pub mode: BuildMode,
    pub group_by: Option<GroupBy>,
    pub seed: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct BuildOutcome {
    pub profile_set: ProfileSetSummary,
    pub artifact_key: String,
    /// Rows written back to the score store; `None` for builds from stored records.
    pub records_written: Option<u64>,
    pub audited_groups: usize,
    pub anomalous_groups: usize,
}

pub async fn build_and_publish(
    state: &AppState,
    request: BuildRequest,
) -> Result<BuildOutcome, AppError> {
    let _guard = state.build_lock.lock().await;

    let settings = state.settings;
    let group_by = request.group_by.unwrap_or(settings.group_by);
    info!(mode = ?request.mode, group_by = group_by.as_str(), "Starting profile build");

    let records = match request.mode.synthesis_mode() {
        None => state.store.fetch_score_records().await?,
        Some(mode) => {
            let descriptors = state.store.fetch_descriptors().await?;
            let synthesizer = ProfileSynthesizer::keyword(SynthesisConfig {
                mode,
                group_by,
                jitter_ratio: settings.jitter_ratio,
                seed: request.seed.unwrap_or(settings.seed),
            });
            synthesizer.synthesize_all(&descriptors)?
        }
    };

    let set = build_profiles(&records, group_by, request.mode, Utc::now())?;
    set.validate()?;

    let audit = audit_report(&records, group_by, settings.jitter_ratio);
    if audit.anomalous_groups > 0 {
        warn!(
            anomalous = audit.anomalous_groups,
            audited = audit.audited_groups,
            "Some groups exceed the expected score spread"
        );
    }

    let artifact_key = state.artifacts.save_version(&set).await?;

    let (records_written, previous) = match request.mode {
        BuildMode::Stored => (None, None),
        BuildMode::TwoStage | BuildMode::SingleStage => {
            let previous = state.store.fetch_score_records().await?;
            let written = state.store.replace_score_records(&records).await?;
            (Some(written), Some(previous))
        }
    };

    if let Err(e) = state.artifacts.promote_latest(&set).await {
        if let Some(previous) = previous {
            if let Err(restore) = state.store.replace_score_records(&previous).await {
                error!("Could not restore score records after failed build: {restore:#}");
            }
        }
        return Err(e.into());
    }
    let published = state.profiles.publish(set)?;

    info!(
        version = %published.version,
        groups = published.profiles.len(),
        records = records.len(),
        "Profile build complete"
    );

    Ok(BuildOutcome {
        profile_set: published.summary(),
        artifact_key,
        records_written,
        audited_groups: audit.audited_groups,
        anomalous_groups: audit.anomalous_groups,
    })
}

/// Publishes the latest stored artifact. `None` when nothing has been built yet.
pub async fn reload_latest(state: &AppState) -> Result<Option<Arc<GroupProfileSet>>, AppError> {
    let _guard = state.build_lock.lock().await;

    match state.artifacts.load_latest().await? {
        Some(set) => Ok(Some(state.profiles.publish(set)?)),
        None => {
            warn!("No profile artifact found to load");
            Ok(None)
        }
    }
}

pub async fn audit_stored(
    state: &AppState,
    group_by: Option<GroupBy>,
) -> Result<AuditReport, AppError> {
    let records = state.store.fetch_score_records().await?;
    let group_by = group_by.unwrap_or(state.settings.group_by);
    Ok(audit_report(&records, group_by, state.settings.jitter_ratio))
}
