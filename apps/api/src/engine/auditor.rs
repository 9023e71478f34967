//! Consistency Auditor: checks that postings sharing a grouping key cluster
//! tightly. Informational only; never mutates records.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::engine::aggregator::{GroupBy, GroupKey};
use crate::engine::records::PostingScoreRecord;
use crate::engine::synthesizer::max_jitter_bound;
use crate::engine::vector::Component;

pub const DIAGNOSTIC_COMPONENTS: [Component; 3] = [
    Component::Conscientiousness,
    Component::TechnicalMastery,
    Component::InterpersonalInfluence,
];

#[derive(Debug, Clone, Serialize)]
pub struct ComponentSpread {
    pub component: String,
    pub mean: f64,
    pub min: u8,
    pub max: u8,
    pub spread: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupAudit {
    pub key: GroupKey,
    pub label: String,
    pub member_count: usize,
    pub components: Vec<ComponentSpread>,
    pub anomalous: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub group_by: GroupBy,
    pub expected_max_spread: u8,
    pub audited_groups: usize,
    pub skipped_singletons: usize,
    pub anomalous_groups: usize,
    pub groups: Vec<GroupAudit>,
}

pub struct ConsistencyAuditor {
    components: Vec<Component>,
    expected_max_spread: u8,
}

impl ConsistencyAuditor {
    /// A two-stage build moves each record at most one jitter bound from the
    /// baseline, so two members can differ by at most twice that.
    pub fn new(components: Vec<Component>, jitter_ratio: f64) -> Self {
        let spread = (2 * max_jitter_bound(jitter_ratio)).clamp(0, 4) as u8;
        Self {
            components,
            expected_max_spread: spread,
        }
    }

    pub fn audit(&self, records: &[PostingScoreRecord], group_by: GroupBy) -> AuditReport {
        let mut groups: BTreeMap<GroupKey, Vec<&PostingScoreRecord>> = BTreeMap::new();
        for record in records {
            groups
                .entry(group_by.key_for(&record.descriptor))
                .or_default()
                .push(record);
        }

        let mut skipped_singletons = 0;
        let mut audits = Vec::new();

        for (key, members) in groups {
            if members.len() < 2 {
                skipped_singletons += 1;
                continue;
            }

            let components: Vec<ComponentSpread> = self
                .components
                .iter()
                .map(|&component| spread_of(component, &members))
                .collect();
            let anomalous = components
                .iter()
                .any(|c| c.spread > self.expected_max_spread);

            audits.push(GroupAudit {
                label: key.to_string(),
                key,
                member_count: members.len(),
                components,
                anomalous,
            });
        }

        AuditReport {
            group_by,
            expected_max_spread: self.expected_max_spread,
            audited_groups: audits.len(),
            skipped_singletons,
            anomalous_groups: audits.iter().filter(|a| a.anomalous).count(),
            groups: audits,
        }
    }
}

fn spread_of(component: Component, members: &[&PostingScoreRecord]) -> ComponentSpread {
    let values: Vec<u8> = members.iter().map(|r| r.scores.get(component)).collect();
    let min = values.iter().copied().min().unwrap_or(0);
    let max = values.iter().copied().max().unwrap_or(0);
    let sum: f64 = values.iter().map(|&v| f64::from(v)).sum();

    ComponentSpread {
        component: component.label().to_string(),
        mean: sum / values.len().max(1) as f64,
        min,
        max,
        spread: max - min,
    }
}

/// Audits the diagnostic components against the spread a two-stage build with
/// `jitter_ratio` can produce.
pub fn audit_report(
    records: &[PostingScoreRecord],
    group_by: GroupBy,
    jitter_ratio: f64,
) -> AuditReport {
    ConsistencyAuditor::new(DIAGNOSTIC_COMPONENTS.to_vec(), jitter_ratio).audit(records, group_by)
}
