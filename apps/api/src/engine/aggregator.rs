//! Profile aggregation: per-group mean vectors over posting score records.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::engine::records::{JobFormDescriptor, PostingScoreRecord};
use crate::engine::vector::COMPONENT_COUNT;

/// Granularity used to group postings into one profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    #[default]
    OrganizationForm,
    Form,
}

impl GroupBy {
    pub fn key_for(&self, descriptor: &JobFormDescriptor) -> GroupKey {
        match self {
            GroupBy::OrganizationForm => GroupKey {
                organization: Some(descriptor.organization.clone()),
                form: descriptor.form.clone(),
            },
            GroupBy::Form => GroupKey {
                organization: None,
                form: descriptor.form.clone(),
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::OrganizationForm => "organization_form",
            GroupBy::Form => "form",
        }
    }
}

impl FromStr for GroupBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "organization_form" => Ok(GroupBy::OrganizationForm),
            "form" => Ok(GroupBy::Form),
            other => Err(format!(
                "unknown grouping '{other}' (expected 'organization_form' or 'form')"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupKey {
    pub organization: Option<String>,
    pub form: String,
}

impl GroupKey {
    /// Text the weighting strategy sees when computing a group baseline.
    pub fn text(&self) -> String {
        match &self.organization {
            Some(org) => format!("{org} {}", self.form),
            None => self.form.clone(),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.organization {
            Some(org) => write!(f, "{org} / {}", self.form),
            None => f.write_str(&self.form),
        }
    }
}

/// Mean score vector of one group. `mean` is real-valued and unrounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupProfile {
    pub key: GroupKey,
    pub mean: Vec<f64>,
    pub member_count: usize,
}

/// Partitions records by key and averages each component.
///
/// An empty input yields an empty mapping.
pub fn aggregate(
    records: &[PostingScoreRecord],
    group_by: GroupBy,
) -> BTreeMap<GroupKey, GroupProfile> {
    let mut sums: BTreeMap<GroupKey, ([f64; COMPONENT_COUNT], usize)> = BTreeMap::new();

    for record in records {
        let (acc, count) = sums
            .entry(group_by.key_for(&record.descriptor))
            .or_insert(([0.0; COMPONENT_COUNT], 0));
        for (slot, &value) in acc.iter_mut().zip(record.scores.values()) {
            *slot += f64::from(value);
        }
        *count += 1;
    }

    sums.into_iter()
        .map(|(key, (acc, count))| {
            let mean = acc.iter().map(|sum| sum / count as f64).collect();
            let profile = GroupProfile {
                key: key.clone(),
                mean,
                member_count: count,
            };
            (key, profile)
        })
        .collect()
}
