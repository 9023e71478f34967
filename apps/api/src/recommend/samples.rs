use serde::Serialize;

use crate::engine::vector::{ScoreVector, COMPONENT_COUNT};

/// Canned seeker profiles for trying the API, in component order.
const SAMPLES: [(&str, [u8; COMPONENT_COUNT]); 3] = [
    ("기술직 지향", [4, 5, 3, 3, 4, 5, 5, 3, 4, 4, 5, 3, 4, 4, 4, 3]),
    ("사무직 지향", [5, 3, 4, 4, 4, 3, 4, 4, 5, 4, 3, 4, 4, 4, 5, 4]),
    ("영업/서비스직 지향", [4, 4, 5, 5, 4, 3, 3, 5, 4, 5, 4, 5, 4, 4, 4, 5]),
];

#[derive(Debug, Clone, Serialize)]
pub struct SampleProfile {
    pub name: &'static str,
    pub scores: ScoreVector,
}

pub fn sample_profiles() -> Vec<SampleProfile> {
    SAMPLES
        .iter()
        .filter_map(|&(name, values)| {
            ScoreVector::new(values)
                .ok()
                .map(|scores| SampleProfile { name, scores })
        })
        .collect()
}
