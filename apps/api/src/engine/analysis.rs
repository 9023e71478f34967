use serde::{Deserialize, Serialize};

use crate::engine::vector::ScoreVector;

const HIGHLIGHT_COUNT: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentScore {
    pub component: String,
    pub score: u8,
}

/// Strengths and improvement areas of a seeker's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileAnalysis {
    pub strengths: Vec<ComponentScore>,
    pub improvements: Vec<ComponentScore>,
    pub average: f64,
}

/// Top three and bottom three components by score (ties in component order),
/// plus the average rounded to one decimal.
pub fn analyze_profile(scores: &ScoreVector) -> ProfileAnalysis {
    let mut ordered: Vec<ComponentScore> = scores
        .iter()
        .map(|(component, score)| ComponentScore {
            component: component.label().to_string(),
            score,
        })
        .collect();
    ordered.sort_by(|a, b| b.score.cmp(&a.score));

    let total: u32 = scores.values().iter().map(|&v| u32::from(v)).sum();
    let average = f64::from(total) / ordered.len() as f64;

    let improvements = ordered[ordered.len().saturating_sub(HIGHLIGHT_COUNT)..].to_vec();
    ordered.truncate(HIGHLIGHT_COUNT);

    ProfileAnalysis {
        strengths: ordered,
        improvements,
        average: (average * 10.0).round() / 10.0,
    }
}
