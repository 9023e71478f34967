//! Similarity Ranker: blends cosine similarity with inverse Euclidean distance.
//!
//! combined = 0.6 × cosine + 0.4 × 1/(1 + euclidean), reported ×100.
//! The weights are fixed constants, not tuned.

use serde::Serialize;

use crate::engine::aggregator::{GroupKey, GroupProfile};
use crate::engine::error::EngineError;
use crate::engine::vector::{ScoreVector, COMPONENT_COUNT};

pub const COSINE_WEIGHT: f64 = 0.6;
pub const DISTANCE_WEIGHT: f64 = 0.4;
pub const DEFAULT_TOP_N: usize = 5;
pub const MAX_TOP_N: usize = 20;

#[derive(Debug, Clone, Copy, Default)]
pub struct RankOptions {
    /// Z-score query and profiles (fitted on the profiles) before the cosine term.
    pub standardize: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResult {
    pub rank: usize,
    pub target: GroupKey,
    /// 0–100.
    pub combined_score: f64,
    pub cosine_similarity: f64,
    pub distance_similarity: f64,
}

/// Caller-supplied `top_n`: anything outside `1..=MAX_TOP_N` falls back to the default.
pub fn resolve_top_n(requested: Option<i64>) -> usize {
    requested
        .filter(|n| (1..=MAX_TOP_N as i64).contains(n))
        .map(|n| n as usize)
        .unwrap_or(DEFAULT_TOP_N)
}

pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

fn is_zero(v: &[f64]) -> bool {
    v.iter().all(|x| x.abs() < 1e-12)
}

/// `1 / (1 + euclidean)`: 1.0 only for identical vectors.
pub fn distance_similarity(a: &[f64], b: &[f64]) -> f64 {
    let distance = a
        .iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt();
    1.0 / (1.0 + distance)
}

pub fn combined_score(cosine: f64, distance: f64) -> f64 {
    COSINE_WEIGHT * cosine + DISTANCE_WEIGHT * distance
}

/// Column-wise z-score scaler. Zero-variance columns divide by 1.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(rows: &[&[f64]]) -> Self {
        let n = rows.len().max(1) as f64;
        let mut means = vec![0.0; COMPONENT_COUNT];
        for row in rows {
            for (m, v) in means.iter_mut().zip(row.iter()) {
                *m += v / n;
            }
        }
        let mut stds = vec![0.0; COMPONENT_COUNT];
        for row in rows {
            for ((s, v), m) in stds.iter_mut().zip(row.iter()).zip(&means) {
                *s += (v - m).powi(2) / n;
            }
        }
        for s in stds.iter_mut() {
            *s = s.sqrt();
            if *s == 0.0 {
                *s = 1.0;
            }
        }
        Self { means, stds }
    }

    pub fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.means.iter().zip(&self.stds))
            .map(|(v, (m, s))| (v - m) / s)
            .collect()
    }
}

/// Ranks `profiles` against `query`, best first.
///
/// Returns `min(top_n, profiles.len())` results; an empty collection is an
/// empty result, not an error. Any profile that is not 16-dimensional is a
/// data-integrity error for the whole call. Ties keep input order.
pub fn rank(
    query: &ScoreVector,
    profiles: &[GroupProfile],
    top_n: usize,
    options: RankOptions,
) -> Result<Vec<RecommendationResult>, EngineError> {
    for profile in profiles {
        if profile.mean.len() != COMPONENT_COUNT {
            return Err(EngineError::DimensionMismatch {
                target: profile.key.to_string(),
                expected: COMPONENT_COUNT,
                found: profile.mean.len(),
            });
        }
    }
    if profiles.is_empty() {
        return Ok(Vec::new());
    }

    let top_n = if (1..=MAX_TOP_N).contains(&top_n) {
        top_n
    } else {
        DEFAULT_TOP_N
    };

    let query_raw = query.to_f64();
    let scaler = options.standardize.then(|| {
        let rows: Vec<&[f64]> = profiles.iter().map(|p| p.mean.as_slice()).collect();
        StandardScaler::fit(&rows)
    });
    let query_cos = match &scaler {
        Some(s) => s.transform(&query_raw),
        None => query_raw.clone(),
    };

    let mut scored: Vec<(usize, f64, f64, f64)> = profiles
        .iter()
        .enumerate()
        .map(|(idx, profile)| {
            let cosine = match &scaler {
                Some(s) => {
                    let scaled = s.transform(&profile.mean);
                    // a vector sitting on the column means has no direction once scaled
                    if is_zero(&query_cos) || is_zero(&scaled) {
                        cosine_similarity(&query_raw, &profile.mean)
                    } else {
                        cosine_similarity(&query_cos, &scaled)
                    }
                }
                None => cosine_similarity(&query_cos, &profile.mean),
            };
            let distance = distance_similarity(&query_raw, &profile.mean);
            (idx, combined_score(cosine, distance), cosine, distance)
        })
        .collect();

    // sort_by is stable: equal scores keep collection order
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    Ok(scored
        .into_iter()
        .take(top_n)
        .enumerate()
        .map(|(i, (idx, combined, cosine, distance))| RecommendationResult {
            rank: i + 1,
            target: profiles[idx].key.clone(),
            combined_score: combined * 100.0,
            cosine_similarity: cosine,
            distance_similarity: distance,
        })
        .collect())
}
