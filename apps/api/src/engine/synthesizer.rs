//! Profile Synthesizer: produces plausible score vectors for postings that have
//! no real scores yet.
//!
//! Two modes:
//! - `TwoStage` (default): one baseline per grouping key, seeded from a SHA-256
//!   hash of the key, then bounded jitter per record. Postings sharing a key
//!   cluster around the same center, which is what makes group profiles useful.
//! - `SingleStage`: independent draws per record. Noisier; kept for parity with
//!   older builds.
//!
//! All randomness comes from explicitly seeded `ChaCha8Rng`s, so a given seed and
//! input always reproduce the same vectors.

use std::collections::HashMap;
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::engine::aggregator::{GroupBy, GroupKey};
use crate::engine::error::EngineError;
use crate::engine::records::{JobFormDescriptor, PostingScoreRecord};
use crate::engine::vector::{
    Component, ScoreVector, COMPONENT_COUNT, MAX_SCORE, MIN_SCORE,
};
use crate::engine::weights::{CategoryWeightMap, KeywordWeightStrategy, WeightStrategy};

pub const DEFAULT_JITTER_RATIO: f64 = 0.3;
pub const DEFAULT_SEED: u64 = 42;

/// (score, probability) tables, selected by component weight.
const HIGH_WEIGHT_DRAW: &[(u8, f64)] = &[(4, 0.3), (5, 0.7)];
const MID_WEIGHT_DRAW: &[(u8, f64)] = &[(3, 0.2), (4, 0.5), (5, 0.3)];
const BASE_WEIGHT_DRAW: &[(u8, f64)] = &[(2, 0.3), (3, 0.5), (4, 0.2)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisMode {
    #[default]
    TwoStage,
    SingleStage,
}

#[derive(Debug, Clone)]
pub struct SynthesisConfig {
    pub mode: SynthesisMode,
    pub group_by: GroupBy,
    pub jitter_ratio: f64,
    /// Seeds the jitter / single-stage stream. Baselines ignore it.
    pub seed: u64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            mode: SynthesisMode::TwoStage,
            group_by: GroupBy::default(),
            jitter_ratio: DEFAULT_JITTER_RATIO,
            seed: DEFAULT_SEED,
        }
    }
}

pub struct ProfileSynthesizer {
    strategy: Arc<dyn WeightStrategy>,
    config: SynthesisConfig,
}

impl ProfileSynthesizer {
    pub fn new(strategy: Arc<dyn WeightStrategy>, config: SynthesisConfig) -> Self {
        Self { strategy, config }
    }

    /// Synthesizer backed by the default keyword heuristic.
    pub fn keyword(config: SynthesisConfig) -> Self {
        Self::new(Arc::new(KeywordWeightStrategy), config)
    }

    /// Deterministic center for a grouping key: same key, same vector, every run.
    pub fn baseline(&self, key: &GroupKey) -> ScoreVector {
        let weights = self.strategy.weights(&key.text());
        let mut rng = ChaCha8Rng::seed_from_u64(stable_seed(&key.text()));
        draw_vector(&weights, &mut rng)
    }

    /// Synthesizes one descriptor, drawing randomness from `rng`.
    pub fn synthesize<R: Rng>(
        &self,
        descriptor: &JobFormDescriptor,
        rng: &mut R,
    ) -> Result<ScoreVector, EngineError> {
        descriptor.validate()?;
        match self.config.mode {
            SynthesisMode::TwoStage => {
                let baseline = self.baseline(&self.config.group_by.key_for(descriptor));
                Ok(apply_jitter(&baseline, self.config.jitter_ratio, rng))
            }
            SynthesisMode::SingleStage => {
                let weights = self.strategy.weights(&descriptor.combined_text());
                Ok(draw_vector(&weights, rng))
            }
        }
    }

    /// Synthesizes every descriptor in order. Fails as a whole on the first
    /// malformed descriptor.
    pub fn synthesize_all(
        &self,
        descriptors: &[JobFormDescriptor],
    ) -> Result<Vec<PostingScoreRecord>, EngineError> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        let mut baselines: HashMap<GroupKey, ScoreVector> = HashMap::new();
        let mut records = Vec::with_capacity(descriptors.len());

        for descriptor in descriptors {
            descriptor.validate()?;
            let scores = match self.config.mode {
                SynthesisMode::TwoStage => {
                    let key = self.config.group_by.key_for(descriptor);
                    let baseline = *baselines
                        .entry(key)
                        .or_insert_with_key(|key| self.baseline(key));
                    apply_jitter(&baseline, self.config.jitter_ratio, &mut rng)
                }
                SynthesisMode::SingleStage => self.synthesize(descriptor, &mut rng)?,
            };
            records.push(PostingScoreRecord {
                descriptor: descriptor.clone(),
                scores,
            });
        }

        debug!(baselines = baselines.len(), "Synthesis baselines computed");
        info!(
            records = records.len(),
            mode = ?self.config.mode,
            group_by = self.config.group_by.as_str(),
            "Synthesized posting scores"
        );
        Ok(records)
    }
}

/// Largest jitter step allowed around `base`: ±max(1, ⌊base × ratio⌋).
pub fn jitter_bound(base: u8, ratio: f64) -> i32 {
    ((f64::from(base) * ratio).floor() as i32).max(1)
}

/// Largest jitter bound over the whole score range for `ratio`.
pub fn max_jitter_bound(ratio: f64) -> i32 {
    (MIN_SCORE..=MAX_SCORE)
        .map(|base| jitter_bound(base, ratio))
        .max()
        .unwrap_or(1)
}

/// First 8 bytes of SHA-256(text), big-endian. Stable across processes,
/// unlike `std`'s randomized hasher.
pub fn stable_seed(text: &str) -> u64 {
    let digest = Sha256::digest(text.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

fn draw_table(weight: f64) -> &'static [(u8, f64)] {
    if weight >= 1.4 {
        HIGH_WEIGHT_DRAW
    } else if weight >= 1.2 {
        MID_WEIGHT_DRAW
    } else {
        BASE_WEIGHT_DRAW
    }
}

fn draw_score<R: Rng>(weight: f64, rng: &mut R) -> u8 {
    let table = draw_table(weight);
    let roll: f64 = rng.gen();
    let mut cumulative = 0.0;
    for &(score, p) in table {
        cumulative += p;
        if roll < cumulative {
            return score;
        }
    }
    // float rounding can leave roll just above the final cumulative sum
    table[table.len() - 1].0
}

fn draw_vector<R: Rng>(weights: &CategoryWeightMap, rng: &mut R) -> ScoreVector {
    let mut raw = [0i32; COMPONENT_COUNT];
    for component in Component::ALL {
        raw[component.index()] = i32::from(draw_score(weights.get(component), rng));
    }
    ScoreVector::from_clamped(raw)
}

fn apply_jitter<R: Rng>(baseline: &ScoreVector, ratio: f64, rng: &mut R) -> ScoreVector {
    let mut raw = [0i32; COMPONENT_COUNT];
    for (slot, &base) in raw.iter_mut().zip(baseline.values()) {
        let bound = jitter_bound(base, ratio);
        *slot = i32::from(base) + rng.gen_range(-bound..=bound);
    }
    ScoreVector::from_clamped(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(org: &str, form: &str) -> JobFormDescriptor {
        JobFormDescriptor::new(org, form).unwrap()
    }

    fn two_stage(group_by: GroupBy) -> ProfileSynthesizer {
        ProfileSynthesizer::keyword(SynthesisConfig {
            group_by,
            ..SynthesisConfig::default()
        })
    }

    #[test]
    fn test_stable_seed_is_deterministic() {
        assert_eq!(stable_seed("기계직"), stable_seed("기계직"));
        assert_ne!(stable_seed("기계직"), stable_seed("사무직"));
    }

    #[test]
    fn test_baseline_is_reproducible_across_instances() {
        let key = GroupKey {
            organization: None,
            form: "전기직".to_string(),
        };
        let a = two_stage(GroupBy::Form).baseline(&key);
        let b = ProfileSynthesizer::keyword(SynthesisConfig {
            group_by: GroupBy::Form,
            seed: 7,
            ..SynthesisConfig::default()
        })
        .baseline(&key);
        assert_eq!(a, b);
    }

    #[test]
    fn test_high_weight_components_draw_from_upper_range() {
        let key = GroupKey {
            organization: None,
            form: "소프트웨어 개발".to_string(),
        };
        let baseline = two_stage(GroupBy::Form).baseline(&key);
        // 기술전문성 weight 1.5 and 인지문제해결 1.4 only draw 4 or 5
        assert!(baseline.get(Component::TechnicalMastery) >= 4);
        assert!(baseline.get(Component::ProblemSolving) >= 4);
        // neutral components only draw 2..=4
        assert!((2..=4).contains(&baseline.get(Component::Extraversion)));
    }

    #[test]
    fn test_jitter_bound_has_floor_of_one() {
        assert_eq!(jitter_bound(1, 0.3), 1);
        assert_eq!(jitter_bound(5, 0.3), 1);
        assert_eq!(jitter_bound(5, 0.5), 2);
        assert_eq!(max_jitter_bound(0.3), 1);
        assert_eq!(max_jitter_bound(0.6), 3);
    }

    #[test]
    fn test_two_stage_records_cluster_around_baseline() {
        let synth = two_stage(GroupBy::Form);
        let descriptors: Vec<_> = (0..40)
            .map(|i| descriptor(&format!("기관{i}"), "기계직"))
            .collect();
        let records = synth.synthesize_all(&descriptors).unwrap();
        let baseline = synth.baseline(&GroupKey {
            organization: None,
            form: "기계직".to_string(),
        });

        for record in &records {
            for (component, value) in record.scores.iter() {
                let base = baseline.get(component);
                let diff = (i32::from(value) - i32::from(base)).abs();
                assert!(diff <= jitter_bound(base, DEFAULT_JITTER_RATIO));
            }
        }

        let bound = 2 * max_jitter_bound(DEFAULT_JITTER_RATIO);
        for pair in records.windows(2) {
            for (a, b) in pair[0].scores.values().iter().zip(pair[1].scores.values()) {
                assert!((i32::from(*a) - i32::from(*b)).abs() <= bound);
            }
        }
    }

    #[test]
    fn test_synthesize_all_is_reproducible_for_same_seed() {
        let descriptors = vec![
            descriptor("기관A", "사무직"),
            descriptor("기관B", "고객상담"),
            descriptor("기관A", "사무직"),
        ];
        let a = two_stage(GroupBy::OrganizationForm)
            .synthesize_all(&descriptors)
            .unwrap();
        let b = two_stage(GroupBy::OrganizationForm)
            .synthesize_all(&descriptors)
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn test_single_stage_produces_valid_vectors() {
        let synth = ProfileSynthesizer::keyword(SynthesisConfig {
            mode: SynthesisMode::SingleStage,
            ..SynthesisConfig::default()
        });
        let records = synth
            .synthesize_all(&[descriptor("기관A", "운전직"), descriptor("기관B", "일반직")])
            .unwrap();
        for record in records {
            assert!(record
                .scores
                .values()
                .iter()
                .all(|v| (MIN_SCORE..=MAX_SCORE).contains(v)));
        }
    }

    #[test]
    fn test_synthesize_rejects_empty_form() {
        let bad = JobFormDescriptor {
            posting_id: None,
            organization: "기관A".to_string(),
            title: None,
            form: " ".to_string(),
        };
        let synth = two_stage(GroupBy::Form);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(matches!(
            synth.synthesize(&bad, &mut rng),
            Err(EngineError::EmptyForm { .. })
        ));
        assert!(synth.synthesize_all(&[bad]).is_err());
    }
}
