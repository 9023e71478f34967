//! Score Vector: the fixed-order 16-component trait profile shared by job
//! seekers and job postings.
//!
//! Components are identified on the wire by their Korean labels. The two legacy
//! hyphenated spellings (`대인-영향력`, `공감-사회기술`) are accepted as aliases.

use std::collections::HashMap;
use std::fmt;

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::engine::error::EngineError;

pub const COMPONENT_COUNT: usize = 16;
pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 5;

// ────────────────────────────────────────────────────────────────────────────
// Components
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Component {
    Conscientiousness,
    Openness,
    Extraversion,
    Agreeableness,
    EmotionalStability,
    TechnicalMastery,
    ProblemSolving,
    InterpersonalInfluence,
    SelfManagement,
    Adaptability,
    LearningSpeed,
    PeopleAgility,
    ResultsAgility,
    SelfAwareness,
    SelfRegulation,
    EmpathySocialSkill,
}

impl Component {
    /// All components in wire/storage order.
    pub const ALL: [Component; COMPONENT_COUNT] = [
        Component::Conscientiousness,
        Component::Openness,
        Component::Extraversion,
        Component::Agreeableness,
        Component::EmotionalStability,
        Component::TechnicalMastery,
        Component::ProblemSolving,
        Component::InterpersonalInfluence,
        Component::SelfManagement,
        Component::Adaptability,
        Component::LearningSpeed,
        Component::PeopleAgility,
        Component::ResultsAgility,
        Component::SelfAwareness,
        Component::SelfRegulation,
        Component::EmpathySocialSkill,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Component::Conscientiousness => "성실성",
            Component::Openness => "개방성",
            Component::Extraversion => "외향성",
            Component::Agreeableness => "우호성",
            Component::EmotionalStability => "정서안정성",
            Component::TechnicalMastery => "기술전문성",
            Component::ProblemSolving => "인지문제해결",
            Component::InterpersonalInfluence => "대인영향력",
            Component::SelfManagement => "자기관리",
            Component::Adaptability => "적응력",
            Component::LearningSpeed => "학습속도",
            Component::PeopleAgility => "대인민첩성",
            Component::ResultsAgility => "성과민첩성",
            Component::SelfAwareness => "자기인식",
            Component::SelfRegulation => "자기조절",
            Component::EmpathySocialSkill => "공감사회기술",
        }
    }

    pub fn from_label(label: &str) -> Option<Component> {
        match label.trim() {
            "대인-영향력" => Some(Component::InterpersonalInfluence),
            "공감-사회기술" => Some(Component::EmpathySocialSkill),
            other => Component::ALL.into_iter().find(|c| c.label() == other),
        }
    }

    /// Labels of all components in order, as persisted in profile artifacts.
    pub fn labels() -> Vec<String> {
        Component::ALL.iter().map(|c| c.label().to_string()).collect()
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// ScoreVector
// ────────────────────────────────────────────────────────────────────────────

/// Sixteen integer scores, each guaranteed to lie in `[MIN_SCORE, MAX_SCORE]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScoreVector([u8; COMPONENT_COUNT]);

impl ScoreVector {
    /// Validates every component. Out-of-range values are rejected, never clamped.
    pub fn new(values: [u8; COMPONENT_COUNT]) -> Result<Self, EngineError> {
        for (component, value) in Component::ALL.iter().zip(values.iter()) {
            if !(MIN_SCORE..=MAX_SCORE).contains(value) {
                return Err(EngineError::OutOfRange {
                    component: component.label().to_string(),
                    received: value.to_string(),
                });
            }
        }
        Ok(Self(values))
    }

    /// Builds a vector from signed stored values (e.g. a `SMALLINT[]` column).
    pub fn from_slice(values: &[i16]) -> Result<Self, EngineError> {
        if values.len() != COMPONENT_COUNT {
            return Err(EngineError::DimensionMismatch {
                target: "score record".to_string(),
                expected: COMPONENT_COUNT,
                found: values.len(),
            });
        }
        let mut out = [0u8; COMPONENT_COUNT];
        for (i, (component, &value)) in Component::ALL.iter().zip(values).enumerate() {
            if !(MIN_SCORE as i16..=MAX_SCORE as i16).contains(&value) {
                return Err(EngineError::OutOfRange {
                    component: component.label().to_string(),
                    received: value.to_string(),
                });
            }
            out[i] = value as u8;
        }
        Ok(Self(out))
    }

    /// Clamps post-arithmetic values into range. Only synthesis jitter uses this.
    pub(crate) fn from_clamped(values: [i32; COMPONENT_COUNT]) -> Self {
        let mut out = [0u8; COMPONENT_COUNT];
        for (slot, value) in out.iter_mut().zip(values) {
            *slot = value.clamp(MIN_SCORE as i32, MAX_SCORE as i32) as u8;
        }
        Self(out)
    }

    /// Parses a label-keyed JSON score map as received from callers.
    ///
    /// Unknown labels, missing or repeated components, non-integers and values
    /// outside `1..=5` are all reported with the offending component. A legacy
    /// spelling sent next to the current label counts as a repeat.
    pub fn from_map(scores: &HashMap<String, Value>) -> Result<Self, EngineError> {
        let mut slots: [Option<u8>; COMPONENT_COUNT] = [None; COMPONENT_COUNT];

        let mut labels: Vec<&String> = scores.keys().collect();
        labels.sort();
        for label in labels {
            let component = Component::from_label(label)
                .ok_or_else(|| EngineError::UnknownComponent(label.clone()))?;
            let slot = &mut slots[component.index()];
            if slot.is_some() {
                return Err(EngineError::DuplicateComponent(component.label().to_string()));
            }
            *slot = Some(parse_score(component, &scores[label])?);
        }

        let mut out = [0u8; COMPONENT_COUNT];
        for (component, slot) in Component::ALL.iter().zip(slots) {
            out[component.index()] = slot
                .ok_or_else(|| EngineError::MissingComponent(component.label().to_string()))?;
        }
        Ok(Self(out))
    }

    pub fn get(&self, component: Component) -> u8 {
        self.0[component.index()]
    }

    pub fn values(&self) -> &[u8; COMPONENT_COUNT] {
        &self.0
    }

    pub fn to_f64(&self) -> Vec<f64> {
        self.0.iter().map(|&v| f64::from(v)).collect()
    }

    pub fn to_i16(&self) -> Vec<i16> {
        self.0.iter().map(|&v| i16::from(v)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Component, u8)> + '_ {
        Component::ALL.iter().copied().zip(self.0.iter().copied())
    }
}

fn parse_score(component: Component, value: &Value) -> Result<u8, EngineError> {
    let integral = value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64));

    match integral {
        Some(v) if (MIN_SCORE as i64..=MAX_SCORE as i64).contains(&v) => Ok(v as u8),
        _ => Err(EngineError::OutOfRange {
            component: component.label().to_string(),
            received: value.to_string(),
        }),
    }
}

impl Serialize for ScoreVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(COMPONENT_COUNT))?;
        for (component, value) in self.iter() {
            map.serialize_entry(component.label(), &value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ScoreVector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = HashMap::<String, Value>::deserialize(deserializer)?;
        ScoreVector::from_map(&raw).map_err(D::Error::custom)
    }
}

#[cfg(test)]
pub(crate) fn score_map(values: [u8; COMPONENT_COUNT]) -> HashMap<String, Value> {
    Component::ALL
        .iter()
        .zip(values)
        .map(|(c, v)| (c.label().to_string(), Value::from(v)))
        .collect()
}
