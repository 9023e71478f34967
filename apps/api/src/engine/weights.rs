//! Category weighting: maps job-form text to per-component multipliers.
//!
//! `WeightStrategy` is the seam: the keyword heuristic below is the default,
//! and a trained classifier can replace it without touching synthesis or ranking.

use crate::engine::vector::{Component, COMPONENT_COUNT};

/// Per-component multiplier; 1.0 means no bias.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryWeightMap([f64; COMPONENT_COUNT]);

impl Default for CategoryWeightMap {
    fn default() -> Self {
        Self([1.0; COMPONENT_COUNT])
    }
}

impl CategoryWeightMap {
    pub fn get(&self, component: Component) -> f64 {
        self.0[component.index()]
    }

    pub fn boost(&mut self, component: Component, factor: f64) {
        self.0[component.index()] *= factor;
    }
}

pub trait WeightStrategy: Send + Sync {
    fn weights(&self, text: &str) -> CategoryWeightMap;
}

// ────────────────────────────────────────────────────────────────────────────
// Keyword rules
// ────────────────────────────────────────────────────────────────────────────

struct KeywordRule {
    keywords: &'static [&'static str],
    boosts: &'static [(Component, f64)],
}

impl KeywordRule {
    fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|k| text.contains(k))
    }

    fn apply(&self, map: &mut CategoryWeightMap) {
        for &(component, factor) in self.boosts {
            map.boost(component, factor);
        }
    }
}

const TECHNICAL: KeywordRule = KeywordRule {
    keywords: &[
        "기술", "연구", "개발", "it", "정보", "시스템", "프로그램", "엔지니어", "전산", "소프트웨어",
        "기계", "전기", "토목", "건축", "통신", "신호",
    ],
    boosts: &[
        (Component::TechnicalMastery, 1.5),
        (Component::ProblemSolving, 1.4),
        (Component::LearningSpeed, 1.3),
        (Component::SelfManagement, 1.2),
    ],
};

const ADMINISTRATIVE: KeywordRule = KeywordRule {
    keywords: &["사무", "행정", "관리", "총무", "기획", "회계", "인사", "운영"],
    boosts: &[
        (Component::Conscientiousness, 1.4),
        (Component::SelfManagement, 1.3),
        (Component::EmpathySocialSkill, 1.2),
        (Component::InterpersonalInfluence, 1.2),
    ],
};

const SERVICE: KeywordRule = KeywordRule {
    keywords: &["고객", "상담", "민원", "안내", "서비스", "접수"],
    boosts: &[
        (Component::Extraversion, 1.4),
        (Component::Agreeableness, 1.3),
        (Component::EmpathySocialSkill, 1.3),
        (Component::PeopleAgility, 1.2),
    ],
};

const OPERATOR: KeywordRule = KeywordRule {
    keywords: &["운전"],
    boosts: &[
        (Component::Conscientiousness, 1.3),
        (Component::EmotionalStability, 1.3),
        (Component::Adaptability, 1.2),
        (Component::SelfManagement, 1.2),
    ],
};

const PUBLIC_SERVICE: KeywordRule = KeywordRule {
    keywords: &["공무"],
    boosts: &[
        (Component::Conscientiousness, 1.3),
        (Component::SelfManagement, 1.2),
        (Component::EmpathySocialSkill, 1.2),
    ],
};

const MANAGEMENT: KeywordRule = KeywordRule {
    keywords: &["팀장", "과장", "부장", "관리자", "책임자", "리더"],
    boosts: &[
        (Component::InterpersonalInfluence, 1.4),
        (Component::SelfRegulation, 1.3),
        (Component::ResultsAgility, 1.3),
        (Component::SelfAwareness, 1.2),
    ],
};

const ENTRY_LEVEL: KeywordRule = KeywordRule {
    keywords: &["신입", "경력무관"],
    boosts: &[
        (Component::LearningSpeed, 1.3),
        (Component::Adaptability, 1.2),
        (Component::Openness, 1.2),
    ],
};

const EXPERIENCED: KeywordRule = KeywordRule {
    keywords: &["경력"],
    boosts: &[
        (Component::Conscientiousness, 1.2),
        (Component::SelfManagement, 1.2),
        (Component::ResultsAgility, 1.2),
    ],
};

const CATEGORY_RULES: [&KeywordRule; 6] = [
    &TECHNICAL,
    &ADMINISTRATIVE,
    &SERVICE,
    &OPERATOR,
    &PUBLIC_SERVICE,
    &MANAGEMENT,
];

/// Default heuristic: every matching category compounds its boosts; career
/// level is exclusive (entry-level wins over the "경력" substring it contains).
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordWeightStrategy;

impl WeightStrategy for KeywordWeightStrategy {
    fn weights(&self, text: &str) -> CategoryWeightMap {
        let text = text.to_lowercase();
        let mut map = CategoryWeightMap::default();

        for rule in CATEGORY_RULES {
            if rule.matches(&text) {
                rule.apply(&mut map);
            }
        }

        if ENTRY_LEVEL.matches(&text) {
            ENTRY_LEVEL.apply(&mut map);
        } else if EXPERIENCED.matches(&text) {
            EXPERIENCED.apply(&mut map);
        }

        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_plain_text_is_neutral() {
        let map = KeywordWeightStrategy.weights("일반직");
        assert_eq!(map, CategoryWeightMap::default());
    }

    #[test]
    fn test_technical_keywords_boost_mastery() {
        let map = KeywordWeightStrategy.weights("전기직");
        assert!(approx(map.get(Component::TechnicalMastery), 1.5));
        assert!(approx(map.get(Component::ProblemSolving), 1.4));
        assert!(approx(map.get(Component::Extraversion), 1.0));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let map = KeywordWeightStrategy.weights("IT 지원");
        assert!(approx(map.get(Component::TechnicalMastery), 1.5));
    }

    #[test]
    fn test_multiple_categories_compound() {
        // technical (×1.2) and administrative (×1.3) both boost self-management
        let map = KeywordWeightStrategy.weights("전산 행정");
        assert!(approx(map.get(Component::SelfManagement), 1.2 * 1.3));
    }

    #[test]
    fn test_operator_boosts_emotional_stability() {
        let map = KeywordWeightStrategy.weights("버스 운전원");
        assert!(approx(map.get(Component::EmotionalStability), 1.3));
        assert!(approx(map.get(Component::Adaptability), 1.2));
    }

    #[test]
    fn test_career_level_is_exclusive() {
        let entry = KeywordWeightStrategy.weights("경력무관 사원");
        assert!(approx(entry.get(Component::LearningSpeed), 1.3));
        assert!(approx(entry.get(Component::ResultsAgility), 1.0));

        let experienced = KeywordWeightStrategy.weights("경력 사원");
        assert!(approx(experienced.get(Component::ResultsAgility), 1.2));
        assert!(approx(experienced.get(Component::LearningSpeed), 1.0));
    }

    #[test]
    fn test_management_boosts_influence() {
        let map = KeywordWeightStrategy.weights("영업 팀장");
        assert!(approx(map.get(Component::InterpersonalInfluence), 1.4));
        assert!(approx(map.get(Component::SelfRegulation), 1.3));
    }
}
