//! Composite health score
//!
//! Four component scores, each clamped to 0-100, are combined with fixed
//! weights: bowel health 0.4, symptom control 0.3, nutrition 0.2 and
//! medication 0.1.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::stats::{clamp, round1};
use super::types::{
    BowelMovementSummary, HealthScore, MealSummary, MedicationSummary, ScoreFactor,
    SymptomSummary, TrendDirection,
};

pub const BOWEL_WEIGHT: f64 = 0.4;
pub const SYMPTOM_WEIGHT: f64 = 0.3;
pub const MEAL_WEIGHT: f64 = 0.2;
pub const MEDICATION_WEIGHT: f64 = 0.1;

/// Score given to bowel health when nothing was logged
pub const NEUTRAL_BOWEL_SCORE: f64 = 50.0;

const IDEAL_BRISTOL: f64 = 3.5;

/// Per-component scores, each in 0-100
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentScores {
    pub bowel: f64,
    pub symptom: f64,
    pub meal: f64,
    pub medication: f64,
}

impl ComponentScores {
    pub fn from_summaries(
        bowel: &BowelMovementSummary,
        meal: &MealSummary,
        symptom: &SymptomSummary,
        medication: &MedicationSummary,
    ) -> Self {
        Self {
            bowel: bowel_score(bowel),
            symptom: symptom_score(symptom),
            meal: meal_score(meal),
            medication: medication_score(medication),
        }
    }

    /// Weighted overall score, one decimal
    pub fn overall(&self) -> f64 {
        let weighted = clamp(self.bowel, 0.0, 100.0) * BOWEL_WEIGHT
            + clamp(self.symptom, 0.0, 100.0) * SYMPTOM_WEIGHT
            + clamp(self.meal, 0.0, 100.0) * MEAL_WEIGHT
            + clamp(self.medication, 0.0, 100.0) * MEDICATION_WEIGHT;
        clamp(round1(weighted), 0.0, 100.0)
    }

    /// (name, score, weight) in fixed component order
    fn named(&self) -> [(&'static str, f64, f64); 4] {
        [
            ("BowelHealth", self.bowel, BOWEL_WEIGHT),
            ("SymptomControl", self.symptom, SYMPTOM_WEIGHT),
            ("Nutrition", self.meal, MEAL_WEIGHT),
            ("Medication", self.medication, MEDICATION_WEIGHT),
        ]
    }
}

/// Overall score straight from the four summaries
pub fn overall_score(
    bowel: &BowelMovementSummary,
    meal: &MealSummary,
    symptom: &SymptomSummary,
    medication: &MedicationSummary,
) -> f64 {
    ComponentScores::from_summaries(bowel, meal, symptom, medication).overall()
}

pub fn bowel_score(stats: &BowelMovementSummary) -> f64 {
    if stats.total_count == 0 {
        return NEUTRAL_BOWEL_SCORE;
    }

    let mut score = 100.0;
    score -= (f64::from(stats.most_common_bristol) - IDEAL_BRISTOL).abs() * 10.0;
    score -= (stats.average_pain - 1.0) * 5.0;
    score -= (stats.average_strain - 1.0) * 5.0;
    score += (stats.average_satisfaction - 5.0) * 2.0;

    if stats.average_per_day < 0.5 {
        score -= 20.0;
    } else if stats.average_per_day > 4.0 {
        score -= 15.0;
    }

    clamp(score, 0.0, 100.0)
}

pub fn symptom_score(stats: &SymptomSummary) -> f64 {
    if stats.total_symptoms == 0 {
        return 100.0;
    }

    let mut score = 100.0;
    score -= stats.total_symptoms as f64 * 2.0;
    score -= stats.average_severity * 5.0;
    if stats.total_symptoms > 10 {
        score -= 20.0;
    }

    clamp(score, 0.0, 100.0)
}

/// Nutrition score from daily calories and meal frequency
///
/// Calorie penalties only apply once calories have been logged at all.
pub fn meal_score(stats: &MealSummary) -> f64 {
    if stats.total_meals == 0 {
        return 100.0;
    }

    let mut score = 100.0;

    if stats.total_calories > 0 {
        let daily = stats.average_daily_calories;
        if daily > 2500.0 {
            score -= 15.0;
        } else if daily > 2000.0 {
            score -= 5.0;
        } else if daily < 1200.0 {
            score -= 20.0;
        }
    }

    let per_day = stats.average_per_day;
    if (2.0..=4.5).contains(&per_day) {
        score += 10.0;
    } else if per_day < 2.0 {
        score -= 15.0;
    } else {
        score -= 10.0;
    }

    clamp(score, 0.0, 100.0)
}

/// Adherence-based score; only a user with no medications at all is perfect
pub fn medication_score(stats: &MedicationSummary) -> f64 {
    if stats.total_medications == 0 {
        return 100.0;
    }

    let mut score = 100.0;
    if stats.adherence_score < 0.8 {
        score -= 30.0;
    } else if stats.adherence_score < 0.9 {
        score -= 15.0;
    }

    clamp(score, 0.0, 100.0)
}

fn describe(component: &str, score: f64) -> &'static str {
    match component {
        "BowelHealth" if score > 75.0 => "Excellent bowel movement regularity and comfort",
        "BowelHealth" if score > 50.0 => "Good bowel health with room for improvement",
        "BowelHealth" => "Bowel health needs attention",
        "SymptomControl" if score > 75.0 => "Symptoms are well controlled",
        "SymptomControl" if score > 50.0 => "Symptoms are moderately controlled",
        "SymptomControl" => "Symptoms need better management",
        "Nutrition" if score > 75.0 => "Balanced and regular eating habits",
        "Nutrition" if score > 50.0 => "Reasonable nutrition with room for improvement",
        "Nutrition" => "Nutrition needs attention",
        _ if score > 75.0 => "Medication routine is well managed",
        _ if score > 50.0 => "Medication routine is mostly on track",
        _ => "Medication routine needs attention",
    }
}

/// Score factors sorted by impact, most positive first
pub fn score_factors(scores: &ComponentScores, trend: TrendDirection) -> Vec<ScoreFactor> {
    let mut factors: Vec<ScoreFactor> = scores
        .named()
        .iter()
        .map(|(name, score, weight)| ScoreFactor {
            name: (*name).to_string(),
            impact: round1(score - 50.0),
            weight: *weight,
            description: describe(name, *score).to_string(),
            trend,
        })
        .collect();

    factors.sort_by(|a, b| b.impact.total_cmp(&a.impact));
    factors
}

pub fn benchmarks() -> BTreeMap<String, f64> {
    BTreeMap::from([
        ("PopulationAverage".to_string(), 65.0),
        ("HealthyRange".to_string(), 75.0),
        ("OptimalRange".to_string(), 85.0),
    ])
}

/// Full health score from the four summaries
pub fn health_score(
    bowel: &BowelMovementSummary,
    meal: &MealSummary,
    symptom: &SymptomSummary,
    medication: &MedicationSummary,
    trend: TrendDirection,
    now: DateTime<Utc>,
) -> HealthScore {
    let scores = ComponentScores::from_summaries(bowel, meal, symptom, medication);

    HealthScore {
        overall_score: scores.overall(),
        component_scores: scores
            .named()
            .iter()
            .map(|(name, score, _)| ((*name).to_string(), round1(*score)))
            .collect(),
        trend,
        last_updated: now,
        factors: score_factors(&scores, trend),
        benchmarks: benchmarks(),
    }
}
