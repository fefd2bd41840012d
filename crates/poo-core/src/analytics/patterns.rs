//! Behavior patterns: when things happen and how they are distributed

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use super::aggregator::is_large;
use super::stats::{clamp, fraction, mean, round1, round2, ModeCounter, TimeSlot};
use super::trend::{regularity_score, Timestamped, NEUTRAL_REGULARITY};
use super::types::{BehaviorPatterns, BowelPattern, EatingPattern, SymptomPattern};
use crate::models::{BowelMovement, Meal, Symptom};

/// Meals under this many calories are small
const SMALL_MEAL_CALORIES: u32 = 400;

/// Fraction of records per time slot, every slot present
fn timing_distribution<T: Timestamped>(records: &[T]) -> BTreeMap<String, f64> {
    let mut slots = BTreeMap::new();
    for slot in [
        TimeSlot::Morning,
        TimeSlot::Afternoon,
        TimeSlot::Evening,
        TimeSlot::Night,
    ] {
        let n = records
            .iter()
            .filter(|r| TimeSlot::of(&r.timestamp()) == slot)
            .count();
        slots.insert(slot.as_str().to_string(), round2(fraction(n, records.len())));
    }
    slots
}

fn distribution(counter: &ModeCounter<String>) -> BTreeMap<String, f64> {
    let total = counter.total();
    counter
        .counts()
        .iter()
        .map(|(k, n)| (k.clone(), round2(fraction(*n, total))))
        .collect()
}

/// 1 minus the coefficient of variation of meals per logged day
fn dietary_consistency(meals: &[Meal]) -> f64 {
    if meals.is_empty() {
        return 0.0;
    }
    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for meal in meals {
        *per_day.entry(meal.meal_time.date_naive()).or_default() += 1;
    }

    let counts: Vec<f64> = per_day.values().map(|n| *n as f64).collect();
    let avg = mean(counts.iter().copied());
    let variance = mean(counts.iter().map(|c| (c - avg).powi(2)));
    let cv = variance.sqrt() / avg;

    round2(clamp(1.0 - cv, 0.0, 1.0))
}

pub fn eating_pattern(meals: &[Meal]) -> EatingPattern {
    if meals.is_empty() {
        return EatingPattern::default();
    }

    let small = meals
        .iter()
        .filter(|m| m.calories < SMALL_MEAL_CALORIES)
        .count();
    let large = meals.iter().filter(|m| is_large(m)).count();
    let medium = meals.len() - small - large;

    let mut categories = ModeCounter::new();
    for category in meals.iter().filter_map(|m| m.category) {
        categories.add(category.as_str().to_string());
    }

    EatingPattern {
        meal_timing: timing_distribution(meals),
        meal_size_distribution: BTreeMap::from([
            ("small".to_string(), round2(fraction(small, meals.len()))),
            ("medium".to_string(), round2(fraction(medium, meals.len()))),
            ("large".to_string(), round2(fraction(large, meals.len()))),
        ]),
        category_distribution: distribution(&categories),
        dietary_consistency: dietary_consistency(meals),
    }
}

/// Bowel pattern, with meal response measured inside `window`
pub fn bowel_pattern(movements: &[BowelMovement], meals: &[Meal], window: Duration) -> BowelPattern {
    if movements.is_empty() {
        return BowelPattern {
            regularity_score: NEUTRAL_REGULARITY,
            ..Default::default()
        };
    }

    let mut bristol = ModeCounter::new();
    for m in movements {
        bristol.add(format!("type_{}", m.bristol_type));
    }

    let mut sorted: Vec<&BowelMovement> = movements.iter().collect();
    sorted.sort_by_key(|m| m.recorded_at);

    let gaps: Vec<f64> = meals
        .iter()
        .filter_map(|meal| {
            let idx = sorted.partition_point(|m| m.recorded_at <= meal.meal_time);
            sorted.get(idx).map(|m| m.recorded_at - meal.meal_time)
        })
        .filter(|gap| *gap <= window)
        .map(|gap| gap.num_minutes() as f64 / 60.0)
        .collect();

    BowelPattern {
        preferred_timing: timing_distribution(movements),
        regularity_score: regularity_score(movements),
        consistency_patterns: distribution(&bristol),
        response_to_meals: if gaps.is_empty() {
            None
        } else {
            Some(round1(mean(gaps)))
        },
    }
}

pub fn symptom_pattern(symptoms: &[Symptom]) -> SymptomPattern {
    if symptoms.is_empty() {
        return SymptomPattern::default();
    }

    // Fraction of symptoms naming each trigger
    let mut triggers: ModeCounter<String> = ModeCounter::new();
    for s in symptoms {
        for t in s.triggers.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
            triggers.add(t.to_lowercase());
        }
    }
    let trigger_patterns = triggers
        .counts()
        .iter()
        .map(|(t, n)| (t.clone(), round2(fraction(*n, symptoms.len()))))
        .collect();

    let mut types = ModeCounter::new();
    for t in symptoms.iter().filter_map(|s| s.symptom_type) {
        types.add(t.as_str().to_string());
    }

    SymptomPattern {
        symptom_timing: timing_distribution(symptoms),
        trigger_patterns,
        type_distribution: distribution(&types),
    }
}

pub fn behavior_patterns(
    movements: &[BowelMovement],
    meals: &[Meal],
    symptoms: &[Symptom],
    window: Duration,
) -> BehaviorPatterns {
    BehaviorPatterns {
        eating_patterns: eating_pattern(meals),
        bowel_patterns: bowel_pattern(movements, meals, window),
        symptom_patterns: symptom_pattern(symptoms),
    }
}
