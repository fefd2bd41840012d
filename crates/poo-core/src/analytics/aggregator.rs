//! Reduces raw records of one category into a summary
//!
//! Every function here is total: an empty slice yields a zero-valued
//! summary (regularity stays neutral), and a window of zero days is
//! treated as one.

use chrono::{DateTime, Utc};

use super::stats::{mean, percent, ModeCounter};
use super::trend::{meal_health_proxy, regularity_score, trend_all, NEUTRAL_REGULARITY};
use super::types::{BowelMovementSummary, MealSummary, MedicationSummary, SymptomSummary};
use crate::models::{BowelMovement, Meal, Medication, Symptom};

/// Spicy level above which a meal counts as spicy
pub const SPICY_THRESHOLD: u8 = 2;

/// Calories above which a meal counts as large
pub const LARGE_MEAL_CALORIES: u32 = 800;

/// Calories below which a fiber-rich meal counts as healthy
pub const HEALTHY_MAX_CALORIES: u32 = 600;

fn divisor(window_days: i64) -> f64 {
    window_days.max(1) as f64
}

pub fn is_spicy(meal: &Meal) -> bool {
    meal.spicy_level.map_or(false, |l| l > SPICY_THRESHOLD)
}

pub fn is_large(meal: &Meal) -> bool {
    meal.calories > LARGE_MEAL_CALORIES
}

pub fn is_ideal_bristol(bristol_type: u8) -> bool {
    (3..=4).contains(&bristol_type)
}

pub fn summarize_bowel_movements(
    movements: &[BowelMovement],
    window_days: i64,
) -> BowelMovementSummary {
    if movements.is_empty() {
        return BowelMovementSummary {
            regularity_score: NEUTRAL_REGULARITY,
            ..Default::default()
        };
    }

    let mut bristol = ModeCounter::new();
    for m in movements {
        bristol.add(m.bristol_type);
    }

    let ideal = movements
        .iter()
        .filter(|m| is_ideal_bristol(m.bristol_type))
        .count();

    BowelMovementSummary {
        total_count: movements.len() as u64,
        average_per_day: movements.len() as f64 / divisor(window_days),
        most_common_bristol: bristol.mode().unwrap_or(0),
        average_pain: mean(movements.iter().map(|m| f64::from(m.pain))),
        average_strain: mean(movements.iter().map(|m| f64::from(m.strain))),
        average_satisfaction: mean(movements.iter().map(|m| f64::from(m.satisfaction))),
        regularity_score: regularity_score(movements),
        ideal_bristol_percent: percent(ideal, movements.len()),
    }
}

pub fn summarize_meals(meals: &[Meal], window_days: i64) -> MealSummary {
    if meals.is_empty() {
        return MealSummary::default();
    }

    let total = meals.len();
    let total_calories: u64 = meals.iter().map(|m| u64::from(m.calories)).sum();
    let count = |pred: fn(&Meal) -> bool| meals.iter().filter(|m| pred(*m)).count();

    let mut categories = ModeCounter::new();
    for category in meals.iter().filter_map(|m| m.category) {
        categories.add(category);
    }

    MealSummary {
        total_meals: total as u64,
        average_per_day: total as f64 / divisor(window_days),
        total_calories,
        average_calories: total_calories as f64 / total as f64,
        average_daily_calories: total_calories as f64 / divisor(window_days),
        fiber_rich_percent: percent(count(|m| m.fiber_rich), total),
        dairy_percent: percent(count(|m| m.dairy), total),
        gluten_percent: percent(count(|m| m.gluten), total),
        spicy_percent: percent(count(is_spicy), total),
        healthy_meal_percent: percent(
            count(|m| m.fiber_rich && m.calories > 0 && m.calories < HEALTHY_MAX_CALORIES),
            total,
        ),
        most_common_category: categories.mode(),
        health_score: mean(meals.iter().map(meal_health_proxy)),
    }
}

pub fn summarize_symptoms(symptoms: &[Symptom], window_days: i64) -> SymptomSummary {
    if symptoms.is_empty() {
        return SymptomSummary::default();
    }

    let mut categories = ModeCounter::new();
    let mut types = ModeCounter::new();
    for s in symptoms {
        if let Some(category) = s.category {
            categories.add(category);
        }
        if let Some(symptom_type) = s.symptom_type {
            types.add(symptom_type);
        }
    }

    SymptomSummary {
        total_symptoms: symptoms.len() as u64,
        average_per_day: symptoms.len() as f64 / divisor(window_days),
        average_severity: mean(symptoms.iter().map(|s| f64::from(s.severity))),
        most_common_category: categories.mode(),
        most_common_type: types.mode(),
        trend_direction: trend_all(symptoms).direction,
    }
}

/// Summarize medications as of `now`
///
/// A medication is active when flagged so and not past its end date.
pub fn summarize_medications(medications: &[Medication], now: DateTime<Utc>) -> MedicationSummary {
    if medications.is_empty() {
        return MedicationSummary::default();
    }

    let active = medications.iter().filter(|m| m.is_current(now)).count();

    let mut categories = ModeCounter::new();
    for category in medications.iter().filter_map(|m| m.category) {
        categories.add(category);
    }

    MedicationSummary {
        total_medications: medications.len() as u64,
        active_medications: active as u64,
        adherence_score: active as f64 / medications.len() as f64,
        most_common_category: categories.mode(),
        complexity_score: complexity_score(medications.len()),
    }
}

/// Regimen complexity by number of medications
pub fn complexity_score(count: usize) -> f64 {
    match count {
        0 => 0.0,
        1..=2 => 25.0,
        3..=5 => 50.0,
        6..=10 => 75.0,
        _ => 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::types::TrendDirection;
    use crate::models::{MealCategory, MedicationCategory, SymptomCategory, SymptomType};
    use crate::test_utils::{bowel, bowel_at, meal_at, medication, symptom_at, t0};
    use chrono::Duration;

    #[test]
    fn test_empty_inputs_are_zero_summaries() {
        let bm = summarize_bowel_movements(&[], 7);
        assert_eq!(bm.total_count, 0);
        assert_eq!(bm.average_per_day, 0.0);
        assert_eq!(bm.average_pain, 0.0);
        assert_eq!(bm.regularity_score, NEUTRAL_REGULARITY);

        let meals = summarize_meals(&[], 0);
        assert_eq!(meals.total_meals, 0);
        assert_eq!(meals.fiber_rich_percent, 0.0);

        assert_eq!(summarize_symptoms(&[], 0).average_severity, 0.0);
        assert_eq!(summarize_medications(&[], t0()).adherence_score, 0.0);
    }

    #[test]
    fn test_regularity_is_neutral_for_zero_or_one_movement() {
        let none = summarize_bowel_movements(&[], 7);
        let one = summarize_bowel_movements(&[bowel_at(t0(), 4)], 7);
        assert_eq!(none.regularity_score, one.regularity_score);
        assert_eq!(one.regularity_score, NEUTRAL_REGULARITY);
    }

    #[test]
    fn test_zero_or_negative_window_uses_one_day() {
        let movements = vec![bowel_at(t0(), 4), bowel_at(t0() + Duration::hours(3), 4)];
        assert_eq!(summarize_bowel_movements(&movements, 0).average_per_day, 2.0);
        assert_eq!(summarize_bowel_movements(&movements, -5).average_per_day, 2.0);
    }

    #[test]
    fn test_average_per_day_is_exact() {
        let movements: Vec<_> = (0..7)
            .map(|i| bowel_at(t0() + Duration::hours(i * 30), 4))
            .collect();
        let summary = summarize_bowel_movements(&movements, 3);
        assert_eq!(summary.average_per_day, 7.0 / 3.0);
    }

    #[test]
    fn test_bowel_summary_values() {
        let movements = vec![
            bowel(t0(), 2, 6, 7, 3),
            bowel(t0() + Duration::hours(24), 4, 2, 1, 8),
            bowel(t0() + Duration::hours(48), 4, 1, 1, 9),
            bowel(t0() + Duration::hours(72), 2, 3, 3, 6),
        ];
        let summary = summarize_bowel_movements(&movements, 4);
        assert_eq!(summary.total_count, 4);
        // 2 and 4 tie; 2 was seen first
        assert_eq!(summary.most_common_bristol, 2);
        assert_eq!(summary.average_pain, 3.0);
        assert_eq!(summary.average_strain, 3.0);
        assert_eq!(summary.average_satisfaction, 6.5);
        assert_eq!(summary.ideal_bristol_percent, 50.0);
        assert_eq!(summary.regularity_score, 1.0);
    }

    #[test]
    fn test_fiber_rich_percent() {
        let meals: Vec<_> = (0..5)
            .map(|i| meal_at(t0() + Duration::hours(i * 5), 500, i < 2))
            .collect();
        let summary = summarize_meals(&meals, 1);
        assert_eq!(summary.fiber_rich_percent, 40.0);
        assert_eq!(summary.healthy_meal_percent, 40.0);
    }

    #[test]
    fn test_meal_summary_flags_and_calories() {
        let mut meals = vec![
            meal_at(t0(), 900, false),
            meal_at(t0() + Duration::hours(5), 300, true),
            meal_at(t0() + Duration::hours(10), 600, false),
        ];
        meals[0].dairy = true;
        meals[0].spicy_level = Some(7);
        meals[1].spicy_level = Some(2);
        meals[2].gluten = true;
        meals[0].category = Some(MealCategory::Dinner);
        meals[1].category = Some(MealCategory::Breakfast);
        meals[2].category = Some(MealCategory::Breakfast);

        let summary = summarize_meals(&meals, 2);
        assert_eq!(summary.total_calories, 1800);
        assert_eq!(summary.average_calories, 600.0);
        assert_eq!(summary.average_daily_calories, 900.0);
        assert_eq!(summary.average_per_day, 1.5);
        assert_eq!(summary.dairy_percent, 33.3);
        assert_eq!(summary.gluten_percent, 33.3);
        assert_eq!(summary.spicy_percent, 33.3);
        assert_eq!(summary.most_common_category, Some(MealCategory::Breakfast));
        // 50 / 85 / 65
        assert_eq!(summary.health_score, 200.0 / 3.0);
    }

    #[test]
    fn test_symptom_summary_modes_and_trend() {
        let mut symptoms: Vec<_> = [8, 8, 8, 2, 2, 2]
            .iter()
            .enumerate()
            .map(|(i, sev)| symptom_at(t0() + Duration::days(i as i64), *sev))
            .collect();
        symptoms[0].symptom_type = Some(SymptomType::Gas);
        symptoms[1].symptom_type = Some(SymptomType::Cramps);
        symptoms[2].symptom_type = Some(SymptomType::Cramps);
        symptoms[3].symptom_type = Some(SymptomType::Gas);
        symptoms[4].category = Some(SymptomCategory::Abdominal);

        let summary = summarize_symptoms(&symptoms, 6);
        assert_eq!(summary.total_symptoms, 6);
        assert_eq!(summary.average_severity, 5.0);
        assert_eq!(summary.average_per_day, 1.0);
        assert_eq!(summary.most_common_type, Some(SymptomType::Gas));
        assert_eq!(summary.most_common_category, Some(SymptomCategory::Digestive));
        assert_eq!(summary.trend_direction, TrendDirection::Improving);
    }

    #[test]
    fn test_medication_summary() {
        let now = t0();
        let mut meds = vec![
            medication("Psyllium", now - Duration::days(20)),
            medication("Loperamide", now - Duration::days(10)),
            medication("Omeprazole", now - Duration::days(5)),
        ];
        meds[1].end_date = Some(now - Duration::days(1));
        meds[2].is_active = false;
        meds[2].category = Some(MedicationCategory::Gastrointestinal);

        let summary = summarize_medications(&meds, now);
        assert_eq!(summary.total_medications, 3);
        assert_eq!(summary.active_medications, 1);
        assert!((summary.adherence_score - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.complexity_score, 50.0);
        assert_eq!(
            summary.most_common_category,
            Some(MedicationCategory::Supplements)
        );
    }

    #[test]
    fn test_complexity_bands() {
        assert_eq!(complexity_score(0), 0.0);
        assert_eq!(complexity_score(2), 25.0);
        assert_eq!(complexity_score(5), 50.0);
        assert_eq!(complexity_score(10), 75.0);
        assert_eq!(complexity_score(11), 100.0);
    }
}
