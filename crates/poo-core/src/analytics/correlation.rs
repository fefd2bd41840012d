//! Time-windowed correlation heuristics
//!
//! A meal "is followed by" an event when the nearest event strictly after
//! the meal lies within the correlation window. Strength is the fraction of
//! qualifying meals whose following event shows the outcome; confidence
//! grows with the number of qualifying meals. None of this is a statistical
//! test.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Timelike, Utc};

use super::aggregator::{is_ideal_bristol, is_large, is_spicy};
use super::stats::{clamp, fraction, mean, round1, round2, sample_confidence};
use super::trend::Timestamped;
use super::types::{Correlation, CorrelationAnalysis, MedicationEffect, TriggerEffect};
use crate::config::MAX_CORRELATION_WINDOW_HOURS;
use crate::models::{BowelMovement, Meal, Medication, Symptom};

/// Hour of day from which a meal counts as late
pub const LATE_EATING_HOUR: u32 = 20;

const TRIGGER_SYMPTOM_THRESHOLD: f64 = 0.15;
const TRIGGER_BOWEL_THRESHOLD: f64 = 0.2;

/// A meal property paired with an outcome on the following event
struct MealFactor<E> {
    factor: &'static str,
    outcome: &'static str,
    /// Plural noun for the description, e.g. "fiber-rich meals"
    label: &'static str,
    /// Outcome phrase for the description
    outcome_label: &'static str,
    applies: fn(&Meal) -> bool,
    hit: fn(&E) -> bool,
}

fn bowel_factors() -> Vec<MealFactor<BowelMovement>> {
    vec![
        MealFactor {
            factor: "High Fiber Meals",
            outcome: "Ideal Stool Consistency",
            label: "fiber-rich meals",
            outcome_label: "an ideal stool (Bristol 3-4)",
            applies: |m| m.fiber_rich,
            hit: |bm| is_ideal_bristol(bm.bristol_type),
        },
        MealFactor {
            factor: "Spicy Meals",
            outcome: "Painful Bowel Movement",
            label: "spicy meals",
            outcome_label: "a painful bowel movement",
            applies: is_spicy,
            hit: |bm| bm.pain >= 5,
        },
        MealFactor {
            factor: "Large Meals",
            outcome: "Low Satisfaction",
            label: "large meals",
            outcome_label: "an unsatisfying bowel movement",
            applies: is_large,
            hit: |bm| bm.satisfaction <= 4,
        },
    ]
}

fn symptom_factors() -> Vec<MealFactor<Symptom>> {
    vec![
        MealFactor {
            factor: "Spicy Meals",
            outcome: "Symptom Occurrence",
            label: "spicy meals",
            outcome_label: "a symptom",
            applies: is_spicy,
            hit: |_| true,
        },
        MealFactor {
            factor: "Dairy",
            outcome: "Symptom Occurrence",
            label: "dairy meals",
            outcome_label: "a symptom",
            applies: |m| m.dairy,
            hit: |_| true,
        },
        MealFactor {
            factor: "Gluten",
            outcome: "Symptom Occurrence",
            label: "gluten meals",
            outcome_label: "a symptom",
            applies: |m| m.gluten,
            hit: |_| true,
        },
    ]
}

fn late_eating(meal: &Meal) -> bool {
    meal.meal_time.hour() >= LATE_EATING_HOUR
}

/// Events sorted by time, for repeated "next event" lookups
struct Timeline<'a, E> {
    events: Vec<&'a E>,
    window: Duration,
}

impl<'a, E: Timestamped> Timeline<'a, E> {
    fn new(events: &'a [E], window: Duration) -> Self {
        let mut events: Vec<&E> = events.iter().collect();
        events.sort_by_key(|e| e.timestamp());
        Self { events, window }
    }

    /// Nearest event strictly after `at`, if within the window
    fn next_after(&self, at: DateTime<Utc>) -> Option<&'a E> {
        let idx = self.events.partition_point(|e| e.timestamp() <= at);
        self.events
            .get(idx)
            .copied()
            .filter(|e| e.timestamp() - at <= self.window)
    }
}

/// Correlation and effect analysis over one user's records
#[derive(Debug, Clone, Copy)]
pub struct CorrelationAnalyzer {
    window: Duration,
}

impl CorrelationAnalyzer {
    pub fn new(window_hours: i64) -> Self {
        Self {
            window: Duration::hours(window_hours.clamp(1, MAX_CORRELATION_WINDOW_HOURS)),
        }
    }

    pub fn window_hours(&self) -> i64 {
        self.window.num_hours()
    }

    fn correlate<E: Timestamped>(
        &self,
        meals: &[Meal],
        events: &[E],
        factors: &[MealFactor<E>],
    ) -> Vec<Correlation> {
        let timeline = Timeline::new(events, self.window);

        factors
            .iter()
            .filter_map(|f| {
                let samples: Vec<&Meal> = meals.iter().filter(|m| (f.applies)(*m)).collect();
                if samples.is_empty() {
                    return None;
                }
                let hits = samples
                    .iter()
                    .filter(|m| timeline.next_after(m.meal_time).map_or(false, f.hit))
                    .count();

                Some(Correlation {
                    factor: f.factor.to_string(),
                    outcome: f.outcome.to_string(),
                    strength: round2(fraction(hits, samples.len())),
                    confidence: sample_confidence(samples.len()),
                    description: format!(
                        "{} of {} {} were followed by {} within {}h",
                        hits,
                        samples.len(),
                        f.label,
                        f.outcome_label,
                        self.window_hours()
                    ),
                    sample_size: samples.len(),
                })
            })
            .collect()
    }

    /// Meal properties against the next bowel movement
    pub fn meal_bowel_correlations(
        &self,
        meals: &[Meal],
        movements: &[BowelMovement],
    ) -> Vec<Correlation> {
        self.correlate(meals, movements, &bowel_factors())
    }

    /// Meal properties against the next symptom
    pub fn meal_symptom_correlations(
        &self,
        meals: &[Meal],
        symptoms: &[Symptom],
    ) -> Vec<Correlation> {
        self.correlate(meals, symptoms, &symptom_factors())
    }

    /// Before/after comparison around each medication's first start date
    ///
    /// Medications sharing a name are treated as one course. Medications
    /// without a start date are skipped.
    pub fn medication_effectiveness(
        &self,
        medications: &[Medication],
        symptoms: &[Symptom],
        movements: &[BowelMovement],
    ) -> Vec<MedicationEffect> {
        // name -> earliest start, in first-seen order
        let mut courses: Vec<(String, DateTime<Utc>)> = Vec::new();
        for med in medications {
            let Some(start) = med.start_date else {
                continue;
            };
            let name = med.name.trim();
            match courses
                .iter_mut()
                .find(|(n, _)| n.eq_ignore_ascii_case(name))
            {
                Some((_, earliest)) => *earliest = (*earliest).min(start),
                None => courses.push((name.to_string(), start)),
            }
        }

        courses
            .into_iter()
            .map(|(name, start)| medication_effect(name, start, symptoms, movements))
            .collect()
    }

    /// Meal traits whose meals are followed by more trouble than meals overall
    pub fn trigger_analysis(
        &self,
        meals: &[Meal],
        symptoms: &[Symptom],
        movements: &[BowelMovement],
    ) -> Vec<TriggerEffect> {
        if meals.is_empty() {
            return Vec::new();
        }

        let symptom_timeline = Timeline::new(symptoms, self.window);
        let bowel_timeline = Timeline::new(movements, self.window);

        let all: Vec<&Meal> = meals.iter().collect();
        let baseline_rate = symptom_rate(&all, &symptom_timeline);
        let baseline_load = bowel_load(&all, &bowel_timeline);

        let triggers: [(&str, fn(&Meal) -> bool); 5] = [
            ("dairy", |m| m.dairy),
            ("gluten", |m| m.gluten),
            ("spicy food", is_spicy),
            ("high calorie", is_large),
            ("late eating", late_eating),
        ];

        let mut effects: Vec<TriggerEffect> = triggers
            .iter()
            .filter_map(|(name, applies)| {
                let subset: Vec<&Meal> = meals.iter().filter(|m| applies(*m)).collect();
                if subset.is_empty() {
                    return None;
                }

                let symptom_increase = symptom_rate(&subset, &symptom_timeline) - baseline_rate;
                let bowel_impact = match (bowel_load(&subset, &bowel_timeline), baseline_load) {
                    (Some(load), Some(base)) => load - base,
                    _ => 0.0,
                };

                if symptom_increase <= TRIGGER_SYMPTOM_THRESHOLD
                    && bowel_impact.abs() <= TRIGGER_BOWEL_THRESHOLD
                {
                    return None;
                }

                Some(TriggerEffect {
                    trigger: (*name).to_string(),
                    symptom_increase: round2(symptom_increase),
                    bowel_impact: round2(bowel_impact),
                    frequency: subset.len(),
                    severity: round2(
                        0.6 * symptom_increase.max(0.0) + 0.4 * bowel_impact.abs(),
                    ),
                })
            })
            .collect();

        effects.sort_by(|a, b| b.severity.total_cmp(&a.severity));
        effects
    }

    /// All four correlation outputs
    pub fn analyze(
        &self,
        meals: &[Meal],
        symptoms: &[Symptom],
        movements: &[BowelMovement],
        medications: &[Medication],
    ) -> CorrelationAnalysis {
        CorrelationAnalysis {
            meal_bowel_correlations: self.meal_bowel_correlations(meals, movements),
            meal_symptom_correlations: self.meal_symptom_correlations(meals, symptoms),
            medication_effectiveness: self.medication_effectiveness(
                medications,
                symptoms,
                movements,
            ),
            trigger_analysis: self.trigger_analysis(meals, symptoms, movements),
        }
    }
}

/// Fraction of meals followed by any symptom
fn symptom_rate(meals: &[&Meal], symptoms: &Timeline<'_, Symptom>) -> f64 {
    let followed = meals
        .iter()
        .filter(|m| symptoms.next_after(m.meal_time).is_some())
        .count();
    fraction(followed, meals.len())
}

/// Mean normalised discomfort (pain + strain, 0-1) of the next movement
fn bowel_load(meals: &[&Meal], movements: &Timeline<'_, BowelMovement>) -> Option<f64> {
    let loads: Vec<f64> = meals
        .iter()
        .filter_map(|m| movements.next_after(m.meal_time))
        .map(|bm| (f64::from(bm.pain) + f64::from(bm.strain) - 2.0) / 18.0)
        .collect();
    if loads.is_empty() {
        None
    } else {
        Some(mean(loads))
    }
}

/// Percent drop from `before` to `after`, if both exist and before is nonzero
fn percent_drop(before: &[f64], after: &[f64]) -> Option<f64> {
    if before.is_empty() || after.is_empty() {
        return None;
    }
    let b = mean(before.iter().copied());
    let a = mean(after.iter().copied());
    if b == 0.0 {
        None
    } else {
        Some(round1((b - a) / b * 100.0))
    }
}

fn medication_effect(
    name: String,
    start: DateTime<Utc>,
    symptoms: &[Symptom],
    movements: &[BowelMovement],
) -> MedicationEffect {
    let (before_sym, after_sym): (Vec<&Symptom>, Vec<&Symptom>) =
        symptoms.iter().partition(|s| s.recorded_at < start);
    let (before_bm, after_bm): (Vec<&BowelMovement>, Vec<&BowelMovement>) =
        movements.iter().partition(|m| m.recorded_at < start);

    let severities = |list: &[&Symptom]| -> Vec<f64> {
        list.iter().map(|s| f64::from(s.severity)).collect()
    };

    let mut symptom_improvement = BTreeMap::new();

    // Per type, in first-seen order of the types present before the start
    let mut types = Vec::new();
    for s in &before_sym {
        if let Some(t) = s.symptom_type {
            if !types.contains(&t) {
                types.push(t);
            }
        }
    }
    for t in types {
        let before: Vec<f64> = before_sym
            .iter()
            .filter(|s| s.symptom_type == Some(t))
            .map(|s| f64::from(s.severity))
            .collect();
        let after: Vec<f64> = after_sym
            .iter()
            .filter(|s| s.symptom_type == Some(t))
            .map(|s| f64::from(s.severity))
            .collect();
        if let Some(drop) = percent_drop(&before, &after) {
            symptom_improvement.insert(t.as_str().to_string(), drop);
        }
    }

    let overall = percent_drop(&severities(&before_sym), &severities(&after_sym)).unwrap_or(0.0);
    symptom_improvement.insert("overall".to_string(), overall);

    let comfort = |list: &[&BowelMovement]| -> f64 {
        mean(list.iter().map(|m| {
            f64::from(m.satisfaction) - f64::from(m.pain) - f64::from(m.strain)
        }))
    };
    let bowel_improvement = if before_bm.is_empty() || after_bm.is_empty() {
        0.0
    } else {
        round1(comfort(&after_bm) - comfort(&before_bm))
    };

    let paired = before_sym.len().min(after_sym.len()) + before_bm.len().min(after_bm.len());

    MedicationEffect {
        medication_name: name,
        symptom_improvement,
        bowel_improvement,
        effectiveness_score: round1(clamp(
            50.0 + overall * 0.3 + bowel_improvement * 0.2,
            0.0,
            100.0,
        )),
        confidence: sample_confidence(paired),
        sample_size: symptoms.len() + movements.len(),
    }
}
