//! Trend analysis over time-ordered records
//!
//! Records are sorted chronologically and split into halves; the mean of a
//! per-record metric is compared between the halves. A change larger than
//! the metric's threshold in the better direction is IMPROVING, in the worse
//! direction DECLINING, anything else STABLE.

use chrono::{DateTime, Utc};

use super::stats::{clamp, linear_slope, mean, round2, sample_confidence};
use super::types::{DataTrend, TrendAnalysis, TrendDirection};
use crate::models::{BowelMovement, Meal, Symptom};

/// Ideal cadence between bowel movements, in hours
const IDEAL_INTERVAL_HOURS: f64 = 24.0;

/// Regularity returned when there are too few movements to measure
pub const NEUTRAL_REGULARITY: f64 = 0.5;

/// A record with a point in time
pub trait Timestamped {
    fn timestamp(&self) -> DateTime<Utc>;
}

impl Timestamped for BowelMovement {
    fn timestamp(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

impl Timestamped for Meal {
    fn timestamp(&self) -> DateTime<Utc> {
        self.meal_time
    }
}

impl Timestamped for Symptom {
    fn timestamp(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

/// A record that can be placed on a trend line
pub trait TrendMetric: Timestamped {
    /// Whether a rising metric is good news
    const HIGHER_IS_BETTER: bool;
    /// Minimum change in half-means that counts as movement
    const THRESHOLD: f64;

    fn metric(&self) -> f64;
}

impl TrendMetric for Symptom {
    const HIGHER_IS_BETTER: bool = false;
    const THRESHOLD: f64 = 0.5;

    fn metric(&self) -> f64 {
        f64::from(self.severity)
    }
}

impl TrendMetric for BowelMovement {
    const HIGHER_IS_BETTER: bool = false;
    const THRESHOLD: f64 = 0.5;

    /// Distance from the ideal Bristol midpoint
    fn metric(&self) -> f64 {
        (f64::from(self.bristol_type) - 3.5).abs()
    }
}

impl TrendMetric for Meal {
    const HIGHER_IS_BETTER: bool = true;
    const THRESHOLD: f64 = 5.0;

    fn metric(&self) -> f64 {
        meal_health_proxy(self)
    }
}

/// Per-meal health proxy: 50 base, +20 fiber rich, +15 for 100-800 kcal
pub fn meal_health_proxy(meal: &Meal) -> f64 {
    let mut score = 50.0;
    if meal.fiber_rich {
        score += 20.0;
    }
    if meal.calories > 100 && meal.calories < 800 {
        score += 15.0;
    }
    score
}

/// Trend of the records falling inside `[start, end]`
pub fn trend<T: TrendMetric>(records: &[T], start: DateTime<Utc>, end: DateTime<Utc>) -> DataTrend {
    let mut points: Vec<(DateTime<Utc>, f64)> = records
        .iter()
        .filter(|r| r.timestamp() >= start && r.timestamp() <= end)
        .map(|r| (r.timestamp(), r.metric()))
        .collect();
    // Stable sort keeps insertion order for identical timestamps
    points.sort_by_key(|(t, _)| *t);

    let values: Vec<f64> = points.iter().map(|(_, v)| *v).collect();
    let direction = direction_of::<T>(&values);

    DataTrend {
        direction,
        slope: round2(linear_slope(&values)),
        confidence: sample_confidence(values.len()),
        sample_size: values.len(),
        time_points: points.into_iter().map(|(t, _)| t).collect(),
        values,
    }
}

/// Trend over every record, whatever its timestamp
pub fn trend_all<T: TrendMetric>(records: &[T]) -> DataTrend {
    trend(records, DateTime::<Utc>::MIN_UTC, DateTime::<Utc>::MAX_UTC)
}

fn direction_of<T: TrendMetric>(values: &[f64]) -> TrendDirection {
    if values.len() < 2 {
        return TrendDirection::Stable;
    }
    let mid = values.len() / 2;
    let first = mean(values[..mid].iter().copied());
    let second = mean(values[mid..].iter().copied());

    let improvement = if T::HIGHER_IS_BETTER {
        second - first
    } else {
        first - second
    };

    if improvement > T::THRESHOLD {
        TrendDirection::Improving
    } else if improvement < -T::THRESHOLD {
        TrendDirection::Declining
    } else {
        TrendDirection::Stable
    }
}

/// How close bowel movement cadence is to once every 24 hours, 0-1
///
/// Mean squared deviation of each interval from 24h, scaled so a mean
/// deviation of a whole day scores 0. Fewer than two movements is neutral.
pub fn regularity_score(movements: &[BowelMovement]) -> f64 {
    if movements.len() < 2 {
        return NEUTRAL_REGULARITY;
    }

    let mut times: Vec<DateTime<Utc>> = movements.iter().map(|m| m.recorded_at).collect();
    times.sort();

    let variance = mean(times.windows(2).map(|w| {
        let hours = (w[1] - w[0]).num_seconds() as f64 / 3600.0;
        (hours - IDEAL_INTERVAL_HOURS).powi(2)
    }));

    let score = 1.0 - variance / (IDEAL_INTERVAL_HOURS * IDEAL_INTERVAL_HOURS);
    round2(clamp(score, 0.0, 1.0))
}

/// Majority of improving vs declining; a tie is stable
pub fn overall_direction(directions: &[TrendDirection]) -> TrendDirection {
    let improving = directions
        .iter()
        .filter(|d| **d == TrendDirection::Improving)
        .count();
    let declining = directions
        .iter()
        .filter(|d| **d == TrendDirection::Declining)
        .count();

    match improving.cmp(&declining) {
        std::cmp::Ordering::Greater => TrendDirection::Improving,
        std::cmp::Ordering::Less => TrendDirection::Declining,
        std::cmp::Ordering::Equal => TrendDirection::Stable,
    }
}

/// Trends for all three record series within `[start, end]`
pub fn analyze_trends(
    movements: &[BowelMovement],
    meals: &[Meal],
    symptoms: &[Symptom],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> TrendAnalysis {
    let bowel_movement_trends = trend(movements, start, end);
    let symptom_trends = trend(symptoms, start, end);
    let meal_trends = trend(meals, start, end);

    let overall_trend = overall_direction(&[
        bowel_movement_trends.direction,
        symptom_trends.direction,
        meal_trends.direction,
    ]);

    TrendAnalysis {
        bowel_movement_trends,
        symptom_trends,
        meal_trends,
        overall_trend,
    }
}
