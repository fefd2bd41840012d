//! Small numeric helpers shared by the analyzers

use chrono::{DateTime, Timelike, Utc};

/// Round to `places` decimal places, mapping NaN/inf to 0
pub fn round_to(value: f64, places: i32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

pub fn round1(value: f64) -> f64 {
    round_to(value, 1)
}

pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

/// Clamp into `[min, max]`, mapping NaN to `min`
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return min;
    }
    value.clamp(min, max)
}

pub fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut n = 0usize;
    for v in values {
        sum += v;
        n += 1;
    }
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// `matching / total * 100`, one decimal, 0 for an empty total
pub fn percent(matching: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    clamp(round1(matching as f64 / total as f64 * 100.0), 0.0, 100.0)
}

/// `matching / total` as a fraction, 0 for an empty total
pub fn fraction(matching: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        matching as f64 / total as f64
    }
}

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Days in `[start, end]` with a partial day counted as whole, never below 1
pub fn window_days(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let millis = (end - start).num_milliseconds();
    if millis <= 0 {
        return 1;
    }
    (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
}

/// Confidence in a heuristic given how many observations back it
pub fn sample_confidence(sample_size: usize) -> f64 {
    match sample_size {
        0 => 0.0,
        n if n >= 100 => 0.95,
        n if n >= 50 => 0.85,
        n if n >= 30 => 0.75,
        n if n >= 20 => 0.65,
        n if n >= 10 => 0.55,
        _ => 0.3,
    }
}

/// Least-squares slope of `values` against their index
pub fn linear_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let x_mean = (n as f64 - 1.0) / 2.0;
    let y_mean = mean(values.iter().copied());

    let mut num = 0.0;
    let mut den = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        num += dx * (y - y_mean);
        den += dx * dx;
    }
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// Frequency counter whose mode breaks ties by first occurrence
#[derive(Debug, Clone)]
pub struct ModeCounter<T> {
    counts: Vec<(T, usize)>,
}

impl<T: PartialEq + Clone> Default for ModeCounter<T> {
    fn default() -> Self {
        Self { counts: Vec::new() }
    }
}

impl<T: PartialEq + Clone> ModeCounter<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: T) {
        match self.counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, count)) => *count += 1,
            None => self.counts.push((value, 1)),
        }
    }

    /// Most frequent value; earliest-seen wins a tie
    pub fn mode(&self) -> Option<T> {
        let mut best: Option<&(T, usize)> = None;
        for entry in &self.counts {
            if best.map_or(true, |b| entry.1 > b.1) {
                best = Some(entry);
            }
        }
        best.map(|(v, _)| v.clone())
    }

    /// Values with their counts, in first-seen order
    pub fn counts(&self) -> &[(T, usize)] {
        &self.counts
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, c)| c).sum()
    }
}

/// Part of the day an event falls in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSlot {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeSlot {
    /// Morning 06-12, afternoon 12-17, evening 17-22, night otherwise
    pub fn of(at: &DateTime<Utc>) -> Self {
        match at.hour() {
            6..=11 => TimeSlot::Morning,
            12..=16 => TimeSlot::Afternoon,
            17..=21 => TimeSlot::Evening,
            _ => TimeSlot::Night,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeSlot::Morning => "morning",
            TimeSlot::Afternoon => "afternoon",
            TimeSlot::Evening => "evening",
            TimeSlot::Night => "night",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_rounding() {
        assert_eq!(round1(33.333), 33.3);
        assert_eq!(round1(66.66), 66.7);
        assert_eq!(round2(0.98765), 0.99);
        assert_eq!(round1(f64::NAN), 0.0);
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(2, 5), 40.0);
        assert_eq!(percent(1, 3), 33.3);
        assert_eq!(percent(0, 0), 0.0);
    }

    #[test]
    fn test_window_days_floor_of_one() {
        let t = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(window_days(t, t), 1);
        assert_eq!(window_days(t, t + chrono::Duration::hours(5)), 1);
        assert_eq!(window_days(t, t + chrono::Duration::days(10)), 10);
        assert_eq!(window_days(t + chrono::Duration::days(1), t), 1);
    }

    #[test]
    fn test_window_days_counts_date_only_end_as_whole_day() {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 3, 7, 23, 59, 59).unwrap()
            + chrono::Duration::milliseconds(999);
        assert_eq!(window_days(start, end), 7);
        assert_eq!(window_days(start, start + chrono::Duration::hours(36)), 2);
    }

    #[test]
    fn test_sample_confidence_table() {
        assert_eq!(sample_confidence(0), 0.0);
        assert_eq!(sample_confidence(9), 0.3);
        assert_eq!(sample_confidence(10), 0.55);
        assert_eq!(sample_confidence(25), 0.65);
        assert_eq!(sample_confidence(30), 0.75);
        assert_eq!(sample_confidence(60), 0.85);
        assert_eq!(sample_confidence(5000), 0.95);
    }

    #[test]
    fn test_mode_first_seen_wins_ties() {
        let mut counter = ModeCounter::new();
        for v in [5, 3, 3, 5, 1] {
            counter.add(v);
        }
        assert_eq!(counter.mode(), Some(5));
        assert_eq!(counter.total(), 5);

        counter.add(3);
        assert_eq!(counter.mode(), Some(3));

        let empty: ModeCounter<u8> = ModeCounter::new();
        assert_eq!(empty.mode(), None);
    }

    #[test]
    fn test_linear_slope() {
        assert_eq!(linear_slope(&[1.0, 2.0, 3.0, 4.0]), 1.0);
        assert_eq!(linear_slope(&[4.0, 4.0, 4.0]), 0.0);
        assert_eq!(linear_slope(&[7.0]), 0.0);
        assert!(linear_slope(&[8.0, 8.0, 8.0, 2.0, 2.0, 2.0]) < 0.0);
    }

    #[test]
    fn test_time_slots() {
        let at = |h| Utc.with_ymd_and_hms(2025, 1, 1, h, 0, 0).unwrap();
        assert_eq!(TimeSlot::of(&at(6)), TimeSlot::Morning);
        assert_eq!(TimeSlot::of(&at(12)), TimeSlot::Afternoon);
        assert_eq!(TimeSlot::of(&at(21)), TimeSlot::Evening);
        assert_eq!(TimeSlot::of(&at(22)), TimeSlot::Night);
        assert_eq!(TimeSlot::of(&at(3)), TimeSlot::Night);
    }
}
