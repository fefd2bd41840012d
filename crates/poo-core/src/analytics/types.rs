//! Output types for the analytics engine
//!
//! Everything here is recomputed per request and never persisted. Maps are
//! `BTreeMap` so serialized output is stable between identical calls.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{MealCategory, MedicationCategory, SymptomCategory, SymptomType};

/// Coarse direction of a metric over time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendDirection {
    Improving,
    #[default]
    Stable,
    Declining,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Improving => "IMPROVING",
            TrendDirection::Stable => "STABLE",
            TrendDirection::Declining => "DECLINING",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TrendDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "IMPROVING" => Ok(TrendDirection::Improving),
            "STABLE" => Ok(TrendDirection::Stable),
            "DECLINING" => Ok(TrendDirection::Declining),
            _ => Err(format!("Unknown trend direction: {}", s)),
        }
    }
}

/// Priority of an insight or recommendation, also used as alert level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
        }
    }

    /// Numeric rank for sorting (higher = more urgent)
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }

    /// How long a recommendation at this priority stays valid
    pub fn validity_weeks(&self) -> i64 {
        match self {
            Priority::High => 4,
            Priority::Medium => 8,
            Priority::Low => 12,
        }
    }

    pub fn expected_impact(&self) -> &'static str {
        match self {
            Priority::High => "Significant improvement expected within 2-4 weeks",
            Priority::Medium => "Moderate improvement expected within 4-6 weeks",
            Priority::Low => "Gradual improvement expected within 6-8 weeks",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Broad kind of an insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InsightType {
    Dietary,
    Lifestyle,
    Medical,
    Behavioral,
}

impl InsightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightType::Dietary => "DIETARY",
            InsightType::Lifestyle => "LIFESTYLE",
            InsightType::Medical => "MEDICAL",
            InsightType::Behavioral => "BEHAVIORAL",
        }
    }

    /// When results of acting on an insight of this kind should show
    pub fn timeline(&self) -> &'static str {
        match self {
            InsightType::Dietary => "2-4 weeks",
            InsightType::Lifestyle => "4-6 weeks",
            InsightType::Medical => "Consult healthcare provider",
            InsightType::Behavioral => "2-3 weeks",
        }
    }
}

impl fmt::Display for InsightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BowelMovementSummary {
    pub total_count: u64,
    pub average_per_day: f64,
    /// 0 when there are no records
    pub most_common_bristol: u8,
    pub average_pain: f64,
    pub average_strain: f64,
    pub average_satisfaction: f64,
    /// 0-1, closeness to a 24h cadence
    pub regularity_score: f64,
    /// Share of Bristol types 3-4
    pub ideal_bristol_percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MealSummary {
    pub total_meals: u64,
    pub average_per_day: f64,
    pub total_calories: u64,
    /// Per meal
    pub average_calories: f64,
    pub average_daily_calories: f64,
    pub fiber_rich_percent: f64,
    pub dairy_percent: f64,
    pub gluten_percent: f64,
    pub spicy_percent: f64,
    pub healthy_meal_percent: f64,
    pub most_common_category: Option<MealCategory>,
    /// Mean per-meal health proxy, 0 when there are no meals
    pub health_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymptomSummary {
    pub total_symptoms: u64,
    pub average_per_day: f64,
    pub average_severity: f64,
    pub most_common_category: Option<SymptomCategory>,
    pub most_common_type: Option<SymptomType>,
    pub trend_direction: TrendDirection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MedicationSummary {
    pub total_medications: u64,
    pub active_medications: u64,
    /// Active over total, 0-1
    pub adherence_score: f64,
    pub most_common_category: Option<MedicationCategory>,
    pub complexity_score: f64,
}

/// A component's contribution to the overall score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreFactor {
    pub name: String,
    /// Score minus 50, so -50 to 50
    pub impact: f64,
    pub weight: f64,
    pub description: String,
    pub trend: TrendDirection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataTrend {
    pub direction: TrendDirection,
    /// Least-squares slope of the metric per sample
    pub slope: f64,
    pub confidence: f64,
    pub sample_size: usize,
    pub time_points: Vec<DateTime<Utc>>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub insight_type: InsightType,
    pub category: String,
    pub message: String,
    pub evidence: String,
    pub priority: Priority,
    pub confidence: f64,
    pub action_items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthOverview {
    /// "YYYY-MM-DD to YYYY-MM-DD"
    pub period: String,
    pub bowel_movement_stats: BowelMovementSummary,
    pub meal_stats: MealSummary,
    pub symptom_stats: SymptomSummary,
    pub medication_stats: MedicationSummary,
    pub overall_health_score: f64,
    pub trend_direction: TrendDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    pub factor: String,
    pub outcome: String,
    /// Fraction of factor occurrences followed by the outcome
    pub strength: f64,
    pub confidence: f64,
    pub description: String,
    pub sample_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationEffect {
    pub medication_name: String,
    /// Percent drop in average severity per symptom type, plus "overall"
    pub symptom_improvement: BTreeMap<String, f64>,
    pub bowel_improvement: f64,
    pub effectiveness_score: f64,
    pub confidence: f64,
    pub sample_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerEffect {
    pub trigger: String,
    pub symptom_increase: f64,
    pub bowel_impact: f64,
    /// Number of meals carrying the trigger
    pub frequency: usize,
    pub severity: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrelationAnalysis {
    pub meal_bowel_correlations: Vec<Correlation>,
    pub meal_symptom_correlations: Vec<Correlation>,
    pub medication_effectiveness: Vec<MedicationEffect>,
    pub trigger_analysis: Vec<TriggerEffect>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub bowel_movement_trends: DataTrend,
    pub symptom_trends: DataTrend,
    pub meal_trends: DataTrend,
    pub overall_trend: TrendDirection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EatingPattern {
    /// Time slot -> fraction of meals
    pub meal_timing: BTreeMap<String, f64>,
    /// small/medium/large -> fraction of meals
    pub meal_size_distribution: BTreeMap<String, f64>,
    pub category_distribution: BTreeMap<String, f64>,
    pub dietary_consistency: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BowelPattern {
    pub preferred_timing: BTreeMap<String, f64>,
    pub regularity_score: f64,
    /// `type_N` -> fraction of movements
    pub consistency_patterns: BTreeMap<String, f64>,
    /// Mean hours from a meal to the next movement, if any followed
    pub response_to_meals: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymptomPattern {
    pub symptom_timing: BTreeMap<String, f64>,
    /// Trigger -> fraction of symptoms naming it
    pub trigger_patterns: BTreeMap<String, f64>,
    pub type_distribution: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BehaviorPatterns {
    pub eating_patterns: EatingPattern,
    pub bowel_patterns: BowelPattern,
    pub symptom_patterns: SymptomPattern,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthInsights {
    pub key_findings: Vec<String>,
    pub risk_factors: Vec<String>,
    pub positive_factors: Vec<String>,
    pub recommendations: Vec<Insight>,
    pub alert_level: Priority,
    pub confidence_level: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthScore {
    pub overall_score: f64,
    pub component_scores: BTreeMap<String, f64>,
    pub trend: TrendDirection,
    pub last_updated: DateTime<Utc>,
    pub factors: Vec<ScoreFactor>,
    pub benchmarks: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: String,
    #[serde(rename = "type")]
    pub recommendation_type: InsightType,
    pub category: String,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub confidence: f64,
    pub evidence: Vec<String>,
    pub action_steps: Vec<String>,
    pub expected_impact: String,
    pub timeline: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
