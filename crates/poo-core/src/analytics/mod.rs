//! Health Analytics Engine
//!
//! Turns raw per-record tracking data into summaries, a composite health
//! score, cross-category correlations, trend directions, behavior patterns
//! and rule-based insights.
//!
//! ## Stages
//!
//! - **aggregator** - per-category summaries
//! - **score** - weighted composite health score
//! - **correlation** - meal, medication and trigger effects
//! - **trend** - half-split trend direction and regularity
//! - **patterns** - timing and distribution patterns
//! - **insights** - ordered insight rules and recommendations
//!
//! All stages are pure functions over slices. [`AnalyticsService`] fetches
//! the data for a user and range and runs them.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use poo_core::analytics::AnalyticsService;
//!
//! let service = AnalyticsService::from_database(db, AnalyticsConfig::default());
//! let overview = service.health_overview("local", start, end).await?;
//! ```

pub mod aggregator;
pub mod correlation;
pub mod insights;
pub mod patterns;
pub mod score;
pub mod service;
pub mod stats;
pub mod trend;
pub mod types;

pub use correlation::CorrelationAnalyzer;
pub use insights::{InsightContext, InsightEngine, InsightRule, ThresholdRule};
pub use service::AnalyticsService;
pub use types::{
    BehaviorPatterns, BowelMovementSummary, BowelPattern, Correlation, CorrelationAnalysis,
    DataTrend, EatingPattern, HealthInsights, HealthOverview, HealthScore, Insight, InsightType,
    MealSummary, MedicationEffect, MedicationSummary, Priority, Recommendation, ScoreFactor,
    SymptomPattern, SymptomSummary, TrendAnalysis, TrendDirection, TriggerEffect,
};
