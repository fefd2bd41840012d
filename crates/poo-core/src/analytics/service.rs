//! Analytics orchestration
//!
//! Every public operation performs one concurrent fetch of the four record
//! collections for a user, then runs the pure analysis stages on the joined
//! data. Any fetch failure aborts the call; the whole fetch runs under the
//! configured request timeout, and dropping the returned future cancels the
//! in-flight fetches.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::aggregator::{
    summarize_bowel_movements, summarize_meals, summarize_medications, summarize_symptoms,
};
use super::correlation::CorrelationAnalyzer;
use super::insights::{generate_recommendations, InsightContext, InsightEngine};
use super::patterns::behavior_patterns;
use super::score::{health_score, ComponentScores};
use super::stats::window_days;
use super::trend::analyze_trends;
use super::types::{
    BehaviorPatterns, CorrelationAnalysis, HealthInsights, HealthOverview, HealthScore,
    Recommendation, TrendAnalysis,
};
use crate::config::AnalyticsConfig;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{BowelMovement, Meal, Medication, Symptom};
use crate::repository::{
    BowelMovementRepository, MealRepository, MedicationRepository, SymptomRepository,
};

/// Records for one user and range, fetched together
struct Dataset {
    movements: Vec<BowelMovement>,
    meals: Vec<Meal>,
    symptoms: Vec<Symptom>,
    medications: Vec<Medication>,
}

pub struct AnalyticsService {
    bowel_movements: Arc<dyn BowelMovementRepository>,
    meals: Arc<dyn MealRepository>,
    symptoms: Arc<dyn SymptomRepository>,
    medications: Arc<dyn MedicationRepository>,
    config: AnalyticsConfig,
    correlations: CorrelationAnalyzer,
    engine: InsightEngine,
}

impl AnalyticsService {
    pub fn new(
        bowel_movements: Arc<dyn BowelMovementRepository>,
        meals: Arc<dyn MealRepository>,
        symptoms: Arc<dyn SymptomRepository>,
        medications: Arc<dyn MedicationRepository>,
        config: AnalyticsConfig,
    ) -> Self {
        Self {
            bowel_movements,
            meals,
            symptoms,
            medications,
            correlations: CorrelationAnalyzer::new(config.correlation_window_hours),
            config,
            engine: InsightEngine::new(),
        }
    }

    /// Service backed by a single store implementing all four repositories
    pub fn from_store<S>(store: Arc<S>, config: AnalyticsConfig) -> Self
    where
        S: BowelMovementRepository
            + MealRepository
            + SymptomRepository
            + MedicationRepository
            + 'static,
    {
        Self::new(store.clone(), store.clone(), store.clone(), store, config)
    }

    pub fn from_database(db: Database, config: AnalyticsConfig) -> Self {
        Self::from_store(Arc::new(db), config)
    }

    /// Replace the insight engine, e.g. to register extra rules
    pub fn with_engine(mut self, engine: InsightEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Fetch all four collections concurrently under the request timeout
    async fn fetch(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Dataset> {
        if start > end {
            return Err(Error::InvalidDateRange);
        }

        let limit = self.config.medication_limit;
        let joined = async {
            tokio::try_join!(
                async {
                    self.bowel_movements
                        .get_by_date_range(user_id, start, end)
                        .await
                        .map_err(|e| Error::fetch("bowel movements", e))
                },
                async {
                    self.meals
                        .get_by_date_range(user_id, start, end)
                        .await
                        .map_err(|e| Error::fetch("meals", e))
                },
                async {
                    self.symptoms
                        .get_by_date_range(user_id, start, end)
                        .await
                        .map_err(|e| Error::fetch("symptoms", e))
                },
                async {
                    self.medications
                        .get_by_user_id(user_id, limit, 0)
                        .await
                        .map_err(|e| Error::fetch("medications", e))
                },
            )
        };

        let timeout = self.config.request_timeout;
        let (movements, meals, symptoms, medications) = tokio::time::timeout(timeout, joined)
            .await
            .map_err(|_| Error::Timeout(timeout))??;

        debug!(
            user_id,
            bowel_movements = movements.len(),
            meals = meals.len(),
            symptoms = symptoms.len(),
            medications = medications.len(),
            "Fetched analytics data"
        );

        Ok(Dataset {
            movements,
            meals,
            symptoms,
            medications,
        })
    }

    /// Range covering the configured data window up to `now`
    fn window_ending(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        (now - self.config.data_window, now)
    }

    fn overview(
        &self,
        data: &Dataset,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> HealthOverview {
        let days = window_days(start, end);
        let bowel_movement_stats = summarize_bowel_movements(&data.movements, days);
        let meal_stats = summarize_meals(&data.meals, days);
        let symptom_stats = summarize_symptoms(&data.symptoms, days);
        // Medications are not ranged; activity is judged at the end of the window
        let medication_stats = summarize_medications(&data.medications, end);

        let overall_health_score = ComponentScores::from_summaries(
            &bowel_movement_stats,
            &meal_stats,
            &symptom_stats,
            &medication_stats,
        )
        .overall();
        let trends = analyze_trends(&data.movements, &data.meals, &data.symptoms, start, end);

        HealthOverview {
            period: format!("{} to {}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d")),
            bowel_movement_stats,
            meal_stats,
            symptom_stats,
            medication_stats,
            overall_health_score,
            trend_direction: trends.overall_trend,
        }
    }

    fn correlate(&self, data: &Dataset) -> CorrelationAnalysis {
        self.correlations
            .analyze(&data.meals, &data.symptoms, &data.movements, &data.medications)
    }

    fn patterns(&self, data: &Dataset) -> BehaviorPatterns {
        behavior_patterns(
            &data.movements,
            &data.meals,
            &data.symptoms,
            chrono::Duration::hours(self.correlations.window_hours()),
        )
    }

    fn insights(
        &self,
        data: &Dataset,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> (HealthOverview, HealthInsights) {
        let overview = self.overview(data, start, end);
        let correlations = self.correlate(data);
        let patterns = self.patterns(data);
        let insights = self
            .engine
            .health_insights(&InsightContext::new(
                &overview,
                &correlations,
                &patterns,
                &data.movements,
            ));
        (overview, insights)
    }

    pub async fn health_overview(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<HealthOverview> {
        let data = self.fetch(user_id, start, end).await?;
        Ok(self.overview(&data, start, end))
    }

    pub async fn correlation_analysis(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<CorrelationAnalysis> {
        let data = self.fetch(user_id, start, end).await?;
        Ok(self.correlate(&data))
    }

    pub async fn trend_analysis(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<TrendAnalysis> {
        let data = self.fetch(user_id, start, end).await?;
        Ok(analyze_trends(
            &data.movements,
            &data.meals,
            &data.symptoms,
            start,
            end,
        ))
    }

    pub async fn behavior_patterns(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<BehaviorPatterns> {
        let data = self.fetch(user_id, start, end).await?;
        Ok(self.patterns(&data))
    }

    pub async fn health_insights(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<HealthInsights> {
        let data = self.fetch(user_id, start, end).await?;
        let (_, insights) = self.insights(&data, start, end);
        Ok(insights)
    }

    /// Health score over the configured data window ending at `now`
    pub async fn health_score(&self, user_id: &str, now: DateTime<Utc>) -> Result<HealthScore> {
        let (start, end) = self.window_ending(now);
        let data = self.fetch(user_id, start, end).await?;
        let overview = self.overview(&data, start, end);

        Ok(health_score(
            &overview.bowel_movement_stats,
            &overview.meal_stats,
            &overview.symptom_stats,
            &overview.medication_stats,
            overview.trend_direction,
            now,
        ))
    }

    /// Recommendations from the insights over the data window ending at `now`
    pub async fn recommendations(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Recommendation>> {
        let (start, end) = self.window_ending(now);
        let data = self.fetch(user_id, start, end).await?;
        let (overview, insights) = self.insights(&data, start, end);

        Ok(generate_recommendations(
            &insights.recommendations,
            overview.overall_health_score,
            now,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{bowel_at, t0, MockStore};
    use chrono::Duration;

    #[tokio::test]
    async fn test_overview_period_and_counts() {
        let store = MockStore::default().with_bowel_movements(
            (0..5)
                .map(|i| bowel_at(t0() + Duration::days(i), 4))
                .collect(),
        );
        let service = AnalyticsService::from_store(Arc::new(store), AnalyticsConfig::default());

        let overview = service
            .health_overview("local", t0(), t0() + Duration::days(4))
            .await
            .unwrap();
        assert_eq!(overview.period, "2025-03-01 to 2025-03-05");
        assert_eq!(overview.bowel_movement_stats.total_count, 5);
        assert_eq!(overview.bowel_movement_stats.average_per_day, 1.25);
    }

    #[tokio::test]
    async fn test_partial_last_day_counts_as_a_day() {
        let store = MockStore::default().with_bowel_movements(
            (0..7)
                .map(|i| bowel_at(t0() + Duration::days(i), 4))
                .collect(),
        );
        let service = AnalyticsService::from_store(Arc::new(store), AnalyticsConfig::default());

        let start = t0() - Duration::hours(8);
        let end = start + Duration::days(7) - Duration::milliseconds(1);
        let overview = service.health_overview("local", start, end).await.unwrap();
        assert_eq!(overview.period, "2025-03-01 to 2025-03-07");
        assert_eq!(overview.bowel_movement_stats.average_per_day, 1.0);
    }

    #[tokio::test]
    async fn test_invalid_range_fails_before_fetch() {
        let store = Arc::new(MockStore::default());
        let service = AnalyticsService::from_store(store.clone(), AnalyticsConfig::default());

        let err = service
            .trend_analysis("local", t0() + Duration::days(1), t0())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDateRange));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_one_fetch_per_collection() {
        let store = Arc::new(MockStore::default());
        let service = AnalyticsService::from_store(store.clone(), AnalyticsConfig::default());

        service.recommendations("local", t0()).await.unwrap();
        assert_eq!(store.calls(), 4);
    }
}
