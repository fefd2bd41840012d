//! Analytics handlers
//!
//! Ranged endpoints take `?start=&end=` as RFC 3339 timestamps or plain
//! `YYYY-MM-DD` dates. A plain end date covers that whole day. Missing
//! bounds default to the configured data window ending now.

use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    Json,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;

use crate::{get_user_id, AppError, AppState};
use poo_core::analytics::{
    BehaviorPatterns, CorrelationAnalysis, HealthInsights, HealthOverview, HealthScore,
    Recommendation, TrendAnalysis,
};

/// Query parameters for ranged analytics
#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl RangeQuery {
    /// Resolve to concrete bounds; ordering is checked by the analytics service
    fn resolve(
        &self,
        state: &AppState,
        now: DateTime<Utc>,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>), AppError> {
        let end = match &self.end {
            Some(s) => parse_bound(s, true)?,
            None => now,
        };
        let start = match &self.start {
            Some(s) => parse_bound(s, false)?,
            None => end - state.analytics.config().data_window,
        };
        Ok((start, end))
    }
}

/// Parse an RFC 3339 timestamp or a `YYYY-MM-DD` date
fn parse_bound(value: &str, end_of_day: bool) -> Result<DateTime<Utc>, AppError> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        AppError::bad_request(&format!(
            "Invalid date '{}': expected YYYY-MM-DD or RFC 3339",
            value
        ))
    })?;
    let time = if end_of_day {
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
            .ok_or_else(|| AppError::internal("Invalid end-of-day time"))?
    } else {
        NaiveTime::MIN
    };
    Ok(date.and_time(time).and_utc())
}

/// GET /api/analytics/overview - Summaries and overall score for a range
pub async fn get_overview(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RangeQuery>,
    request: Request,
) -> Result<Json<HealthOverview>, AppError> {
    let user_id = get_user_id(request.headers());
    let (start, end) = params.resolve(&state, Utc::now())?;

    let overview = state
        .analytics
        .health_overview(&user_id, start, end)
        .await
        .map_err(AppError::from_core)?;

    Ok(Json(overview))
}

/// GET /api/analytics/correlations - Meal, medication and trigger effects
pub async fn get_correlations(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RangeQuery>,
    request: Request,
) -> Result<Json<CorrelationAnalysis>, AppError> {
    let user_id = get_user_id(request.headers());
    let (start, end) = params.resolve(&state, Utc::now())?;

    let analysis = state
        .analytics
        .correlation_analysis(&user_id, start, end)
        .await
        .map_err(AppError::from_core)?;

    Ok(Json(analysis))
}

/// GET /api/analytics/trends - Trend direction per series
pub async fn get_trends(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RangeQuery>,
    request: Request,
) -> Result<Json<TrendAnalysis>, AppError> {
    let user_id = get_user_id(request.headers());
    let (start, end) = params.resolve(&state, Utc::now())?;

    let trends = state
        .analytics
        .trend_analysis(&user_id, start, end)
        .await
        .map_err(AppError::from_core)?;

    Ok(Json(trends))
}

/// GET /api/analytics/patterns - Timing and distribution patterns
pub async fn get_patterns(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RangeQuery>,
    request: Request,
) -> Result<Json<BehaviorPatterns>, AppError> {
    let user_id = get_user_id(request.headers());
    let (start, end) = params.resolve(&state, Utc::now())?;

    let patterns = state
        .analytics
        .behavior_patterns(&user_id, start, end)
        .await
        .map_err(AppError::from_core)?;

    Ok(Json(patterns))
}

/// GET /api/analytics/insights - Rule-based insights and key findings
pub async fn get_insights(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RangeQuery>,
    request: Request,
) -> Result<Json<HealthInsights>, AppError> {
    let user_id = get_user_id(request.headers());
    let (start, end) = params.resolve(&state, Utc::now())?;

    let insights = state
        .analytics
        .health_insights(&user_id, start, end)
        .await
        .map_err(AppError::from_core)?;

    Ok(Json(insights))
}

/// GET /api/analytics/score - Health score over the data window
pub async fn get_score(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<HealthScore>, AppError> {
    let user_id = get_user_id(request.headers());

    let score = state
        .analytics
        .health_score(&user_id, Utc::now())
        .await
        .map_err(AppError::from_core)?;

    Ok(Json(score))
}

/// GET /api/analytics/recommendations - Actionable recommendations
pub async fn get_recommendations(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Vec<Recommendation>>, AppError> {
    let user_id = get_user_id(request.headers());

    let recommendations = state
        .analytics
        .recommendations(&user_id, Utc::now())
        .await
        .map_err(AppError::from_core)?;

    Ok(Json(recommendations))
}
