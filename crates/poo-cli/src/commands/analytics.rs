//! Analytics report commands
//!
//! Each report is printed as a readable summary, or as pretty JSON with `--json`.

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use poo_core::analytics::{
    AnalyticsService, BehaviorPatterns, CorrelationAnalysis, DataTrend, HealthInsights,
    HealthOverview, HealthScore, Recommendation, TrendAnalysis,
};
use poo_core::config::MAX_WINDOW_DAYS;

use super::{parse_when, truncate};
use crate::cli::RangeArgs;

/// Resolve `--days`/`--from`/`--to` into concrete bounds
///
/// Ordering is left to the analytics service, which rejects inverted ranges.
pub fn resolve_range(
    range: &RangeArgs,
    default_window: Duration,
    now: DateTime<Utc>,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let end = match &range.to {
        Some(to) => parse_when(to, true)?,
        None => now,
    };
    let start = match (&range.from, range.days) {
        (Some(from), _) => parse_when(from, false)?,
        (None, Some(days)) if !(1..=MAX_WINDOW_DAYS).contains(&days) => bail!(
            "--days must be between 1 and {} (got {})",
            MAX_WINDOW_DAYS,
            days
        ),
        (None, Some(days)) => end - Duration::days(days),
        (None, None) => end - default_window,
    };
    Ok((start, end))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn percent(fraction: f64) -> String {
    format!("{:.0}%", fraction * 100.0)
}

pub async fn cmd_overview(service: &AnalyticsService, user: &str, range: &RangeArgs) -> Result<()> {
    let (start, end) = resolve_range(range, service.config().data_window, Utc::now())?;
    let overview = service.health_overview(user, start, end).await?;

    if range.json {
        return print_json(&overview);
    }
    print_overview(&overview);
    Ok(())
}

fn print_overview(overview: &HealthOverview) {
    let bm = &overview.bowel_movement_stats;
    let meals = &overview.meal_stats;
    let symptoms = &overview.symptom_stats;
    let meds = &overview.medication_stats;

    println!();
    println!("📊 Health Overview ({})", overview.period);
    println!("   ─────────────────────────────────────────────");
    println!(
        "   Overall score: {:.1}/100 ({})",
        overview.overall_health_score, overview.trend_direction
    );
    println!();
    println!("   💩 Bowel movements: {}", bm.total_count);
    if bm.total_count > 0 {
        println!("      Per day:        {:.2}", bm.average_per_day);
        println!("      Typical type:   {}", bm.most_common_bristol);
        println!("      Regularity:     {}", percent(bm.regularity_score));
        println!("      Ideal (3-4):    {:.0}%", bm.ideal_bristol_percent);
        println!(
            "      Pain/strain:    {:.1} / {:.1}",
            bm.average_pain, bm.average_strain
        );
    }
    println!("   🍽️  Meals: {}", meals.total_meals);
    if meals.total_meals > 0 {
        println!("      Calories/day:   {:.0}", meals.average_daily_calories);
        println!("      Fiber rich:     {:.0}%", meals.fiber_rich_percent);
        println!("      Healthy:        {:.0}%", meals.healthy_meal_percent);
    }
    println!("   🤢 Symptoms: {}", symptoms.total_symptoms);
    if symptoms.total_symptoms > 0 {
        println!("      Avg severity:   {:.1}/10", symptoms.average_severity);
        println!("      Trend:          {}", symptoms.trend_direction);
    }
    println!(
        "   💊 Medications: {} active of {}",
        meds.active_medications, meds.total_medications
    );
    println!();
}

pub async fn cmd_score(service: &AnalyticsService, user: &str, json: bool) -> Result<()> {
    let score = service.health_score(user, Utc::now()).await?;

    if json {
        return print_json(&score);
    }
    print_score(&score);
    Ok(())
}

fn print_score(score: &HealthScore) {
    println!();
    println!(
        "🏅 Health Score: {:.1}/100 ({})",
        score.overall_score, score.trend
    );
    println!("   ─────────────────────────────────────────────");
    for factor in &score.factors {
        println!(
            "   {:<18} {:>5.1}  weight {:.0}%  {}",
            factor.name,
            factor.impact + 50.0,
            factor.weight * 100.0,
            factor.description
        );
    }
    println!();
    let benchmarks: Vec<String> = score
        .benchmarks
        .iter()
        .map(|(name, value)| format!("{} {:.0}", name, value))
        .collect();
    println!("   Benchmarks: {}", benchmarks.join(", "));
    println!();
}

pub async fn cmd_insights(service: &AnalyticsService, user: &str, range: &RangeArgs) -> Result<()> {
    let (start, end) = resolve_range(range, service.config().data_window, Utc::now())?;
    let insights = service.health_insights(user, start, end).await?;

    if range.json {
        return print_json(&insights);
    }
    print_insights(&insights);
    Ok(())
}

fn print_insights(insights: &HealthInsights) {
    println!();
    println!(
        "🔎 Health Insights (alert level {}, confidence {})",
        insights.alert_level,
        percent(insights.confidence_level)
    );
    println!("   ─────────────────────────────────────────────");

    print_list("Key findings", &insights.key_findings);
    print_list("Risk factors", &insights.risk_factors);
    print_list("Positive factors", &insights.positive_factors);

    if insights.recommendations.is_empty() {
        println!("   ✅ Nothing stands out. Keep it up!");
    }
    for insight in &insights.recommendations {
        println!();
        println!(
            "   [{}] {} ({})",
            insight.priority, insight.message, insight.insight_type
        );
        println!("      {}", insight.evidence);
        for action in &insight.action_items {
            println!("      → {}", action);
        }
    }
    println!();
}

fn print_list(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("   {}:", title);
    for item in items {
        println!("      • {}", item);
    }
}

pub async fn cmd_recommendations(service: &AnalyticsService, user: &str, json: bool) -> Result<()> {
    let recommendations = service.recommendations(user, Utc::now()).await?;

    if json {
        return print_json(&recommendations);
    }
    print_recommendations(&recommendations);
    Ok(())
}

fn print_recommendations(recommendations: &[Recommendation]) {
    println!();
    println!("📋 Recommendations");
    println!("   ─────────────────────────────────────────────");
    if recommendations.is_empty() {
        println!("   ✅ No recommendations right now.");
    }
    for rec in recommendations {
        println!();
        println!("   [{}] {}", rec.priority, rec.title);
        println!("      {}", truncate(&rec.description, 100));
        println!(
            "      Timeline: {} · Expected: {}",
            rec.timeline, rec.expected_impact
        );
        for step in &rec.action_steps {
            println!("      → {}", step);
        }
    }
    println!();
}

pub async fn cmd_trends(service: &AnalyticsService, user: &str, range: &RangeArgs) -> Result<()> {
    let (start, end) = resolve_range(range, service.config().data_window, Utc::now())?;
    let trends = service.trend_analysis(user, start, end).await?;

    if range.json {
        return print_json(&trends);
    }
    print_trends(&trends);
    Ok(())
}

fn print_trends(trends: &TrendAnalysis) {
    fn row(name: &str, trend: &DataTrend) {
        println!(
            "   {:<16} {:<10} slope {:>+6.2}  confidence {}  ({} samples)",
            name,
            trend.direction,
            trend.slope,
            percent(trend.confidence),
            trend.sample_size
        );
    }

    println!();
    println!("📈 Trends (overall {})", trends.overall_trend);
    println!("   ─────────────────────────────────────────────");
    row("Bowel movements", &trends.bowel_movement_trends);
    row("Meals", &trends.meal_trends);
    row("Symptoms", &trends.symptom_trends);
    println!();
}

pub async fn cmd_correlations(
    service: &AnalyticsService,
    user: &str,
    range: &RangeArgs,
) -> Result<()> {
    let (start, end) = resolve_range(range, service.config().data_window, Utc::now())?;
    let analysis = service.correlation_analysis(user, start, end).await?;

    if range.json {
        return print_json(&analysis);
    }
    print_correlations(&analysis);
    Ok(())
}

fn print_correlations(analysis: &CorrelationAnalysis) {
    println!();
    println!("🔗 Correlations");
    println!("   ─────────────────────────────────────────────");

    let links = analysis
        .meal_bowel_correlations
        .iter()
        .chain(&analysis.meal_symptom_correlations);
    let mut any = false;
    for c in links {
        any = true;
        println!(
            "   {} → {}: strength {}, confidence {} (n={})",
            c.factor,
            c.outcome,
            percent(c.strength),
            percent(c.confidence),
            c.sample_size
        );
    }
    if !any {
        println!("   Not enough overlapping data yet.");
    }

    if !analysis.medication_effectiveness.is_empty() {
        println!();
        println!("   💊 Medication effectiveness:");
        for m in &analysis.medication_effectiveness {
            println!(
                "      {:<20} {:>5.1}  (n={})",
                truncate(&m.medication_name, 20),
                m.effectiveness_score,
                m.sample_size
            );
        }
    }

    if !analysis.trigger_analysis.is_empty() {
        println!();
        println!("   ⚡ Triggers:");
        for t in &analysis.trigger_analysis {
            println!(
                "      {:<20} +{:.1} severity  ({} meals)",
                truncate(&t.trigger, 20),
                t.symptom_increase,
                t.frequency
            );
        }
    }
    println!();
}

pub async fn cmd_patterns(service: &AnalyticsService, user: &str, range: &RangeArgs) -> Result<()> {
    let (start, end) = resolve_range(range, service.config().data_window, Utc::now())?;
    let patterns = service.behavior_patterns(user, start, end).await?;

    if range.json {
        return print_json(&patterns);
    }
    print_patterns(&patterns);
    Ok(())
}

fn print_patterns(patterns: &BehaviorPatterns) {
    fn shares(title: &str, map: &BTreeMap<String, f64>) {
        if map.is_empty() {
            return;
        }
        let parts: Vec<String> = map
            .iter()
            .map(|(k, v)| format!("{} {}", k, percent(*v)))
            .collect();
        println!("   {:<18} {}", title, parts.join(", "));
    }

    let eating = &patterns.eating_patterns;
    let bowel = &patterns.bowel_patterns;
    let symptoms = &patterns.symptom_patterns;

    println!();
    println!("🧭 Behavior Patterns");
    println!("   ─────────────────────────────────────────────");
    shares("Meal timing", &eating.meal_timing);
    shares("Meal sizes", &eating.meal_size_distribution);
    shares("Meal categories", &eating.category_distribution);
    println!(
        "   {:<18} {}",
        "Diet consistency",
        percent(eating.dietary_consistency)
    );
    shares("Bowel timing", &bowel.preferred_timing);
    shares("Stool types", &bowel.consistency_patterns);
    println!("   {:<18} {}", "Regularity", percent(bowel.regularity_score));
    if let Some(hours) = bowel.response_to_meals {
        println!("   {:<18} {:.1}h after meals", "Bowel response", hours);
    }
    shares("Symptom timing", &symptoms.symptom_timing);
    shares("Symptom triggers", &symptoms.trigger_patterns);
    println!();
}
