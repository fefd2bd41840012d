//! Rule-based insights and recommendations
//!
//! Each rule is an independent [`InsightRule`] evaluated in registration
//! order. Every matching rule fires; the combined output is then stably
//! sorted by priority so rules of equal priority keep their order.

use chrono::{DateTime, Duration, Utc};

use super::stats::{clamp, fraction, sample_confidence};
use super::types::{
    BehaviorPatterns, Correlation, CorrelationAnalysis, HealthInsights, HealthOverview, Insight,
    InsightType, Priority, Recommendation, TrendDirection,
};
use crate::models::BowelMovement;

/// Overall score under which a general improvement recommendation is added
pub const LOW_OVERALL_SCORE: f64 = 60.0;

/// Everything a rule may look at
pub struct InsightContext<'a> {
    pub overview: &'a HealthOverview,
    pub correlations: &'a CorrelationAnalysis,
    pub patterns: &'a BehaviorPatterns,
    pub movements: &'a [BowelMovement],
}

impl<'a> InsightContext<'a> {
    pub fn new(
        overview: &'a HealthOverview,
        correlations: &'a CorrelationAnalysis,
        patterns: &'a BehaviorPatterns,
        movements: &'a [BowelMovement],
    ) -> Self {
        Self {
            overview,
            correlations,
            patterns,
            movements,
        }
    }

    /// Exact share of bowel movements with any of the given Bristol types
    ///
    /// Counted from the movements themselves; the rounded pattern shares
    /// can overshoot a threshold.
    fn bristol_share(&self, types: &[u8]) -> f64 {
        let matching = self
            .movements
            .iter()
            .filter(|m| types.contains(&m.bristol_type))
            .count();
        fraction(matching, self.movements.len())
    }
}

/// A rule that inspects the context and emits zero or more insights
pub trait InsightRule: Send + Sync {
    /// Stable identifier, used in logs
    fn id(&self) -> &'static str;

    fn evaluate(&self, ctx: &InsightContext<'_>) -> Vec<Insight>;
}

/// A `(predicate, builder)` pair emitting at most one insight
pub struct ThresholdRule {
    id: &'static str,
    applies: fn(&InsightContext<'_>) -> bool,
    build: fn(&InsightContext<'_>) -> Insight,
}

impl ThresholdRule {
    pub fn new(
        id: &'static str,
        applies: fn(&InsightContext<'_>) -> bool,
        build: fn(&InsightContext<'_>) -> Insight,
    ) -> Self {
        Self { id, applies, build }
    }
}

impl InsightRule for ThresholdRule {
    fn id(&self) -> &'static str {
        self.id
    }

    fn evaluate(&self, ctx: &InsightContext<'_>) -> Vec<Insight> {
        if (self.applies)(ctx) {
            vec![(self.build)(ctx)]
        } else {
            vec![]
        }
    }
}

/// One insight per strong, well-supported meal correlation
pub struct StrongCorrelationRule;

impl StrongCorrelationRule {
    const MIN_CONFIDENCE: f64 = 0.7;
    const MIN_STRENGTH: f64 = 0.5;
    const HIGH_CONFIDENCE: f64 = 0.8;

    fn insight(corr: &Correlation) -> Insight {
        Insight {
            insight_type: InsightType::Dietary,
            category: "correlation".to_string(),
            message: format!("Strong link between {} and {}", corr.factor, corr.outcome),
            evidence: corr.description.clone(),
            priority: if corr.confidence > Self::HIGH_CONFIDENCE {
                Priority::High
            } else {
                Priority::Medium
            },
            confidence: corr.confidence,
            action_items: correlation_actions(corr),
        }
    }
}

impl InsightRule for StrongCorrelationRule {
    fn id(&self) -> &'static str {
        "strong_correlation"
    }

    fn evaluate(&self, ctx: &InsightContext<'_>) -> Vec<Insight> {
        ctx.correlations
            .meal_bowel_correlations
            .iter()
            .chain(&ctx.correlations.meal_symptom_correlations)
            .filter(|c| c.confidence > Self::MIN_CONFIDENCE && c.strength > Self::MIN_STRENGTH)
            .map(Self::insight)
            .collect()
    }
}

fn correlation_actions(corr: &Correlation) -> Vec<String> {
    let actions: &[&str] = match corr.factor.as_str() {
        "Spicy Meals" => &[
            "Consider reducing spicy food intake",
            "Try milder seasonings like herbs instead of hot spices",
            "Gradually reintroduce spicy foods to test tolerance",
        ],
        "High Fiber Meals" => &[
            "Continue including fiber-rich foods in your diet",
            "Aim for 25-35g of fiber daily from various sources",
            "Increase water intake with higher fiber consumption",
        ],
        "Dairy" => &[
            "Consider reducing dairy intake temporarily",
            "Try lactose-free alternatives",
            "Discuss potential lactose intolerance with a healthcare provider",
        ],
        _ => {
            return vec![
                format!("Monitor {} and its effects", corr.factor.to_lowercase()),
                format!(
                    "Track changes in {} when adjusting {}",
                    corr.outcome.to_lowercase(),
                    corr.factor.to_lowercase()
                ),
                "Keep detailed records to confirm this pattern".to_string(),
            ];
        }
    };
    strings(actions)
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn low_fiber() -> ThresholdRule {
    ThresholdRule::new(
        "low_fiber",
        |ctx| {
            let meals = &ctx.overview.meal_stats;
            meals.total_meals > 0 && meals.fiber_rich_percent < 40.0
        },
        |ctx| Insight {
            insight_type: InsightType::Dietary,
            category: "nutrition".to_string(),
            message: "Consider increasing fiber intake".to_string(),
            evidence: format!(
                "Only {:.1}% of meals were fiber rich",
                ctx.overview.meal_stats.fiber_rich_percent
            ),
            priority: Priority::Medium,
            confidence: 0.8,
            action_items: strings(&[
                "Add more fruits and vegetables",
                "Choose whole grains",
                "Include legumes in meals",
            ]),
        },
    )
}

fn irregular_routine() -> ThresholdRule {
    ThresholdRule::new(
        "irregular_routine",
        |ctx| {
            let bm = &ctx.overview.bowel_movement_stats;
            bm.total_count >= 2 && bm.regularity_score < 0.6
        },
        |ctx| Insight {
            insight_type: InsightType::Lifestyle,
            category: "routine".to_string(),
            message: "Establish a consistent bathroom routine".to_string(),
            evidence: format!(
                "Irregular bowel movement pattern (regularity {:.2})",
                ctx.overview.bowel_movement_stats.regularity_score
            ),
            priority: Priority::High,
            confidence: 0.7,
            action_items: strings(&[
                "Try to use the bathroom at the same times daily",
                "Allow adequate time for bowel movements",
                "Don't delay when you feel the urge",
            ]),
        },
    )
}

/// Minimum movements before stool consistency patterns are reported
const MIN_MOVEMENTS_FOR_PATTERN: u64 = 7;

fn constipation_pattern() -> ThresholdRule {
    ThresholdRule::new(
        "constipation_pattern",
        |ctx| {
            ctx.overview.bowel_movement_stats.total_count >= MIN_MOVEMENTS_FOR_PATTERN
                && ctx.bristol_share(&[1, 2]) > 0.5
        },
        |ctx| Insight {
            insight_type: InsightType::Lifestyle,
            category: "bowel_health".to_string(),
            message: "Constipation pattern detected".to_string(),
            evidence: format!(
                "{:.0}% of movements were Bristol types 1-2, indicating hard stools",
                ctx.bristol_share(&[1, 2]) * 100.0
            ),
            priority: Priority::High,
            confidence: 0.8,
            action_items: strings(&[
                "Increase fiber intake with fruits, vegetables, and whole grains",
                "Drink more water throughout the day",
                "Consider adding physical activity to your routine",
                "Consult with a healthcare provider if the pattern persists",
            ]),
        },
    )
}

fn loose_stool_pattern() -> ThresholdRule {
    ThresholdRule::new(
        "loose_stool_pattern",
        |ctx| {
            ctx.overview.bowel_movement_stats.total_count >= MIN_MOVEMENTS_FOR_PATTERN
                && ctx.bristol_share(&[6, 7]) > 0.4
        },
        |ctx| Insight {
            insight_type: InsightType::Lifestyle,
            category: "bowel_health".to_string(),
            message: "Loose stool pattern detected".to_string(),
            evidence: format!(
                "{:.0}% of movements were Bristol types 6-7, indicating loose stools",
                ctx.bristol_share(&[6, 7]) * 100.0
            ),
            priority: Priority::Medium,
            confidence: 0.7,
            action_items: strings(&[
                "Keep a food diary to identify potential triggers",
                "Consider reducing dairy, gluten, or spicy foods temporarily",
                "Stay hydrated to replace lost fluids",
                "Consult with a healthcare provider if the pattern continues",
            ]),
        },
    )
}

fn severe_symptoms() -> ThresholdRule {
    ThresholdRule::new(
        "severe_symptoms",
        |ctx| ctx.overview.symptom_stats.average_severity > 6.0,
        |ctx| Insight {
            insight_type: InsightType::Medical,
            category: "symptoms".to_string(),
            message: "Discuss persistent symptoms with a healthcare provider".to_string(),
            evidence: format!(
                "Average symptom severity of {:.1}/10",
                ctx.overview.symptom_stats.average_severity
            ),
            priority: Priority::High,
            confidence: 0.75,
            action_items: strings(&[
                "Keep a symptom diary to share with your provider",
                "Note when symptoms start and how long they last",
                "Seek prompt care if symptoms suddenly worsen",
            ]),
        },
    )
}

fn low_adherence() -> ThresholdRule {
    ThresholdRule::new(
        "low_adherence",
        |ctx| {
            let meds = &ctx.overview.medication_stats;
            meds.total_medications > 0 && meds.adherence_score < 0.8
        },
        |ctx| {
            let meds = &ctx.overview.medication_stats;
            Insight {
                insight_type: InsightType::Medical,
                category: "medication".to_string(),
                message: "Improve medication adherence".to_string(),
                evidence: format!(
                    "{} of {} medications are currently active",
                    meds.active_medications, meds.total_medications
                ),
                priority: Priority::High,
                confidence: 0.7,
                action_items: strings(&[
                    "Set daily reminders for each medication",
                    "Use a pill organizer to track doses",
                    "Review your regimen with a healthcare provider",
                ]),
            }
        },
    )
}

fn worsening_symptoms() -> ThresholdRule {
    // Symptom trend confidence follows the number of symptoms logged
    fn confidence(ctx: &InsightContext<'_>) -> f64 {
        sample_confidence(ctx.overview.symptom_stats.total_symptoms as usize)
    }

    ThresholdRule::new(
        "worsening_symptoms",
        |ctx| {
            ctx.overview.symptom_stats.trend_direction == TrendDirection::Declining
                && confidence(ctx) > 0.6
        },
        |ctx| Insight {
            insight_type: InsightType::Behavioral,
            category: "symptoms".to_string(),
            message: "Symptoms are getting worse".to_string(),
            evidence: format!(
                "Symptom severity trended upward across {} entries",
                ctx.overview.symptom_stats.total_symptoms
            ),
            priority: Priority::Medium,
            confidence: confidence(ctx),
            action_items: strings(&[
                "Review and adjust symptom management strategies",
                "Look for new foods or routines that coincide with the change",
                "Track progress over the next few weeks",
            ]),
        },
    )
}

/// Ordered collection of insight rules
pub struct InsightEngine {
    rules: Vec<Box<dyn InsightRule>>,
}

impl Default for InsightEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightEngine {
    /// Engine with the built-in rules, in evaluation order
    pub fn new() -> Self {
        let mut engine = Self::empty();

        engine.register(Box::new(low_fiber()));
        engine.register(Box::new(irregular_routine()));
        engine.register(Box::new(constipation_pattern()));
        engine.register(Box::new(loose_stool_pattern()));
        engine.register(Box::new(severe_symptoms()));
        engine.register(Box::new(StrongCorrelationRule));
        engine.register(Box::new(low_adherence()));
        engine.register(Box::new(worsening_symptoms()));

        engine
    }

    /// Engine with no rules registered
    pub fn empty() -> Self {
        Self { rules: vec![] }
    }

    /// Append a rule; it runs after every rule already registered
    pub fn register(&mut self, rule: Box<dyn InsightRule>) {
        self.rules.push(rule);
    }

    pub fn rule_ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    /// Evaluate every rule and sort the result by priority, highest first
    pub fn generate_insights(&self, ctx: &InsightContext<'_>) -> Vec<Insight> {
        let mut insights = vec![];

        for rule in &self.rules {
            let found = rule.evaluate(ctx);
            tracing::debug!(rule = rule.id(), count = found.len(), "Insight rule evaluated");
            insights.extend(found);
        }

        insights.sort_by(|a, b| b.priority.rank().cmp(&a.priority.rank()));
        insights
    }

    /// Findings, risks and positives around the rule-based insights
    pub fn health_insights(&self, ctx: &InsightContext<'_>) -> HealthInsights {
        let overview = ctx.overview;
        let risk_factors = risk_factors(overview);

        HealthInsights {
            key_findings: key_findings(overview),
            alert_level: alert_level(overview, &risk_factors),
            risk_factors: or_placeholder(risk_factors, "No significant risk factors identified"),
            positive_factors: or_placeholder(
                positive_factors(overview),
                "Maintaining baseline health indicators",
            ),
            recommendations: self.generate_insights(ctx),
            confidence_level: confidence_level(overview),
        }
    }
}

fn or_placeholder(items: Vec<String>, placeholder: &str) -> Vec<String> {
    if items.is_empty() {
        vec![placeholder.to_string()]
    } else {
        items
    }
}

fn key_findings(overview: &HealthOverview) -> Vec<String> {
    let bm = &overview.bowel_movement_stats;
    let mut findings = vec![
        format!("Average {:.1} bowel movements per day", bm.average_per_day),
        format!("Most common Bristol scale: Type {}", bm.most_common_bristol),
        format!(
            "Average symptom severity: {:.1}/10",
            overview.symptom_stats.average_severity
        ),
    ];

    if bm.total_count >= 2 && bm.regularity_score > 0.8 {
        findings.push("Excellent bowel movement regularity".to_string());
    }
    if overview.meal_stats.fiber_rich_percent > 60.0 {
        findings.push("High fiber diet maintained".to_string());
    }
    findings
}

fn risk_factors(overview: &HealthOverview) -> Vec<String> {
    let bm = &overview.bowel_movement_stats;
    let mut risks = vec![];

    if bm.average_pain > 5.0 {
        risks.push("High average pain levels during bowel movements".to_string());
    }
    if overview.symptom_stats.average_severity > 6.0 {
        risks.push("High average symptom severity".to_string());
    }
    if bm.total_count >= 2 && bm.regularity_score < 0.5 {
        risks.push("Irregular bowel movement patterns".to_string());
    }
    risks
}

fn positive_factors(overview: &HealthOverview) -> Vec<String> {
    let bm = &overview.bowel_movement_stats;
    let meds = &overview.medication_stats;
    let mut positives = vec![];

    if overview.meal_stats.fiber_rich_percent > 50.0 {
        positives.push("Good fiber intake from meals".to_string());
    }
    if bm.total_count >= 2 && bm.regularity_score > 0.7 {
        positives.push("Consistent bowel movement schedule".to_string());
    }
    if meds.total_medications > 0 && meds.adherence_score > 0.8 {
        positives.push("Good medication adherence".to_string());
    }
    positives
}

fn alert_level(overview: &HealthOverview, risks: &[String]) -> Priority {
    if overview.bowel_movement_stats.average_pain > 8.0
        || overview.symptom_stats.average_severity > 8.0
    {
        Priority::High
    } else if risks.len() > 2 || overview.overall_health_score < 50.0 {
        Priority::Medium
    } else {
        Priority::Low
    }
}

/// More logged data means more confidence, within [0.3, 0.9]
fn confidence_level(overview: &HealthOverview) -> f64 {
    let points = overview.bowel_movement_stats.total_count
        + overview.meal_stats.total_meals
        + overview.symptom_stats.total_symptoms;
    clamp(points as f64 / 100.0, 0.3, 0.9)
}

/// Turn insights into dated recommendations, one per insight
///
/// A low overall score appends a general improvement recommendation.
pub fn generate_recommendations(
    insights: &[Insight],
    overall_score: f64,
    now: DateTime<Utc>,
) -> Vec<Recommendation> {
    let stamp = now.timestamp();

    let mut recommendations: Vec<Recommendation> = insights
        .iter()
        .enumerate()
        .map(|(i, insight)| Recommendation {
            id: format!("rec_{}_{}", stamp, i),
            recommendation_type: insight.insight_type,
            category: insight.category.clone(),
            title: insight.message.clone(),
            description: insight.evidence.clone(),
            priority: insight.priority,
            confidence: insight.confidence,
            evidence: vec![insight.evidence.clone()],
            action_steps: insight.action_items.clone(),
            expected_impact: insight.priority.expected_impact().to_string(),
            timeline: insight.insight_type.timeline().to_string(),
            created_at: now,
            expires_at: now + Duration::weeks(insight.priority.validity_weeks()),
        })
        .collect();

    if overall_score < LOW_OVERALL_SCORE {
        recommendations.push(Recommendation {
            id: format!("rec_{}_{}", stamp, recommendations.len()),
            recommendation_type: InsightType::Lifestyle,
            category: "overall_health".to_string(),
            title: "Focus on Overall Health Improvement".to_string(),
            description: "Your health score indicates room for improvement across multiple areas"
                .to_string(),
            priority: Priority::High,
            confidence: 0.8,
            evidence: vec![format!("Overall health score: {:.1}/100", overall_score)],
            action_steps: strings(&[
                "Review dietary patterns and increase fiber intake",
                "Establish consistent daily routines",
                "Monitor symptoms more closely",
                "Ensure medication adherence",
            ]),
            expected_impact: "Significant improvement in overall health score within 4-6 weeks"
                .to_string(),
            timeline: InsightType::Lifestyle.timeline().to_string(),
            created_at: now,
            expires_at: now + Duration::weeks(Priority::High.validity_weeks()),
        });
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::types::{
        BowelMovementSummary, MealSummary, MedicationSummary, SymptomSummary,
    };
    use crate::analytics::patterns::behavior_patterns;
    use crate::test_utils::{bowel_at, t0};

    fn overview() -> HealthOverview {
        HealthOverview {
            period: "2025-03-01 to 2025-03-31".to_string(),
            bowel_movement_stats: BowelMovementSummary::default(),
            meal_stats: MealSummary::default(),
            symptom_stats: SymptomSummary::default(),
            medication_stats: MedicationSummary::default(),
            overall_health_score: 80.0,
            trend_direction: TrendDirection::Stable,
        }
    }

    fn run(
        overview: &HealthOverview,
        correlations: &CorrelationAnalysis,
        patterns: &BehaviorPatterns,
    ) -> Vec<Insight> {
        run_with(overview, correlations, patterns, &[])
    }

    fn run_with(
        overview: &HealthOverview,
        correlations: &CorrelationAnalysis,
        patterns: &BehaviorPatterns,
        movements: &[BowelMovement],
    ) -> Vec<Insight> {
        let ctx = InsightContext::new(overview, correlations, patterns, movements);
        InsightEngine::new().generate_insights(&ctx)
    }

    fn movements_of(types: &[u8]) -> Vec<BowelMovement> {
        types
            .iter()
            .enumerate()
            .map(|(i, t)| bowel_at(t0() + Duration::days(i as i64), *t))
            .collect()
    }

    fn messages(insights: &[Insight]) -> Vec<&str> {
        insights.iter().map(|i| i.message.as_str()).collect()
    }

    #[test]
    fn test_engine_registers_rules_in_order() {
        let engine = InsightEngine::new();
        assert_eq!(
            engine.rule_ids(),
            vec![
                "low_fiber",
                "irregular_routine",
                "constipation_pattern",
                "loose_stool_pattern",
                "severe_symptoms",
                "strong_correlation",
                "low_adherence",
                "worsening_symptoms",
            ]
        );
    }

    #[test]
    fn test_no_data_no_insights() {
        let insights = run(&overview(), &CorrelationAnalysis::default(), &BehaviorPatterns::default());
        assert!(insights.is_empty());
    }

    #[test]
    fn test_low_fiber_and_irregular_sorted_by_priority() {
        let mut ov = overview();
        ov.meal_stats.total_meals = 10;
        ov.meal_stats.fiber_rich_percent = 20.0;
        ov.bowel_movement_stats.total_count = 5;
        ov.bowel_movement_stats.regularity_score = 0.3;

        let insights = run(&ov, &CorrelationAnalysis::default(), &BehaviorPatterns::default());
        // Fiber fires first but routine is HIGH priority
        assert_eq!(
            messages(&insights),
            vec![
                "Establish a consistent bathroom routine",
                "Consider increasing fiber intake"
            ]
        );
        assert_eq!(insights[0].priority, Priority::High);
        assert_eq!(insights[0].insight_type, InsightType::Lifestyle);
        assert_eq!(insights[1].category, "nutrition");
        assert_eq!(insights[1].confidence, 0.8);
        assert_eq!(insights[1].action_items.len(), 3);
    }

    #[test]
    fn test_constipation_needs_seven_movements() {
        let mut ov = overview();
        ov.bowel_movement_stats.regularity_score = 0.9;
        let corr = CorrelationAnalysis::default();
        let patterns = BehaviorPatterns::default();

        let six = movements_of(&[1, 1, 2, 2, 4, 4]);
        ov.bowel_movement_stats.total_count = 6;
        assert!(run_with(&ov, &corr, &patterns, &six).is_empty());

        let seven = movements_of(&[1, 1, 2, 2, 4, 4, 4]);
        ov.bowel_movement_stats.total_count = 7;
        let insights = run_with(&ov, &corr, &patterns, &seven);
        assert_eq!(messages(&insights), vec!["Constipation pattern detected"]);
        assert_eq!(insights[0].priority, Priority::High);
        assert!(insights[0].evidence.starts_with("57%"));
    }

    #[test]
    fn test_constipation_threshold_is_exclusive() {
        // 3/8 and 1/8 round to 0.38 and 0.13, which would sum past one half
        let half = movements_of(&[1, 1, 1, 2, 4, 4, 4, 4]);
        let mut ov = overview();
        ov.bowel_movement_stats.total_count = 8;
        ov.bowel_movement_stats.regularity_score = 0.9;
        let patterns = behavior_patterns(&half, &[], &[], Duration::hours(24));

        let insights = run_with(&ov, &CorrelationAnalysis::default(), &patterns, &half);
        assert!(insights.is_empty(), "{:?}", messages(&insights));
    }

    #[test]
    fn test_loose_stools() {
        let mut ov = overview();
        ov.bowel_movement_stats.total_count = 10;
        ov.bowel_movement_stats.regularity_score = 0.9;
        let movements = movements_of(&[7, 7, 7, 7, 7, 4, 4, 4, 4, 4]);

        let insights = run_with(
            &ov,
            &CorrelationAnalysis::default(),
            &BehaviorPatterns::default(),
            &movements,
        );
        assert_eq!(messages(&insights), vec!["Loose stool pattern detected"]);
        assert_eq!(insights[0].priority, Priority::Medium);

        // Exactly 40% does not fire
        let boundary = movements_of(&[6, 6, 7, 7, 4, 4, 4, 4, 4, 4]);
        assert!(run_with(
            &ov,
            &CorrelationAnalysis::default(),
            &BehaviorPatterns::default(),
            &boundary
        )
        .is_empty());
    }

    #[test]
    fn test_strong_correlation_priority_by_confidence() {
        let corr = |factor: &str, strength: f64, confidence: f64| Correlation {
            factor: factor.to_string(),
            outcome: "Symptom Occurrence".to_string(),
            strength,
            confidence,
            description: "test".to_string(),
            sample_size: 40,
        };
        let analysis = CorrelationAnalysis {
            meal_symptom_correlations: vec![
                corr("Dairy", 0.8, 0.75),
                corr("Gluten", 0.9, 0.85),
                corr("Spicy Meals", 0.4, 0.95),
                corr("Spicy Meals", 0.9, 0.65),
            ],
            ..Default::default()
        };

        let insights = run(&overview(), &analysis, &BehaviorPatterns::default());
        assert_eq!(insights.len(), 2);
        assert_eq!(insights[0].priority, Priority::High);
        assert!(insights[0].message.contains("Gluten"));
        assert_eq!(insights[1].priority, Priority::Medium);
        assert_eq!(
            insights[1].action_items[1],
            "Try lactose-free alternatives"
        );
    }

    #[test]
    fn test_medication_and_symptom_rules() {
        let mut ov = overview();
        ov.medication_stats.total_medications = 4;
        ov.medication_stats.active_medications = 2;
        ov.medication_stats.adherence_score = 0.5;
        ov.symptom_stats.total_symptoms = 25;
        ov.symptom_stats.average_severity = 7.0;
        ov.symptom_stats.trend_direction = TrendDirection::Declining;

        let insights = run(&ov, &CorrelationAnalysis::default(), &BehaviorPatterns::default());
        assert_eq!(
            messages(&insights),
            vec![
                "Discuss persistent symptoms with a healthcare provider",
                "Improve medication adherence",
                "Symptoms are getting worse",
            ]
        );
        assert_eq!(insights[1].evidence, "2 of 4 medications are currently active");
        assert_eq!(insights[2].confidence, 0.65);
    }

    #[test]
    fn test_declining_with_little_data_is_ignored() {
        let mut ov = overview();
        ov.symptom_stats.total_symptoms = 5;
        ov.symptom_stats.average_severity = 4.0;
        ov.symptom_stats.trend_direction = TrendDirection::Declining;
        assert!(run(&ov, &CorrelationAnalysis::default(), &BehaviorPatterns::default()).is_empty());
    }

    struct AlwaysRule;

    impl InsightRule for AlwaysRule {
        fn id(&self) -> &'static str {
            "always"
        }

        fn evaluate(&self, _ctx: &InsightContext<'_>) -> Vec<Insight> {
            vec![Insight {
                insight_type: InsightType::Behavioral,
                category: "custom".to_string(),
                message: "custom rule".to_string(),
                evidence: String::new(),
                priority: Priority::Low,
                confidence: 0.5,
                action_items: vec![],
            }]
        }
    }

    #[test]
    fn test_register_custom_rule() {
        let mut engine = InsightEngine::empty();
        engine.register(Box::new(AlwaysRule));
        let ov = overview();
        let corr = CorrelationAnalysis::default();
        let patterns = BehaviorPatterns::default();
        let insights = engine.generate_insights(&InsightContext::new(&ov, &corr, &patterns, &[]));
        assert_eq!(messages(&insights), vec!["custom rule"]);
    }

    #[test]
    fn test_health_insights_placeholders_and_alert() {
        let ov = overview();
        let corr = CorrelationAnalysis::default();
        let patterns = BehaviorPatterns::default();
        let result = InsightEngine::new().health_insights(&InsightContext::new(&ov, &corr, &patterns, &[]));

        assert_eq!(result.key_findings.len(), 3);
        assert_eq!(result.risk_factors, vec!["No significant risk factors identified"]);
        assert_eq!(result.positive_factors, vec!["Maintaining baseline health indicators"]);
        assert_eq!(result.alert_level, Priority::Low);
        assert_eq!(result.confidence_level, 0.3);
    }

    #[test]
    fn test_alert_levels() {
        let mut ov = overview();
        ov.bowel_movement_stats.average_pain = 9.0;
        assert_eq!(alert_level(&ov, &risk_factors(&ov)), Priority::High);

        let mut ov = overview();
        ov.overall_health_score = 45.0;
        assert_eq!(alert_level(&ov, &risk_factors(&ov)), Priority::Medium);

        let mut ov = overview();
        ov.bowel_movement_stats.average_pain = 6.0;
        ov.bowel_movement_stats.total_count = 3;
        ov.bowel_movement_stats.regularity_score = 0.2;
        ov.symptom_stats.average_severity = 7.0;
        assert_eq!(risk_factors(&ov).len(), 3);
        assert_eq!(alert_level(&ov, &risk_factors(&ov)), Priority::Medium);
    }

    #[test]
    fn test_confidence_level_bounds() {
        let mut ov = overview();
        ov.meal_stats.total_meals = 60;
        assert_eq!(confidence_level(&ov), 0.6);
        ov.meal_stats.total_meals = 500;
        assert_eq!(confidence_level(&ov), 0.9);
    }

    #[test]
    fn test_recommendations_map_one_to_one() {
        let insights = vec![
            Insight {
                insight_type: InsightType::Lifestyle,
                category: "routine".to_string(),
                message: "Establish a consistent bathroom routine".to_string(),
                evidence: "irregular".to_string(),
                priority: Priority::High,
                confidence: 0.7,
                action_items: vec!["a".to_string()],
            },
            Insight {
                insight_type: InsightType::Dietary,
                category: "nutrition".to_string(),
                message: "Consider increasing fiber intake".to_string(),
                evidence: "low fiber".to_string(),
                priority: Priority::Medium,
                confidence: 0.8,
                action_items: vec![],
            },
        ];

        let now = t0();
        let recs = generate_recommendations(&insights, 75.0, now);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].id, format!("rec_{}_0", now.timestamp()));
        assert_eq!(recs[0].title, "Establish a consistent bathroom routine");
        assert_eq!(recs[0].evidence, vec!["irregular"]);
        assert_eq!(recs[0].timeline, "4-6 weeks");
        assert_eq!(recs[0].expires_at, now + Duration::weeks(4));
        assert_eq!(recs[1].timeline, "2-4 weeks");
        assert_eq!(recs[1].expires_at, now + Duration::weeks(8));
        assert_eq!(
            recs[1].expected_impact,
            "Moderate improvement expected within 4-6 weeks"
        );
    }

    #[test]
    fn test_low_score_appends_general_recommendation() {
        let now = t0();
        let recs = generate_recommendations(&[], 55.0, now);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].title, "Focus on Overall Health Improvement");
        assert_eq!(recs[0].priority, Priority::High);
        assert_eq!(recs[0].action_steps.len(), 4);
        assert_eq!(recs[0].expires_at, now + Duration::weeks(4));

        assert!(generate_recommendations(&[], 60.0, now).is_empty());
    }
}
