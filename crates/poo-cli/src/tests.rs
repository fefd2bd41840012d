//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use chrono::{Duration, TimeZone, Utc};
use clap::Parser;
use poo_core::analytics::AnalyticsService;
use poo_core::db::Database;
use poo_core::models::{MealCategory, SymptomType};
use poo_core::AnalyticsConfig;
use tempfile::TempDir;

use crate::cli::{Cli, Commands, LogAction, RangeArgs};
use crate::commands::{self, truncate, BowelArgs, MealArgs, MedicationArgs, SymptomArgs};

fn setup_test_db() -> Database {
    Database::in_memory().unwrap()
}

fn bowel(bristol_type: u8, days_ago: i64) -> BowelArgs {
    BowelArgs {
        bristol_type,
        pain: 2,
        strain: 2,
        satisfaction: 7,
        notes: None,
        at: Utc::now() - Duration::days(days_ago),
    }
}

// ========== Date Parsing Tests ==========

#[test]
fn test_parse_when_plain_date() {
    let start = commands::parse_when("2025-06-01", false).unwrap();
    assert_eq!(start, Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap());

    let end = commands::parse_when("2025-06-01", true).unwrap();
    assert_eq!(end.format("%Y-%m-%d %H:%M:%S").to_string(), "2025-06-01 23:59:59");
}

#[test]
fn test_parse_when_rfc3339() {
    let ts = commands::parse_when("2025-06-01T12:00:00-04:00", false).unwrap();
    assert_eq!(ts, Utc.with_ymd_and_hms(2025, 6, 1, 16, 0, 0).unwrap());
}

#[test]
fn test_parse_when_invalid() {
    let err = commands::parse_when("06/01/2025", false).unwrap_err();
    assert!(err.to_string().contains("Invalid date"));
}

#[test]
fn test_when_or_defaults_to_now() {
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
    assert_eq!(commands::when_or(None, now).unwrap(), now);
}

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a much longer string", 10), "a much ...");
    // Multi-byte characters are not split
    assert_eq!(truncate("ééééééé", 5), "éé...");
}

// ========== Range Tests ==========

#[test]
fn test_resolve_range_defaults_to_window() {
    let now = Utc.with_ymd_and_hms(2025, 6, 30, 12, 0, 0).unwrap();
    let (start, end) =
        commands::resolve_range(&RangeArgs::default(), Duration::days(30), now).unwrap();
    assert_eq!(end, now);
    assert_eq!(start, now - Duration::days(30));
}

#[test]
fn test_resolve_range_days() {
    let now = Utc.with_ymd_and_hms(2025, 6, 30, 12, 0, 0).unwrap();
    let range = RangeArgs {
        days: Some(7),
        ..Default::default()
    };
    let (start, end) = commands::resolve_range(&range, Duration::days(30), now).unwrap();
    assert_eq!(end - start, Duration::days(7));
}

#[test]
fn test_resolve_range_from_to() {
    let range = RangeArgs {
        from: Some("2025-06-01".to_string()),
        to: Some("2025-06-07".to_string()),
        ..Default::default()
    };
    let (start, end) = commands::resolve_range(&range, Duration::days(30), Utc::now()).unwrap();
    assert_eq!(start, Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap());
    assert!(end > Utc.with_ymd_and_hms(2025, 6, 7, 23, 59, 0).unwrap());
}

#[test]
fn test_resolve_range_rejects_zero_days() {
    let range = RangeArgs {
        days: Some(0),
        ..Default::default()
    };
    assert!(commands::resolve_range(&range, Duration::days(30), Utc::now()).is_err());
}

#[test]
fn test_resolve_range_rejects_huge_days() {
    let range = RangeArgs {
        days: Some(i64::MAX),
        ..Default::default()
    };
    let err = commands::resolve_range(&range, Duration::days(30), Utc::now()).unwrap_err();
    assert!(err.to_string().contains("--days must be between 1 and 3650"));

    let range = RangeArgs {
        days: Some(3650),
        ..Default::default()
    };
    assert!(commands::resolve_range(&range, Duration::days(30), Utc::now()).is_ok());
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_parse_log_meal_args() {
    let cli = Cli::try_parse_from([
        "poo", "--user", "sam", "log", "meal", "Bean chili", "-c", "dinner", "--fiber",
        "--spicy", "7",
    ])
    .unwrap();

    assert_eq!(cli.user, "sam");
    match cli.command {
        Commands::Log {
            action:
                LogAction::Meal {
                    name,
                    category,
                    fiber,
                    dairy,
                    spicy,
                    ..
                },
        } => {
            assert_eq!(name, "Bean chili");
            assert_eq!(category, Some(MealCategory::Dinner));
            assert!(fiber);
            assert!(!dairy);
            assert_eq!(spicy, Some(7));
        }
        _ => panic!("expected log meal"),
    }
}

#[test]
fn test_parse_symptom_triggers() {
    let cli = Cli::try_parse_from([
        "poo",
        "log",
        "symptom",
        "Bloating",
        "-s",
        "6",
        "--type",
        "bloating",
        "--triggers",
        "dairy,beans",
    ])
    .unwrap();

    match cli.command {
        Commands::Log {
            action:
                LogAction::Symptom {
                    triggers,
                    symptom_type,
                    ..
                },
        } => {
            assert_eq!(triggers, vec!["dairy", "beans"]);
            assert_eq!(symptom_type, Some(SymptomType::Bloating));
        }
        _ => panic!("expected log symptom"),
    }
}

#[test]
fn test_parse_global_defaults() {
    let cli = Cli::try_parse_from(["poo", "score", "--json"]).unwrap();
    assert_eq!(cli.user, "local");
    assert_eq!(cli.db.to_str(), Some("poo.db"));
    assert!(matches!(cli.command, Commands::Score { json: true }));
}

#[test]
fn test_days_conflicts_with_from() {
    let result = Cli::try_parse_from(["poo", "overview", "--days", "7", "--from", "2025-06-01"]);
    assert!(result.is_err());
}

#[test]
fn test_unknown_meal_category_is_rejected() {
    let result = Cli::try_parse_from(["poo", "log", "meal", "Toast", "-c", "brunch"]);
    assert!(result.is_err());
}

// ========== Database Command Tests ==========

#[test]
fn test_cmd_init_creates_tables() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("poo.db");

    commands::cmd_init(&path, true).unwrap();
    assert!(path.exists());

    let conn = rusqlite::Connection::open(&path).unwrap();
    let tables: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN \
             ('bowel_movements', 'meals', 'symptoms', 'medications')",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(tables, 4);
}

#[test]
fn test_cmd_status_before_init() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.db");

    commands::cmd_status(&path, true).unwrap();
    assert!(!path.exists());
}

#[test]
fn test_cmd_status_after_logging() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("poo.db");
    let db = commands::open_db(&path, true).unwrap();
    commands::cmd_log_bowel(&db, "local", bowel(4, 0)).unwrap();

    assert!(commands::cmd_status(&path, true).is_ok());
}

#[test]
fn test_cmd_log_bowel() {
    let db = setup_test_db();

    let id = commands::cmd_log_bowel(&db, "sam", bowel(3, 1)).unwrap();

    let stored = db.get_bowel_movement(id).unwrap().unwrap();
    assert_eq!(stored.user_id, "sam");
    assert_eq!(stored.bristol_type, 3);
}

#[test]
fn test_cmd_log_bowel_rejects_invalid_type() {
    let db = setup_test_db();

    let err = commands::cmd_log_bowel(&db, "sam", bowel(8, 0)).unwrap_err();

    assert!(format!("{:#}", err).contains("bristol_type"));
    assert!(db.list_bowel_movements("sam", 10, 0).unwrap().is_empty());
}

#[test]
fn test_cmd_log_meal() {
    let db = setup_test_db();

    let id = commands::cmd_log_meal(
        &db,
        "local",
        MealArgs {
            name: "Oatmeal".to_string(),
            category: Some(MealCategory::Breakfast),
            calories: 350,
            fiber_rich: true,
            dairy: true,
            gluten: false,
            spicy_level: None,
            at: Utc::now(),
        },
    )
    .unwrap();

    let meal = db.get_meal(id).unwrap().unwrap();
    assert_eq!(meal.name, "Oatmeal");
    assert!(meal.fiber_rich && meal.dairy);
    assert_eq!(meal.category, Some(MealCategory::Breakfast));
}

#[test]
fn test_cmd_log_symptom_drops_blank_triggers() {
    let db = setup_test_db();

    let id = commands::cmd_log_symptom(
        &db,
        "local",
        SymptomArgs {
            name: "Cramps".to_string(),
            severity: 5,
            category: None,
            symptom_type: Some(SymptomType::Cramps),
            triggers: vec![" coffee ".to_string(), "".to_string()],
            at: Utc::now(),
        },
    )
    .unwrap();

    let symptom = db.get_symptom(id).unwrap().unwrap();
    assert_eq!(symptom.triggers, vec!["coffee"]);
}

#[test]
fn test_cmd_log_medication_inactive() {
    let db = setup_test_db();
    let start = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();

    let id = commands::cmd_log_medication(
        &db,
        "local",
        MedicationArgs {
            name: "Loperamide".to_string(),
            dosage: Some("2mg".to_string()),
            category: None,
            start,
            end: Some(start + Duration::days(5)),
            active: false,
        },
    )
    .unwrap();

    let med = db.get_medication(id).unwrap().unwrap();
    assert!(!med.is_active);
    assert_eq!(med.start_date, Some(start));
}

#[test]
fn test_cmd_log_medication_end_before_start() {
    let db = setup_test_db();
    let start = Utc.with_ymd_and_hms(2025, 5, 10, 0, 0, 0).unwrap();

    let result = commands::cmd_log_medication(
        &db,
        "local",
        MedicationArgs {
            name: "Psyllium".to_string(),
            dosage: None,
            category: None,
            start,
            end: Some(start - Duration::days(1)),
            active: true,
        },
    );

    assert!(result.is_err());
}

// ========== Report Command Tests ==========

fn populated_service() -> AnalyticsService {
    let db = setup_test_db();
    for day in 0..10 {
        commands::cmd_log_bowel(&db, "local", bowel(if day % 3 == 0 { 2 } else { 4 }, day))
            .unwrap();
        commands::cmd_log_meal(
            &db,
            "local",
            MealArgs {
                name: "Lentil curry".to_string(),
                category: Some(MealCategory::Dinner),
                calories: 600,
                fiber_rich: day % 2 == 0,
                dairy: false,
                gluten: false,
                spicy_level: Some(6),
                at: Utc::now() - Duration::days(day) - Duration::hours(6),
            },
        )
        .unwrap();
    }
    AnalyticsService::from_database(db, AnalyticsConfig::default())
}

#[tokio::test]
async fn test_ranged_reports_run() {
    let service = populated_service();
    let range = RangeArgs {
        days: Some(14),
        ..Default::default()
    };

    commands::cmd_overview(&service, "local", &range).await.unwrap();
    commands::cmd_insights(&service, "local", &range).await.unwrap();
    commands::cmd_trends(&service, "local", &range).await.unwrap();
    commands::cmd_correlations(&service, "local", &range).await.unwrap();
    commands::cmd_patterns(&service, "local", &range).await.unwrap();
}

#[tokio::test]
async fn test_json_reports_run() {
    let service = populated_service();
    let range = RangeArgs {
        json: true,
        ..Default::default()
    };

    commands::cmd_overview(&service, "local", &range).await.unwrap();
    commands::cmd_score(&service, "local", true).await.unwrap();
    commands::cmd_recommendations(&service, "local", true).await.unwrap();
}

#[tokio::test]
async fn test_windowed_reports_on_empty_db() {
    let service = AnalyticsService::from_database(setup_test_db(), AnalyticsConfig::default());

    commands::cmd_score(&service, "local", false).await.unwrap();
    commands::cmd_recommendations(&service, "local", false).await.unwrap();
}

#[tokio::test]
async fn test_inverted_range_fails() {
    let service = AnalyticsService::from_database(setup_test_db(), AnalyticsConfig::default());
    let range = RangeArgs {
        from: Some("2025-06-10".to_string()),
        to: Some("2025-06-01".to_string()),
        ..Default::default()
    };

    let err = commands::cmd_trends(&service, "local", &range)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("invalid date range"));
}
