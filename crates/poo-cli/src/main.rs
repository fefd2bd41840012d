//! Poo Tracker CLI - Digestive health tracking and analytics
//!
//! Usage:
//!   poo init                        Initialize database
//!   poo log bowel --bristol 4       Log a bowel movement
//!   poo overview --days 14          Summaries and health score
//!   poo insights                    Rule-based insights
//!   poo serve --port 3000           Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;
use commands::{BowelArgs, MealArgs, MedicationArgs, SymptomArgs};
use poo_core::{AnalyticsConfig, AnalyticsService};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let load_config = || {
        AnalyticsConfig::load(cli.config.as_deref()).context("Failed to load analytics config")
    };
    let open_service = || -> Result<AnalyticsService> {
        let db = commands::open_db(&cli.db, cli.no_encrypt)?;
        Ok(AnalyticsService::from_database(db, load_config()?))
    };

    match &cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Status => commands::cmd_status(&cli.db, cli.no_encrypt),
        Commands::Log { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let now = Utc::now();
            let logged = match action {
                LogAction::Bowel {
                    bristol,
                    pain,
                    strain,
                    satisfaction,
                    notes,
                    at,
                } => commands::cmd_log_bowel(
                    &db,
                    &cli.user,
                    BowelArgs {
                        bristol_type: *bristol,
                        pain: *pain,
                        strain: *strain,
                        satisfaction: *satisfaction,
                        notes: notes.clone(),
                        at: commands::when_or(at.as_deref(), now)?,
                    },
                ),
                LogAction::Meal {
                    name,
                    category,
                    calories,
                    fiber,
                    dairy,
                    gluten,
                    spicy,
                    at,
                } => commands::cmd_log_meal(
                    &db,
                    &cli.user,
                    MealArgs {
                        name: name.clone(),
                        category: *category,
                        calories: *calories,
                        fiber_rich: *fiber,
                        dairy: *dairy,
                        gluten: *gluten,
                        spicy_level: *spicy,
                        at: commands::when_or(at.as_deref(), now)?,
                    },
                ),
                LogAction::Symptom {
                    name,
                    severity,
                    category,
                    symptom_type,
                    triggers,
                    at,
                } => commands::cmd_log_symptom(
                    &db,
                    &cli.user,
                    SymptomArgs {
                        name: name.clone(),
                        severity: *severity,
                        category: *category,
                        symptom_type: *symptom_type,
                        triggers: triggers.clone(),
                        at: commands::when_or(at.as_deref(), now)?,
                    },
                ),
                LogAction::Medication {
                    name,
                    dosage,
                    category,
                    start,
                    end,
                    inactive,
                } => commands::cmd_log_medication(
                    &db,
                    &cli.user,
                    MedicationArgs {
                        name: name.clone(),
                        dosage: dosage.clone(),
                        category: *category,
                        start: commands::when_or(start.as_deref(), now)?,
                        end: end
                            .as_deref()
                            .map(|e| commands::parse_when(e, true))
                            .transpose()?,
                        active: !*inactive,
                    },
                ),
            };
            logged.map(|_| ())
        }
        Commands::Overview(range) => {
            commands::cmd_overview(&open_service()?, &cli.user, range).await
        }
        Commands::Score { json } => commands::cmd_score(&open_service()?, &cli.user, *json).await,
        Commands::Insights(range) => {
            commands::cmd_insights(&open_service()?, &cli.user, range).await
        }
        Commands::Recommendations { json } => {
            commands::cmd_recommendations(&open_service()?, &cli.user, *json).await
        }
        Commands::Trends(range) => commands::cmd_trends(&open_service()?, &cli.user, range).await,
        Commands::Correlations(range) => {
            commands::cmd_correlations(&open_service()?, &cli.user, range).await
        }
        Commands::Patterns(range) => {
            commands::cmd_patterns(&open_service()?, &cli.user, range).await
        }
        Commands::Serve {
            port,
            host,
            no_auth,
        } => {
            commands::cmd_serve(
                &cli.db,
                load_config()?,
                host,
                *port,
                *no_auth,
                cli.no_encrypt,
            )
            .await
        }
    }
}
