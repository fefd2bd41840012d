//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use poo_core::models::{MealCategory, MedicationCategory, SymptomCategory, SymptomType};

/// Poo Tracker - Log digestive health and see what affects it
#[derive(Parser)]
#[command(name = "poo")]
#[command(about = "Self-hosted digestive health tracker and analytics", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "poo.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set POO_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    /// User the records belong to
    #[arg(long, default_value = "local", global = true)]
    pub user: String,

    /// Analytics config file (defaults to the user config dir, then built-in)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Show database status (encryption, record counts)
    Status,

    /// Log a record
    Log {
        #[command(subcommand)]
        action: LogAction,
    },

    /// Summaries and overall health score for a range
    Overview(RangeArgs),

    /// Health score over the configured data window
    Score {
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },

    /// Rule-based insights for a range
    Insights(RangeArgs),

    /// Recommendations over the configured data window
    Recommendations {
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },

    /// Trend direction of bowel movements, meals and symptoms
    Trends(RangeArgs),

    /// Meal, medication and trigger correlations
    Correlations(RangeArgs),

    /// Timing and distribution patterns
    Patterns(RangeArgs),

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        ///
        /// WARNING: Do not use this flag when exposing the server to a network.
        /// By default, the server requires an API key from POO_API_KEYS.
        #[arg(long)]
        no_auth: bool,
    },
}

/// Analysis range for the ranged reports
///
/// Dates are `YYYY-MM-DD` or RFC 3339. Without `--from`, the range covers
/// `--days` days (or the configured data window) ending at `--to` or now.
#[derive(Args, Debug, Clone, Default)]
pub struct RangeArgs {
    /// Number of days ending at --to (or now)
    #[arg(long, conflicts_with = "from")]
    pub days: Option<i64>,

    /// Range start
    #[arg(long)]
    pub from: Option<String>,

    /// Range end (a plain date covers the whole day)
    #[arg(long)]
    pub to: Option<String>,

    /// Print raw JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum LogAction {
    /// Log a bowel movement
    Bowel {
        /// Bristol Stool Scale type (1-7)
        #[arg(short, long)]
        bristol: u8,

        /// Pain (1-10)
        #[arg(long, default_value = "1")]
        pain: u8,

        /// Strain (1-10)
        #[arg(long, default_value = "1")]
        strain: u8,

        /// Satisfaction (1-10)
        #[arg(long, default_value = "5")]
        satisfaction: u8,

        #[arg(long)]
        notes: Option<String>,

        /// When it happened (defaults to now)
        #[arg(long)]
        at: Option<String>,
    },

    /// Log a meal
    Meal {
        /// What was eaten
        name: String,

        /// breakfast, lunch, dinner or snack
        #[arg(short, long)]
        category: Option<MealCategory>,

        #[arg(long, default_value = "0")]
        calories: u32,

        #[arg(long)]
        fiber: bool,

        #[arg(long)]
        dairy: bool,

        #[arg(long)]
        gluten: bool,

        /// Spice level (1-10)
        #[arg(long)]
        spicy: Option<u8>,

        /// Meal time (defaults to now)
        #[arg(long)]
        at: Option<String>,
    },

    /// Log a symptom
    Symptom {
        /// Symptom name
        name: String,

        /// Severity (1-10)
        #[arg(short, long)]
        severity: u8,

        /// digestive, abdominal, systemic, neurological or other
        #[arg(short, long)]
        category: Option<SymptomCategory>,

        /// bloating, cramps, nausea, heartburn, constipation, diarrhea, gas, fatigue or other
        #[arg(short = 't', long = "type")]
        symptom_type: Option<SymptomType>,

        /// Suspected triggers (comma-separated)
        #[arg(long, value_delimiter = ',')]
        triggers: Vec<String>,

        /// When it happened (defaults to now)
        #[arg(long)]
        at: Option<String>,
    },

    /// Record a medication
    Medication {
        /// Medication name
        name: String,

        #[arg(long)]
        dosage: Option<String>,

        /// Medication class (e.g. supplements, probiotics, laxatives)
        #[arg(short, long)]
        category: Option<MedicationCategory>,

        /// Start date (defaults to now)
        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        end: Option<String>,

        /// Record as no longer taken
        #[arg(long)]
        inactive: bool,
    },
}
