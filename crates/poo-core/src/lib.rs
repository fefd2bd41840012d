//! Poo Tracker Core Library
//!
//! Shared functionality for the poo-tracker health log:
//! - Encrypted SQLite storage for bowel movements, meals, symptoms and medications
//! - Record validation
//! - Repository traits consumed by the analytics engine
//! - The health analytics engine (summaries, score, correlations, trends, insights)
//! - Analytics configuration

pub mod analytics;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repository;
pub mod validation;

/// Test utilities: record fixtures and an in-memory mock store
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use analytics::AnalyticsService;
pub use config::AnalyticsConfig;
pub use db::Database;
pub use error::{Error, Result};
pub use repository::{
    BowelMovementRepository, MealRepository, MedicationRepository, SymptomRepository,
};
pub use validation::{FieldError, ValidationErrors};
