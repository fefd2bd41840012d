//! Error types for poo-tracker

use std::time::Duration;

use thiserror::Error;

use crate::validation::ValidationErrors;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    /// Analysis window where `start` is after `end`
    #[error("invalid date range for analysis")]
    InvalidDateRange,

    /// A repository fetch failed; `entity` names what was being loaded
    #[error("failed to get {entity}: {source}")]
    Fetch {
        entity: &'static str,
        #[source]
        source: Box<Error>,
    },

    #[error("analysis timed out after {0:?}")]
    Timeout(Duration),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl Error {
    /// Wrap a repository error with the entity it was fetching
    pub fn fetch(entity: &'static str, source: Error) -> Self {
        Error::Fetch {
            entity,
            source: Box::new(source),
        }
    }

    /// Innermost error, looking through any `Fetch` wrappers
    pub fn root(&self) -> &Error {
        match self {
            Error::Fetch { source, .. } => source.root(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
