//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod analytics;
pub mod health;
pub mod records;

// Re-export all handlers for use in router
pub use analytics::*;
pub use health::*;
pub use records::*;
