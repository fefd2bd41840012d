//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `cmd_init` - Initialize the database
//! - `cmd_status` - Show encryption state and record counts

use std::path::Path;

use anyhow::{Context, Result};
use poo_core::db::{Database, DB_KEY_ENV};

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    // Migrations run on open
    open_db(db_path, no_encrypt)?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Log something: poo log bowel --bristol 4");
    println!("  2. See how you're doing: poo overview");
    println!("  3. Start the API: poo serve");

    Ok(())
}

pub fn cmd_status(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!();
    println!("📊 Poo Tracker Status");
    println!("   ─────────────────────────────────────────────");
    println!("   Database: {}", db_path.display());

    if !db_path.exists() {
        println!("   Size: (database not initialized)");
        println!();
        return Ok(());
    }

    if let Ok(metadata) = std::fs::metadata(db_path) {
        let size_kb = metadata.len() as f64 / 1024.0;
        if size_kb < 1024.0 {
            println!("   Size: {:.1} KB", size_kb);
        } else {
            println!("   Size: {:.1} MB", size_kb / 1024.0);
        }
    }

    let has_key = std::env::var(DB_KEY_ENV).is_ok();
    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else if has_key {
        println!("   🔒 Encryption: ENABLED ({}=***)", DB_KEY_ENV);
    } else {
        println!("   ❌ Encryption: REQUIRED but {} not set", DB_KEY_ENV);
    }

    match open_db(db_path, no_encrypt).and_then(|db| Ok(db.table_counts()?)) {
        Ok(counts) => {
            println!();
            for (table, count) in counts {
                println!("   {:<16} {}", table, count);
            }
        }
        Err(e) => {
            println!();
            println!("   ❌ Error opening database: {:#}", e);
            if !no_encrypt && !has_key {
                println!("      Set {} or use --no-encrypt", DB_KEY_ENV);
            }
        }
    }

    println!();
    Ok(())
}
