//! Server command implementation

use std::path::Path;

use anyhow::Result;
use poo_core::AnalyticsConfig;

use super::open_db;

pub async fn cmd_serve(
    db_path: &Path,
    analytics: AnalyticsConfig,
    host: &str,
    port: u16,
    no_auth: bool,
    no_encrypt: bool,
) -> Result<()> {
    println!("🚀 Starting Poo Tracker web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);

    // Parse API keys from environment (comma-separated)
    let api_keys = poo_server::parse_api_keys(&std::env::var("POO_API_KEYS").unwrap_or_default());

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
    } else if api_keys.is_empty() {
        println!("   ❌ No API keys configured: every request except /api/health will be rejected");
        println!("      Set POO_API_KEYS or use --no-auth for local development");
    } else {
        println!(
            "   🔑 API keys: {} configured (POO_API_KEYS)",
            api_keys.len()
        );
    }
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path, no_encrypt)?;

    let config = poo_server::ServerConfig {
        require_auth: !no_auth,
        allowed_origins: vec![],
        api_keys,
    };

    poo_server::serve_with_config(db, analytics, host, port, config).await?;

    Ok(())
}
