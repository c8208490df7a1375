//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};

use super::open_db;

#[allow(clippy::too_many_arguments)]
pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_auth: bool,
    no_encrypt: bool,
    static_dir: Option<&Path>,
    allowed_origins: Vec<String>,
    company_profile: Option<&Path>,
) -> Result<()> {
    println!("🚀 Starting Lince web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }

    // Parse API keys from environment (comma-separated)
    let api_keys =
        lince_server::parse_api_keys(&std::env::var("LINCE_API_KEYS").unwrap_or_default());

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
    } else {
        println!("   🔒 Authentication: access proxy header");
        if !api_keys.is_empty() {
            println!(
                "   🔑 API keys: {} configured (LINCE_API_KEYS)",
                api_keys.len()
            );
        }
    }
    if !allowed_origins.is_empty() {
        println!("   🌐 CORS origins: {}", allowed_origins.join(", "));
    }
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path, no_encrypt)?;

    let config = lince_server::ServerConfig {
        require_auth: !no_auth,
        allowed_origins,
        api_keys,
        company_profile: company_profile.map(Path::to_path_buf),
    };

    let static_dir_str = static_dir
        .map(|p| p.to_str().context("static_dir path must be valid UTF-8"))
        .transpose()?;
    lince_server::serve_with_config(db, host, port, static_dir_str, config).await?;

    Ok(())
}
