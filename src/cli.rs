//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use crate::db::Database;
use clap::Parser;
use std::time::Duration;
use tracing::{error, info};
use url::Url;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "Toolgate",
    about = "Account gateway for the tool storefront"
)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8085")]
    pub port: u16,

    /// Path to SQLite database file
    #[arg(short, long, default_value = "toolgate.db")]
    pub database: String,

    /// Upstream accounts API base origin (e.g., "https://api.example.vn")
    #[arg(short, long, env = "UPSTREAM_API_URL")]
    pub upstream: String,

    /// Upstream request timeout in seconds
    #[arg(long, default_value = "15")]
    pub timeout_secs: u64,

    /// Demo session lifetime in minutes
    #[arg(long, default_value = "30")]
    pub demo_ttl_minutes: i64,

    /// Set the Secure flag on cookies (enable when serving behind HTTPS)
    #[arg(long)]
    pub secure_cookies: bool,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Parse and validate the upstream base URL.
/// Returns None and logs an error if validation fails.
pub fn validate_upstream_url(upstream: &str) -> Option<Url> {
    let url = match Url::parse(upstream) {
        Ok(url) => url,
        Err(e) => {
            error!(upstream = %upstream, error = %e, "Invalid upstream URL");
            return None;
        }
    };

    let is_https = url.scheme() == "https";
    let is_local = matches!(url.host_str(), Some("localhost") | Some("127.0.0.1"));

    if !is_https && !is_local {
        error!("Upstream URL must use HTTPS for non-local deployments");
        return None;
    }

    Some(url)
}

/// Open the database, logging errors if it fails.
pub async fn open_database(path: &str) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => {
            info!(path = %path, "Database opened");
            Some(db)
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}

/// Build ServerConfig from validated arguments.
pub fn build_config(args: &Args, db: Database, upstream_url: Url) -> ServerConfig {
    ServerConfig {
        db,
        upstream_url,
        request_timeout: Duration::from_secs(args.timeout_secs),
        secure_cookies: args.secure_cookies,
        demo_session_ttl_minutes: args.demo_ttl_minutes,
    }
}
