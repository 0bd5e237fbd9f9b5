use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    pub vector_index_url: String,
    pub vector_api_key: String,
    pub listings_api_url: String,
    pub listings_api_key: String,
    /// Vector index namespace holding the job records. One namespace is
    /// shared by all requests; see `pipeline::index_sync` for the tradeoff.
    pub vector_namespace: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            vector_index_url: require_env("VECTOR_INDEX_URL")?,
            vector_api_key: require_env("VECTOR_API_KEY")?,
            listings_api_url: require_env("LISTINGS_API_URL")?,
            listings_api_key: require_env("LISTINGS_API_KEY")?,
            vector_namespace: std::env::var("VECTOR_NAMESPACE")
                .unwrap_or_else(|_| "job-list".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
