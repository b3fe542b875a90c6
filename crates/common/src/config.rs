//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config. The backend base URL is
//! the only behavior-bearing value; it is read once at process start.

use anyhow::Result;
use std::env;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the Cropsight backend API, without a trailing slash
    pub api_base_url: String,

    /// Runtime configuration
    pub rust_log: String,
}

impl ClientConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let api_base_url = env::var("API_BASE_URL")
            .map_err(|_| anyhow::anyhow!("API_BASE_URL is required"))?;

        Ok(Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "cropsight=debug".to_string()),
        })
    }
}
