//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

/// Default base URL of the external GenAI service
pub const DEFAULT_GENAI_API_URL: &str = "http://localhost:8080";

#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Storage backend for user aggregates (postgres, memory)
    pub storage_provider: String,

    /// Database connection URL, required for the postgres provider
    pub database_url: Option<String>,

    /// Bearer token validation
    pub secret_key: String,
    pub algorithm: String,

    /// External GenAI service
    pub genai_provider: String,
    pub genai_api_url: String,
    pub genai_timeout_secs: u64,
    pub genai_speech_timeout_secs: u64,

    /// Message ingestion behavior
    pub generate_text_answers: bool,
    pub persist_generated_answers: bool,
    pub store_max_write_attempts: u32,

    /// Allowed CORS origins
    pub frontend_url: String,
    pub backend_url: String,

    /// Runtime configuration
    pub rust_log: String,
    pub port: u16,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("storage_provider", &self.storage_provider)
            .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
            .field("secret_key", &"[REDACTED]")
            .field("algorithm", &self.algorithm)
            .field("genai_provider", &self.genai_provider)
            .field("genai_api_url", &self.genai_api_url)
            .field("genai_timeout_secs", &self.genai_timeout_secs)
            .field("genai_speech_timeout_secs", &self.genai_speech_timeout_secs)
            .field("generate_text_answers", &self.generate_text_answers)
            .field("persist_generated_answers", &self.persist_generated_answers)
            .field("store_max_write_attempts", &self.store_max_write_attempts)
            .field("frontend_url", &self.frontend_url)
            .field("backend_url", &self.backend_url)
            .field("rust_log", &self.rust_log)
            .field("port", &self.port)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let storage_provider =
            env::var("STORAGE_PROVIDER").unwrap_or_else(|_| "postgres".to_string());
        let database_url = env::var("DATABASE_URL").ok();

        if storage_provider == "postgres" && database_url.is_none() {
            return Err(anyhow::anyhow!(
                "DATABASE_URL is required for the postgres storage provider"
            ));
        }

        let config = Self {
            storage_provider,
            database_url,

            secret_key: env::var("SECRET_KEY")
                .map_err(|_| anyhow::anyhow!("SECRET_KEY is required"))?,
            algorithm: env::var("ALGORITHM").unwrap_or_else(|_| "HS256".to_string()),

            genai_provider: env::var("GENAI_PROVIDER").unwrap_or_else(|_| "http".to_string()),
            genai_api_url: env::var("GENAI_API_URL")
                .unwrap_or_else(|_| DEFAULT_GENAI_API_URL.to_string()),
            genai_timeout_secs: parse_or("GENAI_TIMEOUT_SECS", 120),
            genai_speech_timeout_secs: parse_or("GENAI_SPEECH_TIMEOUT_SECS", 30),

            generate_text_answers: flag_or("GENERATE_TEXT_ANSWERS", false),
            persist_generated_answers: flag_or("PERSIST_GENERATED_ANSWERS", true),
            store_max_write_attempts: parse_or("STORE_MAX_WRITE_ATTEMPTS", 5),

            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            backend_url: env::var("BACKEND_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),

            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "chatvault=debug".to_string()),
            port: parse_or("PORT", 8000),
        };

        Ok(config)
    }

    /// Origins allowed to call the API from a browser
    pub fn cors_origins(&self) -> Vec<String> {
        vec![
            self.frontend_url.clone(),
            self.backend_url.clone(),
            self.genai_api_url.clone(),
        ]
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn flag_or(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(v) => matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}
