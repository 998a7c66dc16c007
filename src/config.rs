//! Application configuration loaded from environment variables.
//!
//! Secrets are injected as environment variables by the deployment
//! (Cloud Run secret bindings) and read once at startup.

use crate::services::wizard::{WizardLimits, DEFAULT_MAX_REPETITIONS, DEFAULT_MAX_SERIES};
use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// User ID allowed to use admin features
    pub admin_user_id: Option<String>,
    /// Path to the bundled strength standards dataset
    pub standards_path: String,
    /// Offset (minutes east of UTC) used for calendar days and labels
    pub display_utc_offset_minutes: i32,
    /// Bounds for the set wizard
    pub wizard_limits: WizardLimits,

    // --- Secrets ---
    /// HS256 key shared with the auth provider (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Bearer secret expected on `/tasks/*` routes
    pub tasks_secret: String,
}

impl Config {
    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            admin_user_id: Some("admin-user".to_string()),
            standards_path: "data/strength_standards.json".to_string(),
            display_utc_offset_minutes: 0,
            wizard_limits: WizardLimits::default(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            tasks_secret: "test_tasks_secret".to_string(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: parse_or("PORT", 8080)?,
            admin_user_id: env::var("ADMIN_USER_ID")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            standards_path: env::var("STANDARDS_PATH")
                .unwrap_or_else(|_| "data/strength_standards.json".to_string()),
            display_utc_offset_minutes: parse_or("DISPLAY_UTC_OFFSET_MINUTES", 0)?,
            wizard_limits: WizardLimits {
                max_series: parse_or("WIZARD_MAX_SERIES", DEFAULT_MAX_SERIES)?,
                max_repetitions: parse_or("WIZARD_MAX_REPETITIONS", DEFAULT_MAX_REPETITIONS)?,
            },

            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            tasks_secret: env::var("TASKS_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("TASKS_SECRET"))?,
        })
    }

    pub fn is_admin(&self, user_id: &str) -> bool {
        self.admin_user_id.as_deref() == Some(user_id)
    }
}

/// Parse an optional variable, using `default` when unset.
fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
