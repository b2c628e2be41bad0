//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honoured for local development.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// The only email address allowed into the admin console
    pub admin_email: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Firebase project whose Auth ID tokens are accepted
    pub firebase_project_id: String,
    /// Server port
    pub port: u16,
    /// Page the session gate redirects rejected visitors to
    pub login_page: String,
    /// Directory holding the static site pages
    pub static_dir: String,
    /// Frontend origin allowed by CORS
    pub frontend_url: String,

    /// HS256 key for session tokens (raw bytes)
    pub session_signing_key: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let admin_email = env::var("ADMIN_EMAIL")
            .map(|v| v.trim().to_string())
            .map_err(|_| ConfigError::Missing("ADMIN_EMAIL"))?;
        if admin_email.is_empty() {
            return Err(ConfigError::Invalid("ADMIN_EMAIL", "must not be empty"));
        }

        let gcp_project_id =
            env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string());

        Ok(Self {
            admin_email,
            firebase_project_id: env::var("FIREBASE_PROJECT_ID")
                .unwrap_or_else(|_| gcp_project_id.clone()),
            gcp_project_id,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            login_page: env::var("LOGIN_PAGE").unwrap_or_else(|_| "/login.html".to_string()),
            static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "public".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            session_signing_key: env::var("SESSION_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("SESSION_SIGNING_KEY"))?
                .into_bytes(),
        })
    }

    /// Session cookies carry `Secure` unless the frontend is plain HTTP.
    pub fn secure_cookies(&self) -> bool {
        !self.frontend_url.starts_with("http://")
    }

    /// Config for tests: known admin address and signing key.
    pub fn test_default() -> Self {
        Self {
            admin_email: "admin@example.com".to_string(),
            gcp_project_id: "test-project".to_string(),
            firebase_project_id: "test-project".to_string(),
            port: 8080,
            login_page: "/login.html".to_string(),
            static_dir: "public".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            session_signing_key: b"test_session_key_32_bytes_min!!!".to_vec(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}
