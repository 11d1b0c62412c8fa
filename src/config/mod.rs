//! Client configuration (code > env).

use std::num::NonZeroU32;
use std::time::Duration;

use crate::error::{AuthError, Result};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for one identity-provider client.
///
/// # Example
/// ```
/// use std::num::NonZeroU32;
/// use twofold::config::AuthConfig;
///
/// let config = AuthConfig::new("https://api.example.com", "app-api-key")
///     .with_timeout(std::time::Duration::from_secs(10))
///     .with_max_verify_attempts(NonZeroU32::new(5).unwrap());
/// assert_eq!(config.base_url, "https://api.example.com");
/// ```
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Provider base URL, without a trailing slash.
    pub base_url: String,
    /// Application API key, sent as the `apikey` query parameter.
    pub api_key: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// How many rejected verification attempts are tolerated before the
    /// session fails.
    /// `None` means unlimited; the provider rate-limits either way.
    pub max_verify_attempts: Option<NonZeroU32>,
}

impl AuthConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
            max_verify_attempts: None,
        }
    }

    /// Load from `TWOFOLD_BASE_URL` and `TWOFOLD_API_KEY` (a `.env` file is
    /// honored when present).
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let base_url = std::env::var("TWOFOLD_BASE_URL")
            .map_err(|_| AuthError::Configuration("TWOFOLD_BASE_URL is not set".to_string()))?;
        let api_key = std::env::var("TWOFOLD_API_KEY")
            .map_err(|_| AuthError::Configuration("TWOFOLD_API_KEY is not set".to_string()))?;
        Ok(Self::new(base_url, api_key))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_verify_attempts(mut self, limit: NonZeroU32) -> Self {
        self.max_verify_attempts = Some(limit);
        self
    }
}
