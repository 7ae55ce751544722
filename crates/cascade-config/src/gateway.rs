//! External data gateway settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult, Validate, ValidationError};

/// Settings for the formula API gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// API base URL (without the `/time-series` suffix).
    pub base_url: String,

    /// API username. Sent upper-cased.
    pub username: String,

    /// Inline API key. Takes precedence over `api_key_file`.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// File holding the API key.
    #[serde(default)]
    pub api_key_file: Option<PathBuf>,

    /// Per-request timeout.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Attempts per request, including the first.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Base delay for exponential backoff.
    #[serde(default = "default_retry_delay_seconds")]
    pub retry_delay_seconds: f64,
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_seconds() -> f64 {
    2.0
}

impl GatewayConfig {
    /// Creates a config with an inline key and default timing.
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            api_key: Some(api_key.into()),
            api_key_file: None,
            timeout_seconds: default_timeout_seconds(),
            retry_attempts: default_retry_attempts(),
            retry_delay_seconds: default_retry_delay_seconds(),
        }
    }

    /// Resolves the API key from the inline value or the key file.
    pub fn resolve_api_key(&self) -> ConfigResult<String> {
        if let Some(key) = &self.api_key {
            return Ok(key.trim().to_string());
        }
        let path = self
            .api_key_file
            .as_ref()
            .ok_or_else(|| ConfigError::MissingField {
                field: "api_key or api_key_file".to_string(),
                scope: "gateway".to_string(),
            })?;
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let key = content.trim().to_string();
        if key.is_empty() {
            return Err(ConfigError::Validation {
                field: "gateway.api_key_file".to_string(),
                message: format!("{} is empty", path.display()),
            });
        }
        Ok(key)
    }
}

impl Validate for GatewayConfig {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.base_url.trim().is_empty() {
            errors.push(ValidationError::new("base_url", "must not be empty"));
        }
        if self.username.trim().is_empty() {
            errors.push(ValidationError::new("username", "must not be empty"));
        }
        if self.api_key.is_none() && self.api_key_file.is_none() {
            errors.push(ValidationError::new(
                "api_key",
                "either api_key or api_key_file is required",
            ));
        }
        if self.timeout_seconds == 0 {
            errors.push(ValidationError::new("timeout_seconds", "must be positive"));
        }
        if self.retry_attempts == 0 {
            errors.push(ValidationError::new("retry_attempts", "must be at least 1"));
        }
        if !self.retry_delay_seconds.is_finite() || self.retry_delay_seconds < 0.0 {
            errors.push(ValidationError::new(
                "retry_delay_seconds",
                "must be a non-negative number",
            ));
        }

        errors
    }
}
