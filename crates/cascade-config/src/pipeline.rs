//! Top-level pipeline configuration file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use cascade_core::FundId;

use crate::error::{ConfigError, ConfigResult, Validate, ValidationError};
use crate::gateway::GatewayConfig;
use crate::rules::ValidationRulesDocument;

/// Everything a run needs, loaded from one TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Root of the versioned output tree.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Funds processed by a run, in order.
    #[serde(default)]
    pub active_funds: Vec<String>,

    /// Gateway settings.
    pub gateway: GatewayConfig,

    /// Validation rules document.
    #[serde(default)]
    pub validation: ValidationRulesDocument,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

impl PipelineConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Active funds as identifiers.
    pub fn active_fund_ids(&self) -> Vec<FundId> {
        self.active_funds.iter().map(FundId::new).collect()
    }
}

impl Validate for PipelineConfig {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.output_dir.as_os_str().is_empty() {
            errors.push(ValidationError::new("output_dir", "must not be empty"));
        }
        let mut seen = std::collections::HashSet::new();
        for fund in &self.active_funds {
            if !seen.insert(fund) {
                errors.push(ValidationError::new(
                    "active_funds",
                    format!("'{fund}' is listed twice"),
                ));
            }
        }
        errors.extend(self.gateway.validate().into_iter().map(|e| e.within("gateway")));
        errors.extend(
            self.validation
                .validate()
                .into_iter()
                .map(|e| e.within("validation")),
        );

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        output_dir = "out"
        active_funds = ["vanguard_lifestrat"]

        [gateway]
        base_url = "https://api.example.com"
        username = "analyst"
        api_key = "k"
        retry_delay_seconds = 0.5

        [validation.global]
        ucits_cap = 19.25

        [validation.global.reconciliation]
        enabled = true
        change_threshold_pct = 5.0
    "#;

    #[test]
    fn test_parse_sample() {
        let config = PipelineConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.active_fund_ids(), vec![FundId::new("vanguard_lifestrat")]);
        assert_eq!(config.gateway.retry_delay_seconds, 0.5);
        assert!(config.is_valid());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cascade.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        let config = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(config.active_funds.len(), 1);
    }

    #[test]
    fn test_missing_file() {
        let err = PipelineConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_malformed_toml() {
        let err = PipelineConfig::from_toml_str("active_funds = [").unwrap_err();
        assert!(matches!(err, ConfigError::Deserialization(_)));
    }

    #[test]
    fn test_duplicate_funds_rejected() {
        let mut config = PipelineConfig::from_toml_str(SAMPLE).unwrap();
        config.active_funds.push("vanguard_lifestrat".to_string());
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "active_funds");
    }
}
