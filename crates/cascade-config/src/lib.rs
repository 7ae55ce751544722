//! Cascade Configuration Layer
//!
//! Configuration consumed by the allocation pipeline. A single TOML document
//! is loaded once at the entry point and handed down explicitly; nothing in
//! the workspace reads configuration from ambient state.
//!
//! # Features
//!
//! - **Validation rules**: UCITS cap, sum tolerances and reconciliation
//!   settings with a `global` section and per-fund `overrides`
//! - **Gateway settings**: endpoint, credentials, timeout and retry policy
//! - **Pipeline settings**: output directory and the active fund list
//!
//! # Example
//!
//! ```rust
//! use cascade_config::{PipelineConfig, Validate};
//! use cascade_core::FundId;
//!
//! let config = PipelineConfig::from_toml_str(r#"
//!     active_funds = ["vanguard_lifestrat"]
//!
//!     [gateway]
//!     base_url = "https://api.example.com/formula-api/v1"
//!     username = "analyst"
//!     api_key = "secret"
//!
//!     [validation.global]
//!     ucits_cap = 19.25
//! "#).unwrap();
//!
//! assert!(config.is_valid());
//! let rules = config.validation.resolve(&FundId::new("vanguard_lifestrat")).unwrap();
//! assert_eq!(rules.ucits_cap, 19.25);
//! assert_eq!(rules.reconciliation.change_threshold_pct, 5.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod gateway;
pub mod pipeline;
pub mod rules;

pub use error::{ConfigError, ConfigResult, Validate, ValidationError};
pub use gateway::GatewayConfig;
pub use pipeline::PipelineConfig;
pub use rules::{
    ReconciliationRules, ReconciliationSection, RulesSection, ValidationRules,
    ValidationRulesDocument,
};
