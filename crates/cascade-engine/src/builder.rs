//! Builder for the run orchestrator.

use std::sync::Arc;

use cascade_allocation::FundRegistry;
use cascade_config::ValidationRulesDocument;
use cascade_core::FundId;
use cascade_ext_file::VersionedStore;
use cascade_traits::MarketDataGateway;

use crate::error::{EngineError, EngineResult};
use crate::orchestrator::RunOrchestrator;

/// Builder for constructing a [`RunOrchestrator`].
#[derive(Default)]
pub struct RunOrchestratorBuilder {
    gateway: Option<Arc<dyn MarketDataGateway>>,
    registry: Option<FundRegistry>,
    store: Option<VersionedStore>,
    rules: ValidationRulesDocument,
    active_funds: Vec<FundId>,
    user: Option<String>,
}

impl RunOrchestratorBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the market data gateway.
    pub fn with_gateway(mut self, gateway: Arc<dyn MarketDataGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Set the fund registry. Defaults to [`FundRegistry::with_defaults`].
    pub fn with_registry(mut self, registry: FundRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Set the versioned store.
    pub fn with_store(mut self, store: VersionedStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the validation rules document.
    pub fn with_rules(mut self, rules: ValidationRulesDocument) -> Self {
        self.rules = rules;
        self
    }

    /// Set the funds processed by an unfiltered run, in order.
    pub fn with_active_funds(mut self, funds: impl IntoIterator<Item = FundId>) -> Self {
        self.active_funds = funds.into_iter().collect();
        self
    }

    /// Set the user recorded in run metadata.
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Build the orchestrator.
    pub fn build(self) -> EngineResult<RunOrchestrator> {
        let gateway = self
            .gateway
            .ok_or_else(|| EngineError::Configuration("gateway not configured".into()))?;
        let store = self
            .store
            .ok_or_else(|| EngineError::Configuration("store not configured".into()))?;
        let registry = match self.registry {
            Some(registry) => registry,
            None => FundRegistry::with_defaults()?,
        };

        Ok(RunOrchestrator {
            gateway,
            registry,
            store,
            rules: self.rules,
            active_funds: self.active_funds,
            user: self.user.unwrap_or_else(|| "unknown".to_string()),
        })
    }
}
