//! The run orchestrator.
//!
//! ```text
//! FETCH_SHARED_DATA ─> for each fund: COMPUTE ─> VALIDATE ─> RECONCILE ─> PERSIST ─> AGGREGATE
//! ```
//!
//! A failed shared fetch aborts the run before any fund is touched. Any
//! failure after that is confined to the fund it happened in.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::{Local, NaiveDate};
use tracing::{error, info, warn};
use uuid::Uuid;

use cascade_allocation::{FundRegistry, FundStrategy};
use cascade_config::{PipelineConfig, ValidationRulesDocument};
use cascade_core::dates::compact;
use cascade_core::{FundId, IdentifierMap, MarketSnapshot, SecurityId, WeightTable};
use cascade_ext_file::{RunMetadata, SavedArtifact, ValidationStatus, VersionedStore};
use cascade_traits::MarketDataGateway;
use cascade_validation::{ComplianceValidator, ReconciliationEngine, ReconciliationReport};

use crate::builder::RunOrchestratorBuilder;
use crate::error::{EngineError, EngineResult};
use crate::result::{RunOutcome, RunResult, RunSummary};

/// Sequences a daily run across every active fund.
pub struct RunOrchestrator {
    pub(crate) gateway: Arc<dyn MarketDataGateway>,
    pub(crate) registry: FundRegistry,
    pub(crate) store: VersionedStore,
    pub(crate) rules: ValidationRulesDocument,
    pub(crate) active_funds: Vec<FundId>,
    pub(crate) user: String,
}

impl RunOrchestrator {
    /// Starts a builder.
    pub fn builder() -> RunOrchestratorBuilder {
        RunOrchestratorBuilder::new()
    }

    /// Builds an orchestrator from the pipeline configuration, with the
    /// default fund registry.
    pub fn from_config(
        config: &PipelineConfig,
        gateway: Arc<dyn MarketDataGateway>,
        user: impl Into<String>,
    ) -> EngineResult<Self> {
        RunOrchestratorBuilder::new()
            .with_gateway(gateway)
            .with_store(VersionedStore::new(config.output_dir.clone()))
            .with_rules(config.validation.clone())
            .with_active_funds(config.active_fund_ids())
            .with_user(user)
            .build()
    }

    /// Store the orchestrator persists to.
    pub fn store(&self) -> &VersionedStore {
        &self.store
    }

    /// Funds processed by an unfiltered run.
    pub fn active_funds(&self) -> &[FundId] {
        &self.active_funds
    }

    /// Runs every active fund, or only `fund_filter`, for `date`.
    ///
    /// Never fails: aborts and fund failures are reported in the summary.
    pub async fn run(&self, date: NaiveDate, fund_filter: Option<&FundId>) -> RunSummary {
        let run_id = Uuid::new_v4();
        let started = Instant::now();

        let funds = match self.select_funds(fund_filter) {
            Ok(funds) => funds,
            Err(e) => return aborted(run_id, date, started, e),
        };
        info!(%run_id, date = %compact(date), funds = ?funds, "Starting run");

        let market = match self.fetch_shared(&funds, date).await {
            Ok(market) => market,
            Err(e) => return aborted(run_id, date, started, e),
        };

        let mut results = Vec::with_capacity(funds.len());
        for fund in &funds {
            let fund_started = Instant::now();
            info!(fund = %fund, "Processing fund");
            let result = match self.process_fund(run_id, fund, &market, fund_started) {
                Ok((saved, warnings)) => {
                    info!(
                        fund = %fund,
                        version = saved.version,
                        warnings = warnings.len(),
                        path = %saved.versioned_csv.display(),
                        "Fund completed"
                    );
                    RunResult::success(
                        fund.clone(),
                        fund_started.elapsed().as_secs_f64(),
                        saved.versioned_csv,
                        warnings,
                    )
                }
                Err(e) => {
                    error!(fund = %fund, error = %e, "Fund failed");
                    RunResult::failure(fund.clone(), fund_started.elapsed().as_secs_f64(), e.to_string())
                }
            };
            results.push(result);
        }

        let outcome = RunOutcome::from_results(&results);
        let summary = RunSummary {
            run_id,
            date,
            results,
            abort_reason: None,
            outcome,
            runtime_seconds: started.elapsed().as_secs_f64(),
        };
        info!(
            %run_id,
            outcome = %outcome,
            succeeded = summary.succeeded(),
            failed = summary.failed(),
            "Run finished"
        );
        summary
    }

    fn select_funds(&self, fund_filter: Option<&FundId>) -> EngineResult<Vec<FundId>> {
        if self.active_funds.is_empty() {
            return Err(EngineError::NoActiveFunds);
        }
        match fund_filter {
            None => Ok(self.active_funds.clone()),
            Some(fund) if self.active_funds.contains(fund) => Ok(vec![fund.clone()]),
            Some(fund) => Err(EngineError::UnknownFund {
                fund: fund.to_string(),
                available: self.active_funds.iter().map(ToString::to_string).collect(),
            }),
        }
    }

    // =========================================================================
    // SHARED FETCH
    // =========================================================================

    /// Fetches market caps and returns for the union of every fund's
    /// securities in one go.
    async fn fetch_shared(&self, funds: &[FundId], date: NaiveDate) -> EngineResult<MarketSnapshot> {
        let strategies: Vec<Arc<dyn FundStrategy>> =
            funds.iter().filter_map(|f| self.registry.get(f)).collect();

        let mut seen = HashSet::new();
        let market_cap_ids: Vec<SecurityId> = strategies
            .iter()
            .flat_map(|s| s.market_cap_ids())
            .filter(|id| seen.insert(id.clone()))
            .collect();
        let fixed_weight_ids: HashSet<SecurityId> =
            strategies.iter().flat_map(|s| s.fixed_weight_ids()).collect();
        let mut identifiers = IdentifierMap::new();
        for strategy in &strategies {
            identifiers.extend(strategy.return_identifiers());
        }

        info!(securities = market_cap_ids.len(), "Fetching market caps");
        let caps = self.gateway.market_caps(&market_cap_ids, date).await?;

        let returns = if identifiers.is_empty() {
            warn!("No return identifiers configured, returns will not be fetched");
            Default::default()
        } else {
            info!(securities = identifiers.len(), "Fetching returns");
            self.gateway.returns(&identifiers, date).await?
        };

        let mut market = MarketSnapshot::new(date);
        for (id, value) in caps {
            market = market.with_market_cap(id, value);
        }
        for id in fixed_weight_ids {
            market = market.with_fixed_weight(id);
        }
        for (id, value) in returns {
            market = market.with_return(id, value);
        }
        Ok(market)
    }

    // =========================================================================
    // PER FUND
    // =========================================================================

    fn process_fund(
        &self,
        run_id: Uuid,
        fund: &FundId,
        market: &MarketSnapshot,
        started: Instant,
    ) -> EngineResult<(SavedArtifact, Vec<String>)> {
        let strategy = self
            .registry
            .get(fund)
            .ok_or_else(|| EngineError::UnregisteredFund(fund.to_string()))?;
        let rules = self.rules.resolve(fund)?;

        let table = strategy.compute(market)?;

        let validation = ComplianceValidator::from_rules(&rules).validate_fund(&table);
        if !validation.is_valid() {
            return Err(EngineError::ValidationFailed {
                errors: validation.errors(),
            });
        }
        let mut warnings = validation.warnings();
        for warning in &warnings {
            warn!(fund = %fund, "{warning}");
        }

        let report = if rules.reconciliation.enabled {
            self.reconcile(fund, &table, rules.reconciliation.change_threshold_pct)?
        } else {
            info!(fund = %fund, "Reconciliation disabled");
            ReconciliationReport::empty()
        };
        for alert in &report.alerts {
            warn!(fund = %fund, "Reconciliation alert: {alert}");
        }
        warnings.extend(report.alerts.iter().cloned());
        warnings.extend(report.structural_notes());

        let metadata = RunMetadata::new(
            &table,
            Local::now().naive_local(),
            started.elapsed().as_secs_f64(),
            ValidationStatus::Passed,
            self.user.clone(),
        )
        .with_run_id(run_id);
        let saved = self.store.save(&table, metadata)?;
        Ok((saved, warnings))
    }

    fn reconcile(
        &self,
        fund: &FundId,
        table: &WeightTable,
        threshold_pct: f64,
    ) -> EngineResult<ReconciliationReport> {
        match self.store.previous_day(fund, table.date())? {
            Some(previous) => {
                let report = ReconciliationEngine::new(threshold_pct).compare(table, &previous);
                info!(
                    fund = %fund,
                    alerts = report.alerts.len(),
                    new = report.new_components.len(),
                    removed = report.removed_components.len(),
                    "Reconciled against previous day"
                );
                Ok(report)
            }
            None => {
                warn!(fund = %fund, "No previous day results, skipping reconciliation");
                Ok(ReconciliationReport::empty())
            }
        }
    }
}

fn aborted(run_id: Uuid, date: NaiveDate, started: Instant, reason: EngineError) -> RunSummary {
    error!(%run_id, reason = %reason, "Run aborted");
    RunSummary {
        run_id,
        date,
        results: Vec::new(),
        abort_reason: Some(reason.to_string()),
        outcome: RunOutcome::TotalFailure,
        runtime_seconds: started.elapsed().as_secs_f64(),
    }
}
