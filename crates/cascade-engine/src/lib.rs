//! # Cascade Engine
//!
//! Daily run orchestration.
//!
//! This crate provides:
//! - [`RunOrchestrator`]: shared fetch, then per-fund compute, validate,
//!   reconcile and persist with failure isolation
//! - [`RunOrchestratorBuilder`]: wires the gateway, registry, store and rules
//! - [`RunResult`] / [`RunSummary`] / [`RunOutcome`]: what a run reports
//!
//! ## Architecture
//!
//! ```text
//! MarketDataGateway ─> MarketSnapshot ─┬─> fund A: strategy ─> validator ─> reconciliation ─> store
//!                                      │
//!                                      └─> fund B: ...
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let orchestrator = RunOrchestrator::builder()
//!     .with_gateway(gateway)
//!     .with_store(VersionedStore::new("output"))
//!     .with_rules(config.validation.clone())
//!     .with_active_funds(config.active_fund_ids())
//!     .build()?;
//!
//! let summary = orchestrator.run(date, None).await;
//! std::process::exit(summary.exit_code().into());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod error;
pub mod orchestrator;
pub mod result;

pub use builder::RunOrchestratorBuilder;
pub use error::{EngineError, EngineResult};
pub use orchestrator::RunOrchestrator;
pub use result::{RunOutcome, RunResult, RunStatus, RunSummary};
