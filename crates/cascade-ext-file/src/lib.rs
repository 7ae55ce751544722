//! # Cascade Ext File
//!
//! Flat-file system of record for computed weight tables.
//!
//! Every save writes three artifacts under `{root}/{fund}/{YYYYMMDD}/`:
//! - `{fund}_{date}_{HHMMSS}.csv`: immutable versioned copy
//! - `{fund}_{date}_latest.csv`: overwritten pointer to the newest version
//! - `{fund}_{date}_{HHMMSS}.json`: run metadata
//!
//! Reconciliation reads the previous day's latest copy back through
//! [`VersionedStore::previous_day`].

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod metadata;
mod store;

pub use error::{StoreError, StoreResult};
pub use metadata::{RunMetadata, ValidationStatus, ENGINE_VERSION};
pub use store::{SavedArtifact, VersionedStore, CSV_HEADERS};
