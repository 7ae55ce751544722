//! Versioned CSV store.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use cascade_core::dates::compact;
use cascade_core::{FundId, Position, ReturnValue, WeightTable};

use crate::error::{StoreError, StoreResult};
use crate::metadata::RunMetadata;

/// Column headers of every weight file, in order.
pub const CSV_HEADERS: [&str; 7] = [
    "Date",
    "Fund ID",
    "Portfolio",
    "Benchmark ID",
    "Security ID",
    "Weight",
    "Return",
];

// =============================================================================
// CSV RECORD
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct WeightRecord {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Fund ID")]
    fund_id: String,
    #[serde(rename = "Portfolio")]
    portfolio: String,
    #[serde(rename = "Benchmark ID")]
    benchmark_id: String,
    #[serde(rename = "Security ID")]
    security_id: String,
    #[serde(rename = "Weight")]
    weight: String,
    #[serde(rename = "Return")]
    period_return: String,
}

impl WeightRecord {
    fn from_position(table: &WeightTable, position: &Position) -> Self {
        Self {
            date: compact(table.date()),
            fund_id: table.fund_id().to_string(),
            portfolio: position.portfolio_id.to_string(),
            benchmark_id: position.benchmark_id(),
            security_id: position.security_id.to_string(),
            weight: format_decimal(position.weight),
            period_return: format_decimal(position.period_return.value()),
        }
    }

    fn into_position(self, path: &Path) -> StoreResult<Position> {
        let (portfolio, security) = Position::split_benchmark_id(&self.benchmark_id)
            .map_err(|e| StoreError::corrupt(path, e.to_string()))?;
        if portfolio.as_str() != self.portfolio || security.as_str() != self.security_id {
            return Err(StoreError::corrupt(
                path,
                format!(
                    "benchmark id '{}' does not match {}/{}",
                    self.benchmark_id, self.portfolio, self.security_id
                ),
            ));
        }

        let weight = parse_decimal(&self.weight, path, "Weight")?;
        let period_return = ReturnValue::from(parse_decimal(&self.period_return, path, "Return")?);
        let position = match weight {
            Some(w) => Position::new(portfolio, security, w),
            None => Position::missing(portfolio, security),
        };
        Ok(position.with_return(period_return))
    }
}

fn format_decimal(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.9}")).unwrap_or_default()
}

fn parse_decimal(value: &str, path: &Path, column: &str) -> StoreResult<Option<f64>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<f64>()
        .map(Some)
        .map_err(|_| StoreError::corrupt(path, format!("invalid {column} value '{value}'")))
}

// =============================================================================
// STORE
// =============================================================================

/// Paths written by one save.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedArtifact {
    /// Immutable versioned CSV.
    pub versioned_csv: PathBuf,
    /// Latest pointer copy.
    pub latest_csv: PathBuf,
    /// Metadata record.
    pub metadata_json: PathBuf,
    /// Version number assigned to this save.
    pub version: u32,
}

/// Flat-file store rooted at an output directory.
#[derive(Debug, Clone)]
pub struct VersionedStore {
    root: PathBuf,
}

impl VersionedStore {
    /// Creates a store rooted at `root`. Nothing is created until the first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding every artifact of a fund and date.
    pub fn date_dir(&self, fund: &FundId, date: NaiveDate) -> PathBuf {
        self.root.join(fund.as_str()).join(compact(date))
    }

    /// Path of the latest pointer for a fund and date.
    pub fn latest_path(&self, fund: &FundId, date: NaiveDate) -> PathBuf {
        self.date_dir(fund, date)
            .join(format!("{}_latest.csv", file_prefix(fund, date)))
    }

    /// Persists `table`.
    ///
    /// The versioned file is staged in the date directory and published
    /// without clobbering, so two saves of the same fund and date within one
    /// second fail with [`StoreError::VersionExists`] instead of overwriting.
    /// When publishing the latest copy or the metadata fails, the versioned
    /// file is removed again and the error returned. The version number is
    /// the count of versioned files after the write.
    pub fn save(
        &self,
        table: &WeightTable,
        mut metadata: RunMetadata,
    ) -> StoreResult<SavedArtifact> {
        let fund = table.fund_id();
        let date = table.date();
        let dir = self.date_dir(fund, date);
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;

        let stem = format!(
            "{}_{}",
            file_prefix(fund, date),
            metadata.run_timestamp.format("%H%M%S")
        );
        let versioned_csv = dir.join(format!("{stem}.csv"));
        let latest_csv = self.latest_path(fund, date);
        let metadata_json = dir.join(format!("{stem}.json"));

        let staged = stage_table(&dir, table)?;
        if let Err(e) = staged.persist_noclobber(&versioned_csv) {
            if e.error.kind() == ErrorKind::AlreadyExists {
                return Err(StoreError::VersionExists {
                    path: versioned_csv,
                });
            }
            return Err(StoreError::io(&versioned_csv, e.error));
        }
        debug!(path = %versioned_csv.display(), rows = table.len(), "versioned file written");

        let published = self.publish(table, &dir, &latest_csv, &metadata_json, &mut metadata);
        let version = match published {
            Ok(version) => version,
            Err(e) => {
                discard(&versioned_csv);
                discard(&metadata_json);
                return Err(e);
            }
        };

        info!(
            fund = %fund,
            date = %compact(date),
            version,
            path = %versioned_csv.display(),
            "weights persisted"
        );

        Ok(SavedArtifact {
            versioned_csv,
            latest_csv,
            metadata_json,
            version,
        })
    }

    /// Replaces the latest pointer and writes the metadata record.
    fn publish(
        &self,
        table: &WeightTable,
        dir: &Path,
        latest_csv: &Path,
        metadata_json: &Path,
        metadata: &mut RunMetadata,
    ) -> StoreResult<u32> {
        stage_table(dir, table)?
            .persist(latest_csv)
            .map_err(|e| StoreError::io(latest_csv, e.error))?;

        let versions = self.versions(table.fund_id(), table.date())?;
        let version = u32::try_from(versions.len()).unwrap_or(u32::MAX);
        metadata.version = version;
        let json = serde_json::to_string_pretty(metadata)?;
        fs::write(metadata_json, json).map_err(|e| StoreError::io(metadata_json, e))?;
        Ok(version)
    }

    /// Loads the latest table of a fund and date, if one was saved.
    pub fn load_latest(&self, fund: &FundId, date: NaiveDate) -> StoreResult<Option<WeightTable>> {
        let path = self.latest_path(fund, date);
        if !path.exists() {
            return Ok(None);
        }
        read_table(&path, fund, date).map(Some)
    }

    /// Loads the latest table of the calendar day before `date`.
    ///
    /// Only `date - 1` is consulted; older days are never used as a fallback.
    pub fn previous_day(&self, fund: &FundId, date: NaiveDate) -> StoreResult<Option<WeightTable>> {
        match date.pred_opt() {
            Some(previous) => self.load_latest(fund, previous),
            None => Ok(None),
        }
    }

    /// Versioned files of a fund and date, oldest first. The latest pointer
    /// is not a version.
    pub fn versions(&self, fund: &FundId, date: NaiveDate) -> StoreResult<Vec<PathBuf>> {
        let dir = self.date_dir(fund, date);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let prefix = format!("{}_", file_prefix(fund, date));
        let latest = format!("{}_latest.csv", file_prefix(fund, date));

        let entries = fs::read_dir(&dir).map_err(|e| StoreError::io(&dir, e))?;
        let mut versions = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&dir, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with(&prefix) && name.ends_with(".csv") && name != latest {
                versions.push(entry.path());
            }
        }
        versions.sort();
        Ok(versions)
    }

    /// Reads a metadata record.
    pub fn load_metadata(&self, path: &Path) -> StoreResult<RunMetadata> {
        let content = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        Ok(serde_json::from_str(&content)?)
    }
}

fn file_prefix(fund: &FundId, date: NaiveDate) -> String {
    format!("{}_{}", fund, compact(date))
}

/// Writes `table` to an anonymous file in `dir`, removed on drop unless persisted.
fn stage_table(dir: &Path, table: &WeightTable) -> StoreResult<NamedTempFile> {
    let mut staged = NamedTempFile::new_in(dir).map_err(|e| StoreError::io(dir, e))?;
    let mut writer = csv::Writer::from_writer(staged.as_file_mut());
    if table.is_empty() {
        writer.write_record(CSV_HEADERS)?;
    }
    for position in table.positions() {
        writer.serialize(WeightRecord::from_position(table, position))?;
    }
    writer.flush().map_err(csv::Error::from)?;
    drop(writer);
    Ok(staged)
}

fn discard(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "removed partial artifact"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to remove partial artifact")
        }
    }
}

fn read_table(path: &Path, fund: &FundId, date: NaiveDate) -> StoreResult<WeightTable> {
    let expected_date = compact(date);
    let mut reader = csv::Reader::from_path(path)?;
    let mut positions = Vec::new();
    for record in reader.deserialize() {
        let record: WeightRecord = record?;
        if record.date != expected_date {
            return Err(StoreError::corrupt(
                path,
                format!("row dated {} in a {} file", record.date, expected_date),
            ));
        }
        positions.push(record.into_position(path)?);
    }
    Ok(WeightTable::from_positions(fund.clone(), date, positions)?)
}
