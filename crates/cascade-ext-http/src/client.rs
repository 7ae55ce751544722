//! HTTP client for the formula time-series API.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use cascade_config::GatewayConfig;
use cascade_core::dates::compact;
use cascade_core::{IdentifierMap, ReturnValue, SecurityId};
use cascade_traits::{GatewayError, MarketCapTable, MarketDataGateway, ReturnTable};

use crate::formula::{market_cap_formula, return_formula};
use crate::retry::RetryPolicy;

/// Column name under which [`FormulaApiClient::market_caps`] requests the
/// market-cap formula.
pub const MARKET_CAP_COLUMN: &str = "MarketCapIndex";

/// Metric values keyed by security, then by column name.
pub type MetricTable = BTreeMap<SecurityId, BTreeMap<String, f64>>;

type Row = Map<String, Value>;

/// Formula API gateway.
///
/// Credentials are passed in at construction and never logged.
#[derive(Debug, Clone)]
pub struct FormulaApiClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    api_key: String,
    retry: RetryPolicy,
}

impl FormulaApiClient {
    /// Creates a client. The username is sent upper-cased.
    pub fn new(
        base_url: impl Into<String>,
        username: &str,
        api_key: impl Into<String>,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Connection(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            username: username.to_uppercase(),
            api_key: api_key.into(),
            retry,
        })
    }

    /// Creates a client from configuration and an already-resolved API key.
    pub fn from_config(config: &GatewayConfig, api_key: impl Into<String>) -> Result<Self, GatewayError> {
        Self::new(
            config.base_url.clone(),
            &config.username,
            api_key,
            Duration::from_secs(config.timeout_seconds),
            RetryPolicy::from_config(config),
        )
    }

    /// Retry policy in force.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    fn time_series_url(&self) -> String {
        format!("{}/time-series", self.base_url.trim_end_matches('/'))
    }

    // =========================================================================
    // GENERIC FETCH
    // =========================================================================

    /// Fetches arbitrary metrics for `ids`.
    ///
    /// `metrics` pairs an output column name with a fully-built formula. Every
    /// id must come back with a numeric value for every metric, otherwise the
    /// call fails with [`GatewayError::MissingData`]. An empty id or metric
    /// list returns an empty table without a request.
    pub async fn fetch_metrics(
        &self,
        ids: &[SecurityId],
        metrics: &[(String, String)],
    ) -> Result<MetricTable, GatewayError> {
        if ids.is_empty() || metrics.is_empty() {
            return Ok(MetricTable::new());
        }
        let formulas: Vec<String> = metrics.iter().map(|(_, f)| f.clone()).collect();
        let rows = self.fetch_rows(ids, &formulas).await?;
        let by_id = index_rows(&rows)?;

        let mut table = MetricTable::new();
        let mut missing = Vec::new();
        for id in ids {
            let Some(row) = by_id.get(id.as_str()) else {
                missing.push(id.to_string());
                continue;
            };
            let mut values = BTreeMap::new();
            for (column, formula) in metrics {
                match row.get(formula).and_then(numeric) {
                    Some(v) => {
                        values.insert(column.clone(), v);
                    }
                    None => {
                        missing.push(id.to_string());
                        break;
                    }
                }
            }
            table.insert(id.clone(), values);
        }

        if !missing.is_empty() {
            warn!(ids = ?missing, "Response is missing requested values");
            return Err(GatewayError::missing_data(missing));
        }
        check_row_count(rows.len(), ids.len())?;
        Ok(table)
    }

    /// Sends one request per attempt and returns the `data` rows.
    async fn fetch_rows(&self, ids: &[SecurityId], formulas: &[String]) -> Result<Vec<Row>, GatewayError> {
        let ids_param = ids.iter().map(SecurityId::as_str).collect::<Vec<_>>().join(",");
        let formulas_param = formulas.join(",");
        self.retry
            .execute(|| self.request_once(&ids_param, &formulas_param))
            .await
    }

    async fn request_once(&self, ids: &str, formulas: &str) -> Result<Vec<Row>, GatewayError> {
        debug!(url = %self.time_series_url(), formulas, "Requesting time series");
        let response = self
            .http
            .get(self.time_series_url())
            .basic_auth(&self.username, Some(&self.api_key))
            .query(&[("ids", ids), ("formulas", formulas), ("flatten", "Y")])
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(GatewayError::Authentication(format!(
                "credentials rejected with status {}",
                status.as_u16()
            )));
        }
        let body = response.text().await.map_err(transport_error)?;
        if !status.is_success() {
            return Err(GatewayError::HttpStatus {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        parse_rows(&body)
    }
}

// =============================================================================
// GATEWAY
// =============================================================================

#[async_trait]
impl MarketDataGateway for FormulaApiClient {
    async fn market_caps(
        &self,
        ids: &[SecurityId],
        date: NaiveDate,
    ) -> Result<MarketCapTable, GatewayError> {
        let metrics = [(MARKET_CAP_COLUMN.to_string(), market_cap_formula(date))];
        let table = self.fetch_metrics(ids, &metrics).await?;
        let caps: MarketCapTable = table
            .into_iter()
            .filter_map(|(id, values)| values.get(MARKET_CAP_COLUMN).map(|v| (id, *v)))
            .collect();
        info!(count = caps.len(), date = %compact(date), "Fetched market caps");
        Ok(caps)
    }

    async fn returns(
        &self,
        identifiers: &IdentifierMap,
        date: NaiveDate,
    ) -> Result<ReturnTable, GatewayError> {
        if identifiers.is_empty() {
            return Ok(ReturnTable::new());
        }
        let ids: Vec<SecurityId> = identifiers.keys().cloned().collect();
        let formulas: Vec<String> = identifiers
            .values()
            .map(|vendor_id| return_formula(vendor_id, date))
            .collect();
        let rows = self.fetch_rows(&ids, &formulas).await?;
        let by_id = index_rows(&rows)?;

        let mut returns = ReturnTable::new();
        let mut absent = Vec::new();
        let mut no_data = Vec::new();
        for (id, formula) in ids.iter().zip(&formulas) {
            let Some(row) = by_id.get(id.as_str()) else {
                absent.push(id.to_string());
                continue;
            };
            let value = row.get(formula).and_then(numeric);
            if value.is_none() {
                no_data.push(id.to_string());
            }
            returns.insert(id.clone(), ReturnValue::from(value));
        }

        if !absent.is_empty() {
            warn!(ids = ?absent, "Return response is missing requested securities");
            return Err(GatewayError::missing_data(absent));
        }
        check_row_count(rows.len(), ids.len())?;
        if !no_data.is_empty() {
            warn!(ids = ?no_data, "No return data for some securities");
        }
        info!(count = returns.len(), date = %compact(date), "Fetched returns");
        Ok(returns)
    }
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

fn transport_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout(e.to_string())
    } else {
        GatewayError::Connection(e.to_string())
    }
}

fn parse_rows(body: &str) -> Result<Vec<Row>, GatewayError> {
    let json: Value = serde_json::from_str(body)
        .map_err(|e| GatewayError::MalformedResponse(format!("invalid JSON: {e}")))?;
    let data = match json.get("data") {
        Some(Value::Array(data)) => data,
        _ => return Err(GatewayError::DataUnavailable("response has no data".to_string())),
    };
    if data.is_empty() {
        return Err(GatewayError::DataUnavailable("response data is empty".to_string()));
    }
    data.iter()
        .map(|row| match row {
            Value::Object(row) => Ok(row.clone()),
            other => Err(GatewayError::MalformedResponse(format!(
                "expected an object row, got {other}"
            ))),
        })
        .collect()
}

fn index_rows(rows: &[Row]) -> Result<HashMap<&str, &Row>, GatewayError> {
    rows.iter()
        .map(|row| match row.get("requestId").and_then(Value::as_str) {
            Some(id) => Ok((id, row)),
            None => Err(GatewayError::MalformedResponse(
                "row without requestId".to_string(),
            )),
        })
        .collect()
}

fn check_row_count(rows: usize, requested: usize) -> Result<(), GatewayError> {
    if rows != requested {
        return Err(GatewayError::MalformedResponse(format!(
            "expected {requested} rows, got {rows}"
        )));
    }
    Ok(())
}

/// Numbers and numeric strings; anything else is missing.
fn numeric(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    v.is_finite().then_some(v)
}
