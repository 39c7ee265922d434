use std::collections::HashMap;

use chrono::DateTime;
use thiserror::Error;

use crate::models::{CoinSummary, OhlcSample, SampleTime};

/// One row of `/coins/{id}/ohlc`: `[timestamp_ms, open, high, low, close]`
pub type OhlcRow = [f64; 5];

/// `/simple/price` payload: coin id -> field name -> value
pub type SimplePriceResponse = HashMap<String, HashMap<String, Option<f64>>>;

/// Errors from the market data API
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// 400 Bad Request
    #[error("Bad Request: {0}")]
    BadRequest(String),
    /// 401 Unauthorized
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// 403 Forbidden
    #[error("Forbidden: {0}")]
    Forbidden(String),
    /// 404 Not Found
    #[error("Not Found: {0}")]
    NotFound(String),
    /// 429 Too Many Requests
    #[error("Rate Limited. Retry after {retry_after_secs} s")]
    RateLimited { retry_after_secs: u64 },
    /// 5xx Server Error
    #[error("Server Error ({0}): {1}")]
    ServerError(u16, String),
    /// Other HTTP errors
    #[error("HTTP Error ({0}): {1}")]
    HttpError(u16, String),
    /// Network/request error
    #[error("Request Error: {0}")]
    RequestError(String),
    /// Payload did not have the expected shape
    #[error("Deserialization Error: {0}")]
    DeserializationError(String),
}

/// Convert raw OHLC rows into a chronological series.
/// Rows whose timestamp is out of range are dropped.
pub fn rows_to_series(rows: &[OhlcRow]) -> Vec<OhlcSample> {
    let mut series: Vec<OhlcSample> = rows
        .iter()
        .filter_map(|&[ts, open, high, low, close]| {
            let time = DateTime::from_timestamp_millis(ts as i64)?;
            Some(OhlcSample::new(SampleTime::Instant(time), open, high, low, close))
        })
        .collect();

    series.sort_by_key(|s| match s.time {
        SampleTime::Instant(t) => t.timestamp_millis(),
        SampleTime::Ordinal(i) => i as i64,
    });
    series
}

/// Pick `<vs>`, `<vs>_market_cap` and `<vs>_24h_vol` for `coin_id`
pub fn summary_from_response(
    response: &SimplePriceResponse,
    coin_id: &str,
    vs_currency: &str,
) -> Result<CoinSummary, ApiError> {
    let fields = response
        .get(coin_id)
        .ok_or_else(|| ApiError::NotFound(format!("no price data for '{}'", coin_id)))?;

    let field = |name: String| -> Result<f64, ApiError> {
        fields
            .get(&name)
            .copied()
            .flatten()
            .ok_or_else(|| ApiError::DeserializationError(format!("missing field '{}'", name)))
    };

    Ok(CoinSummary {
        price: field(vs_currency.to_string())?,
        market_cap: field(format!("{}_market_cap", vs_currency))?,
        volume_24h: field(format!("{}_24h_vol", vs_currency))?,
    })
}
