use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, RETRY_AFTER};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::models::{rows_to_series, summary_from_response, ApiError, OhlcRow, SimplePriceResponse};
use crate::models::{CoinSummary, OhlcSample};

/// CoinGecko market data client
pub struct CoinGeckoClient {
    http_client: HttpClient,
    api_key: Option<String>,
    base_url: String,
}

impl CoinGeckoClient {
    const DEFAULT_BASE_URL: &'static str = "https://api.coingecko.com/api/v3";
    const API_KEY_HEADER: &'static str = "x-cg-demo-api-key";

    /// Create a new client; `api_key` is the optional demo key
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, Self::DEFAULT_BASE_URL.to_string())
    }

    /// Create a new client with custom base URL (for testing)
    pub fn with_base_url(api_key: Option<String>, base_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            base_url,
        }
    }

    fn create_headers(&self) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(key) = &self.api_key {
            let value = HeaderValue::from_str(key)
                .map_err(|e| ApiError::RequestError(format!("Invalid API key header: {}", e)))?;
            headers.insert(Self::API_KEY_HEADER, value);
        }

        Ok(headers)
    }

    /// Map a non-success response onto an error variant
    async fn handle_error_response(status: reqwest::StatusCode, response: reqwest::Response) -> ApiError {
        let status_code = status.as_u16();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());
        let body_text = response.text().await.unwrap_or_default();

        match status_code {
            400 => ApiError::BadRequest(body_text),
            401 => ApiError::Unauthorized(body_text),
            403 => ApiError::Forbidden(body_text),
            404 => ApiError::NotFound(body_text),
            429 => {
                let retry_after_secs = retry_after.unwrap_or(60);
                warn!("Rate limited by CoinGecko, retry after {} s", retry_after_secs);
                ApiError::RateLimited { retry_after_secs }
            }
            500..=599 => {
                warn!("Server error {}: {}", status_code, body_text);
                ApiError::ServerError(status_code, body_text)
            }
            _ => ApiError::HttpError(status_code, body_text),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let headers = self.create_headers()?;
        debug!("GET {} {:?}", url, query);

        let response = self
            .http_client
            .get(&url)
            .headers(headers)
            .query(query)
            .send()
            .await
            .map_err(|e| ApiError::RequestError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Self::handle_error_response(status, response).await);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::DeserializationError(format!("Failed to parse response: {}", e)))
    }

    /// GET /coins/{id}/ohlc
    ///
    /// Candles for the last `days` days, oldest first.
    pub async fn fetch_ohlc(
        &self,
        coin_id: &str,
        vs_currency: &str,
        days: &str,
    ) -> Result<Vec<OhlcSample>, ApiError> {
        let rows: Vec<OhlcRow> = self
            .get_json(
                &format!("/coins/{}/ohlc", coin_id),
                &[("vs_currency", vs_currency), ("days", days)],
            )
            .await?;

        let series = rows_to_series(&rows);
        if series.len() != rows.len() {
            warn!("Dropped {} OHLC rows with invalid timestamps", rows.len() - series.len());
        }
        Ok(series)
    }

    /// GET /simple/price
    ///
    /// Spot price, market cap and 24h volume.
    pub async fn fetch_summary(&self, coin_id: &str, vs_currency: &str) -> Result<CoinSummary, ApiError> {
        let response: SimplePriceResponse = self
            .get_json(
                "/simple/price",
                &[
                    ("ids", coin_id),
                    ("vs_currencies", vs_currency),
                    ("include_market_cap", "true"),
                    ("include_24hr_vol", "true"),
                ],
            )
            .await?;

        summary_from_response(&response, coin_id, vs_currency)
    }
}
