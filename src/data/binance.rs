use std::num::NonZeroU32;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use governor::{Quota, RateLimiter};
use reqwest::Client;

use super::MarketDataProvider;
use crate::models::RawBar;
use crate::{Result, TradingError};

const BINANCE_API_BASE: &str = "https://api.binance.com";
const RATE_LIMIT_RPM: u32 = 1200;
const MAX_RETRIES: u32 = 3;
const PAGE_LIMIT: usize = 1000;

// Type alias for the rate limiter to simplify signatures
type BinanceRateLimiter = RateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// One kline row as returned by the exchange: open time, OHLCV as
/// strings, close time, then fields this provider does not use.
type KlineRow = (
    i64,
    String,
    String,
    String,
    String,
    String,
    i64,
    String,
    i64,
    String,
    String,
    serde_json::Value,
);

/// Historical kline provider backed by the Binance REST API.
///
/// Shares one rate limiter across clones; requests are retried with
/// exponential backoff on 429 and server errors.
#[derive(Clone)]
pub struct BinanceProvider {
    client: Client,
    base_url: String,
    interval: String,
    rate_limiter: Arc<BinanceRateLimiter>,
}

impl BinanceProvider {
    pub fn new() -> Self {
        Self::with_base_url(BINANCE_API_BASE)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(RATE_LIMIT_RPM).unwrap());
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            interval: "1m".to_string(),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    pub fn with_interval(mut self, interval: &str) -> Self {
        self.interval = interval.to_string();
        self
    }

    /// Make a rate-limited API request with retry logic
    async fn make_request(&self, url: &str) -> Result<reqwest::Response> {
        for attempt in 1..=MAX_RETRIES {
            self.rate_limiter.until_ready().await;

            let response = self.client.get(url).send().await.map_err(|e| {
                TradingError::DataFetch(format!("Binance unreachable: {}", e))
            })?;
            let status = response.status();

            if status.is_success() {
                return Ok(response);
            }

            if status.as_u16() == 429 || status.is_server_error() {
                let backoff_secs = 2u64.pow(attempt);
                tracing::warn!(
                    "Binance returned {}, backing off for {}s (attempt {}/{})",
                    status,
                    backoff_secs,
                    attempt,
                    MAX_RETRIES
                );
                tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                continue;
            }

            return Err(TradingError::DataFetch(format!(
                "Binance request failed with status {}",
                status
            )));
        }

        Err(TradingError::DataFetch(format!(
            "Binance request failed after {} retries",
            MAX_RETRIES
        )))
    }

    fn parse_row(row: &KlineRow) -> Result<RawBar> {
        let timestamp = Utc
            .timestamp_millis_opt(row.0)
            .single()
            .ok_or_else(|| TradingError::DataFetch(format!("invalid kline open time {}", row.0)))?;

        let field = |value: &str, name: &str| -> Result<f64> {
            value.parse::<f64>().map_err(|_| {
                TradingError::DataFetch(format!("malformed kline {} field: {:?}", name, value))
            })
        };

        Ok(RawBar::complete(
            timestamp,
            field(&row.1, "open")?,
            field(&row.2, "high")?,
            field(&row.3, "low")?,
            field(&row.4, "close")?,
            field(&row.5, "volume")?,
        ))
    }
}

impl Default for BinanceProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataProvider for BinanceProvider {
    async fn fetch(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<RawBar>> {
        let mut bars = Vec::new();
        let mut cursor = start.timestamp_millis();
        let end_ms = end.timestamp_millis();

        while cursor < end_ms {
            let url = format!(
                "{}/api/v3/klines?symbol={}&interval={}&startTime={}&endTime={}&limit={}",
                self.base_url, symbol, self.interval, cursor, end_ms, PAGE_LIMIT
            );

            let response = self.make_request(&url).await?;
            let rows: Vec<KlineRow> = response.json().await.map_err(|e| {
                TradingError::DataFetch(format!("malformed klines response: {}", e))
            })?;

            if rows.is_empty() {
                break;
            }

            let last_open = rows.last().map(|r| r.0).unwrap_or(end_ms);
            for row in &rows {
                bars.push(Self::parse_row(row)?);
            }

            if rows.len() < PAGE_LIMIT {
                break;
            }
            cursor = last_open + 1;
        }

        tracing::debug!("Fetched {} klines for {} from Binance", bars.len(), symbol);

        Ok(bars)
    }

    fn name(&self) -> &str {
        "binance"
    }
}
