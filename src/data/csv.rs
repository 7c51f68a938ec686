use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;

use super::MarketDataProvider;
use crate::models::RawBar;
use crate::{Result, TradingError};

/// CSV record format. Missing cells deserialize to None and are left
/// for the cleaning step, matching provider-join semantics.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(alias = "Date", alias = "date", alias = "timestamp", alias = "Timestamp")]
    date: String,
    #[serde(alias = "Open", alias = "open")]
    open: Option<f64>,
    #[serde(alias = "High", alias = "high")]
    high: Option<f64>,
    #[serde(alias = "Low", alias = "low")]
    low: Option<f64>,
    #[serde(alias = "Close", alias = "close")]
    close: Option<f64>,
    #[serde(alias = "Volume", alias = "volume")]
    volume: Option<f64>,
}

/// Bar provider reading a local CSV file.
#[derive(Debug)]
pub struct CsvProvider {
    path: PathBuf,
}

impl CsvProvider {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(TradingError::DataFetch(format!(
                "CSV file not found: {}",
                path.display()
            )));
        }
        Ok(Self { path })
    }

    fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Ok(dt.with_timezone(&Utc));
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
            return Ok(Utc.from_utc_datetime(&dt));
        }
        if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            let dt = date.and_hms_opt(0, 0, 0).unwrap();
            return Ok(Utc.from_utc_datetime(&dt));
        }

        Err(TradingError::DataFetch(format!(
            "unrecognized timestamp format: {:?}",
            value
        )))
    }
}

#[async_trait]
impl MarketDataProvider for CsvProvider {
    async fn fetch(
        &self,
        _symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<RawBar>> {
        let mut reader = ::csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| TradingError::DataFetch(format!("failed to open CSV: {}", e)))?;

        let mut bars = Vec::new();

        for result in reader.deserialize() {
            let record: CsvRecord =
                result.map_err(|e| TradingError::DataFetch(format!("malformed CSV row: {}", e)))?;
            let timestamp = Self::parse_timestamp(&record.date)?;

            if timestamp < start || timestamp > end {
                continue;
            }

            bars.push(RawBar {
                timestamp,
                open: record.open,
                high: record.high,
                low: record.low,
                close: record.close,
                volume: record.volume,
            });
        }

        bars.sort_by_key(|b| b.timestamp);

        tracing::debug!("Loaded {} bars from {}", bars.len(), self.path.display());

        Ok(bars)
    }

    fn name(&self) -> &str {
        "csv"
    }
}
