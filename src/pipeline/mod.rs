// Feature engineering pipeline: raw bars in, standardized feature rows out
pub mod scaler;

use crate::indicators::{rolling_sma, rolling_std, wilder_rsi};
use crate::models::{Bar, RawBar};
use crate::{Result, TradingError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of standardized feature columns per row.
pub const FEATURE_DIM: usize = 11;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Window sizes for the derived columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Rolling window for realized volatility of log returns.
    pub vol_window: usize,
    /// Short simple moving average window.
    pub short_window: usize,
    /// Long simple moving average window.
    pub long_window: usize,
    /// RSI period (Wilder smoothing).
    pub rsi_period: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            vol_window: 20,
            short_window: 20,
            long_window: 50,
            rsi_period: 14,
        }
    }
}

impl FeatureConfig {
    /// Bars needed before the first feature row is defined.
    pub fn min_bars(&self) -> usize {
        let first_valid = self
            .vol_window
            .max(self.short_window - 1)
            .max(self.long_window - 1)
            .max(self.rsi_period)
            .max(1);
        first_valid + 1
    }
}

/// Timestamp-aligned feature record derived from one bar plus its
/// trailing window.
///
/// The eleven feature columns are standardized over the batch that
/// produced them; `price` keeps the raw close as the execution
/// reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub timestamp: DateTime<Utc>,
    /// Raw close price, never standardized.
    pub price: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub ret: f64,
    pub log_ret: f64,
    pub volatility: f64,
    pub sma_short: f64,
    pub sma_long: f64,
    pub rsi: f64,
}

impl FeatureVector {
    /// Feature columns in a fixed order, as fed to the oracle.
    pub fn as_array(&self) -> [f64; FEATURE_DIM] {
        [
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume,
            self.ret,
            self.log_ret,
            self.volatility,
            self.sma_short,
            self.sma_long,
            self.rsi,
        ]
    }
}

/// Cleans raw bars and derives standardized feature rows.
#[derive(Debug, Clone, Default)]
pub struct FeaturePipeline {
    config: FeatureConfig,
}

impl FeaturePipeline {
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Transform an ordered sequence of raw bars into feature rows.
    ///
    /// Bars with missing fields are dropped first; if nothing survives
    /// cleaning the whole call fails. Leading rows whose trailing
    /// windows are not yet full are excluded from the output — with
    /// fewer bars than the longest window this returns an empty vec,
    /// which is not an error.
    pub fn transform(&self, bars: &[RawBar]) -> Result<Vec<FeatureVector>> {
        if bars.is_empty() {
            return Err(TradingError::Preprocessing("no input bars".to_string()));
        }

        let clean: Vec<Bar> = bars.iter().filter_map(RawBar::clean).collect();
        let dropped = bars.len() - clean.len();
        if dropped > 0 {
            tracing::debug!("Dropped {} bars with missing fields", dropped);
        }

        if clean.is_empty() {
            return Err(TradingError::Preprocessing(
                "every bar was missing at least one OHLCV field".to_string(),
            ));
        }

        for pair in clean.windows(2) {
            if pair[1].timestamp < pair[0].timestamp {
                return Err(TradingError::Preprocessing(
                    "bars are not ordered by timestamp".to_string(),
                ));
            }
        }

        Ok(self.compute(&clean))
    }

    /// Derive and standardize feature rows from already-clean bars.
    pub fn compute(&self, bars: &[Bar]) -> Vec<FeatureVector> {
        let n = bars.len();
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

        // Simple and log returns, defined from the second bar
        let mut rets = vec![None; n];
        let mut log_rets = vec![None; n];
        for i in 1..n {
            rets[i] = Some((closes[i] - closes[i - 1]) / closes[i - 1]);
            log_rets[i] = Some((closes[i] / closes[i - 1]).ln());
        }

        // Realized volatility: rolling std of log returns, annualized.
        // log_series[j] belongs to bar j + 1.
        let log_series: Vec<f64> = log_rets.iter().flatten().copied().collect();
        let vol_raw = rolling_std(&log_series, self.config.vol_window);
        let annualize = TRADING_DAYS_PER_YEAR.sqrt();

        let sma_short = rolling_sma(&closes, self.config.short_window);
        let sma_long = rolling_sma(&closes, self.config.long_window);
        let rsi = wilder_rsi(&closes, self.config.rsi_period);

        let mut kept: Vec<(DateTime<Utc>, f64)> = Vec::new();
        let mut matrix: Vec<[f64; FEATURE_DIM]> = Vec::new();

        for i in 0..n {
            let vol = if i >= 1 { vol_raw[i - 1] } else { None };
            let row = (
                rets[i],
                log_rets[i],
                vol,
                sma_short[i],
                sma_long[i],
                rsi[i],
            );
            if let (Some(ret), Some(log_ret), Some(vol), Some(s), Some(l), Some(r)) = row {
                let bar = &bars[i];
                kept.push((bar.timestamp, bar.close));
                matrix.push([
                    bar.open,
                    bar.high,
                    bar.low,
                    bar.close,
                    bar.volume,
                    ret,
                    log_ret,
                    vol * annualize,
                    s,
                    l,
                    r,
                ]);
            }
        }

        scaler::standardize(&mut matrix);

        kept.into_iter()
            .zip(matrix)
            .map(|((timestamp, price), m)| FeatureVector {
                timestamp,
                price,
                open: m[0],
                high: m[1],
                low: m[2],
                close: m[3],
                volume: m[4],
                ret: m[5],
                log_ret: m[6],
                volatility: m[7],
                sma_short: m[8],
                sma_long: m[9],
                rsi: m[10],
            })
            .collect()
    }
}
