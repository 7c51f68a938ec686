// Market data providers and the multi-provider join
pub mod binance;
pub mod csv;
pub mod join;

pub use binance::BinanceProvider;
pub use csv::CsvProvider;
pub use join::outer_join;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::RawBar;
use crate::Result;

/// Historical bar source.
///
/// Implementations return bars ordered by timestamp for the requested
/// range. A provider may populate only a subset of OHLCV fields; the
/// cleaning step downstream decides what survives.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<RawBar>>;

    /// Provider name, used in logs.
    fn name(&self) -> &str;
}

/// Fetch from every provider and combine the results with an outer join
/// on timestamp. Any provider failure fails the whole call.
pub async fn collect(
    providers: &[Arc<dyn MarketDataProvider>],
    symbol: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<RawBar>> {
    let mut frames = Vec::with_capacity(providers.len());

    for provider in providers {
        let bars = provider.fetch(symbol, start, end).await?;
        tracing::debug!("{} returned {} bars for {}", provider.name(), bars.len(), symbol);
        frames.push(bars);
    }

    Ok(outer_join(frames))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TradingError;
    use chrono::TimeZone;

    struct StubProvider {
        bars: Vec<RawBar>,
    }

    #[async_trait]
    impl MarketDataProvider for StubProvider {
        async fn fetch(
            &self,
            _symbol: &str,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> Result<Vec<RawBar>> {
            Ok(self.bars.clone())
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl MarketDataProvider for FailingProvider {
        async fn fetch(
            &self,
            _symbol: &str,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> Result<Vec<RawBar>> {
            Err(TradingError::DataFetch("provider unreachable".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn ts(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, minute, 0).unwrap()
    }

    #[test]
    fn test_collect_merges_providers() {
        let a: Arc<dyn MarketDataProvider> = Arc::new(StubProvider {
            bars: vec![RawBar::complete(ts(0), 1.0, 1.0, 1.0, 1.0, 10.0)],
        });
        let b: Arc<dyn MarketDataProvider> = Arc::new(StubProvider {
            bars: vec![RawBar::complete(ts(1), 2.0, 2.0, 2.0, 2.0, 20.0)],
        });

        let merged = tokio_test::block_on(collect(
            &[a, b],
            "TEST",
            ts(0),
            ts(5),
        ))
        .unwrap();

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].timestamp, ts(0));
        assert_eq!(merged[1].timestamp, ts(1));
    }

    #[test]
    fn test_collect_propagates_provider_failure() {
        let good: Arc<dyn MarketDataProvider> = Arc::new(StubProvider { bars: vec![] });
        let bad: Arc<dyn MarketDataProvider> = Arc::new(FailingProvider);

        let err = tokio_test::block_on(collect(&[good, bad], "TEST", ts(0), ts(5))).unwrap_err();
        assert!(matches!(err, TradingError::DataFetch(_)));
    }
}
