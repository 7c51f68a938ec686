use super::DecisionPolicy;
use crate::indicators::calculate_sma;
use crate::models::Action;
use crate::pipeline::FeatureVector;
use crate::Result;

/// Moving-average crossover over raw close prices.
///
/// Compares the trailing short-window mean against the long-window mean
/// of `FeatureVector::price`. With fewer rows than the long window it
/// holds instead of failing.
#[derive(Debug, Clone)]
pub struct MovingAverageCrossoverPolicy {
    short_window: usize,
    long_window: usize,
}

impl MovingAverageCrossoverPolicy {
    pub fn new(short_window: usize, long_window: usize) -> Self {
        Self {
            short_window,
            long_window,
        }
    }
}

impl Default for MovingAverageCrossoverPolicy {
    fn default() -> Self {
        Self::new(20, 50)
    }
}

impl DecisionPolicy for MovingAverageCrossoverPolicy {
    fn decide(&self, rows: &[FeatureVector]) -> Result<Action> {
        if rows.len() < self.long_window {
            return Ok(Action::Hold);
        }

        let prices: Vec<f64> = rows.iter().map(|r| r.price).collect();

        let (Some(short), Some(long)) = (
            calculate_sma(&prices, self.short_window),
            calculate_sma(&prices, self.long_window),
        ) else {
            return Ok(Action::Hold);
        };

        let action = if short > long {
            Action::Buy
        } else if short < long {
            Action::Sell
        } else {
            Action::Hold
        };

        Ok(action)
    }

    fn name(&self) -> &str {
        "MovingAverageCrossoverPolicy"
    }

    fn min_rows_required(&self) -> usize {
        self.long_window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn rows_with_prices(prices: &[f64]) -> Vec<FeatureVector> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, p)| FeatureVector {
                timestamp: start + Duration::minutes(i as i64),
                price: *p,
                open: 0.0,
                high: 0.0,
                low: 0.0,
                close: 0.0,
                volume: 0.0,
                ret: 0.0,
                log_ret: 0.0,
                volatility: 0.0,
                sma_short: 0.0,
                sma_long: 0.0,
                rsi: 0.0,
            })
            .collect()
    }

    #[test]
    fn test_short_history_always_holds() {
        let policy = MovingAverageCrossoverPolicy::default();

        for n in 0..policy.min_rows_required() {
            let prices: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
            let rows = rows_with_prices(&prices);
            assert_eq!(policy.decide(&rows).unwrap(), Action::Hold);
        }
    }

    #[test]
    fn test_uptrend_buys() {
        let policy = MovingAverageCrossoverPolicy::new(3, 5);
        let rows = rows_with_prices(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        assert_eq!(policy.decide(&rows).unwrap(), Action::Buy);
    }

    #[test]
    fn test_downtrend_sells() {
        let policy = MovingAverageCrossoverPolicy::new(3, 5);
        let rows = rows_with_prices(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0]);
        assert_eq!(policy.decide(&rows).unwrap(), Action::Sell);
    }

    #[test]
    fn test_flat_prices_hold() {
        let policy = MovingAverageCrossoverPolicy::new(3, 5);
        let rows = rows_with_prices(&[100.0; 6]);
        assert_eq!(policy.decide(&rows).unwrap(), Action::Hold);
    }
}
