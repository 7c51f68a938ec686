use super::metrics::BacktestMetrics;
use super::portfolio::Portfolio;
use crate::models::RawBar;
use crate::pipeline::{FeaturePipeline, FeatureVector};
use crate::policy::DecisionPolicy;
use crate::Result;

/// Replays an ordered bar sequence through a decision policy and tracks
/// the resulting portfolio.
///
/// Strictly sequential and deterministic: the same rows and policy
/// always produce the same trade log and final equity. Policy errors
/// (oracle failures) abort the run.
pub struct BacktestRunner {
    initial_capital: f64,
}

impl BacktestRunner {
    pub fn new(initial_capital: f64) -> Self {
        Self { initial_capital }
    }

    /// Transform raw bars and simulate the policy over the result.
    pub fn run(
        &self,
        pipeline: &FeaturePipeline,
        policy: &dyn DecisionPolicy,
        bars: &[RawBar],
    ) -> Result<BacktestMetrics> {
        let rows = pipeline.transform(bars)?;
        tracing::info!(
            "Starting backtest: {} bars -> {} feature rows, policy {}",
            bars.len(),
            rows.len(),
            policy.name()
        );
        self.simulate(policy, &rows)
    }

    /// Simulate the policy over already-derived feature rows.
    ///
    /// Each row is decided on the window ending at that row, so the
    /// policy never sees the future. An empty input yields trivial
    /// metrics rather than an error.
    pub fn simulate(
        &self,
        policy: &dyn DecisionPolicy,
        rows: &[FeatureVector],
    ) -> Result<BacktestMetrics> {
        if rows.is_empty() {
            return Ok(BacktestMetrics::empty(self.initial_capital));
        }

        let mut portfolio = Portfolio::new(self.initial_capital);

        for i in 0..rows.len() {
            let window = &rows[..=i];
            let row = &rows[i];

            let action = policy.decide(window)?;

            if let Some(trade) = portfolio.apply(action, row.timestamp, row.price) {
                tracing::debug!(
                    "{} @ ${:.4} -> position {:.4}, cash ${:.2}",
                    trade.action,
                    trade.price,
                    trade.position,
                    trade.cash
                );
            }
            portfolio.record_equity(row.timestamp, row.price);
        }

        let last_price = rows.last().map(|r| r.price).unwrap_or_default();
        let metrics = BacktestMetrics::from_portfolio(portfolio, self.initial_capital, last_price);

        tracing::info!(
            "Backtest complete: {} trades, final equity ${:.2} ({:+.2}%)",
            metrics.total_trades,
            metrics.final_equity,
            metrics.return_pct
        );

        Ok(metrics)
    }
}
