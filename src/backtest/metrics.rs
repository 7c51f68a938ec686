use serde::{Deserialize, Serialize};

use super::portfolio::{EquityPoint, Portfolio};
use crate::models::Trade;

/// Backtest results: final balance, return and the full trade history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestMetrics {
    pub initial_capital: f64,
    pub final_equity: f64,
    pub return_pct: f64,
    pub total_trades: usize,
    pub buy_trades: usize,
    pub sell_trades: usize,
    pub max_drawdown_pct: f64,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
}

impl BacktestMetrics {
    /// Metrics for a run that produced no decisions.
    pub fn empty(initial_capital: f64) -> Self {
        Self {
            initial_capital,
            final_equity: initial_capital,
            return_pct: 0.0,
            total_trades: 0,
            buy_trades: 0,
            sell_trades: 0,
            max_drawdown_pct: 0.0,
            trades: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    /// Summarize a finished portfolio, marking any open position to
    /// `last_price`.
    pub fn from_portfolio(portfolio: Portfolio, initial_capital: f64, last_price: f64) -> Self {
        let final_equity = portfolio.equity(last_price);
        let return_pct = (final_equity - initial_capital) / initial_capital * 100.0;

        let buy_trades = portfolio.trades().iter().filter(|t| t.action.is_buy()).count();
        let sell_trades = portfolio
            .trades()
            .iter()
            .filter(|t| t.action.is_sell())
            .count();

        let max_drawdown_pct = max_drawdown(portfolio.equity_curve());

        Self {
            initial_capital,
            final_equity,
            return_pct,
            total_trades: portfolio.trades().len(),
            buy_trades,
            sell_trades,
            max_drawdown_pct,
            trades: portfolio.trades().to_vec(),
            equity_curve: portfolio.equity_curve().to_vec(),
        }
    }

    /// Print a human-readable report to stdout.
    pub fn print_report(&self) {
        println!("\n========== Backtest Report ==========");
        println!("Initial Capital:  ${:.2}", self.initial_capital);
        println!("Final Equity:     ${:.2}", self.final_equity);
        println!("Return:           {:.2}%", self.return_pct);
        println!("Max Drawdown:     {:.2}%", self.max_drawdown_pct);
        println!(
            "Trades:           {} ({} buys, {} sells)",
            self.total_trades, self.buy_trades, self.sell_trades
        );
        for trade in &self.trades {
            println!(
                "  {} {} @ ${:.4} -> position {:.4}, cash ${:.2}",
                trade.timestamp.format("%Y-%m-%d %H:%M"),
                trade.action,
                trade.price,
                trade.position,
                trade.cash
            );
        }
        println!("=====================================\n");
    }
}

/// Largest peak-to-trough equity decline, as a percentage of the peak.
fn max_drawdown(curve: &[EquityPoint]) -> f64 {
    let mut peak = f64::MIN;
    let mut worst = 0.0_f64;

    for point in curve {
        peak = peak.max(point.equity);
        if peak > 0.0 {
            let drawdown = (peak - point.equity) / peak * 100.0;
            worst = worst.max(drawdown);
        }
    }

    worst
}
