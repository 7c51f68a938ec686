use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Action, Trade};

/// Portfolio equity at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub equity: f64,
}

/// Single-asset portfolio: either fully in cash (FLAT) or fully
/// invested. Transitions use the whole balance; there are no partial
/// fills and no shorting. The trade log is append-only.
#[derive(Debug, Clone)]
pub struct Portfolio {
    cash: f64,
    position: f64,
    trades: Vec<Trade>,
    equity_curve: Vec<EquityPoint>,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            cash: initial_capital,
            position: 0.0,
            trades: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn is_invested(&self) -> bool {
        self.position > 0.0
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn equity_curve(&self) -> &[EquityPoint] {
        &self.equity_curve
    }

    /// Cash plus position marked to `price`.
    pub fn equity(&self, price: f64) -> f64 {
        self.cash + self.position * price
    }

    /// Apply one action at the given execution price.
    ///
    /// Only FLAT + buy and INVESTED + sell change state; everything
    /// else (HOLD, buying while invested, selling while flat) is a
    /// no-op and records nothing. Returns the trade if one executed.
    pub fn apply(&mut self, action: Action, timestamp: DateTime<Utc>, price: f64) -> Option<&Trade> {
        if action.is_buy() && !self.is_invested() && self.cash > 0.0 {
            self.position = self.cash / price;
            self.cash = 0.0;
        } else if action.is_sell() && self.is_invested() {
            self.cash = self.position * price;
            self.position = 0.0;
        } else {
            return None;
        }

        self.trades.push(Trade {
            id: Uuid::new_v4(),
            action,
            timestamp,
            price,
            position: self.position,
            cash: self.cash,
        });
        self.trades.last()
    }

    /// Record the current equity, marked to `price`.
    pub fn record_equity(&mut self, timestamp: DateTime<Utc>, price: f64) {
        let equity = self.equity(price);
        self.equity_curve.push(EquityPoint { timestamp, equity });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn ts(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minute)
    }

    fn assert_exclusive(p: &Portfolio) {
        assert!(
            !(p.cash() > 0.0 && p.position() > 0.0),
            "cash and position are both non-zero"
        );
    }

    #[test]
    fn test_buy_moves_all_cash_into_position() {
        let mut p = Portfolio::new(1000.0);
        let trade = p.apply(Action::Buy, ts(0), 100.0).cloned().unwrap();

        assert_eq!(trade.position, 10.0);
        assert_eq!(trade.cash, 0.0);
        assert_eq!(p.position(), 10.0);
        assert_eq!(p.cash(), 0.0);
        assert_exclusive(&p);
    }

    #[test]
    fn test_sell_moves_position_back_to_cash() {
        let mut p = Portfolio::new(1000.0);
        p.apply(Action::StrongBuy, ts(0), 100.0);
        let trade = p.apply(Action::Sell, ts(1), 110.0).cloned().unwrap();

        assert_eq!(trade.cash, 1100.0);
        assert_eq!(trade.position, 0.0);
        assert!(!p.is_invested());
        assert_exclusive(&p);
    }

    #[test]
    fn test_hold_is_noop() {
        let mut p = Portfolio::new(1000.0);
        assert!(p.apply(Action::Hold, ts(0), 100.0).is_none());
        assert_eq!(p.cash(), 1000.0);
        assert!(p.trades().is_empty());
    }

    #[test]
    fn test_buy_while_invested_ignored() {
        let mut p = Portfolio::new(1000.0);
        p.apply(Action::Buy, ts(0), 100.0);
        assert!(p.apply(Action::StrongBuy, ts(1), 120.0).is_none());

        assert_eq!(p.trades().len(), 1);
        assert_eq!(p.position(), 10.0);
    }

    #[test]
    fn test_sell_while_flat_ignored() {
        let mut p = Portfolio::new(1000.0);
        assert!(p.apply(Action::StrongSell, ts(0), 100.0).is_none());
        assert_eq!(p.cash(), 1000.0);
        assert!(p.trades().is_empty());
    }

    #[test]
    fn test_trade_log_ordered_and_append_only() {
        let mut p = Portfolio::new(1000.0);
        p.apply(Action::Buy, ts(0), 100.0);
        p.apply(Action::Sell, ts(5), 105.0);
        p.apply(Action::Buy, ts(9), 95.0);

        let stamps: Vec<_> = p.trades().iter().map(|t| t.timestamp).collect();
        let mut sorted = stamps.clone();
        sorted.sort();
        assert_eq!(stamps, sorted);
        assert_eq!(p.trades().len(), 3);
    }

    #[test]
    fn test_equity_marks_to_price() {
        let mut p = Portfolio::new(1000.0);
        p.apply(Action::Buy, ts(0), 100.0);
        assert_eq!(p.equity(110.0), 1100.0);

        p.record_equity(ts(1), 110.0);
        assert_eq!(p.equity_curve().last().unwrap().equity, 1100.0);
    }

    #[test]
    fn test_exclusivity_over_transition_sequence() {
        let mut p = Portfolio::new(500.0);
        let actions = [
            Action::Hold,
            Action::Buy,
            Action::Buy,
            Action::Sell,
            Action::Sell,
            Action::StrongBuy,
            Action::Hold,
            Action::StrongSell,
        ];
        for (i, action) in actions.iter().enumerate() {
            p.apply(*action, ts(i as i64), 100.0 + i as f64);
            assert_exclusive(&p);
        }
    }
}
