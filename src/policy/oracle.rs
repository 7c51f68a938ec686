use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::DecisionPolicy;
use crate::models::Action;
use crate::pipeline::FeatureVector;
use crate::Result;

/// Black-box scoring model.
///
/// Implementations are invoked concurrently from every live symbol
/// session, so they must be stateless or internally synchronized: an
/// implementation wrapping a model that is not thread-safe has to hold
/// its own lock around the underlying call.
pub trait PredictionOracle: Send + Sync {
    /// Score a feature row. The score is an unbounded real; callers
    /// bucket extreme values into the nearest action, they are not an
    /// error.
    fn predict(&self, features: &FeatureVector) -> Result<f64>;
}

/// Score cut-offs for the five actions.
///
/// Comparisons are strict: a score exactly on a boundary maps to the
/// weaker bucket, so the default boundaries themselves resolve to HOLD.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DecisionThresholds {
    pub strong_buy: f64,
    pub buy: f64,
    pub sell: f64,
    pub strong_sell: f64,
}

impl Default for DecisionThresholds {
    fn default() -> Self {
        Self {
            strong_buy: 0.7,
            buy: 0.3,
            sell: -0.3,
            strong_sell: -0.7,
        }
    }
}

impl DecisionThresholds {
    pub fn classify(&self, score: f64) -> Action {
        if score > self.strong_buy {
            Action::StrongBuy
        } else if score > self.buy {
            Action::Buy
        } else if score < self.strong_sell {
            Action::StrongSell
        } else if score < self.sell {
            Action::Sell
        } else {
            Action::Hold
        }
    }
}

/// Resolves the oracle's score for the newest feature row into an
/// action via fixed thresholds.
pub struct OracleThresholdPolicy {
    oracle: Arc<dyn PredictionOracle>,
    thresholds: DecisionThresholds,
}

impl OracleThresholdPolicy {
    pub fn new(oracle: Arc<dyn PredictionOracle>) -> Self {
        Self {
            oracle,
            thresholds: DecisionThresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: DecisionThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }
}

impl DecisionPolicy for OracleThresholdPolicy {
    fn decide(&self, rows: &[FeatureVector]) -> Result<Action> {
        let Some(last) = rows.last() else {
            return Ok(Action::Hold);
        };

        let score = self.oracle.predict(last)?;
        let action = self.thresholds.classify(score);

        tracing::debug!(score, action = %action, "oracle decision");

        Ok(action)
    }

    fn name(&self) -> &str {
        "OracleThresholdPolicy"
    }

    fn min_rows_required(&self) -> usize {
        1
    }
}
