// Decision policies: map feature rows to trading actions
pub mod crossover;
pub mod oracle;

pub use crossover::MovingAverageCrossoverPolicy;
pub use oracle::{DecisionThresholds, OracleThresholdPolicy, PredictionOracle};

use crate::models::Action;
use crate::pipeline::FeatureVector;
use crate::Result;

/// A decision policy resolves an ordered sequence of feature rows into
/// one discrete action.
///
/// The input is always a sequence — a singleton for single-row callers —
/// ending at the bar under decision. Policies are pure: no side effects
/// beyond consulting an injected oracle.
pub trait DecisionPolicy: Send + Sync {
    /// Decide an action for the last row of `rows`.
    ///
    /// Insufficient history degrades to `Action::Hold`; oracle failures
    /// propagate as errors, never as HOLD.
    fn decide(&self, rows: &[FeatureVector]) -> Result<Action>;

    /// Policy name, used in logs and reports.
    fn name(&self) -> &str;

    /// Rows required before the policy can produce a directional action.
    fn min_rows_required(&self) -> usize;
}
