// Historical simulation: portfolio state machine, runner, reporting
pub mod metrics;
pub mod portfolio;
pub mod runner;
pub mod synthetic;

pub use metrics::BacktestMetrics;
pub use portfolio::{EquityPoint, Portfolio};
pub use runner::BacktestRunner;
pub use synthetic::{MarketScenario, SyntheticDataGenerator};
