// Technical indicator calculations
pub mod moving_average;
pub mod rsi;
pub mod volatility;

pub use moving_average::{calculate_sma, rolling_sma};
pub use rsi::wilder_rsi;
pub use volatility::rolling_std;
