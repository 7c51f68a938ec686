// Core modules
pub mod backtest;
pub mod config;
pub mod data;
pub mod error;
pub mod indicators;
pub mod models;
pub mod persistence;
pub mod pipeline;
pub mod policy;
pub mod stream;

// Re-export commonly used types
pub use error::{Result, TradingError};
pub use models::*;
pub use pipeline::{FeaturePipeline, FeatureVector};
pub use policy::DecisionPolicy;
