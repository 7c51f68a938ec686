use thiserror::Error;

/// Errors surfaced by the trading core.
///
/// Batch callers get these directly; live sessions catch them at the
/// session boundary and report them as a per-symbol status.
#[derive(Error, Debug)]
pub enum TradingError {
    #[error("data fetch failed: {0}")]
    DataFetch(String),

    #[error("preprocessing failed: {0}")]
    Preprocessing(String),

    #[error("insufficient history: need {required} bars, have {available}")]
    InsufficientHistory { required: usize, available: usize },

    #[error("oracle invocation failed: {0}")]
    Oracle(String),

    #[error("stream session for {symbol} failed: {reason}")]
    StreamSession { symbol: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, TradingError>;
