// Live execution: feed subscriptions and supervised per-symbol sessions
pub mod executor;
pub mod feed;
pub mod window;

pub use executor::{SessionStatus, StreamingExecutor, StreamingHandle};
pub use feed::{BarStream, BinanceFeed, LiveFeed};
pub use window::BarWindow;
