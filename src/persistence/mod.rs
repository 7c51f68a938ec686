// Persistence sinks for decisions and trades
pub mod postgres;
pub mod redis;

pub use postgres::PostgresSink;
pub use redis::RedisSink;

use async_trait::async_trait;

use crate::models::{LiveDecision, Trade};
use crate::Result;

/// Write-side persistence boundary.
///
/// Fire-and-forget from the core's perspective: callers log failures
/// and move on, nothing is read back. Sinks are invoked concurrently
/// from every live session, so implementations must tolerate
/// concurrent writes.
#[async_trait]
pub trait DecisionSink: Send + Sync {
    async fn save_decision(&self, decision: &LiveDecision) -> Result<()>;

    async fn save_trades(&self, symbol: &str, trades: &[Trade]) -> Result<()>;
}
