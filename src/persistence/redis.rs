use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tokio::sync::Mutex;
use tokio::time::{timeout, Duration};

use super::DecisionSink;
use crate::models::{LiveDecision, Trade};
use crate::{Result, TradingError};

/// Redis persistence for decision and trade events.
///
/// Uses sorted sets with timestamps as scores for efficient time-range
/// queries.
pub struct RedisSink {
    conn: Mutex<ConnectionManager>,
}

impl RedisSink {
    /// Connect to Redis.
    ///
    /// # Arguments
    /// * `redis_url` - Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)?;

        // 5 second timeout on the connection attempt
        let conn = timeout(Duration::from_secs(5), ConnectionManager::new(client))
            .await
            .map_err(|_| {
                TradingError::Persistence("Redis connection timeout after 5 seconds".to_string())
            })??;

        tracing::info!("Connected to Redis at {}", redis_url);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

#[async_trait]
impl DecisionSink for RedisSink {
    async fn save_decision(&self, decision: &LiveDecision) -> Result<()> {
        let key = format!("decisions:{}", decision.symbol);
        let value = serde_json::to_string(decision)?;
        let score = decision.bar.timestamp.timestamp() as f64;

        let mut conn = self.conn.lock().await;
        conn.zadd::<_, _, _, ()>(&key, value, score).await?;

        tracing::debug!("Saved decision for {} to Redis", decision.symbol);

        Ok(())
    }

    async fn save_trades(&self, symbol: &str, trades: &[Trade]) -> Result<()> {
        let key = format!("trades:{}", symbol);

        let mut conn = self.conn.lock().await;
        for trade in trades {
            let value = serde_json::to_string(trade)?;
            let score = trade.timestamp.timestamp() as f64;
            conn.zadd::<_, _, _, ()>(&key, value, score).await?;
        }

        tracing::debug!("Saved {} trades for {} to Redis", trades.len(), symbol);

        Ok(())
    }
}
