use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use super::DecisionSink;
use crate::models::{LiveDecision, Trade};
use crate::Result;

/// Postgres persistence for live decisions and backtest trades.
pub struct PostgresSink {
    pool: PgPool,
}

impl PostgresSink {
    /// Connect to Postgres and run migrations.
    ///
    /// # Arguments
    /// * `database_url` - Postgres connection URL
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        tracing::info!("Connected to Postgres at {}", database_url);

        Ok(Self { pool })
    }
}

#[async_trait]
impl DecisionSink for PostgresSink {
    async fn save_decision(&self, decision: &LiveDecision) -> Result<()> {
        let bar = &decision.bar;
        sqlx::query(
            r#"
            INSERT INTO decisions (id, symbol, action, open, high, low, close, volume, bar_time)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&decision.symbol)
        .bind(decision.action.as_str())
        .bind(bar.open)
        .bind(bar.high)
        .bind(bar.low)
        .bind(bar.close)
        .bind(bar.volume)
        .bind(bar.timestamp)
        .execute(&self.pool)
        .await?;

        tracing::debug!(
            "Saved {} decision for {} to Postgres",
            decision.action,
            decision.symbol
        );

        Ok(())
    }

    async fn save_trades(&self, symbol: &str, trades: &[Trade]) -> Result<()> {
        for trade in trades {
            sqlx::query(
                r#"
                INSERT INTO trades (id, symbol, action, price, position_size, cash, executed_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(trade.id)
            .bind(symbol)
            .bind(trade.action.as_str())
            .bind(trade.price)
            .bind(trade.position)
            .bind(trade.cash)
            .bind(trade.timestamp)
            .execute(&self.pool)
            .await?;
        }

        tracing::debug!("Saved {} trades for {} to Postgres", trades.len(), symbol);

        Ok(())
    }
}
