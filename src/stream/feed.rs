use std::pin::Pin;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use futures_util::{Stream, StreamExt};
use serde::Deserialize;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::models::Bar;
use crate::{Result, TradingError};

const BINANCE_WS_BASE: &str = "wss://stream.binance.com:9443";

/// Lazy, infinite sequence of live bars for one symbol.
pub type BarStream = Pin<Box<dyn Stream<Item = Result<Bar>> + Send>>;

/// Live market data feed.
///
/// A subscription runs until the feed drops it or the consumer stops
/// polling; recovery is re-subscribing, there is no built-in reconnect.
#[async_trait]
pub trait LiveFeed: Send + Sync {
    async fn subscribe(&self, symbol: &str) -> Result<BarStream>;
}

/// Kline event pushed by the exchange websocket.
#[derive(Debug, Deserialize)]
struct KlineEvent {
    k: KlinePayload,
}

#[derive(Debug, Deserialize)]
struct KlinePayload {
    #[serde(rename = "t")]
    open_time: i64,
    #[serde(rename = "o")]
    open: String,
    #[serde(rename = "h")]
    high: String,
    #[serde(rename = "l")]
    low: String,
    #[serde(rename = "c")]
    close: String,
    #[serde(rename = "v")]
    volume: String,
}

/// Websocket kline feed for Binance-style endpoints.
pub struct BinanceFeed {
    ws_base: String,
    interval: String,
}

impl BinanceFeed {
    pub fn new() -> Self {
        Self::with_ws_base(BINANCE_WS_BASE)
    }

    pub fn with_ws_base(ws_base: &str) -> Self {
        Self {
            ws_base: ws_base.trim_end_matches('/').to_string(),
            interval: "1m".to_string(),
        }
    }

    pub fn with_interval(mut self, interval: &str) -> Self {
        self.interval = interval.to_string();
        self
    }
}

impl Default for BinanceFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LiveFeed for BinanceFeed {
    async fn subscribe(&self, symbol: &str) -> Result<BarStream> {
        let url = format!(
            "{}/ws/{}@kline_{}",
            self.ws_base,
            symbol.to_lowercase(),
            self.interval
        );

        let (ws, _) = connect_async(url.as_str()).await.map_err(|e| {
            TradingError::StreamSession {
                symbol: symbol.to_string(),
                reason: format!("websocket connect failed: {}", e),
            }
        })?;

        tracing::info!("Subscribed to {} klines at {}", symbol, url);

        let symbol = symbol.to_string();
        let stream = ws.filter_map(move |message| {
            let symbol = symbol.clone();
            async move {
                match message {
                    Ok(Message::Text(text)) => Some(parse_kline(&symbol, &text)),
                    Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => None,
                    Ok(Message::Close(_)) => Some(Err(TradingError::StreamSession {
                        symbol,
                        reason: "feed closed the connection".to_string(),
                    })),
                    Ok(_) => None,
                    Err(e) => Some(Err(TradingError::StreamSession {
                        symbol,
                        reason: e.to_string(),
                    })),
                }
            }
        });

        Ok(Box::pin(stream))
    }
}

/// Parse one kline message into a bar.
fn parse_kline(symbol: &str, text: &str) -> Result<Bar> {
    let malformed = |detail: String| TradingError::StreamSession {
        symbol: symbol.to_string(),
        reason: detail,
    };

    let event: KlineEvent =
        serde_json::from_str(text).map_err(|e| malformed(format!("malformed kline: {}", e)))?;

    let k = event.k;
    let timestamp = Utc
        .timestamp_millis_opt(k.open_time)
        .single()
        .ok_or_else(|| malformed(format!("invalid kline open time {}", k.open_time)))?;

    let field = |value: &str, name: &str| -> Result<f64> {
        value
            .parse::<f64>()
            .map_err(|_| malformed(format!("malformed kline {} field: {:?}", name, value)))
    };

    Ok(Bar {
        timestamp,
        open: field(&k.open, "open")?,
        high: field(&k.high, "high")?,
        low: field(&k.low, "low")?,
        close: field(&k.close, "close")?,
        volume: field(&k.volume, "volume")?,
    })
}
