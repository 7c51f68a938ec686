use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use futures_util::StreamExt;
use tokio::task::JoinHandle;

use super::feed::LiveFeed;
use super::window::BarWindow;
use crate::models::LiveDecision;
use crate::persistence::DecisionSink;
use crate::pipeline::FeaturePipeline;
use crate::policy::DecisionPolicy;
use crate::Result;

const DEFAULT_WINDOW_CAPACITY: usize = 256;

/// Lifecycle of one symbol's live session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionStatus {
    Running,
    /// The feed ended without an error.
    Stopped,
    /// The session died; the reason is kept for reporting.
    Failed(String),
}

type StatusMap = Arc<RwLock<HashMap<String, SessionStatus>>>;

/// Runs one supervised live session per symbol.
///
/// Every session owns its subscription and rolling bar window; each
/// arriving bar runs through the feature pipeline and the policy, and
/// the decision goes to the sinks. A session failure is recorded in the
/// status map and never touches sibling sessions.
pub struct StreamingExecutor {
    feed: Arc<dyn LiveFeed>,
    pipeline: Arc<FeaturePipeline>,
    policy: Arc<dyn DecisionPolicy>,
    sinks: Vec<Arc<dyn DecisionSink>>,
    window_capacity: usize,
}

impl StreamingExecutor {
    pub fn new(
        feed: Arc<dyn LiveFeed>,
        pipeline: FeaturePipeline,
        policy: Arc<dyn DecisionPolicy>,
    ) -> Self {
        Self {
            feed,
            pipeline: Arc::new(pipeline),
            policy,
            sinks: Vec::new(),
            window_capacity: DEFAULT_WINDOW_CAPACITY,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn DecisionSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn with_window_capacity(mut self, capacity: usize) -> Self {
        self.window_capacity = capacity;
        self
    }

    /// Spawn one task per symbol and return a handle over all of them.
    pub fn spawn(&self, symbols: &[String]) -> StreamingHandle {
        let statuses: StatusMap = Arc::new(RwLock::new(
            symbols
                .iter()
                .map(|s| (s.clone(), SessionStatus::Running))
                .collect(),
        ));

        let mut tasks = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let task = tokio::spawn(run_session(
                symbol.clone(),
                self.feed.clone(),
                self.pipeline.clone(),
                self.policy.clone(),
                self.sinks.clone(),
                self.window_capacity,
                statuses.clone(),
            ));
            tasks.push((symbol.clone(), task));
        }

        tracing::info!("Streaming executor started with {} sessions", tasks.len());

        StreamingHandle { tasks, statuses }
    }
}

/// Session supervisor: runs the loop and records the outcome.
async fn run_session(
    symbol: String,
    feed: Arc<dyn LiveFeed>,
    pipeline: Arc<FeaturePipeline>,
    policy: Arc<dyn DecisionPolicy>,
    sinks: Vec<Arc<dyn DecisionSink>>,
    window_capacity: usize,
    statuses: StatusMap,
) {
    let outcome = session_loop(&symbol, feed, pipeline, policy, sinks, window_capacity).await;

    let status = match outcome {
        Ok(()) => {
            tracing::info!("Session for {} ended: feed exhausted", symbol);
            SessionStatus::Stopped
        }
        Err(e) => {
            tracing::error!("Session for {} failed: {}", symbol, e);
            SessionStatus::Failed(e.to_string())
        }
    };

    if let Ok(mut map) = statuses.write() {
        map.insert(symbol, status);
    }
}

async fn session_loop(
    symbol: &str,
    feed: Arc<dyn LiveFeed>,
    pipeline: Arc<FeaturePipeline>,
    policy: Arc<dyn DecisionPolicy>,
    sinks: Vec<Arc<dyn DecisionSink>>,
    window_capacity: usize,
) -> Result<()> {
    let mut stream = feed.subscribe(symbol).await?;
    let mut window = BarWindow::new(window_capacity);

    while let Some(item) = stream.next().await {
        let bar = item?;
        window.push(bar.clone());

        // The rolling window is the normalization batch, so scaling
        // statistics always cover the same span the policy sees.
        let rows = pipeline.compute(&window.snapshot());
        let action = policy.decide(&rows)?;

        let decision = LiveDecision {
            symbol: symbol.to_string(),
            bar,
            action,
        };

        if action.is_buy() || action.is_sell() {
            tracing::info!(
                symbol,
                price = decision.bar.close,
                action = %action,
                "live decision"
            );
        } else {
            tracing::debug!(symbol, price = decision.bar.close, action = %action, "live decision");
        }

        for sink in &sinks {
            if let Err(e) = sink.save_decision(&decision).await {
                tracing::warn!("Sink write failed for {}: {}", symbol, e);
            }
        }
    }

    Ok(())
}

/// Handle over the spawned sessions.
pub struct StreamingHandle {
    tasks: Vec<(String, JoinHandle<()>)>,
    statuses: StatusMap,
}

impl StreamingHandle {
    /// Current status of every session.
    pub fn statuses(&self) -> HashMap<String, SessionStatus> {
        self.statuses.read().map(|m| m.clone()).unwrap_or_default()
    }

    pub fn status(&self, symbol: &str) -> Option<SessionStatus> {
        self.statuses.read().ok()?.get(symbol).cloned()
    }

    /// Cancel a single symbol's session, leaving the others running.
    pub fn stop_symbol(&mut self, symbol: &str) {
        for (name, task) in &self.tasks {
            if name == symbol {
                task.abort();
            }
        }
        if let Ok(mut map) = self.statuses.write() {
            if let Some(status) = map.get_mut(symbol) {
                if *status == SessionStatus::Running {
                    *status = SessionStatus::Stopped;
                }
            }
        }
    }

    /// Cancel every session.
    pub fn shutdown(self) {
        for (_, task) in &self.tasks {
            task.abort();
        }
        if let Ok(mut map) = self.statuses.write() {
            for status in map.values_mut() {
                if *status == SessionStatus::Running {
                    *status = SessionStatus::Stopped;
                }
            }
        }
        tracing::info!("Streaming executor shut down");
    }

    /// Wait for every session to finish on its own.
    pub async fn join(self) {
        for (symbol, task) in self.tasks {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    tracing::error!("Session task for {} panicked: {}", symbol, e);
                }
            }
        }
    }
}
