use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use quantbot::backtest::BacktestRunner;
use quantbot::config::Settings;
use quantbot::data::{collect, BinanceProvider, CsvProvider, MarketDataProvider};
use quantbot::persistence::{DecisionSink, PostgresSink, RedisSink};
use quantbot::pipeline::FeaturePipeline;
use quantbot::policy::MovingAverageCrossoverPolicy;
use quantbot::stream::{BinanceFeed, StreamingExecutor};

#[derive(Parser)]
#[command(name = "quantbot", about = "Market data pipeline, backtester and live decision engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay historical bars through the pipeline and policy
    Backtest {
        /// Symbol to fetch (defaults to the first configured symbol)
        #[arg(long)]
        symbol: Option<String>,
        /// Start date, YYYY-MM-DD
        #[arg(long)]
        start: String,
        /// End date, YYYY-MM-DD
        #[arg(long)]
        end: String,
        /// Read bars from a CSV file instead of the exchange
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Starting capital
        #[arg(long)]
        capital: Option<f64>,
    },
    /// Subscribe to live klines and emit decisions until interrupted
    Stream {
        /// Symbols to stream (defaults to the configured list)
        #[arg(long, value_delimiter = ',')]
        symbols: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let cli = Cli::parse();
    let settings = Settings::load().context("failed to load settings")?;

    match cli.command {
        Commands::Backtest {
            symbol,
            start,
            end,
            csv,
            capital,
        } => run_backtest(&settings, symbol, &start, &end, csv, capital).await,
        Commands::Stream { symbols } => run_stream(&settings, symbols).await,
    }
}

fn setup_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quantbot=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn parse_date(value: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("invalid date {:?}, expected YYYY-MM-DD", value))?;
    Ok(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap()))
}

async fn build_sinks(settings: &Settings) -> Vec<Arc<dyn DecisionSink>> {
    let mut sinks: Vec<Arc<dyn DecisionSink>> = Vec::new();

    if let Some(url) = &settings.database_url {
        match PostgresSink::new(url).await {
            Ok(sink) => sinks.push(Arc::new(sink)),
            Err(e) => tracing::warn!("Postgres sink disabled: {}", e),
        }
    }

    if let Some(url) = &settings.redis_url {
        match RedisSink::new(url).await {
            Ok(sink) => sinks.push(Arc::new(sink)),
            Err(e) => tracing::warn!("Redis sink disabled: {}", e),
        }
    }

    sinks
}

async fn run_backtest(
    settings: &Settings,
    symbol: Option<String>,
    start: &str,
    end: &str,
    csv: Option<PathBuf>,
    capital: Option<f64>,
) -> Result<()> {
    let symbol = symbol
        .or_else(|| settings.symbols.first().cloned())
        .context("no symbol given and none configured")?;
    let start = parse_date(start)?;
    let end = parse_date(end)?;
    let capital = capital.unwrap_or(settings.initial_capital);

    let providers: Vec<Arc<dyn MarketDataProvider>> = match csv {
        Some(path) => vec![Arc::new(CsvProvider::new(path)?)],
        None => vec![Arc::new(
            BinanceProvider::with_base_url(&settings.binance.rest_url)
                .with_interval(&settings.binance.interval),
        )],
    };

    let bars = collect(&providers, &symbol, start, end).await?;
    tracing::info!("Collected {} bars for {}", bars.len(), symbol);

    let pipeline = FeaturePipeline::new(settings.features.clone());
    let policy = MovingAverageCrossoverPolicy::new(
        settings.features.short_window,
        settings.features.long_window,
    );
    let runner = BacktestRunner::new(capital);

    let metrics = runner.run(&pipeline, &policy, &bars)?;
    metrics.print_report();

    for sink in build_sinks(settings).await {
        if let Err(e) = sink.save_trades(&symbol, &metrics.trades).await {
            tracing::warn!("Failed to persist trades: {}", e);
        }
    }

    Ok(())
}

async fn run_stream(settings: &Settings, symbols: Vec<String>) -> Result<()> {
    let symbols = if symbols.is_empty() {
        settings.symbols.clone()
    } else {
        symbols
    };

    let feed = BinanceFeed::with_ws_base(&settings.binance.ws_url)
        .with_interval(&settings.binance.interval);
    let pipeline = FeaturePipeline::new(settings.features.clone());
    let policy = Arc::new(MovingAverageCrossoverPolicy::new(
        settings.features.short_window,
        settings.features.long_window,
    ));

    let mut executor = StreamingExecutor::new(Arc::new(feed), pipeline, policy);
    for sink in build_sinks(settings).await {
        executor = executor.with_sink(sink);
    }

    let handle = executor.spawn(&symbols);
    tracing::info!("Streaming {} symbols, press Ctrl-C to stop", symbols.len());

    tokio::signal::ctrl_c().await?;

    for (symbol, status) in handle.statuses() {
        tracing::info!("Session {}: {:?}", symbol, status);
    }
    handle.shutdown();

    Ok(())
}
