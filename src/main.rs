use anyhow::{anyhow, Context};
use btc_guess_provider::clock::{SharedClock, SystemClock};
use btc_guess_provider::config::{HttpConfig, MarketConfig};
use btc_guess_provider::price::{spawn_price_task, PriceMode};
use btc_guess_provider::provider::GuessProvider;
use clap::{Parser, ValueEnum};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PriceSource {
    /// Repeated REST requests
    Poll,
    /// Binance ticker WebSocket
    Stream,
}

/// BTC price-direction guessing service
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Interface to bind (overrides HTTP_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides HTTP_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// How the live price is kept current
    #[arg(long, value_enum, default_value_t = PriceSource::Poll)]
    price_mode: PriceSource,

    /// Seconds between price polls in poll mode
    #[arg(long, default_value_t = 5)]
    poll_secs: u64,

    /// Seconds between settlement sweeps
    #[arg(long, default_value_t = 1)]
    settle_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let market =
        MarketConfig::from_env().map_err(|e| anyhow!("invalid market configuration: {}", e))?;
    let http = HttpConfig::from_env()
        .map_err(|e| anyhow!("invalid HTTP configuration: {}", e))?
        .with_addr(cli.host.as_deref(), cli.port)
        .context("invalid --host/--port")?;

    tracing::info!(
        "Starting BTC guess provider for {} ({} x{})",
        market.symbol,
        market.interval,
        market.limit
    );

    let clock: SharedClock = Arc::new(SystemClock);
    let provider =
        GuessProvider::from_config(market, clock).context("failed to initialize provider")?;

    let (shutdown_tx, _shutdown_rx) = tokio::sync::broadcast::channel::<()>(1);

    let signal_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Received shutdown signal (Ctrl+C)");
                let _ = signal_tx.send(());
            }
            Err(err) => {
                tracing::error!("Failed to listen for shutdown signal: {}", err);
            }
        }
    });

    let mode = match cli.price_mode {
        PriceSource::Poll => PriceMode::Poll {
            interval: Duration::from_secs(cli.poll_secs.max(1)),
        },
        PriceSource::Stream => PriceMode::Stream,
    };
    let price_task = spawn_price_task(
        mode,
        provider.binance_client.clone(),
        #[cfg(feature = "websocket")]
        provider.ws_client.clone(),
        provider.market.symbol.clone(),
        provider.feed.clone(),
        provider.clock.clone(),
        shutdown_tx.subscribe(),
    );

    let settlement = provider.settlement_task(Duration::from_secs(cli.settle_secs.max(1)));
    let settlement_task = tokio::spawn(settlement.run(shutdown_tx.subscribe()));

    let served = run_http_server(&http, &provider, shutdown_tx.subscribe()).await;

    // Stops the background tasks when the server exits on its own
    let _ = shutdown_tx.send(());
    let _ = price_task.await;
    let _ = settlement_task.await;

    tracing::info!("Provider stopped");
    served
}

#[cfg(feature = "http_transport")]
async fn run_http_server(
    http: &HttpConfig,
    provider: &GuessProvider,
    shutdown: tokio::sync::broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    let state = provider.app_state(http);
    btc_guess_provider::transport::start_http_server(http, state, shutdown)
        .await
        .context("HTTP server failed")
}

#[cfg(not(feature = "http_transport"))]
async fn run_http_server(
    _http: &HttpConfig,
    _provider: &GuessProvider,
    mut shutdown: tokio::sync::broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    tracing::warn!("HTTP transport not available. Build with --features http_transport");
    shutdown.recv().await.ok();
    Ok(())
}
