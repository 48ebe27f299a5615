//! Duel Arena - local two-player fighting game
//!
//! This is the main entry point. It handles:
//! - Configuration and logging setup
//! - Spawning the stdin/stdout pumps
//! - Running the fixed-rate game session until quit or shutdown

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use duel_arena::app::AppState;
use duel_arena::config::{Config, LogFormat};
use duel_arena::wire::pump::spawn_stdio;

fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level, config.log_format);

    // One player pair, one simulation task
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(run(config));

    // The blocking stdin read would otherwise hold the runtime open
    runtime.shutdown_background();
    result
}

async fn run(config: Config) -> anyhow::Result<()> {
    info!("Starting Duel Arena");

    let state = AppState::new(config);
    let (session, channels) = state.create_session();
    let session_id = session.id();

    let (reader, writer) = spawn_stdio(channels.input_tx, channels.output_rx, state.input_limiter());

    let (end, scores) = session.run(shutdown_signal()).await;

    // Session dropped its sender; the writer drains what is left and exits
    match writer.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(error = %e, "Output pump failed"),
        Err(e) => warn!(error = %e, "Output pump panicked"),
    }
    // Stdin reads block, so the reader is not awaited
    reader.abort();

    info!(
        session_id = %session_id,
        reason = ?end,
        p1_wins = scores.p1,
        p2_wins = scores.p2,
        "Shutdown complete"
    );
    Ok(())
}

/// Initialize tracing/logging. Logs go to stderr, stdout carries the wire protocol.
fn init_tracing(log_level: &str, format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        }
    }
}
