//! `budget-relay` binary: snapshot refresh, notification fan-out and chat proxy.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use budget_relay::builders::{build_chat_proxy, build_scheduler, build_snapshot_provider};
use budget_relay::config::RelayConfig;
use budget_relay::core::AppResult;
use budget_relay::runtime::{router, services, JobDriver, SnapshotRefresher, TokioSpawner};
use budget_relay::util::init_tracing;
use clap::{Parser, Subcommand};

/// Budget snapshots, notification fan-out and chat proxy.
#[derive(Parser)]
#[command(name = "budget-relay", version, about)]
struct Cli {
    /// Path to a JSON configuration file; defaults apply when omitted.
    #[arg(short, long, env = "BUDGET_RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Option<Command>,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Run the refresher, the scheduler and the chat proxy until Ctrl+C.
    Run,
    /// Run one notification tick and print its outcome.
    NotifyOnce,
    /// Print the current snapshot rows as JSON.
    Snapshot,
}

#[tokio::main]
async fn main() -> AppResult<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => RelayConfig::from_path(path).map_err(anyhow::Error::msg)?,
        None => RelayConfig::default(),
    };

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(&config).await,
        Command::NotifyOnce => notify_once(&config).await,
        Command::Snapshot => print_snapshot(&config).await,
    }
}

async fn run(config: &RelayConfig) -> AppResult<()> {
    let relay = services::install(config)?;
    let driver = JobDriver::new(TokioSpawner::try_current()?);

    if config.snapshot.enabled {
        let refresher = Arc::new(SnapshotRefresher::new(build_snapshot_provider(&relay)));
        let mut updates = refresher.subscribe();
        let capacity = config.snapshot.display_capacity;
        tokio::spawn(async move {
            while updates.changed().await.is_ok() {
                let rows = updates.borrow_and_update().snapshot.rows(capacity);
                tracing::info!(rows = rows.len(), "snapshot published");
            }
        });
        driver.start(refresher);
    }

    if config.notifications.enabled {
        driver.start(Arc::new(build_scheduler(&relay)?));
    }

    if config.chat.enabled {
        let listener = tokio::net::TcpListener::bind(&config.chat.bind)
            .await
            .with_context(|| format!("cannot bind {}", config.chat.bind))?;
        tracing::info!(bind = %config.chat.bind, "chat proxy listening");
        axum::serve(listener, router(Arc::new(build_chat_proxy(&relay))))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("chat proxy failed")?;
    } else {
        shutdown_signal().await;
    }

    driver.shutdown();
    services::teardown();
    Ok(())
}

async fn notify_once(config: &RelayConfig) -> AppResult<()> {
    let relay = services::install(config)?;
    let outcome = build_scheduler(&relay)?.run_tick().await;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    services::teardown();
    Ok(())
}

async fn print_snapshot(config: &RelayConfig) -> AppResult<()> {
    let relay = services::install(config)?;
    let provider = build_snapshot_provider(&relay);
    let snapshot = provider
        .current_snapshot_within(config.snapshot.read_timeout())
        .await;
    let rows = snapshot.rows(config.snapshot.display_capacity);
    println!("{}", serde_json::to_string_pretty(&rows)?);
    services::teardown();
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("received Ctrl+C, shutting down");
    }
}
