// SPDX-FileCopyrightText: 2026 Guarantor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `guarantor serve`: wires storage, engine and the Telegram channel
//! together and runs the event loop until shutdown.

use std::sync::Arc;
use std::time::Duration;

use guarantor_config::GuarantorConfig;
use guarantor_core::{ChannelAdapter, GuarantorError, HealthStatus, PluginAdapter, StorageAdapter};
use guarantor_engine::{
    DealEngine, DealSettings, DispatchSettings, Dispatcher, MemorySessionStore, Outbox,
    SessionController, shutdown,
};
use guarantor_storage::SqliteStorage;
use guarantor_telegram::{RenderSettings, TelegramChannel};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// How long in-flight events may run after shutdown was requested.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs the bot until SIGINT/SIGTERM.
pub async fn run_serve(config: GuarantorConfig) -> Result<(), GuarantorError> {
    init_tracing(&config.bot.log_level);

    info!(name = %config.bot.name, "starting guarantor serve");

    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;

    let mut channel =
        TelegramChannel::new(&config.telegram, RenderSettings::from(&config.deals))?;
    match channel.health_check().await? {
        HealthStatus::Healthy => info!("Telegram bot reachable"),
        HealthStatus::Degraded(reason) | HealthStatus::Unhealthy(reason) => {
            warn!(%reason, "Telegram health check failed, polling anyway");
        }
    }
    channel.connect().await?;
    let channel = Arc::new(channel);

    if config.telegram.bot_username.is_none() {
        warn!("telegram.bot_username is not set, deal links fall back to /buy commands");
    }

    let engine = Arc::new(DealEngine::new(
        storage.clone(),
        DealSettings::from(&config.deals),
    ));
    let controller = Arc::new(SessionController::new(
        Arc::new(MemorySessionStore::new()),
        storage.clone(),
        engine.clone(),
    ));
    let (outbox, outbox_handle) = Outbox::spawn(channel.clone());
    let dispatcher = Arc::new(Dispatcher::new(
        controller,
        engine,
        storage.clone(),
        DispatchSettings::from(&config),
        outbox,
    ));

    let cancel = shutdown::install_signal_handler();
    let aborted = run_event_loop(channel.clone(), dispatcher, cancel).await;
    if aborted > 0 {
        warn!(aborted, "some events were aborted during shutdown");
    }

    channel.shutdown().await?;
    // The dispatcher (the last outbox sender) is gone; wait for the queue to drain.
    if let Err(e) = outbox_handle.await {
        error!(error = %e, "outbox task failed");
    }
    storage.close().await?;

    info!("guarantor stopped");
    Ok(())
}

/// Receives events and handles each one on its own task until `cancel`
/// fires or the channel closes, then drains in-flight tasks.
///
/// Returns the number of tasks aborted by the drain timeout.
pub(crate) async fn run_event_loop(
    channel: Arc<dyn ChannelAdapter>,
    dispatcher: Arc<Dispatcher>,
    cancel: CancellationToken,
) -> usize {
    let mut tasks = JoinSet::new();
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("shutdown requested, no longer accepting events");
                break;
            }
            received = channel.receive() => match received {
                Ok(event) => {
                    let dispatcher = dispatcher.clone();
                    tasks.spawn(async move { dispatcher.dispatch(event).await });
                }
                Err(e) => {
                    error!(error = %e, "channel receive failed, stopping");
                    break;
                }
            },
            Some(finished) = tasks.join_next(), if !tasks.is_empty() => {
                if let Err(e) = finished {
                    warn!(error = %e, "event task ended abnormally");
                }
            }
        }
    }
    drop(dispatcher);
    shutdown::drain_tasks(&mut tasks, DRAIN_TIMEOUT).await
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("guarantor={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
