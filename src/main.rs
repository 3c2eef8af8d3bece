use budget_reminders::{
    router, spawn_event_log, AppState, Config, EventBus, NotificationCenter, ReminderStore,
    Scheduler, Storage,
};
use std::net::SocketAddr;
use tokio::fs;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;
    fs::create_dir_all(&config.data_dir).await?;

    let events = EventBus::default();
    let event_log = spawn_event_log(events.subscribe());

    let storage = Storage::at(&config.data_dir);
    let reminders = ReminderStore::load(storage.clone(), events.clone()).await;
    let notifications =
        NotificationCenter::load(storage, config.notification_retention, events.clone()).await;
    let state = AppState::new(reminders, notifications, events.clone());

    let scheduler = Scheduler::new(
        state.reminders.clone(),
        state.notifications.clone(),
        config.chime(),
        events,
        config.scheduler(),
    )
    .spawn();

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.stop().await;
    event_log.abort();
    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
}
