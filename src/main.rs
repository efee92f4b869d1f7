// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::reminder_service::ReminderService;
use crate::application::room_service::RoomService;
use crate::application::streaming_service::RoomWatchService;
use crate::infrastructure::config::load_config;
use crate::infrastructure::notifier::LogNotifier;
use crate::infrastructure::upstream_repository::UpstreamRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    classify_status, health_check, list_reminders, list_rooms, remove_reminder, room_detail, set_reminder,
    watch_room,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = load_config()?;
    tracing::info!("Upstream laundry service at {}", config.upstream.base_url);

    // Repository (infrastructure layer)
    let repository = Arc::new(UpstreamRepository::new(&config.upstream)?);

    // Services (application layer)
    let room_service = RoomService::new(repository);
    let reminder_service = ReminderService::new(room_service.clone(), Arc::new(LogNotifier));
    let watch_service = RoomWatchService::new(
        room_service.clone(),
        reminder_service.clone(),
        config.polling.interval(),
    );

    let poller = reminder_service.spawn_poller(config.polling.interval());

    let state = Arc::new(AppState {
        room_service,
        reminder_service,
        watch_service,
    });

    // Router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/classify", get(classify_status))
        .route("/rooms", get(list_rooms))
        .route("/rooms/:id", get(room_detail))
        .route("/rooms/:id/watch", get(watch_room))
        .route(
            "/rooms/:id/machines/:machine_id/reminder",
            post(set_reminder).delete(remove_reminder),
        )
        .route("/reminders", get(list_reminders))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(config.server.bind).await?;
    tracing::info!("Starting laundry-link service on {}", config.server.bind);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    poller.abort();
    tracing::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
