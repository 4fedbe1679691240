mod config;
mod http;
mod state;

use anyhow::Context;
use dotenvy::dotenv;
use engine::{
    ActionDispatcher, DeferredRemovalCoordinator, GatewayClient, JobWorker, PendingActionStore,
    Triage,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Settings;
use crate::http::router::build_router;
use crate::state::AppState;
use storage::Db;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::new().context("Failed to load configuration")?;
    if settings.gateway.subreddit.is_empty() {
        anyhow::bail!("gateway.subreddit must be set (MODNUKE_GATEWAY__SUBREDDIT)");
    }

    let db = Db::new(&settings.database.url)
        .await
        .with_context(|| format!("Failed to open database {}", settings.database.url))?;
    let store = Arc::new(db.clone());
    let gateway = Arc::new(GatewayClient::new(settings.gateway.clone())?);

    let triage = Arc::new(Triage::new(
        gateway.clone(),
        PendingActionStore::new(store.clone()),
        ActionDispatcher::new(settings.triage.retry_limit),
        gateway.subreddit(),
    ));
    let coordinator = Arc::new(DeferredRemovalCoordinator::new(
        gateway.clone(),
        store.clone(),
        store,
        settings.triage.clone(),
    ));

    let cancel_token = CancellationToken::new();
    let worker = JobWorker::new(
        db,
        coordinator.clone(),
        settings.worker.poll_interval(),
        settings.worker.batch_size,
    );
    let worker_handle = tokio::spawn(worker.run(cancel_token.clone()));

    let state = AppState {
        triage,
        coordinator,
    };
    let app = build_router(state, &settings.server.cors_origins);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    info!(
        "Server listening on {} for r/{}",
        addr, settings.gateway.subreddit
    );

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to address: {}", addr))?;

    let shutdown_token = cancel_token.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            shutdown_token.cancel();
        })
        .await?;

    cancel_token.cancel();
    match worker_handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!("Job worker stopped with error: {:#}", e),
        Err(e) => tracing::error!("Job worker crashed: {:?}", e),
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}
