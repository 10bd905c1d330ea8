//! METAR sensors HTTP server
//!
//! Main entry point: loads configuration, restores config entries, starts
//! polling and serves the JSON API.

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use infrastructure::{AppConfig, JsonEntryStore, MetarAdapter, init_telemetry};
use presentation_http::{routes, state::AppState};
use tokio::{net::TcpListener, signal, sync::Notify};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_telemetry(&config.telemetry)?;
    config.validate()?;

    info!("METAR sensors v{} starting...", env!("CARGO_PKG_VERSION"));
    info!(
        host = %config.server.host,
        port = %config.server.port,
        base_url = %config.metar.base_url,
        entries = %config.persistence.entries_path.display(),
        "Configuration loaded"
    );

    // Entries and observation source
    let store = Arc::new(JsonEntryStore::open(&config.persistence.entries_path).await?);
    let port = Arc::new(MetarAdapter::with_config(config.metar.client_config())?);
    let state = AppState::new(store, port, config.metar.manager_settings()?);

    let seeded = state.seed_stations(&config.seed_stations()?).await?;
    let loaded = state.manager.setup_all().await?;
    info!(seeded, loaded, "Stations ready");

    // Build router
    let app = routes::create_router(state.clone()).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(RequestBodyLimitLayer::new(
                config.server.max_body_size_json_bytes,
            )),
    );
    let app = if config.server.cors_enabled {
        app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        app
    };

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_secs);
    let signalled = Arc::new(Notify::new());
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(Arc::clone(&signalled)))
        .into_future();
    let mut server = std::pin::pin!(server);

    tokio::select! {
        result = &mut server => result?,
        () = signalled.notified() => {
            info!("Waiting up to {:?} for connections to close...", shutdown_timeout);
            match tokio::time::timeout(shutdown_timeout, server.as_mut()).await {
                Ok(result) => result?,
                Err(_) => warn!("Connections still open after {:?}, closing", shutdown_timeout),
            }
        }
    }

    state.manager.shutdown();
    info!("Server shutdown complete");

    Ok(())
}

/// Wait for SIGINT or SIGTERM, then wake `signalled`
async fn shutdown_signal(signalled: Arc<Notify>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    signalled.notify_one();
}
