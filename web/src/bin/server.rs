//! Eventify booking API server.

use anyhow::Context;
use eventify_core::BookingService;
use eventify_core::environment::SystemClock;
use eventify_postgres::{
    PostgresBookingRepository, PostgresEventDirectory, PostgresVendorDirectory,
};
use eventify_web::{AppState, Config, SupabaseIdentityProvider, build_router, metrics};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "eventify_core=info,eventify_postgres=info,eventify_web=info,server=info,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Eventify booking API");

    let config = Config::from_env();
    info!(
        bind = %config.server.bind_address(),
        metrics = %config.server.metrics_address(),
        identity_url = %config.identity.url,
        "Configuration loaded"
    );

    if let Err(e) = metrics::install_exporter(&config.server.metrics_address()) {
        warn!(error = %e, "Metrics exporter not installed");
    }

    info!("Connecting to database...");
    let pool = eventify_postgres::connect(&config.database.pool_config())
        .await
        .context("database connection failed")?;
    if config.database.run_migrations {
        eventify_postgres::migrate(&pool)
            .await
            .context("database migration failed")?;
    }
    info!("Database ready");

    let service = BookingService::new(
        Arc::new(PostgresBookingRepository::new(pool.clone())),
        Arc::new(PostgresEventDirectory::new(pool.clone())),
        Arc::new(PostgresVendorDirectory::new(pool.clone())),
        Arc::new(SystemClock),
    );

    if config.identity.url.is_empty() {
        warn!("SUPABASE_URL is not set; every token will be rejected as unavailable");
    }
    let identity = SupabaseIdentityProvider::new(
        config.identity.url.clone(),
        config.identity.anon_key.clone(),
        Duration::from_secs(config.identity.timeout),
    )
    .context("identity provider setup failed")?;

    let state = AppState::new(service, Arc::new(identity));
    let app = build_router(state, &config.server.cors_allowed_origins);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on {}", addr);

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = stop_rx.await;
            })
            .await
    });

    shutdown_signal().await;
    let _ = stop_tx.send(());

    let grace = Duration::from_secs(config.server.shutdown_timeout);
    match tokio::time::timeout(grace, server).await {
        Ok(Ok(Ok(()))) => info!("Server stopped"),
        Ok(Ok(Err(e))) => error!(error = %e, "Server error during shutdown"),
        Ok(Err(e)) => error!(error = %e, "Server task failed"),
        Err(_) => warn!(timeout_secs = grace.as_secs(), "Shutdown timed out; dropping open connections"),
    }

    pool.close().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
