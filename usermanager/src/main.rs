//! User Manager Main Entry Point
//!
//! Serves user profiles and peer voting over REST, backed by PostgreSQL (or
//! memory) for durable state and Redis (or memory) as a read cache.

use dotenv::dotenv;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use usermanager::config::LogFormat;
use usermanager::{AppError, Dependencies, Settings};

/// Initialize tracing/logging.
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("usermanager=info,tower_http=info"));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_thread_ids(true),
                )
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
                .init();
        }
    }

    info!(
        service_name = "usermanager",
        service_version = env!("CARGO_PKG_VERSION"),
        ?format,
        "Tracing initialized"
    );
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenv().ok();

    let settings = Settings::from_env()?;
    init_tracing(settings.log_format);

    info!("Starting user manager");

    let deps = match Dependencies::new(&settings).await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    let listener = tokio::net::TcpListener::bind(settings.http_addr).await?;
    info!(address = %settings.http_addr, "REST API listening");

    axum::serve(listener, deps.router())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("User manager stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "Unable to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Unable to install SIGTERM handler");
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
}
