//! Bookshelf Server - Main entry point

use anyhow::{Context, Result};
use bookshelf_common::logging::{init_logging, LogConfig};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tracing::info;

use bookshelf_server::{
    api::{self, AppState},
    auth::AuthKeys,
    catalog::PgCatalog,
    config::Config,
    db,
    features::{admins::AdminState, books::BookServices, books::UploadPolicy, FeatureState},
    media::MediaClient,
    storage::Storage,
};

#[tokio::main]
async fn main() -> Result<()> {
    // LOG_* may come from .env as well
    dotenvy::dotenv().ok();

    // Environment variables take precedence over these defaults
    let log_config = LogConfig::builder()
        .log_file_prefix("bookshelf-server")
        .filter_directives("bookshelf_server=debug,tower_http=debug,sqlx=info")
        .build()
        .with_env_overrides()?;

    init_logging(&log_config)?;

    info!("Starting Bookshelf Server");

    // Missing credentials are fatal here, never per request
    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    let db_pool = db::create_pool(&db::DbConfig::from(&config.database))
        .await
        .context("Failed to connect to the database")?;
    db::migrate(&db_pool).await?;

    let storage = Storage::new(config.storage.clone()).await?;
    let media = MediaClient::new(config.media.clone())?;
    info!(
        bucket = %config.storage.bucket,
        cloud = %config.media.cloud_name,
        "Provider clients initialized"
    );

    let keys = AuthKeys::from_config(&config.auth);

    let books = BookServices {
        catalog: Arc::new(PgCatalog::new(db_pool.clone())),
        documents: Arc::new(storage),
        media: Arc::new(media),
        policy: UploadPolicy::new(config.media.cover_folder.clone(), &config.upload),
    };

    let admins = AdminState {
        db: db_pool.clone(),
        keys: keys.clone(),
        registration_enabled: config.auth.registration_enabled,
    };

    let state = AppState {
        db: db_pool,
        features: FeatureState {
            books,
            admins,
            keys,
        },
    };

    let app = api::create_router(state, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
        .await?;

    info!("Server shut down gracefully");

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }

    // Give ongoing requests time to complete
    info!("Waiting up to {} seconds for connections to close", timeout_secs);
    tokio::time::sleep(Duration::from_secs(timeout_secs.min(5))).await;
}
