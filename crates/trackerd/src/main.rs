pub(crate) mod cli;

use api_tracking::router::create_router as create_tracking_router;
use api_tracking::state::{AppState, TrackingConfig};
use axum::{Json, Router, routing::get};
use clap::Parser;
use core_schema::{MetadataStore, StatusTableManager};
use core_store::TrackingStore;
use dotenv::dotenv;
use tokio::signal;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
#[allow(clippy::expect_used)]
async fn main() {
    dotenv().ok();

    let opts = cli::CliOpts::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("trackerd={},tower_http=debug", opts.tracing_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let metadata_store =
        MetadataStore::open(&opts.metadata_file).expect("Failed to load column metadata");
    // Republish the TOML mirror so it always matches the JSON document.
    metadata_store
        .mirror_toml()
        .expect("Failed to write metadata mirror");

    let config = TrackingConfig {
        geojson_path: opts.geojson_file.clone(),
        backup_dir: opts.backup_dir.clone(),
        excel_path: opts.excel_file.clone(),
        shapefile_path: opts.shapefile_file.clone(),
        sheet_name: opts.sheet_name.clone(),
        key_column: opts.key_column.clone(),
        name_column: opts.name_column.clone(),
        timestamp_column: opts.timestamp_column.clone(),
    };
    let store = TrackingStore::new(config.geojson_path.clone(), config.backup_dir.clone());
    let manager = StatusTableManager::new(metadata_store.metadata().clone());
    let state = AppState::new(store, manager, config);

    let router = Router::new()
        .nest("/tracking", create_tracking_router().with_state(state))
        .route("/health", get(|| async { Json("OK") }))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(std::time::Duration::from_secs(
            opts.request_timeout_secs,
        )))
        .layer(CatchPanicLayer::new());

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", opts.host, opts.port))
        .await
        .expect("Failed to bind to address");
    let addr = listener.local_addr().expect("Failed to get local address");
    tracing::info!("Listening on http://{}", addr);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");
}

/// Wait for either a Ctrl+C signal or a SIGTERM signal.
///
/// # Panics
/// If the function fails to install the signal handler, it will panic.
#[allow(clippy::expect_used, clippy::redundant_pub_crate)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::warn!("Ctrl+C received, starting graceful shutdown");
        },
        () = terminate => {
            tracing::warn!("SIGTERM received, starting graceful shutdown");
        },
    }
}
