use std::net::{SocketAddr, TcpListener};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use axum::Router;
use core_schema::{Metadata, StatusTableManager};
use core_store::TrackingStore;
use tokio::runtime::Builder;

use crate::router;
use crate::state::{AppState, TrackingConfig};

#[allow(clippy::needless_pass_by_value)]
#[must_use]
pub fn make_app(metadata: Metadata, config: TrackingConfig) -> Router {
    let store = TrackingStore::new(config.geojson_path.clone(), config.backup_dir.clone());
    let state = AppState::new(store, StatusTableManager::new(metadata), config);
    Router::new().nest("/tracking", router::create_router().with_state(state))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
pub fn run_test_server(metadata: Metadata, config: TrackingConfig) -> SocketAddr {
    let server_cond = Arc::new((Mutex::new(false), Condvar::new())); // Shared state with a condition
    let server_cond_clone = Arc::clone(&server_cond);

    let listener = TcpListener::bind("0.0.0.0:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();

    // Start a new thread for the server
    let _handle = std::thread::spawn(move || {
        let rt = Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("Failed to create Tokio runtime");

        rt.block_on(async move {
            let app = make_app(metadata, config);

            // Lock the mutex and set the notification flag
            {
                let (lock, cvar) = &*server_cond_clone;
                let mut notify_server_started = lock.lock().unwrap();
                *notify_server_started = true;
                cvar.notify_one();
            }

            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });
    // Not joining the thread; tests only need the address.

    let (lock, cvar) = &*server_cond;
    let timeout_duration = Duration::from_secs(1);

    let notified = lock.lock().unwrap();
    let result = cvar.wait_timeout(notified, timeout_duration).unwrap();

    if !*result.0 {
        tracing::error!("Timeout occurred while waiting for server start.");
    } else {
        tracing::info!("Test server is up and running.");
        std::thread::sleep(Duration::from_millis(10));
    }

    addr
}
