use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use botomat_core::WorkerStore;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::shutdown::{shutdown_manager::Shutdown, shutdown_reason::ShutdownReason};

pub const HEALTH_ENDPOINT: &str = "/health";
pub const STATUS_ENDPOINT: &str = "/status";

#[derive(Clone)]
pub struct StatusState {
    pub store: WorkerStore,
    pub tasks_per_worker: usize,
}

pub fn status_routes(store: WorkerStore, tasks_per_worker: usize) -> Router {
    Router::new()
        .route(HEALTH_ENDPOINT, get(health))
        .route(STATUS_ENDPOINT, get(status))
        .with_state(StatusState {
            store,
            tasks_per_worker,
        })
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, [(header::CONTENT_TYPE, "application/json")])
}

async fn status(State(state): State<StatusState>) -> impl IntoResponse {
    debug!("Serving status request");
    // The store lock is released before the snapshot is serialized.
    let snapshot = state.store.snapshot(state.tasks_per_worker).await;
    Json(snapshot)
}

/// Binds `address` and serves `router` until shutdown. Returns the bound address.
pub async fn start_status_server(
    address: SocketAddr,
    router: Router,
    shutdown: Arc<Shutdown<ShutdownReason>>,
) -> std::io::Result<SocketAddr> {
    let listener = TcpListener::bind(address).await?;
    let local_address = listener.local_addr()?;
    info!("Status server listening on {}", local_address);

    let server_handle = tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, router).await {
            error!("Status server failed: {}", err);
        }
    });

    shutdown
        .register_shutdown_task(
            || {
                Box::pin(async move {
                    server_handle.abort();
                })
            },
            "status server",
        )
        .await;

    Ok(local_address)
}
