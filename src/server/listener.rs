//! Presence hub server
//!
//! HTTP listener that upgrades `/ws` requests to hub channels and spawns a
//! connection task per channel.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::engine::{self, BroadcastEngine, HubHandle};
use crate::error::Result;
use crate::server::config::ServerConfig;
use crate::server::connection;

/// Shared state for request handlers
#[derive(Clone)]
struct AppState {
    hub: HubHandle,
    outbox_capacity: usize,
    connection_semaphore: Option<Arc<Semaphore>>,
}

/// Presence hub server
pub struct PresenceServer {
    config: ServerConfig,
    hub: HubHandle,
    connection_semaphore: Option<Arc<Semaphore>>,
}

impl PresenceServer {
    /// Create a new server with empty stores
    ///
    /// Spawns the hub task, so this must be called from within a tokio
    /// runtime.
    pub fn new(config: ServerConfig) -> Self {
        Self::with_engine(config, BroadcastEngine::default())
    }

    /// Create a new server around a prepared engine
    pub fn with_engine(config: ServerConfig, engine: BroadcastEngine) -> Self {
        let connection_semaphore = if config.max_connections > 0 {
            Some(Arc::new(Semaphore::new(config.max_connections)))
        } else {
            None
        };

        // The hub task lives until the last handle is dropped
        let (hub, _task) = engine::spawn(engine, config.hub_config());

        Self {
            config,
            hub,
            connection_semaphore,
        }
    }

    /// Get a handle to the hub task
    pub fn hub(&self) -> &HubHandle {
        &self.hub
    }

    /// Build the HTTP router
    pub fn router(&self) -> Router {
        let state = AppState {
            hub: self.hub.clone(),
            outbox_capacity: self.config.outbox_capacity,
            connection_semaphore: self.connection_semaphore.clone(),
        };

        let router = Router::new()
            .route("/ws", get(ws_handler))
            .with_state(state);

        let router = match &self.config.static_dir {
            Some(dir) => router.fallback_service(ServeDir::new(dir)),
            None => router,
        };

        router.layer(TraceLayer::new_for_http())
    }

    /// Run the server
    ///
    /// This method blocks until the server fails.
    pub async fn run(&self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Run the server with graceful shutdown
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            addr = %addr,
            static_dir = ?self.config.static_dir,
            "Presence hub listening"
        );

        axum::serve(
            listener,
            self.router()
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            shutdown.await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

        Ok(())
    }
}

async fn ws_handler(
    State(state): State<AppState>,
    ConnectInfo(peer_addr): ConnectInfo<SocketAddr>,
    ws: WebSocketUpgrade,
) -> Response {
    // Check connection limit
    let permit = match &state.connection_semaphore {
        Some(sem) => match Arc::clone(sem).try_acquire_owned() {
            Ok(permit) => Some(permit),
            Err(_) => {
                tracing::warn!(peer = %peer_addr, "Connection rejected: limit reached");
                return StatusCode::SERVICE_UNAVAILABLE.into_response();
            }
        },
        None => None,
    };

    let id = state.hub.next_connection_id();

    tracing::debug!(connection_id = %id, peer = %peer_addr, "WebSocket upgrade");

    ws.on_upgrade(move |socket| async move {
        let _permit = permit;
        connection::handle_socket(socket, id, peer_addr, state.hub, state.outbox_capacity).await;
    })
}
