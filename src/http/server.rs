//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, metrics, CORS, timeout)
//! - Serve on a bound listener until the shutdown future resolves

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::routing::get;
use axum::{middleware, Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::http::middleware::{cors_layer, track_metrics};
use crate::http::websocket::{ws_handler, StatusHub};
use crate::http::api;
use crate::lifecycle::Shutdown;
use crate::vehicle::VehicleSimulator;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub simulator: Arc<VehicleSimulator>,
    pub hub: StatusHub,
    pub shutdown: Shutdown,
}

/// HTTP server for the vehicle API.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: &AppConfig, state: AppState) -> Self {
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .route("/health", get(health))
            .route("/ws/vehicle-status", get(ws_handler))
            .nest("/api/vehicle", api::routes())
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(middleware::from_fn(track_metrics))
                    .layer(cors_layer(&config.cors))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.server.request_timeout_secs))),
            )
    }

    /// The router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` resolves. In-flight requests are drained first.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "simulationRunning": state.simulator.is_running(),
    }))
}
