//! WebSocket status stream.
//!
//! # Data Flow
//! ```text
//! BroadcastStatusTask (scheduler) → StatusHub::publish → broadcast channel
//!     → one session per client → JSON text frame
//! ```
//!
//! # Design Decisions
//! - Status is serialized once per broadcast, not once per client
//! - New clients get the current status immediately, then every broadcast
//! - Slow clients skip frames (`Lagged`) rather than block the publisher
//! - Sessions end on client close or service shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::http::server::AppState;
use crate::observability::metrics;
use crate::scheduler::{async_trait, Task};
use crate::vehicle::{VehicleSimulator, VehicleStatus};

/// Fan-out point for serialized vehicle status frames.
#[derive(Clone)]
pub struct StatusHub {
    tx: broadcast::Sender<String>,
}

impl StatusHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Serialize and send `status` to every subscriber. Returns how many received it.
    pub fn publish(&self, status: &VehicleStatus) -> Result<usize, serde_json::Error> {
        let frame = serde_json::to_string(status)?;
        Ok(self.tx.send(frame).unwrap_or(0))
    }
}

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| async move {
        metrics::record_ws_client(1.0);
        tracing::debug!("WebSocket client connected");
        session(socket, state).await;
        metrics::record_ws_client(-1.0);
        tracing::debug!("WebSocket client disconnected");
    })
}

async fn session(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let mut updates = state.hub.subscribe();
    let mut shutdown = state.shutdown.subscribe();

    match serde_json::to_string(&*state.simulator.current_status()) {
        Ok(frame) => {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                return;
            }
        }
        Err(e) => tracing::error!(error = %e, "Failed to serialize vehicle status"),
    }

    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                let _ = sender.send(Message::Close(None)).await;
                break;
            }
            update = updates.recv() => match update {
                Ok(frame) => {
                    if sender.send(Message::Text(frame.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "WebSocket client lagging, frames skipped");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
}

/// Pushes the current status to WebSocket subscribers.
pub struct BroadcastStatusTask {
    simulator: Arc<VehicleSimulator>,
    hub: StatusHub,
    period: Duration,
}

impl BroadcastStatusTask {
    pub fn new(simulator: Arc<VehicleSimulator>, hub: StatusHub, period: Duration) -> Self {
        Self {
            simulator,
            hub,
            period,
        }
    }
}

#[async_trait]
impl Task for BroadcastStatusTask {
    fn name(&self) -> &'static str {
        "broadcast_status"
    }

    fn period(&self) -> Duration {
        self.period
    }

    async fn run(&self) -> anyhow::Result<()> {
        if self.hub.subscriber_count() == 0 {
            return Ok(());
        }
        let delivered = self.hub.publish(&self.simulator.current_status())?;
        tracing::trace!(delivered, "Vehicle status broadcast");
        Ok(())
    }
}
