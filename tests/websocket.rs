//! WebSocket status stream tests.

use std::time::Duration;

use futures_util::{Stream, StreamExt};
use serde_json::Value;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

mod common;

use common::{spawn_app, test_config};

async fn next_status<S>(stream: &mut S) -> Value
where
    S: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .expect("no frame within timeout")
            .expect("stream ended")
            .unwrap();
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

#[tokio::test]
async fn test_client_receives_current_status_then_updates() {
    let app = spawn_app(test_config()).await;
    let (mut ws, _) = connect_async(app.ws_url("/ws/vehicle-status")).await.unwrap();

    let first = next_status(&mut ws).await;
    assert_eq!(first["vehicleData"]["id"], "vehicle_001");
    assert_eq!(first["vehicleData"]["gearPosition"], "P");

    let (code, _) = app.post_text("/api/vehicle/simulation/start").await;
    assert_eq!(code, 200);

    let mut driving = false;
    for _ in 0..40 {
        let status = next_status(&mut ws).await;
        if status["vehicleData"]["gearPosition"] == "D" {
            driving = true;
            break;
        }
    }
    assert!(driving, "broadcast never showed the vehicle driving");

    app.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_sessions_close_on_shutdown() {
    let app = spawn_app(test_config()).await;
    let (mut ws, _) = connect_async(app.ws_url("/ws/vehicle-status")).await.unwrap();
    next_status(&mut ws).await;

    app.shutdown().await.unwrap();

    let closed = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(msg) = ws.next().await {
            match msg {
                Ok(Message::Close(_)) | Err(_) => return true,
                Ok(_) => {}
            }
        }
        true
    })
    .await
    .unwrap();
    assert!(closed);
}
