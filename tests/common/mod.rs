//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;

use driver_care::config::AppConfig;
use driver_care::lifecycle::{Application, StartupError};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// A service instance bound to an ephemeral port.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    stop: Option<oneshot::Sender<()>>,
    handle: JoinHandle<Result<(), StartupError>>,
}

/// Configuration with an ephemeral port and fast ticks.
#[allow(dead_code)]
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.server.bind_address = "127.0.0.1:0".into();
    config.simulation.tick_ms = 50;
    config.broadcast.interval_ms = 50;
    config
}

/// Build and run the service in the background.
pub async fn spawn_app(config: AppConfig) -> TestApp {
    let app = Application::build(config).await.unwrap();
    let addr = app.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();

    let handle = tokio::spawn(app.run(async move {
        let _ = stopped.await;
    }));

    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap();

    TestApp {
        addr,
        client,
        stop: Some(stop),
        handle,
    }
}

#[allow(dead_code)]
impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn ws_url(&self, path: &str) -> String {
        format!("ws://{}{}", self.addr, path)
    }

    pub async fn get_json(&self, path: &str) -> serde_json::Value {
        let res = self.client.get(self.url(path)).send().await.unwrap();
        assert_eq!(res.status(), 200, "GET {path}");
        res.json().await.unwrap()
    }

    pub async fn post_text(&self, path: &str) -> (u16, String) {
        let res = self.client.post(self.url(path)).send().await.unwrap();
        let status = res.status().as_u16();
        (status, res.text().await.unwrap())
    }

    /// Trigger shutdown and wait for the service to finish.
    pub async fn shutdown(mut self) -> Result<(), StartupError> {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        tokio::time::timeout(Duration::from_secs(10), self.handle)
            .await
            .expect("service did not shut down")
            .unwrap()
    }
}
