//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize all subsystems in dependency order
//! - Register periodic tasks with the scheduler
//! - Bind the listener and serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listener binds last (traffic only when ready)

use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use tokio::net::TcpListener;

use crate::config::{load_config, validate_config, AppConfig, ConfigError};
use crate::http::{AppState, BroadcastStatusTask, HttpServer, StatusHub};
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::shutdown_signal;
use crate::observability::{logging, metrics};
use crate::scheduler::TaskScheduler;
use crate::storage::{FlushRecordsTask, MemoryRepository, StorageError, VehicleRecordRepository};
use crate::vehicle::{SimulationTask, VehicleSimulator};

/// Command-line arguments of the `driver-care` service.
#[derive(Debug, Default, Parser)]
#[command(name = "driver-care")]
#[command(about = "Connected-vehicle telemetry simulator and API", long_about = None)]
pub struct Cli {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "DRIVER_CARE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override `server.bind_address`.
    #[arg(long)]
    pub bind: Option<String>,
}

/// Error type for startup failures.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to install metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The fully constructed service, bound but not yet serving.
pub struct Application {
    listener: TcpListener,
    server: HttpServer,
    scheduler: TaskScheduler,
    shutdown: Shutdown,
    simulator: Arc<VehicleSimulator>,
    repository: Arc<dyn VehicleRecordRepository>,
}

impl Application {
    /// Build every component in dependency order.
    pub async fn build(config: AppConfig) -> Result<Self, StartupError> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        if config.observability.metrics_enabled {
            let addr: SocketAddr = config
                .observability
                .metrics_address
                .parse()
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
            metrics::init_metrics(addr)?;
        }

        let repository: Arc<dyn VehicleRecordRepository> = match config.storage.snapshot() {
            Some(path) => Arc::new(MemoryRepository::with_snapshot(config.storage.max_records, path)?),
            None => Arc::new(MemoryRepository::new(config.storage.max_records)),
        };

        let simulator = Arc::new(VehicleSimulator::new(
            config.simulation.vehicle_id.clone(),
            Duration::from_millis(config.simulation.tick_ms),
            repository.clone(),
        ));
        if config.simulation.autostart {
            simulator.start(Utc::now());
        }

        let hub = StatusHub::new(config.broadcast.channel_capacity);
        let shutdown = Shutdown::new();

        let mut scheduler = TaskScheduler::new();
        scheduler.add_task(Arc::new(SimulationTask::new(simulator.clone())));
        scheduler.add_task(Arc::new(BroadcastStatusTask::new(
            simulator.clone(),
            hub.clone(),
            Duration::from_millis(config.broadcast.interval_ms),
        )));
        if config.storage.snapshot().is_some() {
            scheduler.add_task(Arc::new(FlushRecordsTask::new(
                repository.clone(),
                Duration::from_secs(config.storage.flush_interval_secs),
            )));
        }

        let state = AppState {
            simulator: simulator.clone(),
            hub,
            shutdown: shutdown.clone(),
        };
        let server = HttpServer::new(&config, state);

        let listener = TcpListener::bind(&config.server.bind_address)
            .await
            .map_err(|source| StartupError::Bind {
                address: config.server.bind_address.clone(),
                source,
            })?;

        tracing::info!(
            address = %listener.local_addr()?,
            vehicle_id = %config.simulation.vehicle_id,
            tasks = scheduler.len(),
            autostart = config.simulation.autostart,
            "Application initialized"
        );

        Ok(Self {
            listener,
            server,
            scheduler,
            shutdown,
            simulator,
            repository,
        })
    }

    /// The address actually bound, useful with port 0.
    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.listener.local_addr()
    }

    /// Serve until `signal` resolves, then shut down in order: stop accepting,
    /// stop scheduled tasks, stop the simulator, flush the store.
    pub async fn run<F>(self, signal: F) -> Result<(), StartupError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Self {
            listener,
            server,
            mut scheduler,
            shutdown,
            simulator,
            repository,
        } = self;

        scheduler.start(&shutdown);

        let trigger = shutdown.clone();
        let mut server_signal = shutdown.subscribe();
        let served = server
            .run(listener, async move {
                tokio::select! {
                    _ = signal => {
                        tracing::info!("Shutdown signal received");
                        trigger.trigger();
                    }
                    _ = server_signal.recv() => {}
                }
            })
            .await;

        shutdown.trigger();
        scheduler.join().await;
        simulator.stop();

        let flushed = tokio::task::spawn_blocking(move || repository.flush())
            .await
            .map_err(std::io::Error::other)?;
        if let Err(e) = flushed {
            tracing::error!(error = %e, "Final snapshot flush failed");
        }

        served?;
        tracing::info!("Shutdown complete");
        Ok(())
    }
}

/// Process entry: load config, initialize logging, build, serve until SIGINT/SIGTERM.
pub async fn run(cli: Cli) -> Result<(), StartupError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }

    if let Err(e) = logging::init_logging(&config.observability.log_level) {
        eprintln!("logging already initialized: {e}");
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?cli.config,
        bind_address = %config.server.bind_address,
        "driver-care starting"
    );

    let app = Application::build(config).await?;
    app.run(shutdown_signal()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.server.bind_address = "127.0.0.1:0".into();
        config
    }

    #[tokio::test]
    async fn test_build_binds_ephemeral_port() {
        let app = Application::build(test_config()).await.unwrap();
        assert_ne!(app.local_addr().unwrap().port(), 0);
        assert_eq!(app.scheduler.len(), 2);
        assert!(!app.simulator.is_running());
    }

    #[tokio::test]
    async fn test_build_rejects_invalid_config() {
        let mut config = test_config();
        config.simulation.tick_ms = 0;
        let err = Application::build(config).await.err().unwrap();
        assert!(matches!(err, StartupError::Config(ConfigError::Validation(_))));
    }

    #[tokio::test]
    async fn test_build_rejects_overflowing_period() {
        let mut config = test_config();
        config.storage.snapshot_path = "unused.json".into();
        config.storage.flush_interval_secs = 9_223_372_036_854_775_807;
        let err = Application::build(config).await.err().unwrap();
        assert!(matches!(err, StartupError::Config(ConfigError::Validation(ref e)) if e[0].field == "storage.flush_interval_secs"));
    }

    #[tokio::test]
    async fn test_autostart_and_flush_task() {
        let path = std::env::temp_dir().join(format!("driver-care-{}.json", uuid::Uuid::new_v4()));
        let mut config = test_config();
        config.simulation.autostart = true;
        config.storage.snapshot_path = path.display().to_string();

        let app = Application::build(config).await.unwrap();
        assert!(app.simulator.is_running());
        assert_eq!(app.scheduler.len(), 3);
    }

    #[tokio::test]
    async fn test_run_returns_after_signal() {
        let app = Application::build(test_config()).await.unwrap();
        let result = tokio::time::timeout(Duration::from_secs(5), app.run(async {})).await;
        assert!(result.unwrap().is_ok());
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::try_parse_from(["driver-care", "--config", "app.toml", "--bind", "127.0.0.1:9000"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("app.toml")));
        assert_eq!(cli.bind.as_deref(), Some("127.0.0.1:9000"));
    }
}
