//! Application bootstrap (component I): ties configuration, the broker,
//! the heartbeat task, and the HTTP surface together in a three-phase
//! `run`/`init`/`start` sequence.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;

use crate::broker::{Broker, heartbeat};
use crate::core::banner;
use crate::core::cli::{self, Cli};
use crate::core::config::RelayConfig;
use crate::core::shutdown::ShutdownService;
use crate::http;

/// The running application: configuration, the broker, and shutdown
/// coordination. Built once at startup by [`App::run`].
pub struct App {
    pub shutdown: ShutdownService,
    pub config: RelayConfig,
    pub broker: Arc<Broker>,
}

impl App {
    /// Parse CLI/env, initialize logging, build the app, and run it to
    /// completion (until a shutdown signal is received).
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();

        let cli = cli::parse();
        let config = RelayConfig::from_cli(&cli);
        Self::init_logging(&config.log.filter);

        tracing::debug!("application starting");
        tracing::trace!(?cli, "parsed CLI arguments");

        let app = Self::init(config);
        Self::start(app).await
    }

    fn init(config: RelayConfig) -> Self {
        let broker = Arc::new(Broker::new(config.broker));
        let shutdown = ShutdownService::new(broker.clone());
        Self { shutdown, config, broker }
    }

    fn init_logging(filter: &str) {
        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter.to_string())
            .init();
    }

    async fn start(app: Self) -> Result<()> {
        // Install signal handlers first, before any blocking calls.
        app.shutdown.install_signal_handlers();

        let heartbeat_interval = std::time::Duration::from_millis(app.config.heartbeat.interval_ms);
        let heartbeat_handle = heartbeat::spawn(app.broker.clone(), heartbeat_interval, app.shutdown.subscribe());
        app.shutdown.register(heartbeat_handle).await;

        banner::print_banner(&app.config.server.host, app.config.server.port);

        let addr = SocketAddr::new(app.config.server.host.parse()?, app.config.server.port);
        http::serve(addr, app.broker.clone(), app.shutdown.clone()).await?;

        app.shutdown.shutdown().await;
        Ok(())
    }
}
