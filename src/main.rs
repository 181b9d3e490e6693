//! Resource gateway.
//!
//! Serves users, parcs and bookings over HTTP, backed by an upstream API that
//! fails intermittently. Every upstream call is retried with a fixed delay.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌────────────────────────────────────────────────┐
//!                     │                RESOURCE GATEWAY                │
//!   Client Request    │  ┌──────────┐   ┌──────────┐   ┌────────────┐  │
//!   ──────────────────┼─▶│   http   │──▶│  client  │──▶│ resilience │  │
//!                     │  │ handlers │   │ resource │   │  executor  │  │
//!                     │  └──────────┘   └──────────┘   └─────┬──────┘  │
//!                     │                                      │ attempt │
//!   Client Response   │  ┌──────────┐                  ┌─────▼──────┐  │
//!   ◀─────────────────┼──│ response │◀─────────────────│ transport  │◀─┼──── Upstream
//!                     │  │ mapping  │                  │  reqwest   │  │     API
//!                     │  └──────────┘                  └────────────┘  │
//!                     │  config · observability · lifecycle            │
//!                     └────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use resource_gateway::config::{resolve_config, ConfigOverrides};
use resource_gateway::http::HttpServer;
use resource_gateway::lifecycle::{wait_for_signal, Shutdown};
use resource_gateway::observability::init_logging;

#[derive(Parser)]
#[command(name = "resource-gateway", version)]
#[command(about = "HTTP gateway with retries in front of an unreliable resource API", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Upstream API base URL.
    #[arg(long, env = "EUROCAMP_API_URL")]
    upstream_url: Option<String>,

    /// Per-attempt request timeout in milliseconds.
    #[arg(long, env = "CLIENT_SERVICE_TIMEOUT")]
    timeout_ms: Option<u64>,

    /// Retries after the first attempt.
    #[arg(long, env = "CLIENT_SERVICE_RETRY_ATTEMPTS")]
    retry_attempts: Option<u32>,

    /// Fixed delay between attempts in milliseconds.
    #[arg(long, env = "CLIENT_SERVICE_RETRY_DELAY")]
    retry_delay_ms: Option<u64>,

    /// Address to serve on.
    #[arg(long, env = "GATEWAY_BIND")]
    bind: Option<String>,

    /// Port to serve on, keeping the host of the bind address.
    #[arg(long, env = "CLIENT_SERVICE_PORT")]
    port: Option<u16>,

    /// Log level when RUST_LOG is unset.
    #[arg(long, env = "GATEWAY_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            base_url: self.upstream_url.clone(),
            timeout_ms: self.timeout_ms,
            retry_attempts: self.retry_attempts,
            retry_delay_ms: self.retry_delay_ms,
            bind_address: self.bind.clone(),
            port: self.port,
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(cli.config.as_deref(), cli.overrides())?;

    init_logging(&config.observability)?;
    tracing::info!("resource-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        timeout_ms = config.upstream.timeout_ms,
        retry_attempts = config.retries.max_attempts,
        retry_delay_ms = config.retries.delay_ms,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::from_config(config)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        signal_shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
