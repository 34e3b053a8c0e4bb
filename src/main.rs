use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::prelude::*;

use presence_hub::server::DEFAULT_PORT;
use presence_hub::{PresenceServer, ServerConfig};

/// Realtime presence-broadcast hub
#[derive(Debug, Parser)]
#[command(name = "presence-hub", version, about)]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Maximum concurrent channels (0 = unlimited)
    #[arg(long, env = "PRESENCE_HUB_MAX_CONNECTIONS", default_value_t = 0)]
    max_connections: usize,

    /// Per-channel outbound queue capacity
    #[arg(long, default_value_t = 64)]
    outbox_capacity: usize,

    /// Seconds between stats log lines (0 disables)
    #[arg(long, default_value_t = 60)]
    stats_interval: u64,

    /// Directory with the client page and assets
    #[arg(long, env = "PRESENCE_HUB_STATIC_DIR", value_name = "DIR")]
    static_dir: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> ServerConfig {
        let config = ServerConfig::with_addr(SocketAddr::new(self.host, self.port))
            .max_connections(self.max_connections)
            .outbox_capacity(self.outbox_capacity)
            .stats_interval(Duration::from_secs(self.stats_interval));

        match self.static_dir {
            Some(dir) => config.static_dir(dir),
            None => config,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("presence_hub=info,tower_http=info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(env_filter)
        .init();

    let config = Cli::parse().into_config();
    let server = PresenceServer::new(config);

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
        })
        .await
        .context("Presence hub failed")?;

    Ok(())
}
