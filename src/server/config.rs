//! Server configuration

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::engine::HubConfig;

/// Default listen port
pub const DEFAULT_PORT: u16 = 3000;

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Maximum concurrent channels (0 = unlimited)
    pub max_connections: usize,

    /// Per-channel outbound queue capacity
    pub outbox_capacity: usize,

    /// Hub inbound event queue capacity
    pub event_queue_capacity: usize,

    /// Stats log interval (zero disables)
    pub stats_interval: Duration,

    /// Directory served for non-WebSocket requests (index page, scripts, styles)
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            max_connections: 0, // Unlimited
            outbox_capacity: 64,
            event_queue_capacity: 1024,
            stats_interval: Duration::from_secs(60),
            static_dir: None,
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set maximum connections
    pub fn max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Set per-channel outbox capacity (minimum 1)
    pub fn outbox_capacity(mut self, capacity: usize) -> Self {
        self.outbox_capacity = capacity.max(1);
        self
    }

    /// Set hub event queue capacity (minimum 1)
    pub fn event_queue_capacity(mut self, capacity: usize) -> Self {
        self.event_queue_capacity = capacity.max(1);
        self
    }

    /// Set stats log interval
    pub fn stats_interval(mut self, interval: Duration) -> Self {
        self.stats_interval = interval;
        self
    }

    /// Serve static files from `dir`
    pub fn static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    /// Settings for the hub task
    pub fn hub_config(&self) -> HubConfig {
        HubConfig {
            queue_capacity: self.event_queue_capacity,
            stats_interval: self.stats_interval,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();

        assert_eq!(config.bind_addr.port(), DEFAULT_PORT);
        assert_eq!(config.max_connections, 0);
        assert_eq!(config.outbox_capacity, 64);
        assert!(config.static_dir.is_none());
    }

    #[test]
    fn test_with_addr() {
        let addr: SocketAddr = "127.0.0.1:4000".parse().unwrap();
        let config = ServerConfig::with_addr(addr);

        assert_eq!(config.bind_addr.port(), 4000);
    }

    #[test]
    fn test_builder_capacities_have_floor() {
        let config = ServerConfig::default()
            .outbox_capacity(0)
            .event_queue_capacity(0);

        assert_eq!(config.outbox_capacity, 1);
        assert_eq!(config.event_queue_capacity, 1);
    }

    #[test]
    fn test_builder_chaining() {
        let addr: SocketAddr = "127.0.0.1:3001".parse().unwrap();
        let config = ServerConfig::default()
            .bind(addr)
            .max_connections(50)
            .outbox_capacity(32)
            .stats_interval(Duration::ZERO)
            .static_dir("public");

        assert_eq!(config.bind_addr, addr);
        assert_eq!(config.max_connections, 50);
        assert_eq!(config.outbox_capacity, 32);
        assert_eq!(config.static_dir, Some(PathBuf::from("public")));

        let hub = config.hub_config();
        assert_eq!(hub.stats_interval, Duration::ZERO);
        assert_eq!(hub.queue_capacity, 1024);
    }
}
