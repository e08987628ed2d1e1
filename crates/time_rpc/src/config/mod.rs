use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Port the server listens on and the client targets by default
pub const DEFAULT_PORT: u16 = 50051;
pub const DEFAULT_TARGET: &str = "localhost:50051";

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// How long in-flight calls may run once shutdown begins
    pub grace_period: Duration,
    /// How long drained connections get to hang up before they are closed
    pub linger: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            grace_period: Duration::from_secs(30),
            linger: Duration::from_secs(1),
        }
    }
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// `host:port` of the server
    pub target: String,
    pub connect_timeout: Duration,
    /// Deadline of a single call
    pub call_timeout: Duration,
    /// Bound on releasing the channel
    pub shutdown_grace: Duration,
}

impl ClientConfig {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET.to_string(),
            connect_timeout: Duration::from_secs(10),
            call_timeout: Duration::from_secs(10),
            shutdown_grace: Duration::from_secs(5),
        }
    }
}
