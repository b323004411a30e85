//! Client configuration types.

use std::time::Duration;

/// Loopback address the engine listens on
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Timeouts applied to engine calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Host the engine listens on
    pub host: String,

    /// Deadline for opening a channel
    pub connect_timeout: Duration,

    /// Deadline for a health check, including the connect
    pub health_timeout: Duration,

    /// Deadline for the management shutdown call
    pub shutdown_timeout: Duration,

    /// Deadline for a scan; `None` leaves it to the engine
    pub scan_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            connect_timeout: Duration::from_secs(5),
            health_timeout: Duration::from_secs(1),
            shutdown_timeout: Duration::from_secs(2),
            scan_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Create a configuration with the default timeouts
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the connect timeout
    #[must_use]
    pub fn connect_timeout(mut self, duration: Duration) -> Self {
        self.connect_timeout = duration;
        self
    }

    /// Set the health check timeout
    #[must_use]
    pub fn health_timeout(mut self, duration: Duration) -> Self {
        self.health_timeout = duration;
        self
    }

    /// Set the shutdown timeout
    #[must_use]
    pub fn shutdown_timeout(mut self, duration: Duration) -> Self {
        self.shutdown_timeout = duration;
        self
    }

    /// Bound scan calls on the client side
    #[must_use]
    pub fn scan_timeout(mut self, duration: Duration) -> Self {
        self.scan_timeout = Some(duration);
        self
    }

    /// `host:port` for the given port
    #[must_use]
    pub fn address(&self, port: u16) -> String {
        format!("{}:{port}", self.host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.health_timeout, Duration::from_secs(1));
        assert!(config.scan_timeout.is_none());
        assert_eq!(config.address(4242), "127.0.0.1:4242");
    }

    #[test]
    fn test_setters() {
        let config = ClientConfig::new()
            .health_timeout(Duration::from_millis(250))
            .scan_timeout(Duration::from_secs(30));
        assert_eq!(config.health_timeout, Duration::from_millis(250));
        assert_eq!(config.scan_timeout, Some(Duration::from_secs(30)));
    }
}
