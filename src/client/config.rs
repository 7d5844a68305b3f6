//! Client configuration

use std::net::SocketAddr;

/// Client configuration options
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket URL of the stream server
    pub source_url: String,

    /// Local address for an external viewer collaborator, if any.
    /// Pass-through only; the receive loop does not serve HTTP.
    pub viewer_addr: Option<SocketAddr>,
}

impl ClientConfig {
    /// Create a config pointing at a stream server
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            viewer_addr: None,
        }
    }

    /// Set the viewer address
    pub fn viewer(mut self, addr: SocketAddr) -> Self {
        self.viewer_addr = Some(addr);
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("ws://127.0.0.1:8765")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();

        assert_eq!(config.source_url, "ws://127.0.0.1:8765");
        assert!(config.viewer_addr.is_none());
    }

    #[test]
    fn test_builder_viewer() {
        let addr: SocketAddr = "127.0.0.1:8000".parse().unwrap();
        let config = ClientConfig::new("ws://10.0.0.1:8765").viewer(addr);

        assert_eq!(config.source_url, "ws://10.0.0.1:8765");
        assert_eq!(config.viewer_addr, Some(addr));
    }
}
