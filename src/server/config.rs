//! Server configuration

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Target frame rate (0 disables pacing: produce as fast as possible)
    pub target_fps: f64,

    /// Output image width the media source is expected to serve
    pub image_width: u32,

    /// Output image height the media source is expected to serve
    pub image_height: u32,

    /// JPEG quality the media source is expected to serve
    pub jpeg_quality: u8,

    /// Directory of pre-encoded source images
    pub media_dir: PathBuf,

    /// Bounded wait for one send attempt; expiry is the backpressure
    /// signal, not an error
    pub send_timeout: Duration,

    /// How often each connection reports aggregated stats
    pub stats_interval: Duration,

    /// Enable TCP_NODELAY (disable Nagle's algorithm)
    pub tcp_nodelay: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8765".parse().unwrap(),
            target_fps: 30.0,
            image_width: 480,
            image_height: 300,
            jpeg_quality: 80,
            media_dir: PathBuf::from("media"),
            send_timeout: Duration::from_millis(2),
            stats_interval: Duration::from_secs(1),
            tcp_nodelay: true, // Important for low latency
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

    /// Set the target frame rate
    pub fn target_fps(mut self, fps: f64) -> Self {
        self.target_fps = fps;
        self
    }

    /// Set the media source directory
    pub fn media_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.media_dir = dir.into();
        self
    }

    /// Set the bounded send wait
    pub fn send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Set the stats reporting interval
    pub fn stats_interval(mut self, interval: Duration) -> Self {
        self.stats_interval = interval;
        self
    }

    /// Tick period derived from the target frame rate, `None` if unpaced
    pub fn period(&self) -> Option<Duration> {
        if self.target_fps > 0.0 {
            Some(Duration::from_secs_f64(1.0 / self.target_fps))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();

        assert_eq!(config.bind_addr.port(), 8765);
        assert_eq!(config.target_fps, 30.0);
        assert_eq!(config.image_width, 480);
        assert_eq!(config.image_height, 300);
        assert_eq!(config.jpeg_quality, 80);
        assert_eq!(config.send_timeout, Duration::from_millis(2));
        assert_eq!(config.stats_interval, Duration::from_secs(1));
        assert!(config.tcp_nodelay);
    }

    #[test]
    fn test_with_addr() {
        let addr: SocketAddr = "127.0.0.1:9000".parse().unwrap();
        let config = ServerConfig::with_addr(addr);

        assert_eq!(config.bind_addr.port(), 9000);
    }

    #[test]
    fn test_period_from_fps() {
        let config = ServerConfig::default().target_fps(50.0);

        assert_eq!(config.period(), Some(Duration::from_millis(20)));
    }

    #[test]
    fn test_zero_fps_disables_pacing() {
        let config = ServerConfig::default().target_fps(0.0);

        assert_eq!(config.period(), None);
    }

    #[test]
    fn test_builder_chaining() {
        let addr: SocketAddr = "127.0.0.1:8765".parse().unwrap();
        let config = ServerConfig::default()
            .bind(addr)
            .target_fps(15.0)
            .media_dir("/tmp/frames")
            .send_timeout(Duration::from_millis(5))
            .stats_interval(Duration::from_secs(2));

        assert_eq!(config.bind_addr, addr);
        assert_eq!(config.target_fps, 15.0);
        assert_eq!(config.media_dir, PathBuf::from("/tmp/frames"));
        assert_eq!(config.send_timeout, Duration::from_millis(5));
        assert_eq!(config.stats_interval, Duration::from_secs(2));
    }
}
