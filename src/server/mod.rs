//! Server side: listener and per-connection transmission loop

pub mod config;
pub mod listener;
pub mod pacer;

pub use config::ServerConfig;
pub use listener::{StreamServer, WsSink};
pub use pacer::{FrameSink, Pacer};
