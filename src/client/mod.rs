//! Client side: receive loop and latency measurement

pub mod config;
pub mod receiver;

pub use config::ClientConfig;
pub use receiver::{CloseReason, ReceivedFrame, Receiver};
