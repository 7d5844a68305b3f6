//! Transmission statistics

pub mod metrics;

pub use metrics::{TickReport, TickStats};
