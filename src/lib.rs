//! framecast — latest-wins multi-image telemetry streaming
//!
//! Streams synchronized multi-image frames (several camera views plus a
//! numeric state vector) from a producer to consumers over a persistent
//! WebSocket connection, optimized for freshness over completeness: a slow
//! consumer sees the newest available frame late instead of back-pressuring
//! the producer into unbounded queueing.
//!
//! Core pieces:
//!
//! - [`protocol`] — pure encode/decode between a [`Frame`] and its
//!   bit-exact binary wire representation
//! - [`server`] — accept loop plus the per-connection [`Pacer`], which
//!   paces production against anchored deadlines and applies drop-latest
//!   backpressure with bounded-time send attempts
//! - [`client`] — the [`Receiver`] loop decoding inbound frames and
//!   measuring latency
//! - [`slot`] — the single-item, overwrite-on-write [`LatestSlot`] used on
//!   both ends
//! - [`state`] — the validated [`StreamState`] metadata schema
//!
//! The protocol is deliberately not a durable message log: no delivery
//! guarantees, no replay, no frame history.
//!
//! # Server example
//!
//! ```no_run
//! use framecast::{ImageBank, RandomStateFeed, ServerConfig, StreamServer};
//!
//! # async fn example() -> framecast::Result<()> {
//! let bank = ImageBank::from_dir("media")?;
//! let config = ServerConfig::default().target_fps(30.0);
//! let server = StreamServer::new(config, bank, RandomStateFeed);
//! server.run().await
//! # }
//! ```
//!
//! # Client example
//!
//! ```no_run
//! use framecast::{ClientConfig, Receiver};
//!
//! # async fn example() -> framecast::Result<()> {
//! let receiver = Receiver::new(ClientConfig::new("ws://127.0.0.1:8765"));
//! let slot = receiver.slot();
//! tokio::spawn(async move {
//!     if let Some(latest) = slot.peek() {
//!         println!("frame {} at {:.2} ms", latest.frame.frame_id, latest.latency_ms());
//!     }
//! });
//! receiver.run().await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod clock;
pub mod error;
pub mod protocol;
pub mod server;
pub mod slot;
pub mod source;
pub mod state;
pub mod stats;

pub use client::{ClientConfig, CloseReason, ReceivedFrame, Receiver};
pub use error::{Error, ProtocolError, Result, SourceError, TransportError, ValidationError};
pub use protocol::{Frame, ImageRole};
pub use server::{Pacer, ServerConfig, StreamServer};
pub use slot::LatestSlot;
pub use source::{ImageBank, ImageSet, RandomStateFeed, StateFeed};
pub use state::StreamState;
pub use stats::{TickReport, TickStats};
