//! Receive loop
//!
//! The protocol's mirror image: consume inbound binary messages, decode,
//! compute latency against the embedded send timestamp, and publish into
//! the client-side latest-value slot. Any decode failure is fatal for the
//! connection — there is no skip-and-continue recovery.

use std::sync::Arc;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::tungstenite::error::ProtocolError as WsProtocolError;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, WebSocketStream};

use crate::client::config::ClientConfig;
use crate::clock;
use crate::error::{Result, TransportError};
use crate::protocol::{decode, Frame};
use crate::slot::LatestSlot;

/// Why the receive loop exited without an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Close handshake completed or the stream ended cleanly
    Normal,
    /// Peer went away without a close handshake
    Abrupt,
}

/// A decoded frame plus receive-side timing
///
/// Latency assumes producer and consumer clocks are comparable; across
/// hosts the figure is only meaningful with synchronized clocks.
#[derive(Debug, Clone)]
pub struct ReceivedFrame {
    /// The decoded frame
    pub frame: Frame,
    /// Consumer wall clock (ns) when the message arrived
    pub recv_timestamp_ns: u64,
    /// `recv_timestamp_ns - frame.send_timestamp_ns`; signed because an
    /// unsynchronized consumer clock can run behind the producer's
    pub latency_ns: i64,
}

impl ReceivedFrame {
    /// Latency in milliseconds
    pub fn latency_ms(&self) -> f64 {
        self.latency_ns as f64 / 1e6
    }
}

/// Receive loop for one stream connection
///
/// Publishes every decoded frame into a shared [`LatestSlot`]; readers
/// `peek()` the newest frame whenever they want one.
pub struct Receiver {
    config: ClientConfig,
    slot: Arc<LatestSlot<ReceivedFrame>>,
}

impl Receiver {
    /// Create a receiver with a fresh slot
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            slot: Arc::new(LatestSlot::new()),
        }
    }

    /// Handle to the slot holding the most recently decoded frame
    pub fn slot(&self) -> Arc<LatestSlot<ReceivedFrame>> {
        Arc::clone(&self.slot)
    }

    /// Connect to the configured server and run until the connection closes
    pub async fn run(&self) -> Result<CloseReason> {
        let (ws, _response) = connect_async(self.config.source_url.as_str())
            .await
            .map_err(|e| TransportError::WebSocket(e.to_string()))?;

        tracing::info!(url = %self.config.source_url, "connected");
        self.run_on(ws).await
    }

    /// Run the receive loop over an established WebSocket
    pub async fn run_on<S>(&self, mut ws: WebSocketStream<S>) -> Result<CloseReason>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        use futures_util::StreamExt;

        while let Some(message) = ws.next().await {
            match message {
                Ok(Message::Binary(data)) => {
                    self.ingest(Bytes::from(data), clock::now_ns())?;
                }
                Ok(Message::Close(_)) => {
                    tracing::debug!("close frame received");
                    return Ok(CloseReason::Normal);
                }
                // Text/ping/pong are not part of the protocol
                Ok(_) => {}
                Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => {
                    return Ok(CloseReason::Normal);
                }
                Err(WsError::Protocol(WsProtocolError::ResetWithoutClosingHandshake)) => {
                    return Ok(CloseReason::Abrupt);
                }
                Err(e) => return Err(TransportError::WebSocket(e.to_string()).into()),
            }
        }

        Ok(CloseReason::Normal)
    }

    /// Decode one inbound payload and publish it
    ///
    /// A decode failure aborts the connection: the caller sees the
    /// protocol error and the slot keeps the last good frame.
    fn ingest(&self, payload: Bytes, recv_timestamp_ns: u64) -> Result<()> {
        let frame = decode(payload)?;
        let latency_ns = recv_timestamp_ns as i64 - frame.send_timestamp_ns as i64;

        tracing::trace!(
            frame_id = frame.frame_id,
            latency_ms = latency_ns as f64 / 1e6,
            images = frame.images.len(),
            "frame received"
        );

        self.slot.set(ReceivedFrame {
            frame,
            recv_timestamp_ns,
            latency_ns,
        });
        Ok(())
    }
}
