//! Stream server listener
//!
//! Handles the TCP accept loop, upgrades connections to WebSocket, and
//! spawns one pacer session per connected consumer.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{accept_async, WebSocketStream};

use crate::error::{Result, TransportError};
use crate::server::config::ServerConfig;
use crate::server::pacer::{FrameSink, Pacer};
use crate::source::{ImageBank, StateFeed};

/// Bounded-wait adapter over a WebSocket write half
///
/// One encoded frame payload per binary message.
pub struct WsSink<S>(SplitSink<WebSocketStream<S>, Message>);

impl<S: AsyncRead + AsyncWrite + Unpin> FrameSink for WsSink<S> {
    async fn send(&mut self, payload: Bytes) -> std::result::Result<(), TransportError> {
        self.0
            .send(Message::Binary(payload.to_vec()))
            .await
            .map_err(|e| match e {
                WsError::ConnectionClosed | WsError::AlreadyClosed => TransportError::Closed,
                other => TransportError::WebSocket(other.to_string()),
            })
    }
}

/// Telemetry stream server
///
/// Owns the preloaded image bank (shared read-only across connections)
/// and a prototype state feed cloned into each session.
pub struct StreamServer<F: StateFeed + Clone + Send + 'static> {
    config: ServerConfig,
    bank: Arc<ImageBank>,
    feed: F,
    next_session_id: AtomicU64,
}

impl<F: StateFeed + Clone + Send + 'static> StreamServer<F> {
    /// Create a new server over a preloaded image bank
    pub fn new(config: ServerConfig, bank: ImageBank, feed: F) -> Self {
        Self {
            config,
            bank: Arc::new(bank),
            feed,
            next_session_id: AtomicU64::new(1),
        }
    }

    /// Get the bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }

    /// Run the server
    ///
    /// This method blocks until the server is shut down.
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(
            addr = %self.config.bind_addr,
            fps = self.config.target_fps,
            sets = self.bank.len(),
            "stream server listening"
        );

        self.accept_loop(&listener).await
    }

    /// Run the server with graceful shutdown
    pub async fn run_until<Fut>(&self, shutdown: Fut) -> Result<()>
    where
        Fut: std::future::Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "stream server listening");

        tokio::select! {
            _ = shutdown => {
                tracing::info!("shutdown signal received");
                Ok(())
            }
            result = self.accept_loop(&listener) => result,
        }
    }

    async fn accept_loop(&self, listener: &TcpListener) -> Result<()> {
        loop {
            match listener.accept().await {
                Ok((socket, peer_addr)) => {
                    self.handle_connection(socket, peer_addr);
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to accept connection");
                }
            }
        }
    }

    fn handle_connection(&self, socket: TcpStream, peer_addr: SocketAddr) {
        let session_id = self.next_session_id.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(session_id = session_id, peer = %peer_addr, "new connection");

        if self.config.tcp_nodelay {
            if let Err(e) = socket.set_nodelay(true) {
                tracing::error!(error = %e, "failed to configure socket");
                return;
            }
        }

        let config = self.config.clone();
        let bank = Arc::clone(&self.bank);
        let feed = self.feed.clone();

        tokio::spawn(async move {
            if let Err(e) = run_session(session_id, socket, config, bank, feed).await {
                tracing::debug!(session_id = session_id, error = %e, "session error");
            }

            tracing::debug!(session_id = session_id, "session closed");
        });
    }
}

/// Serve one consumer until either side closes the connection
async fn run_session<F: StateFeed>(
    session_id: u64,
    socket: TcpStream,
    config: ServerConfig,
    bank: Arc<ImageBank>,
    feed: F,
) -> Result<()> {
    let ws = accept_async(socket)
        .await
        .map_err(|e| TransportError::WebSocket(e.to_string()))?;
    let (write, mut read) = ws.split();

    let mut sink = WsSink(write);
    let mut pacer = Pacer::new(session_id, &config, bank, feed);

    // The read half only watches for close; inbound data is not part of
    // the protocol. Either branch finishing ends the session, cancelling
    // the other loop's pending wait.
    tokio::select! {
        result = pacer.run(&mut sink) => result,
        _ = drain_until_closed(&mut read) => Ok(()),
    }
}

async fn drain_until_closed<S: AsyncRead + AsyncWrite + Unpin>(
    read: &mut futures_util::stream::SplitStream<WebSocketStream<S>>,
) {
    while let Some(msg) = read.next().await {
        match msg {
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => {}
        }
    }
}
