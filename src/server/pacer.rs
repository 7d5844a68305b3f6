//! Pacer / transmission loop
//!
//! Drives frame production at a target cadence, owns the pending-payload
//! slot on the send side, and performs bounded-time send attempts against
//! the transport.
//!
//! Deadlines are anchored to the stream origin (`stream_start + k * period`
//! for tick `k`), never "sleep one period after the last tick", so per-tick
//! scheduling jitter cannot accumulate into drift.
//!
//! Backpressure policy is drop-latest: only the newest built frame is ever
//! a send candidate. A payload that could not be sent within the bounded
//! wait stays in the slot and is discarded, counted as dropped, as soon as
//! the next tick builds a fresh one. Memory is bounded to one pending
//! payload and added latency to one bounded-wait interval; the cost is
//! delivery completeness, which is the right trade for a live feed where
//! stale data has near-zero value.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::time::Instant;

use crate::clock;
use crate::error::{Result, TransportError};
use crate::protocol::{encode, Frame};
use crate::server::config::ServerConfig;
use crate::slot::LatestSlot;
use crate::source::{ImageBank, StateFeed};
use crate::stats::TickStats;

/// Bounded-wait frame transport seen from the pacer
///
/// Implemented by the WebSocket write half
/// ([`WsSink`](crate::server::listener::WsSink)) and by mocks in tests.
#[allow(async_fn_in_trait)]
pub trait FrameSink {
    /// Send one encoded frame payload
    async fn send(&mut self, payload: Bytes) -> std::result::Result<(), TransportError>;
}

/// An encoded frame awaiting its send attempt
#[derive(Debug, Clone)]
struct Pending {
    frame_id: u64,
    payload: Bytes,
}

/// Offset of tick `k` from the stream origin
pub fn tick_offset(period: Duration, tick: u64) -> Duration {
    Duration::from_nanos((period.as_nanos() as u64).saturating_mul(tick))
}

/// Per-connection transmission loop state
pub struct Pacer<F: StateFeed> {
    session_id: u64,
    period: Option<Duration>,
    send_timeout: Duration,
    stats_interval: Duration,
    bank: Arc<ImageBank>,
    feed: F,
    frame_id: u64,
    pending: LatestSlot<Pending>,
    stats: TickStats,
}

impl<F: StateFeed> Pacer<F> {
    /// Create a pacer for one connection
    pub fn new(session_id: u64, config: &ServerConfig, bank: Arc<ImageBank>, feed: F) -> Self {
        Self {
            session_id,
            period: config.period(),
            send_timeout: config.send_timeout,
            stats_interval: config.stats_interval,
            bank,
            feed,
            frame_id: 0,
            pending: LatestSlot::new(),
            stats: TickStats::new(Instant::now().into_std()),
        }
    }

    /// Rolling counters (reset every reporting interval)
    pub fn stats(&self) -> &TickStats {
        &self.stats
    }

    /// Run the transmission loop until the transport closes
    ///
    /// Returns `Ok(())` on close; a pending payload at close time is
    /// discarded, not an error.
    pub async fn run<S: FrameSink>(&mut self, sink: &mut S) -> Result<()> {
        let stream_start = Instant::now();

        loop {
            if let Some(period) = self.period {
                let target = stream_start + tick_offset(period, self.frame_id);
                let now = Instant::now();
                if now < target {
                    tokio::time::sleep_until(target).await;
                } else if now - target > period / 2 {
                    // Degraded pacing; still produce immediately
                    self.stats.note_missed_deadline();
                }
            }

            let payload = self.build_payload()?;

            // Drop-oldest-pending: a payload still unsent from an earlier
            // tick is superseded, never queued behind the new one.
            if let Some(dropped) = self.pending.set(Pending {
                frame_id: self.frame_id,
                payload,
            }) {
                self.stats.note_dropped();
                tracing::trace!(
                    session_id = self.session_id,
                    frame_id = dropped.frame_id,
                    "dropped unsent frame"
                );
            }

            if let Some(pending) = self.pending.take() {
                let bytes = pending.payload.len();
                match tokio::time::timeout(self.send_timeout, sink.send(pending.payload.clone()))
                    .await
                {
                    Ok(Ok(())) => self.stats.note_sent(bytes),
                    Ok(Err(TransportError::Closed)) => {
                        // Expected client lifecycle, not an application error
                        tracing::debug!(session_id = self.session_id, "transport closed");
                        return Ok(());
                    }
                    Ok(Err(e)) => return Err(e.into()),
                    Err(_) => {
                        // Backpressured; keep the payload for a later tick
                        self.pending.set(pending);
                    }
                }
            }

            let now = Instant::now().into_std();
            if self.stats.report_due(now, self.stats_interval) {
                let report = self.stats.drain_report(now);
                tracing::info!(
                    session_id = self.session_id,
                    mib_per_sec = report.mib_per_sec,
                    msgs_per_sec = report.msgs_per_sec,
                    bytes_sent = report.bytes_sent,
                    missed_deadlines = report.missed_deadlines,
                    dropped_frames = report.dropped_frames,
                    "tx report"
                );
            }

            self.frame_id += 1;
        }
    }

    /// Build and encode the frame for the current tick
    fn build_payload(&mut self) -> Result<Bytes> {
        let send_ts = clock::now_ns();
        let state = self.feed.next(send_ts);

        let mut frame = Frame::new(self.frame_id, send_ts, state.to_meta());
        frame.images = self.bank.set(self.frame_id).clone();

        encode(&frame)
    }
}
