//! Rolling per-connection transmission counters
//!
//! The pacer resets these every reporting interval; they are an
//! observability side effect, not part of the correctness contract.

use std::time::{Duration, Instant};

/// Rolling counters for one connection's transmission loop
#[derive(Debug)]
pub struct TickStats {
    /// Bytes successfully handed to the transport since the last report
    pub bytes_sent: u64,
    /// Frames successfully handed to the transport since the last report
    pub frames_sent: u64,
    /// Ticks that fired more than half a period late
    pub missed_deadlines: u64,
    /// Frames discarded unsent because a newer frame superseded them
    pub dropped_frames: u64,
    /// When the counters were last reset
    last_report: Instant,
}

/// Aggregated snapshot emitted once per reporting interval
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Throughput in MiB per second
    pub mib_per_sec: f64,
    /// Messages per second
    pub msgs_per_sec: f64,
    /// Bytes sent during the interval
    pub bytes_sent: u64,
    /// Missed deadlines during the interval
    pub missed_deadlines: u64,
    /// Dropped frames during the interval
    pub dropped_frames: u64,
}

impl TickStats {
    /// Create counters anchored at `now`
    pub fn new(now: Instant) -> Self {
        Self {
            bytes_sent: 0,
            frames_sent: 0,
            missed_deadlines: 0,
            dropped_frames: 0,
            last_report: now,
        }
    }

    /// Record a successful send
    pub fn note_sent(&mut self, bytes: usize) {
        self.bytes_sent += bytes as u64;
        self.frames_sent += 1;
    }

    /// Record a frame discarded unsent
    pub fn note_dropped(&mut self) {
        self.dropped_frames += 1;
    }

    /// Record a tick that fired late
    pub fn note_missed_deadline(&mut self) {
        self.missed_deadlines += 1;
    }

    /// Whether a reporting interval has elapsed since the last report
    pub fn report_due(&self, now: Instant, interval: Duration) -> bool {
        now.duration_since(self.last_report) >= interval
    }

    /// Take an aggregated snapshot and reset the counters
    pub fn drain_report(&mut self, now: Instant) -> TickReport {
        let elapsed = now.duration_since(self.last_report).as_secs_f64();
        let report = if elapsed > 0.0 {
            TickReport {
                mib_per_sec: (self.bytes_sent as f64 / (1024.0 * 1024.0)) / elapsed,
                msgs_per_sec: self.frames_sent as f64 / elapsed,
                bytes_sent: self.bytes_sent,
                missed_deadlines: self.missed_deadlines,
                dropped_frames: self.dropped_frames,
            }
        } else {
            TickReport {
                mib_per_sec: 0.0,
                msgs_per_sec: 0.0,
                bytes_sent: self.bytes_sent,
                missed_deadlines: self.missed_deadlines,
                dropped_frames: self.dropped_frames,
            }
        };

        self.bytes_sent = 0;
        self.frames_sent = 0;
        self.missed_deadlines = 0;
        self.dropped_frames = 0;
        self.last_report = now;

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_zeroed() {
        let stats = TickStats::new(Instant::now());
        assert_eq!(stats.bytes_sent, 0);
        assert_eq!(stats.frames_sent, 0);
        assert_eq!(stats.missed_deadlines, 0);
        assert_eq!(stats.dropped_frames, 0);
    }

    #[test]
    fn test_note_sent_accumulates() {
        let mut stats = TickStats::new(Instant::now());
        stats.note_sent(1000);
        stats.note_sent(500);

        assert_eq!(stats.bytes_sent, 1500);
        assert_eq!(stats.frames_sent, 2);
    }

    #[test]
    fn test_report_due() {
        let start = Instant::now();
        let stats = TickStats::new(start);
        let interval = Duration::from_secs(1);

        assert!(!stats.report_due(start + Duration::from_millis(500), interval));
        assert!(stats.report_due(start + Duration::from_secs(1), interval));
    }

    #[test]
    fn test_drain_report_resets() {
        let start = Instant::now();
        let mut stats = TickStats::new(start);
        stats.note_sent(2 * 1024 * 1024);
        stats.note_dropped();
        stats.note_missed_deadline();

        let report = stats.drain_report(start + Duration::from_secs(2));

        assert_eq!(report.bytes_sent, 2 * 1024 * 1024);
        assert_eq!(report.dropped_frames, 1);
        assert_eq!(report.missed_deadlines, 1);
        assert!((report.mib_per_sec - 1.0).abs() < 1e-9);
        assert!((report.msgs_per_sec - 0.5).abs() < 1e-9);

        assert_eq!(stats.bytes_sent, 0);
        assert_eq!(stats.frames_sent, 0);
        assert_eq!(stats.dropped_frames, 0);
        assert_eq!(stats.missed_deadlines, 0);
    }
}
