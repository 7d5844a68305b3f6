//! Wall-clock helpers
//!
//! Frame timestamps are wall-clock nanoseconds so that a consumer on a
//! clock-synchronized host can compute end-to-end latency. Pacing
//! deadlines use the monotonic clock instead and never depend on these.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in nanoseconds since the Unix epoch
pub fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
