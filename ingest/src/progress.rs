//! Session progress tracking.
//!
//! Non-authoritative throughput and ETA estimation against the tip height
//! captured when the session started. Owned by the orchestrator and reset
//! on every run; never global state.

use std::time::Instant;

pub struct ProgressTracker {
    session_start: Instant,
    blocks_this_session: u64,
    tip_at_start: u64,
}

impl ProgressTracker {
    pub fn new(tip_at_start: u64) -> Self {
        Self {
            session_start: Instant::now(),
            blocks_this_session: 0,
            tip_at_start,
        }
    }

    pub fn record_block(&mut self) {
        self.blocks_this_session += 1;
    }

    pub fn blocks(&self) -> u64 {
        self.blocks_this_session
    }

    /// Blocks per second this session. Estimation only — display math is
    /// the one place floating point is acceptable.
    pub fn blocks_per_second(&self) -> f64 {
        let elapsed = self.session_start.elapsed().as_secs_f64();
        if elapsed <= 0.0 {
            return 0.0;
        }
        self.blocks_this_session as f64 / elapsed
    }

    /// Estimated seconds until the session reaches the tip captured at
    /// start, or `None` while throughput is unknown or the tip is passed.
    pub fn eta_seconds(&self, current_height: u64) -> Option<u64> {
        if current_height >= self.tip_at_start {
            return None;
        }
        let rate = self.blocks_per_second();
        if rate <= 0.0 {
            return None;
        }
        let remaining = self.tip_at_start - current_height;
        Some((remaining as f64 / rate).round() as u64)
    }

    pub fn tip_at_start(&self) -> u64 {
        self.tip_at_start
    }
}
