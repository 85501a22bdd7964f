//! Per-query stage timings for verbose display and the showcase run.

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Wall-clock timings for one `ask` call
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StageTimings {
    pub retrieval_ms: u64,
    pub generation_ms: u64,
    pub total_ms: u64,
}

impl fmt::Display for StageTimings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "retrieval {}ms, generation {}ms, total {}ms",
            self.retrieval_ms, self.generation_ms, self.total_ms
        )
    }
}

/// Measures one stage of a query
pub struct StageTimer {
    started: Instant,
}

impl StageTimer {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }
}
