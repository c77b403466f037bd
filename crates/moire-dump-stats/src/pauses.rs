//! Pause history for collector-like work.
//!
//! Rust has no tracing collector, so the process reports pauses the host
//! records itself: arena resets, cache sweeps, compactions. The history keeps
//! the most recent [`PAUSE_HISTORY_LEN`] pauses plus lifetime totals.

use moire_dump_types::{GcSnapshot, unix_nanos};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::{Duration, Instant, SystemTime};

/// Number of recent pauses kept.
pub const PAUSE_HISTORY_LEN: usize = 256;

/// Number of quantiles reported: min, 25%, 50%, 75%, max.
const QUANTILES: usize = 5;

#[derive(Debug, Clone, Copy)]
struct Pause {
    duration_ns: u64,
    end_ns: u64,
}

#[derive(Debug, Default)]
struct Ring {
    recent: VecDeque<Pause>,
    count: u64,
    total_ns: u64,
}

#[derive(Debug, Default)]
pub struct PauseHistory {
    ring: Mutex<Ring>,
}

impl PauseHistory {
    pub const fn new() -> Self {
        Self {
            ring: Mutex::new(Ring {
                recent: VecDeque::new(),
                count: 0,
                total_ns: 0,
            }),
        }
    }

    pub fn record(&self, pause: Duration, end: SystemTime) {
        let duration_ns = u64::try_from(pause.as_nanos()).unwrap_or(u64::MAX);
        let mut ring = self.ring.lock();
        if ring.recent.len() == PAUSE_HISTORY_LEN {
            ring.recent.pop_back();
        }
        ring.recent.push_front(Pause {
            duration_ns,
            end_ns: unix_nanos(end),
        });
        ring.count += 1;
        ring.total_ns = ring.total_ns.saturating_add(duration_ns);
    }

    /// Runs `work` and records its wall time as one pause.
    pub fn time<T>(&self, work: impl FnOnce() -> T) -> T {
        let started = Instant::now();
        let out = work();
        self.record(started.elapsed(), SystemTime::now());
        out
    }

    pub fn count(&self) -> u64 {
        self.ring.lock().count
    }

    pub fn snapshot(&self) -> GcSnapshot {
        let ring = self.ring.lock();
        let pause_ns: Vec<u64> = ring.recent.iter().map(|p| p.duration_ns).collect();
        let pause_end_ns = ring.recent.iter().map(|p| p.end_ns).collect();
        GcSnapshot {
            last_gc_ns: ring.recent.front().map(|p| p.end_ns),
            num_gc: ring.count,
            pause_total_ns: ring.total_ns,
            pause_quantiles_ns: quantiles(&pause_ns),
            pause_ns,
            pause_end_ns,
        }
    }
}

fn quantiles(pauses: &[u64]) -> Vec<u64> {
    if pauses.is_empty() {
        return Vec::new();
    }
    let mut sorted = pauses.to_vec();
    sorted.sort_unstable();
    let len = sorted.len();
    let mut out: Vec<u64> = (0..QUANTILES - 1)
        .map(|i| sorted[len * i / (QUANTILES - 1)])
        .collect();
    out.push(sorted[len - 1]);
    out
}

static PROCESS_PAUSES: PauseHistory = PauseHistory::new();

/// The process-wide history read by [`crate::ProcessStats`].
pub fn process_pauses() -> &'static PauseHistory {
    &PROCESS_PAUSES
}

/// Records one pause that just ended in the process-wide history.
pub fn record_pause(pause: Duration) {
    PROCESS_PAUSES.record(pause, SystemTime::now());
}
