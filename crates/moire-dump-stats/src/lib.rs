//! Runtime stats for moire-dump.
//!
//! [`RuntimeStatsProvider`] is the seam between the printer and the process.
//! [`ProcessStats`] reads the real process; [`FixedStats`] replays a preset
//! snapshot so dumps can be tested deterministically.

mod alloc;
mod build_info;
mod pauses;
mod platform;
mod stack;

pub use alloc::{AllocCounters, AllocTally, CountingAllocator, allocator_counters};
pub use moire_dump_types::{
    BuildSnapshot, GcSnapshot, MemorySnapshot, RuntimeSnapshot, StackSnapshot,
};
pub use pauses::{PAUSE_HISTORY_LEN, PauseHistory, process_pauses, record_pause};
pub use stack::{CaptureOptions, capture_stack};

use moire_dump_types::unix_nanos;
use std::time::SystemTime;
use tracing::debug;

/// Source of read-only runtime facts.
pub trait RuntimeStatsProvider: Send + Sync {
    /// Captures all stat groups at once.
    fn snapshot(&self) -> RuntimeSnapshot;
}

impl<P: RuntimeStatsProvider + ?Sized> RuntimeStatsProvider for &P {
    fn snapshot(&self) -> RuntimeSnapshot {
        (**self).snapshot()
    }
}

impl<P: RuntimeStatsProvider + ?Sized> RuntimeStatsProvider for std::sync::Arc<P> {
    fn snapshot(&self) -> RuntimeSnapshot {
        (**self).snapshot()
    }
}

/// Stats of the running process.
#[derive(Debug, Clone)]
pub struct ProcessStats {
    build: Option<BuildSnapshot>,
    pauses: &'static PauseHistory,
    capture: CaptureOptions,
}

impl Default for ProcessStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessStats {
    /// No build metadata, the process-wide pause history, default capture.
    pub fn new() -> Self {
        Self {
            build: None,
            pauses: process_pauses(),
            capture: CaptureOptions::default(),
        }
    }

    /// Usually fed from [`build_info!`].
    pub fn with_build_info(mut self, build: BuildSnapshot) -> Self {
        self.build = Some(build);
        self
    }

    pub fn with_pause_history(mut self, pauses: &'static PauseHistory) -> Self {
        self.pauses = pauses;
        self
    }

    pub fn with_capture_options(mut self, capture: CaptureOptions) -> Self {
        self.capture = capture;
        self
    }
}

/// Merges allocator counters, heap figures and stack figures.
///
/// `TotalAlloc` and `HeapObjects` exist only with counters; without them both
/// are 0.
fn memory_from(
    counters: Option<AllocCounters>,
    heap: Option<platform::HeapFigures>,
    stack: platform::StackFigures,
    num_gc: u64,
) -> MemorySnapshot {
    let alloc = match (counters, heap) {
        (Some(counters), _) => counters.live_bytes,
        (None, Some(heap)) => heap.inuse,
        (None, None) => 0,
    };
    let heap = heap.unwrap_or(platform::HeapFigures {
        sys: alloc,
        inuse: alloc,
        idle: 0,
        released: 0,
    });

    MemorySnapshot {
        alloc,
        total_alloc: counters.map_or(0, |c| c.total_bytes),
        heap_alloc: alloc,
        heap_sys: heap.sys,
        heap_idle: heap.idle,
        heap_inuse: heap.inuse,
        heap_released: heap.released,
        heap_objects: counters.map_or(0, |c| c.live_objects),
        stack_inuse: stack.inuse,
        stack_sys: stack.sys,
        num_gc,
    }
}

impl RuntimeStatsProvider for ProcessStats {
    fn snapshot(&self) -> RuntimeSnapshot {
        let captured_at_ns = unix_nanos(SystemTime::now());
        let stack = capture_stack(self.capture);
        let gc = self.pauses.snapshot();
        let memory = memory_from(
            allocator_counters(),
            platform::heap_figures(),
            platform::stack_figures(),
            gc.num_gc,
        );
        debug!(
            captured_at_ns,
            counting_allocator = allocator_counters().is_some(),
            has_build_info = self.build.is_some(),
            "captured runtime snapshot"
        );
        RuntimeSnapshot {
            captured_at_ns,
            stack,
            memory,
            gc,
            build: self.build.clone(),
        }
    }
}

/// Replays one snapshot on every call.
#[derive(Debug, Clone)]
pub struct FixedStats(pub RuntimeSnapshot);

impl RuntimeStatsProvider for FixedStats {
    fn snapshot(&self) -> RuntimeSnapshot {
        self.0.clone()
    }
}
