//! Global-allocator wrapper that keeps live and cumulative byte counts.
//!
//! Install it in the host binary:
//!
//! ```rust,ignore
//! #[global_allocator]
//! static ALLOC: moire_dump_stats::CountingAllocator =
//!     moire_dump_stats::CountingAllocator::system();
//! ```
//!
//! Only the `#[global_allocator]` instance should use the process counters.
//! A wrapper built with [`CountingAllocator::new`] or [`CountingAllocator::system`]
//! anywhere else feeds the same counters and skews them.

use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Counter block shared by the allocator hooks.
#[derive(Debug)]
pub struct AllocTally {
    used: AtomicBool,
    live_bytes: AtomicU64,
    total_bytes: AtomicU64,
    mallocs: AtomicU64,
    frees: AtomicU64,
}

impl Default for AllocTally {
    fn default() -> Self {
        Self::new()
    }
}

impl AllocTally {
    pub const fn new() -> Self {
        Self {
            used: AtomicBool::new(false),
            live_bytes: AtomicU64::new(0),
            total_bytes: AtomicU64::new(0),
            mallocs: AtomicU64::new(0),
            frees: AtomicU64::new(0),
        }
    }

    #[inline]
    fn on_alloc(&self, size: usize) {
        let size = size as u64;
        self.live_bytes.fetch_add(size, Ordering::Relaxed);
        self.total_bytes.fetch_add(size, Ordering::Relaxed);
        self.mallocs.fetch_add(1, Ordering::Relaxed);
        if !self.used.load(Ordering::Relaxed) {
            self.used.store(true, Ordering::Relaxed);
        }
    }

    #[inline]
    fn on_free(&self, size: usize) {
        self.live_bytes.fetch_sub(size as u64, Ordering::Relaxed);
        self.frees.fetch_add(1, Ordering::Relaxed);
    }

    /// `None` until an allocation was counted.
    pub fn counters(&self) -> Option<AllocCounters> {
        if !self.used.load(Ordering::Relaxed) {
            return None;
        }
        let mallocs = self.mallocs.load(Ordering::Relaxed);
        let frees = self.frees.load(Ordering::Relaxed);
        Some(AllocCounters {
            live_bytes: self.live_bytes.load(Ordering::Relaxed),
            total_bytes: self.total_bytes.load(Ordering::Relaxed),
            live_objects: mallocs.saturating_sub(frees),
        })
    }
}

static PROCESS_TALLY: AllocTally = AllocTally::new();

pub struct CountingAllocator<A = System> {
    inner: A,
    tally: &'static AllocTally,
}

impl CountingAllocator<System> {
    pub const fn system() -> Self {
        Self::new(System)
    }
}

impl<A> CountingAllocator<A> {
    /// Counts into the process tally read by [`allocator_counters`].
    pub const fn new(inner: A) -> Self {
        Self::with_tally(inner, &PROCESS_TALLY)
    }

    /// Counts into `tally` instead of the process tally.
    pub const fn with_tally(inner: A, tally: &'static AllocTally) -> Self {
        Self { inner, tally }
    }
}

// SAFETY: every call is forwarded to `inner` unchanged; only counters are touched.
unsafe impl<A: GlobalAlloc> GlobalAlloc for CountingAllocator<A> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { self.inner.alloc(layout) };
        if !ptr.is_null() {
            self.tally.on_alloc(layout.size());
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { self.inner.alloc_zeroed(layout) };
        if !ptr.is_null() {
            self.tally.on_alloc(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { self.inner.dealloc(ptr, layout) };
        self.tally.on_free(layout.size());
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = unsafe { self.inner.realloc(ptr, layout, new_size) };
        if !new_ptr.is_null() {
            self.tally.on_free(layout.size());
            self.tally.on_alloc(new_size);
        }
        new_ptr
    }
}

/// Counter values read from a [`CountingAllocator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocCounters {
    pub live_bytes: u64,
    pub total_bytes: u64,
    pub live_objects: u64,
}

/// Process counters. `None` unless the `#[global_allocator]` is a
/// [`CountingAllocator`] on the process tally.
pub fn allocator_counters() -> Option<AllocCounters> {
    PROCESS_TALLY.counters()
}
