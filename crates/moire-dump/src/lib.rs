//! On-demand runtime diagnostic dumps.
//!
//! A dump is one synchronous call: capture a [`RuntimeSnapshot`] from a
//! [`RuntimeStatsProvider`], then write the caller's message and the requested
//! stat groups to a [`Sink`].
//!
//! ```rust,no_run
//! use moire_dump::{ConsoleSink, DebugRequest, ProcessStats, Selector, emit};
//!
//! let stats = ProcessStats::new().with_build_info(moire_dump::build_info!());
//! let request = DebugRequest::new(Selector::MemoryStats, "checkpoint A");
//! emit(&request, &stats, &mut ConsoleSink::stdout())?;
//! # Ok::<(), moire_dump::DiagnosticError>(())
//! ```
//!
//! # Selectors
//!
//! | Tag | Groups |
//! |-----|--------|
//! | `INFO` | message only |
//! | `STACK` | calling thread's stack trace |
//! | `MEM` | allocator counters |
//! | `GC` | pause history |
//! | `BUILD` | build metadata, when the binary has it |
//! | `ALL` | all of the above |
//!
//! Tags combine with `,` (`MEM,GC`). Typed callers use [`Selectors`] flags
//! directly and cannot produce an invalid selection.
//!
//! # Configuration
//!
//! [`DumpConfig::from_env`] reads `MOIRE_DUMP` (enable gate) and
//! `MOIRE_DUMP_LEVEL` (tags, default `INFO`).

mod config;
mod error;
mod render;
pub mod sink;

pub use config::{DUMP_ENV, DumpConfig, LEVEL_ENV};
pub use error::DiagnosticError;
pub use moire_dump_stats::{
    CaptureOptions, CountingAllocator, FixedStats, PauseHistory, ProcessStats,
    RuntimeStatsProvider, build_info, record_pause,
};
pub use moire_dump_types::{
    BuildSnapshot, DebugRequest, GcSnapshot, Group, InvalidSelector, MemorySnapshot, Record,
    RuntimeSnapshot, Selector, Selectors, StackSnapshot,
};
pub use render::records;
pub use sink::{CollectingSink, ConsoleSink, EmitContext, JsonLinesSink, Sink, TracingSink};

use std::panic::Location;
use tracing::debug;

/// Writes one dump of `request` to `sink`.
///
/// A disabled request returns immediately without touching the provider or
/// the sink. Otherwise the snapshot is captured once, the message is written,
/// then each selected group in the order stack, memory, GC, build. Missing
/// build metadata is skipped. The first sink error aborts the dump.
#[track_caller]
pub fn emit<P, S>(request: &DebugRequest, provider: &P, sink: &mut S) -> Result<(), DiagnosticError>
where
    P: RuntimeStatsProvider + ?Sized,
    S: Sink + ?Sized,
{
    let cx = EmitContext {
        caller: Location::caller(),
    };
    emit_in(request, provider, sink, cx)
}

/// Like [`emit`], for selectors that arrive as text (`"MEM"`, `"MEM,GC"`).
///
/// An unknown tag fails with [`DiagnosticError::InvalidSelector`] before
/// anything is written. A disabled call never looks at the tag.
#[track_caller]
pub fn emit_tagged<P, S>(
    enabled: bool,
    tags: &str,
    message: &str,
    provider: &P,
    sink: &mut S,
) -> Result<(), DiagnosticError>
where
    P: RuntimeStatsProvider + ?Sized,
    S: Sink + ?Sized,
{
    if !enabled {
        return Ok(());
    }
    let cx = EmitContext {
        caller: Location::caller(),
    };
    let request = DebugRequest::parse(true, tags, message)?;
    emit_in(&request, provider, sink, cx)
}

fn emit_in<P, S>(
    request: &DebugRequest,
    provider: &P,
    sink: &mut S,
    cx: EmitContext,
) -> Result<(), DiagnosticError>
where
    P: RuntimeStatsProvider + ?Sized,
    S: Sink + ?Sized,
{
    if !request.enabled() {
        return Ok(());
    }

    let snapshot = provider.snapshot();
    let records = records(request.message(), request.selectors(), &snapshot);
    debug!(
        selectors = ?request.selectors(),
        records = records.len(),
        caller = %cx.caller,
        "emitting debug dump"
    );

    sink.begin(&cx)?;
    for record in &records {
        sink.record(record, &cx)?;
    }
    sink.finish(&cx)?;
    Ok(())
}

#[cfg(test)]
mod tests;
