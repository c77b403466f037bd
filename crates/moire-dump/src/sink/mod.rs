//! Destinations for dump records.
//!
//! A sink sees `begin`, then one `record` per line, then `finish`. The first
//! error it returns aborts the dump.

mod collect;
mod console;
mod json;
mod log;

pub use collect::CollectingSink;
pub use console::ConsoleSink;
pub use json::JsonLinesSink;
pub use log::TracingSink;

use moire_dump_types::Record;
use std::io;
use std::panic::Location;

/// Per-call facts a sink may use for attribution.
#[derive(Debug, Clone, Copy)]
pub struct EmitContext {
    /// Where `emit` was called from.
    pub caller: &'static Location<'static>,
}

pub trait Sink {
    fn begin(&mut self, _cx: &EmitContext) -> io::Result<()> {
        Ok(())
    }

    fn record(&mut self, record: &Record, cx: &EmitContext) -> io::Result<()>;

    fn finish(&mut self, _cx: &EmitContext) -> io::Result<()> {
        Ok(())
    }
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn begin(&mut self, cx: &EmitContext) -> io::Result<()> {
        (**self).begin(cx)
    }

    fn record(&mut self, record: &Record, cx: &EmitContext) -> io::Result<()> {
        (**self).record(record, cx)
    }

    fn finish(&mut self, cx: &EmitContext) -> io::Result<()> {
        (**self).finish(cx)
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn begin(&mut self, cx: &EmitContext) -> io::Result<()> {
        (**self).begin(cx)
    }

    fn record(&mut self, record: &Record, cx: &EmitContext) -> io::Result<()> {
        (**self).record(record, cx)
    }

    fn finish(&mut self, cx: &EmitContext) -> io::Result<()> {
        (**self).finish(cx)
    }
}
