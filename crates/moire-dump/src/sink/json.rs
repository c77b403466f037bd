use super::{EmitContext, Sink};
use moire_dump_types::Record;
use std::io::{self, Write};

/// One JSON object per record, newline separated.
#[derive(Debug)]
pub struct JsonLinesSink<W> {
    out: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Sink for JsonLinesSink<W> {
    fn record(&mut self, record: &Record, _cx: &EmitContext) -> io::Result<()> {
        let line = facet_json::to_string(record).map_err(|e| io::Error::other(e.to_string()))?;
        writeln!(self.out, "{line}")
    }

    fn finish(&mut self, _cx: &EmitContext) -> io::Result<()> {
        self.out.flush()
    }
}
