use super::{EmitContext, Sink};
use moire_dump_types::Record;
use std::io::{self, Write};

/// Plain line output.
///
/// The message is written as-is, single-line stats as `Key: value`, and
/// multi-line stats (stack trace, build info) as `Key:` followed by the block.
#[derive(Debug)]
pub struct ConsoleSink<W> {
    out: W,
    banners: bool,
}

impl ConsoleSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            banners: false,
        }
    }

    /// Frames the dump with `Start debug...` / `Finish debug...` lines.
    pub fn with_banners(mut self, banners: bool) -> Self {
        self.banners = banners;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Sink for ConsoleSink<W> {
    fn begin(&mut self, _cx: &EmitContext) -> io::Result<()> {
        if self.banners {
            writeln!(self.out, "\nStart debug...")?;
        }
        Ok(())
    }

    fn record(&mut self, record: &Record, _cx: &EmitContext) -> io::Result<()> {
        if record.is_message() {
            writeln!(self.out, "{}", record.value)
        } else if record.value.contains('\n') {
            writeln!(self.out, "{}:\n{}", record.key, record.value)
        } else {
            writeln!(self.out, "{}: {}", record.key, record.value)
        }
    }

    fn finish(&mut self, _cx: &EmitContext) -> io::Result<()> {
        if self.banners {
            writeln!(self.out, "\nFinish debug...")?;
        }
        self.out.flush()
    }
}
