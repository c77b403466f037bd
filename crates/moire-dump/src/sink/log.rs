use super::{EmitContext, Sink};
use moire_dump_types::Record;
use std::io;
use tracing::Level;

/// Emits each record as a `tracing` event.
///
/// Stats carry `group` and `key` fields. With caller attribution on, every
/// event also carries `caller = "file:line"` of the `emit` call, so the dump
/// is attributed to the code that asked for it.
#[derive(Debug, Clone, Copy)]
pub struct TracingSink {
    level: Level,
    caller: bool,
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl TracingSink {
    pub fn new() -> Self {
        Self {
            level: Level::INFO,
            caller: false,
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_caller(mut self, caller: bool) -> Self {
        self.caller = caller;
        self
    }
}

macro_rules! event_at {
    ($level:expr, $($rest:tt)+) => {
        match $level {
            Level::ERROR => tracing::event!(Level::ERROR, $($rest)+),
            Level::WARN => tracing::event!(Level::WARN, $($rest)+),
            Level::INFO => tracing::event!(Level::INFO, $($rest)+),
            Level::DEBUG => tracing::event!(Level::DEBUG, $($rest)+),
            _ => tracing::event!(Level::TRACE, $($rest)+),
        }
    };
}

impl Sink for TracingSink {
    fn record(&mut self, record: &Record, cx: &EmitContext) -> io::Result<()> {
        let caller = self
            .caller
            .then(|| format!("{}:{}", cx.caller.file(), cx.caller.line()));
        let caller = caller.as_deref();
        match record.group {
            None => event_at!(self.level, caller, "{}", record.value),
            Some(group) => event_at!(
                self.level,
                group = group.as_str(),
                key = %record.key,
                caller,
                "{}: {}",
                record.key,
                record.value
            ),
        }
        Ok(())
    }
}
