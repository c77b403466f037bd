use super::{EmitContext, Sink};
use moire_dump_types::Record;
use std::io;

/// Keeps records in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    records: Vec<Record>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Record keys in emission order.
    pub fn keys(&self) -> Vec<&str> {
        self.records.iter().map(|record| record.key.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Sink for CollectingSink {
    fn record(&mut self, record: &Record, _cx: &EmitContext) -> io::Result<()> {
        self.records.push(record.clone());
        Ok(())
    }
}
