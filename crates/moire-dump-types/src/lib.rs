//! Types shared by the moire-dump printer and its stats providers.
//!
//! A dump is driven by a [`DebugRequest`] (which stat [`Group`]s to include)
//! and fed by a [`RuntimeSnapshot`] captured once per call. The printer turns
//! both into a sequence of [`Record`]s.

mod record;
mod request;
mod selector;
mod snapshot;

pub use record::Record;
pub use request::DebugRequest;
pub use selector::{Group, InvalidSelector, Selector, Selectors};
pub use snapshot::{
    BuildSnapshot, GcSnapshot, MemorySnapshot, RuntimeSnapshot, StackSnapshot, unix_nanos,
};
