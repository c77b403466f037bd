use facet::Facet;
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Allocator counters at capture time. All sizes are in bytes.
#[derive(Facet, Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySnapshot {
    /// Bytes of live heap allocations.
    pub alloc: u64,
    /// Cumulative bytes allocated, never decreases.
    pub total_alloc: u64,
    pub heap_alloc: u64,
    /// Bytes the allocator obtained from the OS for the heap.
    pub heap_sys: u64,
    /// Heap bytes held by the allocator but not handed out.
    pub heap_idle: u64,
    pub heap_inuse: u64,
    /// Heap bytes returned to the OS.
    pub heap_released: u64,
    /// Live heap objects.
    pub heap_objects: u64,
    /// Not every platform reports stack usage.
    pub stack_inuse: Option<u64>,
    pub stack_sys: Option<u64>,
    /// Completed collection cycles.
    pub num_gc: u64,
}

/// Pause history at capture time. Lists are ordered most recent first.
#[derive(Facet, Debug, Clone, Default, PartialEq, Eq)]
pub struct GcSnapshot {
    /// End of the most recent pause, unix nanoseconds.
    pub last_gc_ns: Option<u64>,
    pub num_gc: u64,
    pub pause_total_ns: u64,
    pub pause_ns: Vec<u64>,
    /// Unix nanoseconds, index-aligned with `pause_ns`.
    pub pause_end_ns: Vec<u64>,
    /// Minimum, 25%, 50%, 75% and maximum pause. Empty when there is no history.
    pub pause_quantiles_ns: Vec<u64>,
}

impl GcSnapshot {
    pub fn pause_total(&self) -> Duration {
        Duration::from_nanos(self.pause_total_ns)
    }

    pub fn last_pause(&self) -> Option<Duration> {
        self.pause_ns.first().copied().map(Duration::from_nanos)
    }
}

/// Metadata embedded in the running binary at compile time.
#[derive(Facet, Debug, Clone, PartialEq, Eq)]
pub struct BuildSnapshot {
    pub package: String,
    pub version: String,
    pub target: Option<String>,
    pub profile: Option<String>,
    pub git_revision: Option<String>,
    pub rustc: Option<String>,
}

impl BuildSnapshot {
    pub fn new(package: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            version: version.into(),
            target: None,
            profile: None,
            git_revision: None,
            rustc: None,
        }
    }
}

impl fmt::Display for BuildSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "package\t{}\nversion\t{}", self.package, self.version)?;
        let optional = [
            ("target", &self.target),
            ("profile", &self.profile),
            ("git", &self.git_revision),
            ("rustc", &self.rustc),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                write!(f, "\n{key}\t{value}")?;
            }
        }
        Ok(())
    }
}

/// Preformatted call stack of the capturing thread.
#[derive(Facet, Debug, Clone, Default, PartialEq, Eq)]
#[facet(transparent)]
pub struct StackSnapshot(String);

impl StackSnapshot {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StackSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// All four stat groups, captured at one instant.
#[derive(Facet, Debug, Clone, PartialEq, Eq)]
pub struct RuntimeSnapshot {
    pub captured_at_ns: u64,
    pub stack: StackSnapshot,
    pub memory: MemorySnapshot,
    pub gc: GcSnapshot,
    /// `None` when the binary carries no build metadata.
    pub build: Option<BuildSnapshot>,
}

/// Unix nanoseconds for `at`, saturating to zero before the epoch.
pub fn unix_nanos(at: SystemTime) -> u64 {
    at.duration_since(UNIX_EPOCH)
        .map(|duration| u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
