use crate::DiagnosticError;
use moire_dump_types::{DebugRequest, Selectors};

/// Enables dumps when set to `1`, `true`, `on` or `yes`.
pub const DUMP_ENV: &str = "MOIRE_DUMP";
/// Selector tags, e.g. `MEM` or `MEM,GC`.
pub const LEVEL_ENV: &str = "MOIRE_DUMP_LEVEL";

const DEFAULT_LEVEL: &str = "INFO";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpConfig {
    pub enabled: bool,
    pub selectors: Selectors,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            selectors: Selectors::INFO,
        }
    }
}

impl DumpConfig {
    pub fn from_env() -> Result<Self, DiagnosticError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DiagnosticError> {
        let enabled = lookup(DUMP_ENV).is_some_and(|value| is_truthy(&value));
        if !enabled {
            return Ok(Self::default());
        }
        let level = lookup(LEVEL_ENV).unwrap_or_else(|| DEFAULT_LEVEL.to_string());
        let selectors = Selectors::parse(&level)?;
        Ok(Self { enabled, selectors })
    }

    pub fn request(&self, message: impl Into<String>) -> DebugRequest {
        DebugRequest::new(self.selectors, message).with_enabled(self.enabled)
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    )
}
