use crate::{InvalidSelector, Selectors};

/// What a caller asks to dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugRequest {
    enabled: bool,
    selectors: Selectors,
    message: String,
}

impl DebugRequest {
    pub fn new(selectors: impl Into<Selectors>, message: impl Into<String>) -> Self {
        Self {
            enabled: true,
            selectors: selectors.into(),
            message: message.into(),
        }
    }

    /// A request that produces nothing when emitted.
    pub fn disabled(message: impl Into<String>) -> Self {
        Self {
            enabled: false,
            selectors: Selectors::INFO,
            message: message.into(),
        }
    }

    /// Builds a request from an untyped tag list such as `"MEM"` or `"MEM,GC"`.
    ///
    /// Tags of a disabled request are never parsed.
    pub fn parse(
        enabled: bool,
        tags: &str,
        message: impl Into<String>,
    ) -> Result<Self, InvalidSelector> {
        if !enabled {
            return Ok(Self::disabled(message));
        }
        Ok(Self {
            enabled,
            selectors: Selectors::parse(tags)?,
            message: message.into(),
        })
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn selectors(&self) -> Selectors {
        self.selectors
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
