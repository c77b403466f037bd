use facet::Facet;
use std::error::Error;
use std::fmt;
use std::str::FromStr;

/// One of the four stat groups a dump can include.
#[derive(Facet, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
#[facet(rename_all = "snake_case")]
pub enum Group {
    Stack,
    Memory,
    Gc,
    Build,
}

impl Group {
    /// Emission order. Stable across calls.
    pub const ALL: [Group; 4] = [Group::Stack, Group::Memory, Group::Gc, Group::Build];

    pub fn flag(self) -> Selectors {
        match self {
            Self::Stack => Selectors::STACK,
            Self::Memory => Selectors::MEMORY,
            Self::Gc => Selectors::GC,
            Self::Build => Selectors::BUILD,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stack => "stack",
            Self::Memory => "memory",
            Self::Gc => "gc",
            Self::Build => "build",
        }
    }
}

/// A single verbosity tag, as named by a caller or a config value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Message only.
    Info,
    StackTrace,
    MemoryStats,
    GcStats,
    BuildInfo,
    /// Every stat group.
    All,
}

impl Selector {
    pub fn as_tag(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::StackTrace => "STACK",
            Self::MemoryStats => "MEM",
            Self::GcStats => "GC",
            Self::BuildInfo => "BUILD",
            Self::All => "ALL",
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl FromStr for Selector {
    type Err = InvalidSelector;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let trimmed = tag.trim();
        let selector = match trimmed.to_ascii_uppercase().as_str() {
            "INFO" => Self::Info,
            "STACK" | "STACKTRACE" => Self::StackTrace,
            "MEM" | "MEMORYSTATS" => Self::MemoryStats,
            "GC" | "GCSTATS" => Self::GcStats,
            "BUILD" | "BUILDINFO" => Self::BuildInfo,
            "ALL" => Self::All,
            _ => return Err(InvalidSelector::new(tag)),
        };
        Ok(selector)
    }
}

bitflags::bitflags! {
    /// The set of stat groups requested for one dump.
    ///
    /// The empty set means "message only". [`Selector::All`] maps to
    /// [`Selectors::all()`]; there is no separate bit for it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Selectors: u8 {
        const STACK = 1;
        const MEMORY = 1 << 1;
        const GC = 1 << 2;
        const BUILD = 1 << 3;
    }
}

impl Selectors {
    /// Message only.
    pub const INFO: Selectors = Selectors::empty();

    pub fn includes(self, group: Group) -> bool {
        self.contains(group.flag())
    }

    /// Parses a single tag or a `,`/`|` separated list of tags.
    ///
    /// An empty string is rejected; `INFO` is the explicit spelling of
    /// "no groups".
    pub fn parse(tags: &str) -> Result<Self, InvalidSelector> {
        if tags.trim().is_empty() {
            return Err(InvalidSelector::new(tags));
        }
        let mut selectors = Selectors::empty();
        for tag in tags.split([',', '|']) {
            selectors |= Selectors::from(tag.parse::<Selector>()?);
        }
        Ok(selectors)
    }
}

impl From<Selector> for Selectors {
    fn from(selector: Selector) -> Self {
        match selector {
            Selector::Info => Selectors::INFO,
            Selector::StackTrace => Selectors::STACK,
            Selector::MemoryStats => Selectors::MEMORY,
            Selector::GcStats => Selectors::GC,
            Selector::BuildInfo => Selectors::BUILD,
            Selector::All => Selectors::all(),
        }
    }
}

impl FromIterator<Selector> for Selectors {
    fn from_iter<I: IntoIterator<Item = Selector>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Selectors::empty(), |acc, selector| acc | Selectors::from(selector))
    }
}

/// A selector tag outside the recognized set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSelector {
    tag: String,
}

impl InvalidSelector {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }

    /// The offending value, verbatim.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn into_tag(self) -> String {
        self.tag
    }
}

impl fmt::Display for InvalidSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid debug option: {}", self.tag)
    }
}

impl Error for InvalidSelector {}
