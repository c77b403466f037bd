use moire_dump_types::InvalidSelector;
use std::error::Error;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum DiagnosticError {
    /// A selector tag outside the recognized set. Carries the tag verbatim.
    InvalidSelector(String),
    /// The sink refused a record; the remaining records were not written.
    SinkWrite(io::Error),
}

impl fmt::Display for DiagnosticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSelector(tag) => write!(f, "invalid debug option: {tag}"),
            Self::SinkWrite(err) => write!(f, "failed to write debug record: {err}"),
        }
    }
}

impl Error for DiagnosticError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::SinkWrite(err) => Some(err),
            Self::InvalidSelector(_) => None,
        }
    }
}

impl From<InvalidSelector> for DiagnosticError {
    fn from(err: InvalidSelector) -> Self {
        Self::InvalidSelector(err.into_tag())
    }
}

impl From<io::Error> for DiagnosticError {
    fn from(err: io::Error) -> Self {
        Self::SinkWrite(err)
    }
}
