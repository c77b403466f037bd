use facet::Facet;

use crate::Group;

/// One emitted line of a dump.
///
/// The caller's message is the record with `group: None`.
#[derive(Facet, Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub group: Option<Group>,
    pub key: String,
    pub value: String,
}

impl Record {
    pub const MESSAGE_KEY: &'static str = "message";

    pub fn message(text: impl Into<String>) -> Self {
        Self {
            group: None,
            key: Self::MESSAGE_KEY.to_string(),
            value: text.into(),
        }
    }

    pub fn stat(group: Group, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            group: Some(group),
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn is_message(&self) -> bool {
        self.group.is_none()
    }
}
