use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_STATUS: &str = "Needs Action";
pub const DEFAULT_PRIORITY: &str = "Medium";

/// Local identity of a proposed record.
///
/// Always generated on this side; never taken from the board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub Uuid);

impl RecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedRecord {
    pub id: RecordId,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
}

impl ProposedRecord {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: RecordId::new(),
            title: title.into(),
            description: String::new(),
            status: DEFAULT_STATUS.into(),
            priority: DEFAULT_PRIORITY.into(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// A record can only be sent to the board with a non-blank title.
    pub fn is_approvable(&self) -> bool {
        !self.title.trim().is_empty()
    }

    pub fn has_description(&self) -> bool {
        !self.description.trim().is_empty()
    }
}

/// In-place edit of a pending record. `None` leaves the field untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecordPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
}

impl RecordPatch {
    pub fn apply(&self, record: &mut ProposedRecord) {
        if let Some(v) = &self.title {
            record.title = v.clone();
        }
        if let Some(v) = &self.description {
            record.description = v.clone();
        }
        if let Some(v) = &self.status {
            record.status = v.clone();
        }
        if let Some(v) = &self.priority {
            record.priority = v.clone();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_ids_are_unique() {
        let a = ProposedRecord::new("a");
        let b = ProposedRecord::new("a");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn blank_title_is_not_approvable() {
        assert!(!ProposedRecord::new("   ").is_approvable());
        assert!(ProposedRecord::new("OPS > fix printer").is_approvable());
    }

    #[test]
    fn patch_only_touches_given_fields() {
        let mut r = ProposedRecord::new("old").with_description("keep");
        RecordPatch {
            title: Some("new".into()),
            priority: Some("High".into()),
            ..Default::default()
        }
        .apply(&mut r);

        assert_eq!(r.title, "new");
        assert_eq!(r.description, "keep");
        assert_eq!(r.status, DEFAULT_STATUS);
        assert_eq!(r.priority, "High");
    }
}
