//! Note domain model.
//!
//! # Responsibility
//! - Define the note record and its content blocks.
//! - Model prerequisite references as a tagged union so callers never see
//!   a half-populated shape.
//!
//! # Invariants
//! - A note never lists itself as a prerequisite.
//! - Prerequisite lists hold unique ids, in insertion order.

use crate::model::topic::TopicId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Stable note identifier.
pub type NoteId = Uuid;

/// Owner partition key shared by notes and topics.
pub type OwnerId = String;

/// Content block type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Text,
    Image,
}

/// One opaque content block. The core never interprets `value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: BlockKind,
    pub value: String,
}

impl ContentBlock {
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Text,
            value: value.into(),
        }
    }

    pub fn image(value: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Image,
            value: value.into(),
        }
    }
}

/// Prerequisite fields resolved by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrerequisiteStub {
    pub id: NoteId,
    pub title: String,
    pub topics: Vec<TopicId>,
}

/// A prerequisite either as a bare id or as a resolved stub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Prerequisite {
    Reference(NoteId),
    Resolved(PrerequisiteStub),
}

impl Prerequisite {
    pub fn id(&self) -> NoteId {
        match self {
            Self::Reference(id) => *id,
            Self::Resolved(stub) => stub.id,
        }
    }

    /// Title when resolved.
    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Reference(_) => None,
            Self::Resolved(stub) => Some(stub.title.as_str()),
        }
    }

    /// Topic memberships when resolved; `None` means "unknown", not "none".
    pub fn topics(&self) -> Option<&[TopicId]> {
        match self {
            Self::Reference(_) => None,
            Self::Resolved(stub) => Some(stub.topics.as_slice()),
        }
    }
}

impl From<NoteId> for Prerequisite {
    fn from(value: NoteId) -> Self {
        Self::Reference(value)
    }
}

/// Canonical note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub owner: OwnerId,
    pub title: String,
    pub blocks: Vec<ContentBlock>,
    /// Topic memberships, ordered by topic name.
    pub topics: Vec<TopicId>,
    /// Ordered, unique, never containing `id`.
    pub prerequisites: Vec<Prerequisite>,
}

impl Note {
    /// Creates an empty note with a generated id.
    pub fn new(owner: impl Into<OwnerId>, title: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), owner, title)
    }

    /// Creates an empty note with a caller-provided id.
    pub fn with_id(id: NoteId, owner: impl Into<OwnerId>, title: impl Into<String>) -> Self {
        Self {
            id,
            owner: owner.into(),
            title: title.into(),
            blocks: Vec::new(),
            topics: Vec::new(),
            prerequisites: Vec::new(),
        }
    }

    pub fn prerequisite_ids(&self) -> Vec<NoteId> {
        self.prerequisites.iter().map(Prerequisite::id).collect()
    }

    pub fn has_prerequisite(&self, id: NoteId) -> bool {
        self.prerequisites.iter().any(|p| p.id() == id)
    }

    pub fn belongs_to(&self, topic: TopicId) -> bool {
        self.topics.contains(&topic)
    }
}

/// Removes duplicate ids, keeping the first occurrence of each.
pub fn dedup_ids<I>(ids: I) -> Vec<NoteId>
where
    I: IntoIterator<Item = NoteId>,
{
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::{dedup_ids, Note, Prerequisite, PrerequisiteStub};
    use uuid::Uuid;

    #[test]
    fn dedup_ids_keeps_first_occurrence_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(dedup_ids([b, a, b, a]), vec![b, a]);
    }

    #[test]
    fn prerequisite_accessors_cover_both_shapes() {
        let id = Uuid::new_v4();
        let topic = Uuid::new_v4();
        let reference = Prerequisite::from(id);
        let resolved = Prerequisite::Resolved(PrerequisiteStub {
            id,
            title: "Limits".to_string(),
            topics: vec![topic],
        });

        assert_eq!(reference.id(), resolved.id());
        assert!(reference.topics().is_none());
        assert_eq!(resolved.topics(), Some(&[topic][..]));
        assert_eq!(resolved.title(), Some("Limits"));
    }

    #[test]
    fn content_blocks_serialize_with_type_tag() {
        let mut note = Note::new("alice", "Sets");
        note.blocks.push(super::ContentBlock::image("img/venn.png"));
        let json = serde_json::to_string(&note.blocks).unwrap();
        assert_eq!(json, r#"[{"type":"image","value":"img/venn.png"}]"#);
    }
}
