//! Derived graph value types.
//!
//! # Responsibility
//! - Give graph nodes and edges dedicated id types instead of ad hoc strings.
//! - Own the string encoding of those ids.
//!
//! # Invariants
//! - `NodeKey` encoding is injective:
//!   - `topic:<topic-uuid>`
//!   - `note:<note-uuid>`
//!   - `note:<note-uuid>@topic:<topic-uuid>`
//! - `EdgeKey` encodes as `<source>-><target>`; UUIDs never contain `->`.

use crate::model::note::NoteId;
use crate::model::topic::{Topic, TopicId};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

const TOPIC_PREFIX: &str = "topic:";
const NOTE_PREFIX: &str = "note:";
const COMPOSITE_SEPARATOR: &str = "@";
const EDGE_SEPARATOR: &str = "->";

/// Identity of a graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKey {
    /// Topic root.
    Topic(TopicId),
    /// Note in a single-topic view.
    Note(NoteId),
    /// Note instance under one topic in the whole-graph view.
    Composite { note: NoteId, topic: TopicId },
}

impl NodeKey {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Topic(_) => NodeKind::Topic,
            Self::Note(_) | Self::Composite { .. } => NodeKind::Note,
        }
    }
}

impl Display for NodeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Topic(topic) => write!(f, "{TOPIC_PREFIX}{topic}"),
            Self::Note(note) => write!(f, "{NOTE_PREFIX}{note}"),
            Self::Composite { note, topic } => write!(
                f,
                "{NOTE_PREFIX}{note}{COMPOSITE_SEPARATOR}{TOPIC_PREFIX}{topic}"
            ),
        }
    }
}

/// Failure to decode a node or edge id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseKeyError(pub String);

impl Display for ParseKeyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "malformed graph id `{}`", self.0)
    }
}

impl Error for ParseKeyError {}

impl FromStr for NodeKey {
    type Err = ParseKeyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseKeyError(value.to_string());
        let parse_uuid = |raw: &str| Uuid::parse_str(raw).map_err(|_| malformed());

        if let Some(topic) = value.strip_prefix(TOPIC_PREFIX) {
            return Ok(Self::Topic(parse_uuid(topic)?));
        }
        let rest = value.strip_prefix(NOTE_PREFIX).ok_or_else(malformed)?;
        match rest.split_once(COMPOSITE_SEPARATOR) {
            None => Ok(Self::Note(parse_uuid(rest)?)),
            Some((note, topic)) => {
                let topic = topic.strip_prefix(TOPIC_PREFIX).ok_or_else(malformed)?;
                Ok(Self::Composite {
                    note: parse_uuid(note)?,
                    topic: parse_uuid(topic)?,
                })
            }
        }
    }
}

impl Serialize for NodeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NodeKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Identity of a directed edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    pub source: NodeKey,
    pub target: NodeKey,
}

impl Display for EdgeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{EDGE_SEPARATOR}{}", self.source, self.target)
    }
}

impl FromStr for EdgeKey {
    type Err = ParseKeyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (source, target) = value
            .split_once(EDGE_SEPARATOR)
            .ok_or_else(|| ParseKeyError(value.to_string()))?;
        Ok(Self {
            source: source.parse()?,
            target: target.parse()?,
        })
    }
}

impl Serialize for EdgeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EdgeKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Node category used by renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Topic,
    Note,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeKey,
    pub name: String,
    pub kind: NodeKind,
}

impl GraphNode {
    pub fn new(id: NodeKey, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: id.kind(),
        }
    }
}

/// Directed edge: `source` is the prerequisite (or topic), `target` the dependent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: EdgeKey,
    pub source: NodeKey,
    pub target: NodeKey,
}

impl GraphEdge {
    pub fn new(source: NodeKey, target: NodeKey) -> Self {
        Self {
            id: EdgeKey { source, target },
            source,
            target,
        }
    }
}

/// Node and edge set in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl Graph {
    pub fn node(&self, id: &NodeKey) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| &node.id == id)
    }

    pub fn has_edge(&self, source: NodeKey, target: NodeKey) -> bool {
        self.edges
            .iter()
            .any(|edge| edge.source == source && edge.target == target)
    }

    /// Number of edges pointing at `id`.
    pub fn inbound_count(&self, id: &NodeKey) -> usize {
        self.edges.iter().filter(|edge| &edge.target == id).count()
    }
}

/// Single-topic view together with the topic it was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicGraph {
    #[serde(flatten)]
    pub graph: Graph,
    pub topic: Topic,
}

#[cfg(test)]
mod tests {
    use super::{EdgeKey, GraphEdge, NodeKey};
    use uuid::Uuid;

    #[test]
    fn composite_key_encoding_is_documented_form() {
        let note = Uuid::parse_str("6f1c1f4e-0000-4000-8000-000000000001").unwrap();
        let topic = Uuid::parse_str("6f1c1f4e-0000-4000-8000-000000000002").unwrap();
        let key = NodeKey::Composite { note, topic };
        assert_eq!(
            key.to_string(),
            "note:6f1c1f4e-0000-4000-8000-000000000001@topic:6f1c1f4e-0000-4000-8000-000000000002"
        );
        assert_eq!(key.to_string().parse::<NodeKey>().unwrap(), key);
    }

    #[test]
    fn note_and_topic_keys_with_same_uuid_differ() {
        let id = Uuid::new_v4();
        assert_ne!(NodeKey::Note(id).to_string(), NodeKey::Topic(id).to_string());
    }

    #[test]
    fn edge_key_parses_back_to_endpoints() {
        let edge = GraphEdge::new(NodeKey::Topic(Uuid::new_v4()), NodeKey::Note(Uuid::new_v4()));
        let parsed: EdgeKey = edge.id.to_string().parse().unwrap();
        assert_eq!(parsed.source, edge.source);
        assert_eq!(parsed.target, edge.target);
    }

    #[test]
    fn malformed_keys_are_rejected() {
        assert!("topic:not-a-uuid".parse::<NodeKey>().is_err());
        assert!("folder:6f1c1f4e-0000-4000-8000-000000000001"
            .parse::<NodeKey>()
            .is_err());
        assert!("note:6f1c1f4e-0000-4000-8000-000000000001@6f1c1f4e-0000-4000-8000-000000000002"
            .parse::<NodeKey>()
            .is_err());
    }

    #[test]
    fn keys_serialize_as_strings() {
        let id = Uuid::new_v4();
        let json = serde_json::to_string(&NodeKey::Note(id)).unwrap();
        assert_eq!(json, format!("\"note:{id}\""));
    }
}
