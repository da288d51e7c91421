//! Topic domain model.

use crate::model::note::OwnerId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable topic identifier.
pub type TopicId = Uuid;

/// Named grouping of notes. Acts as a root in every derived graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: TopicId,
    /// Partition key; topic names are unique per owner.
    pub owner: OwnerId,
    pub name: String,
}

impl Topic {
    /// Creates a topic with a freshly generated id.
    pub fn new(owner: impl Into<OwnerId>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner: owner.into(),
            name: name.into(),
        }
    }
}
