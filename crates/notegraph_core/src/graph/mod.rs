//! Graph derivation and tree layout.
//!
//! # Responsibility
//! - Turn flat notes/topics/prerequisites into renderable node/edge graphs.
//! - Assign 2D tree coordinates to a derived graph.
//!
//! # Invariants
//! - Everything here is a pure function of its input; no storage access.
//! - Derivation either returns a whole graph or an error, never a partial one.

pub mod builder;
pub mod layout;

pub use builder::{build_full_graph, build_topic_graph};
pub use layout::{layout, Layout, LayoutOptions, PositionedLink, PositionedNode};

use crate::model::topic::TopicId;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Requested topic does not exist for this owner.
    TopicNotFound(TopicId),
}

impl Display for GraphError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TopicNotFound(id) => write!(f, "topic not found: {id}"),
        }
    }
}

impl Error for GraphError {}
