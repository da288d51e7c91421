//! Core domain logic for the note graph.
//!
//! Notes belong to topics and declare prerequisite notes. This crate stores
//! them, derives renderable graphs from them, lays those graphs out as
//! trees and keeps the prerequisite links consistent under edits.

pub mod config;
pub mod db;
pub mod graph;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use graph::{
    build_full_graph, build_topic_graph, layout, GraphError, Layout, LayoutOptions,
    PositionedLink, PositionedNode,
};
pub use logging::{default_log_level, init_logging, init_logging_from, logging_status};
pub use model::graph::{EdgeKey, Graph, GraphEdge, GraphNode, NodeKey, NodeKind, TopicGraph};
pub use model::note::{
    BlockKind, ContentBlock, Note, NoteId, OwnerId, Prerequisite, PrerequisiteStub,
};
pub use model::topic::{Topic, TopicId};
pub use repo::error::{RepoError, RepoResult};
pub use repo::note_repo::NoteRepository;
pub use repo::sqlite::SqliteStore;
pub use repo::topic_repo::TopicRepository;
pub use repo::Store;
pub use service::error::{
    parse_id, Conflict, InvalidReference, Missing, ServiceError, ServiceResult,
};
pub use service::graph_service::GraphService;
pub use service::link_service::LinkService;
pub use service::note_service::{DeletionReport, FailedRewire, NoteDraft, NoteService};
pub use service::topic_service::TopicService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
