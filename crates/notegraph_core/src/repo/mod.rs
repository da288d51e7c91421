//! Repository layer: the Store interface consumed by the graph core.
//!
//! # Responsibility
//! - Define use-case oriented persistence contracts for notes and topics.
//! - Keep SQL details out of services and graph derivation.
//!
//! # Invariants
//! - Repository APIs report semantic `NoteNotFound`/`TopicNotFound` errors
//!   in addition to transport errors.
//! - Prerequisites leave the repository fully resolved.

pub mod error;
pub mod note_repo;
pub mod sqlite;
pub mod topic_repo;

use note_repo::NoteRepository;
use topic_repo::TopicRepository;

/// Combined store surface used by services that need both notes and topics.
pub trait Store: NoteRepository + TopicRepository {}

impl<T: NoteRepository + TopicRepository> Store for T {}
