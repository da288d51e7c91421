//! Domain model for notes, topics and derived graphs.
//!
//! # Responsibility
//! - Define the stored shapes (`Note`, `Topic`) consumed by core logic.
//! - Define the derived, ephemeral graph shapes (`Graph`, `NodeKey`, ...).
//!
//! # Invariants
//! - Notes and topics are identified by stable UUIDs.
//! - Graph ids are value types with an injective string encoding.

pub mod graph;
pub mod note;
pub mod topic;
