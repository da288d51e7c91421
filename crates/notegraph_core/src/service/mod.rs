//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into note, link, topic and graph use-cases.
//! - Map store failures onto the service error taxonomy.
//!
//! # Invariants
//! - Services never bypass repository contracts.
//! - Services stay storage-agnostic; they only see repository traits.

pub mod error;
pub mod graph_service;
pub mod link_service;
pub mod note_service;
pub mod topic_service;
