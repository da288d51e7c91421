//! Service error taxonomy shared by note, link, topic and graph use-cases.

use crate::graph::GraphError;
use crate::model::note::NoteId;
use crate::model::topic::TopicId;
use crate::repo::error::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Entity that could not be found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    Note(NoteId),
    Topic(TopicId),
    /// `prerequisite` is not listed on `note`.
    Link { note: NoteId, prerequisite: NoteId },
}

/// Why a reference was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidReference {
    /// A note cannot be its own prerequisite.
    SelfReference(NoteId),
    /// Id text is not a UUID.
    MalformedId(String),
}

/// Duplicate link requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conflict {
    AlreadyPrerequisite { note: NoteId, prerequisite: NoteId },
    /// `note` is already an immediate predecessor of `next`.
    AlreadyNext { note: NoteId, next: NoteId },
}

#[derive(Debug)]
pub enum ServiceError {
    NotFound(Missing),
    InvalidReference(InvalidReference),
    Conflict(Conflict),
    /// Topic name is blank after normalization.
    InvalidName(String),
    /// Store failure.
    Upstream(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(Missing::Note(id)) => write!(f, "note not found: {id}"),
            Self::NotFound(Missing::Topic(id)) => write!(f, "topic not found: {id}"),
            Self::NotFound(Missing::Link { note, prerequisite }) => {
                write!(f, "note {note} does not depend on {prerequisite}")
            }
            Self::InvalidReference(InvalidReference::SelfReference(id)) => {
                write!(f, "note {id} cannot be its own prerequisite")
            }
            Self::InvalidReference(InvalidReference::MalformedId(value)) => {
                write!(f, "malformed id `{value}`")
            }
            Self::Conflict(Conflict::AlreadyPrerequisite { note, prerequisite }) => {
                write!(f, "note {note} already depends on {prerequisite}")
            }
            Self::Conflict(Conflict::AlreadyNext { note, next }) => {
                write!(f, "note {note} is already a prerequisite of {next}")
            }
            Self::InvalidName(value) => write!(f, "invalid name: `{value}`"),
            Self::Upstream(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Upstream(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NoteNotFound(id) => Self::NotFound(Missing::Note(id)),
            RepoError::TopicNotFound(id) => Self::NotFound(Missing::Topic(id)),
            other => Self::Upstream(other),
        }
    }
}

impl From<GraphError> for ServiceError {
    fn from(value: GraphError) -> Self {
        match value {
            GraphError::TopicNotFound(id) => Self::NotFound(Missing::Topic(id)),
        }
    }
}

/// Parses a note or topic id supplied as text.
pub fn parse_id(value: &str) -> ServiceResult<uuid::Uuid> {
    uuid::Uuid::parse_str(value.trim()).map_err(|_| {
        ServiceError::InvalidReference(InvalidReference::MalformedId(value.to_string()))
    })
}
