//! Note use-case service.
//!
//! # Responsibility
//! - Create, update, list and re-topic notes.
//! - Replace prerequisite lists with self-reference and duplicate checks.
//! - Delete notes by splicing them out of prerequisite chains.
//!
//! # Invariants
//! - Self-referencing prerequisite lists are rejected before persistence.
//! - After `delete_note`, no note references the deleted id.
//! - The deletion splice is one hop and best-effort: a failed dependent
//!   update is logged and reported, earlier updates are kept.

use crate::model::note::{dedup_ids, ContentBlock, Note, NoteId};
use crate::model::topic::TopicId;
use crate::repo::Store;
use crate::service::error::{InvalidReference, Missing, ServiceError, ServiceResult};
use crate::service::topic_service::{normalize_name, TopicService};
use log::{info, warn};
use std::time::Instant;

const UNTITLED_NOTE: &str = "Untitled note";

/// Input for [`NoteService::create_note`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub blocks: Vec<ContentBlock>,
    /// Topic names; missing topics are created.
    pub topics: Vec<String>,
    pub prerequisites: Vec<NoteId>,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn in_topics<I, T>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.topics = topics.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_prerequisites(mut self, prerequisites: impl IntoIterator<Item = NoteId>) -> Self {
        self.prerequisites = prerequisites.into_iter().collect();
        self
    }

    pub fn with_blocks(mut self, blocks: Vec<ContentBlock>) -> Self {
        self.blocks = blocks;
        self
    }
}

/// Dependent whose prerequisite list could not be rewired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedRewire {
    pub note: NoteId,
    pub error: String,
}

/// Outcome of a note deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionReport {
    pub deleted: NoteId,
    /// Dependents that now list the deleted note's prerequisites instead.
    pub rewired: Vec<NoteId>,
    pub failed: Vec<FailedRewire>,
    /// Prerequisite links removed together with the note.
    pub removed_links: usize,
}

pub struct NoteService<S: Store> {
    store: S,
}

impl<S: Store> NoteService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates a note, creating any named topic that does not exist yet.
    pub fn create_note(&self, draft: NoteDraft) -> ServiceResult<Note> {
        let topics = TopicService::new(&self.store).ensure_topics(&draft.topics)?;
        let mut note = Note::new(self.store.owner(), normalize_title(&draft.title));
        note.prerequisites = validate_prerequisites(note.id, &draft.prerequisites)?
            .into_iter()
            .map(Into::into)
            .collect();
        note.blocks = draft.blocks;
        note.topics = topics;

        let id = self.store.create_note(&note)?;
        self.get_note(id)
    }

    /// Replaces title and content blocks.
    pub fn update_note(
        &self,
        id: NoteId,
        title: &str,
        blocks: Vec<ContentBlock>,
    ) -> ServiceResult<Note> {
        self.store
            .update_note_content(id, &normalize_title(title), &blocks)?;
        self.get_note(id)
    }

    pub fn get_note(&self, id: NoteId) -> ServiceResult<Note> {
        self.store
            .get_note(id)?
            .ok_or(ServiceError::NotFound(Missing::Note(id)))
    }

    /// Lists all notes, or the members of one topic.
    pub fn list_notes(&self, topic: Option<TopicId>) -> ServiceResult<Vec<Note>> {
        match topic {
            None => Ok(self.store.find_all_notes()?),
            Some(topic) => {
                if self.store.get_topic(topic)?.is_none() {
                    return Err(ServiceError::NotFound(Missing::Topic(topic)));
                }
                Ok(self.store.find_notes_by_topic(topic)?)
            }
        }
    }

    /// Replaces topic memberships by name, creating missing topics.
    pub fn set_note_topics(&self, id: NoteId, names: &[String]) -> ServiceResult<Note> {
        let topics = TopicService::new(&self.store).ensure_topics(names)?;
        self.store.set_note_topics(id, &topics)?;
        self.get_note(id)
    }

    /// Replaces the prerequisite list.
    ///
    /// # Errors
    /// - `InvalidReference::SelfReference` when `prerequisites` contains `id`.
    /// - `NotFound` when `id` or any prerequisite does not exist.
    pub fn set_prerequisites(&self, id: NoteId, prerequisites: &[NoteId]) -> ServiceResult<Note> {
        let prerequisites = validate_prerequisites(id, prerequisites)?;
        self.store.update_note_prerequisites(id, &prerequisites)?;
        self.get_note(id)
    }

    /// Deletes a note and splices it out of every prerequisite chain.
    ///
    /// Each dependent drops `id` and inherits the deleted note's
    /// prerequisites. Dependent updates are independent writes; a failure is
    /// recorded in the report and does not undo the others. The note itself
    /// and all links touching it are removed afterwards either way.
    pub fn delete_note(&self, id: NoteId) -> ServiceResult<DeletionReport> {
        let started_at = Instant::now();
        let note = self.get_note(id)?;
        let inherited = note.prerequisite_ids();
        let dependents = self.store.find_notes_with_prerequisite(id)?;

        let mut report = DeletionReport {
            deleted: id,
            rewired: Vec::new(),
            failed: Vec::new(),
            removed_links: 0,
        };

        for dependent in dependents {
            let updated = splice_prerequisites(
                dependent.id,
                &dependent.prerequisite_ids(),
                id,
                &inherited,
            );
            match self.store.update_note_prerequisites(dependent.id, &updated) {
                Ok(()) => report.rewired.push(dependent.id),
                Err(err) => {
                    warn!(
                        "event=note_delete_rewire module=service status=error note={} dependent={} error={}",
                        id, dependent.id, err
                    );
                    report.failed.push(FailedRewire {
                        note: dependent.id,
                        error: err.to_string(),
                    });
                }
            }
        }

        report.removed_links = self.store.delete_links_for(id)?;
        self.store.delete_note(id)?;

        info!(
            "event=note_delete module=service status=ok note={} rewired={} failed={} removed_links={} duration_ms={}",
            id,
            report.rewired.len(),
            report.failed.len(),
            report.removed_links,
            started_at.elapsed().as_millis()
        );
        Ok(report)
    }
}

/// Removes `removed` from `current` and appends every inherited prerequisite
/// not already present. `dependent` itself is never inherited, which keeps a
/// two-note cycle from turning into a self-reference.
pub fn splice_prerequisites(
    dependent: NoteId,
    current: &[NoteId],
    removed: NoteId,
    inherited: &[NoteId],
) -> Vec<NoteId> {
    let kept = current.iter().copied().filter(|id| *id != removed);
    let added = inherited
        .iter()
        .copied()
        .filter(|id| *id != dependent && *id != removed);
    dedup_ids(kept.chain(added))
}

/// Deduplicates `prerequisites` and rejects a self-reference.
pub fn validate_prerequisites(id: NoteId, prerequisites: &[NoteId]) -> ServiceResult<Vec<NoteId>> {
    if prerequisites.contains(&id) {
        return Err(ServiceError::InvalidReference(
            InvalidReference::SelfReference(id),
        ));
    }
    Ok(dedup_ids(prerequisites.iter().copied()))
}

fn normalize_title(value: &str) -> String {
    normalize_name(value).unwrap_or_else(|| UNTITLED_NOTE.to_string())
}

#[cfg(test)]
mod tests {
    use super::{splice_prerequisites, validate_prerequisites};
    use crate::service::error::{InvalidReference, ServiceError};
    use uuid::Uuid;

    #[test]
    fn splice_replaces_deleted_note_with_its_prerequisites() {
        let (d, a, x, b) = (
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
        );
        assert_eq!(splice_prerequisites(d, &[a, x], x, &[b]), vec![a, b]);
    }

    #[test]
    fn splice_does_not_duplicate_shared_prerequisites() {
        let (d, a, x) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(splice_prerequisites(d, &[x, a], x, &[a]), vec![a]);
    }

    #[test]
    fn splice_never_makes_dependent_its_own_prerequisite() {
        let (d, x) = (Uuid::new_v4(), Uuid::new_v4());
        assert!(splice_prerequisites(d, &[x], x, &[d]).is_empty());
    }

    #[test]
    fn validate_rejects_self_reference() {
        let id = Uuid::new_v4();
        let err = validate_prerequisites(id, &[Uuid::new_v4(), id]).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::InvalidReference(InvalidReference::SelfReference(found)) if found == id
        ));
    }
}
