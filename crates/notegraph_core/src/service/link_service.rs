//! Interactive prerequisite/"next" link editing.
//!
//! # Responsibility
//! - Validate single-link edits made from the graph view.
//! - Keep "next" insertions close to a linear chain.
//!
//! # Invariants
//! - A note is never linked to itself; rejected before any store read.
//! - Adding "next" rewires only the `next` note (one hop).
//! - Every edit is persisted through `update_note_prerequisites`; callers
//!   rebuild the graph afterwards.

use crate::model::note::{Note, NoteId};
use crate::repo::note_repo::NoteRepository;
use crate::service::error::{Conflict, InvalidReference, Missing, ServiceError, ServiceResult};
use log::info;

pub struct LinkService<R: NoteRepository> {
    repo: R,
}

impl<R: NoteRepository> LinkService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Appends `prerequisite` to `note`'s prerequisites. Returns updated `note`.
    pub fn add_prerequisite(&self, note: NoteId, prerequisite: NoteId) -> ServiceResult<Note> {
        reject_self_link(note, prerequisite)?;
        let current = self.load(note)?;
        self.load(prerequisite)?;

        let updated = plan_add_prerequisite(&current, prerequisite)?;
        self.persist("add_prerequisite", note, prerequisite, &updated)
    }

    /// Drops `prerequisite` from `note`'s prerequisites. Returns updated `note`.
    pub fn remove_prerequisite(&self, note: NoteId, prerequisite: NoteId) -> ServiceResult<Note> {
        let current = self.load(note)?;
        if !current.has_prerequisite(prerequisite) {
            return Err(ServiceError::NotFound(Missing::Link {
                note,
                prerequisite,
            }));
        }

        let updated: Vec<NoteId> = current
            .prerequisite_ids()
            .into_iter()
            .filter(|id| *id != prerequisite)
            .collect();
        self.persist("remove_prerequisite", note, prerequisite, &updated)
    }

    /// Makes `note` an immediate predecessor of `next`. Returns updated `next`.
    pub fn add_next(&self, note: NoteId, next: NoteId) -> ServiceResult<Note> {
        reject_self_link(note, next)?;
        let current = self.load(note)?;
        let following = self.load(next)?;

        let updated = plan_add_next(&current, &following)?;
        self.persist("add_next", next, note, &updated)
    }

    /// Inverse of [`LinkService::add_next`]. Returns updated `next`.
    pub fn remove_next(&self, note: NoteId, next: NoteId) -> ServiceResult<Note> {
        self.remove_prerequisite(next, note)
    }

    fn load(&self, id: NoteId) -> ServiceResult<Note> {
        self.repo
            .get_note(id)?
            .ok_or(ServiceError::NotFound(Missing::Note(id)))
    }

    fn persist(
        &self,
        op: &str,
        note: NoteId,
        other: NoteId,
        prerequisites: &[NoteId],
    ) -> ServiceResult<Note> {
        self.repo.update_note_prerequisites(note, prerequisites)?;
        info!(
            "event=link_edit module=service status=ok op={op} note={note} other={other} prerequisites={}",
            prerequisites.len()
        );
        self.load(note)
    }
}

/// New prerequisite list for `note` after appending `prerequisite`.
pub fn plan_add_prerequisite(note: &Note, prerequisite: NoteId) -> ServiceResult<Vec<NoteId>> {
    reject_self_link(note.id, prerequisite)?;
    if note.has_prerequisite(prerequisite) {
        return Err(ServiceError::Conflict(Conflict::AlreadyPrerequisite {
            note: note.id,
            prerequisite,
        }));
    }

    let mut updated = note.prerequisite_ids();
    updated.push(prerequisite);
    Ok(updated)
}

/// New prerequisite list for `next` once `note` becomes its predecessor.
///
/// Prerequisites of `next` that `note` already depends on are dropped, then
/// `note` is appended.
pub fn plan_add_next(note: &Note, next: &Note) -> ServiceResult<Vec<NoteId>> {
    reject_self_link(note.id, next.id)?;
    if next.has_prerequisite(note.id) {
        return Err(ServiceError::Conflict(Conflict::AlreadyNext {
            note: note.id,
            next: next.id,
        }));
    }

    let mut updated: Vec<NoteId> = next
        .prerequisite_ids()
        .into_iter()
        .filter(|id| !note.has_prerequisite(*id))
        .collect();
    updated.push(note.id);
    Ok(updated)
}

fn reject_self_link(note: NoteId, other: NoteId) -> ServiceResult<()> {
    if note == other {
        return Err(ServiceError::InvalidReference(
            InvalidReference::SelfReference(note),
        ));
    }
    Ok(())
}
