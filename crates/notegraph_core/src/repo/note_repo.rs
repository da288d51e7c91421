//! Note repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist notes, their topic memberships and ordered prerequisite lists.
//! - Resolve prerequisites into stubs (id, title, topics) at this boundary,
//!   so the graph core never sees bare references from storage.
//!
//! # Invariants
//! - Prerequisite writes replace the whole list in one transaction.
//! - Referenced prerequisites and topics must belong to the same owner.
//! - Note lists are ordered by creation (`created_at ASC, rowid ASC`).

use crate::model::note::{dedup_ids, ContentBlock, Note, NoteId, Prerequisite, PrerequisiteStub};
use crate::model::topic::TopicId;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::sqlite::{parse_uuid, SqliteStore};
use rusqlite::{params, Connection, Row, Transaction};

const NOTE_SELECT_SQL: &str = "SELECT uuid, owner, title, content_json FROM notes";
const NOTE_ORDER_SQL: &str = " ORDER BY created_at ASC, rowid ASC;";

/// Store interface consumed by the note, link and graph services.
pub trait NoteRepository {
    /// Owner partition every read and write is scoped to.
    fn owner(&self) -> &str;
    /// Inserts a note with its topics and prerequisites.
    fn create_note(&self, note: &Note) -> RepoResult<NoteId>;
    /// Replaces title and content blocks.
    fn update_note_content(&self, id: NoteId, title: &str, blocks: &[ContentBlock])
        -> RepoResult<()>;
    /// Replaces the whole topic membership set.
    fn set_note_topics(&self, id: NoteId, topics: &[TopicId]) -> RepoResult<()>;
    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>>;
    fn find_all_notes(&self) -> RepoResult<Vec<Note>>;
    fn find_notes_by_topic(&self, topic: TopicId) -> RepoResult<Vec<Note>>;
    /// Notes that list `id` among their prerequisites.
    fn find_notes_with_prerequisite(&self, id: NoteId) -> RepoResult<Vec<Note>>;
    /// Replaces the ordered prerequisite list. Duplicates are dropped.
    fn update_note_prerequisites(&self, id: NoteId, prerequisites: &[NoteId]) -> RepoResult<()>;
    /// Removes every prerequisite link where `id` is either endpoint.
    fn delete_links_for(&self, id: NoteId) -> RepoResult<usize>;
    fn delete_note(&self, id: NoteId) -> RepoResult<()>;
}

impl NoteRepository for SqliteStore<'_> {
    fn owner(&self) -> &str {
        self.owner.as_str()
    }

    fn create_note(&self, note: &Note) -> RepoResult<NoteId> {
        let blocks_json = encode_blocks(&note.blocks)?;
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO notes (uuid, owner, title, content_json) VALUES (?1, ?2, ?3, ?4);",
            params![
                note.id.to_string(),
                self.owner.as_str(),
                note.title.as_str(),
                blocks_json
            ],
        )?;
        write_topics(&tx, self.owner.as_str(), note.id, &note.topics)?;
        write_prerequisites(&tx, self.owner.as_str(), note.id, &note.prerequisite_ids())?;
        tx.commit()?;
        Ok(note.id)
    }

    fn update_note_content(
        &self,
        id: NoteId,
        title: &str,
        blocks: &[ContentBlock],
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE notes
             SET
                title = ?3,
                content_json = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1 AND owner = ?2;",
            params![
                id.to_string(),
                self.owner.as_str(),
                title,
                encode_blocks(blocks)?
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NoteNotFound(id));
        }
        Ok(())
    }

    fn set_note_topics(&self, id: NoteId, topics: &[TopicId]) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        ensure_note_exists(&tx, self.owner.as_str(), id)?;
        tx.execute(
            "DELETE FROM note_topics WHERE note_uuid = ?1;",
            [id.to_string()],
        )?;
        write_topics(&tx, self.owner.as_str(), id, topics)?;
        touch_note(&tx, id)?;
        tx.commit()?;
        Ok(())
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE uuid = ?1 AND owner = ?2;"))?;
        let mut rows = stmt.query(params![id.to_string(), self.owner.as_str()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_note_row(self.conn, row)?)),
            None => Ok(None),
        }
    }

    fn find_all_notes(&self) -> RepoResult<Vec<Note>> {
        let sql = format!("{NOTE_SELECT_SQL} WHERE owner = ?1{NOTE_ORDER_SQL}");
        query_notes(self.conn, &sql, params![self.owner.as_str()])
    }

    fn find_notes_by_topic(&self, topic: TopicId) -> RepoResult<Vec<Note>> {
        let sql = format!(
            "{NOTE_SELECT_SQL}
             WHERE owner = ?1
               AND EXISTS (
                    SELECT 1
                    FROM note_topics nt
                    WHERE nt.note_uuid = notes.uuid
                      AND nt.topic_uuid = ?2
               ){NOTE_ORDER_SQL}"
        );
        query_notes(
            self.conn,
            &sql,
            params![self.owner.as_str(), topic.to_string()],
        )
    }

    fn find_notes_with_prerequisite(&self, id: NoteId) -> RepoResult<Vec<Note>> {
        let sql = format!(
            "{NOTE_SELECT_SQL}
             WHERE owner = ?1
               AND EXISTS (
                    SELECT 1
                    FROM note_prerequisites np
                    WHERE np.note_uuid = notes.uuid
                      AND np.prerequisite_uuid = ?2
               ){NOTE_ORDER_SQL}"
        );
        query_notes(self.conn, &sql, params![self.owner.as_str(), id.to_string()])
    }

    fn update_note_prerequisites(&self, id: NoteId, prerequisites: &[NoteId]) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        ensure_note_exists(&tx, self.owner.as_str(), id)?;
        tx.execute(
            "DELETE FROM note_prerequisites WHERE note_uuid = ?1;",
            [id.to_string()],
        )?;
        write_prerequisites(&tx, self.owner.as_str(), id, prerequisites)?;
        touch_note(&tx, id)?;
        tx.commit()?;
        Ok(())
    }

    fn delete_links_for(&self, id: NoteId) -> RepoResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM note_prerequisites
             WHERE (note_uuid = ?1 OR prerequisite_uuid = ?1)
               AND EXISTS (SELECT 1 FROM notes WHERE uuid = ?1 AND owner = ?2);",
            params![id.to_string(), self.owner.as_str()],
        )?;
        Ok(removed)
    }

    fn delete_note(&self, id: NoteId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM notes WHERE uuid = ?1 AND owner = ?2;",
            params![id.to_string(), self.owner.as_str()],
        )?;
        if changed == 0 {
            return Err(RepoError::NoteNotFound(id));
        }
        Ok(())
    }
}

fn query_notes(
    conn: &Connection,
    sql: &str,
    bind: impl rusqlite::Params,
) -> RepoResult<Vec<Note>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(bind)?;
    let mut notes = Vec::new();
    while let Some(row) = rows.next()? {
        notes.push(parse_note_row(conn, row)?);
    }
    Ok(notes)
}

fn parse_note_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Note> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text, "notes.uuid")?;
    let content_json: String = row.get("content_json")?;
    let blocks: Vec<ContentBlock> = serde_json::from_str(&content_json).map_err(|err| {
        RepoError::InvalidData(format!("invalid content_json for note {id}: {err}"))
    })?;

    Ok(Note {
        id,
        owner: row.get("owner")?,
        title: row.get("title")?,
        blocks,
        topics: load_topics_for_note(conn, &uuid_text)?,
        prerequisites: load_prerequisites_for_note(conn, &uuid_text)?,
    })
}

fn load_topics_for_note(conn: &Connection, note_uuid: &str) -> RepoResult<Vec<TopicId>> {
    let mut stmt = conn.prepare(
        "SELECT t.uuid
         FROM note_topics nt
         INNER JOIN topics t ON t.uuid = nt.topic_uuid
         WHERE nt.note_uuid = ?1
         ORDER BY t.name COLLATE NOCASE ASC, t.uuid ASC;",
    )?;
    let mut rows = stmt.query([note_uuid])?;
    let mut topics = Vec::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        topics.push(parse_uuid(&value, "topics.uuid")?);
    }
    Ok(topics)
}

fn load_prerequisites_for_note(conn: &Connection, note_uuid: &str) -> RepoResult<Vec<Prerequisite>> {
    let mut stmt = conn.prepare(
        "SELECT n.uuid, n.title
         FROM note_prerequisites np
         INNER JOIN notes n ON n.uuid = np.prerequisite_uuid
         WHERE np.note_uuid = ?1
         ORDER BY np.position ASC;",
    )?;
    let mut rows = stmt.query([note_uuid])?;
    let mut prerequisites = Vec::new();
    while let Some(row) = rows.next()? {
        let uuid_text: String = row.get(0)?;
        prerequisites.push(Prerequisite::Resolved(PrerequisiteStub {
            id: parse_uuid(&uuid_text, "note_prerequisites.prerequisite_uuid")?,
            title: row.get(1)?,
            topics: load_topics_for_note(conn, &uuid_text)?,
        }));
    }
    Ok(prerequisites)
}

fn write_topics(
    tx: &Transaction<'_>,
    owner: &str,
    note: NoteId,
    topics: &[TopicId],
) -> RepoResult<()> {
    for topic in topics {
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO note_topics (note_uuid, topic_uuid)
             SELECT ?1, uuid
             FROM topics
             WHERE uuid = ?2 AND owner = ?3;",
            params![note.to_string(), topic.to_string(), owner],
        )?;
        if inserted == 0 && !topic_exists(tx, owner, *topic)? {
            return Err(RepoError::TopicNotFound(*topic));
        }
    }
    Ok(())
}

fn write_prerequisites(
    tx: &Transaction<'_>,
    owner: &str,
    note: NoteId,
    prerequisites: &[NoteId],
) -> RepoResult<()> {
    for (position, prerequisite) in dedup_ids(prerequisites.iter().copied())
        .into_iter()
        .enumerate()
    {
        let position = i64::try_from(position)
            .map_err(|_| RepoError::InvalidData("prerequisite list too long".to_string()))?;
        let inserted = tx.execute(
            "INSERT INTO note_prerequisites (note_uuid, prerequisite_uuid, position)
             SELECT ?1, uuid, ?3
             FROM notes
             WHERE uuid = ?2 AND owner = ?4;",
            params![note.to_string(), prerequisite.to_string(), position, owner],
        )?;
        if inserted == 0 {
            return Err(RepoError::NoteNotFound(prerequisite));
        }
    }
    Ok(())
}

fn ensure_note_exists(tx: &Transaction<'_>, owner: &str, id: NoteId) -> RepoResult<()> {
    let exists: i64 = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM notes WHERE uuid = ?1 AND owner = ?2);",
        params![id.to_string(), owner],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(RepoError::NoteNotFound(id));
    }
    Ok(())
}

fn topic_exists(tx: &Transaction<'_>, owner: &str, id: TopicId) -> RepoResult<bool> {
    let exists: i64 = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM topics WHERE uuid = ?1 AND owner = ?2);",
        params![id.to_string(), owner],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn touch_note(tx: &Transaction<'_>, id: NoteId) -> RepoResult<()> {
    tx.execute(
        "UPDATE notes SET updated_at = (strftime('%s', 'now') * 1000) WHERE uuid = ?1;",
        [id.to_string()],
    )?;
    Ok(())
}

fn encode_blocks(blocks: &[ContentBlock]) -> RepoResult<String> {
    serde_json::to_string(blocks)
        .map_err(|err| RepoError::InvalidData(format!("unencodable content blocks: {err}")))
}

impl<T: NoteRepository + ?Sized> NoteRepository for &T {
    fn owner(&self) -> &str {
        (**self).owner()
    }

    fn create_note(&self, note: &Note) -> RepoResult<NoteId> {
        (**self).create_note(note)
    }

    fn update_note_content(
        &self,
        id: NoteId,
        title: &str,
        blocks: &[ContentBlock],
    ) -> RepoResult<()> {
        (**self).update_note_content(id, title, blocks)
    }

    fn set_note_topics(&self, id: NoteId, topics: &[TopicId]) -> RepoResult<()> {
        (**self).set_note_topics(id, topics)
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        (**self).get_note(id)
    }

    fn find_all_notes(&self) -> RepoResult<Vec<Note>> {
        (**self).find_all_notes()
    }

    fn find_notes_by_topic(&self, topic: TopicId) -> RepoResult<Vec<Note>> {
        (**self).find_notes_by_topic(topic)
    }

    fn find_notes_with_prerequisite(&self, id: NoteId) -> RepoResult<Vec<Note>> {
        (**self).find_notes_with_prerequisite(id)
    }

    fn update_note_prerequisites(&self, id: NoteId, prerequisites: &[NoteId]) -> RepoResult<()> {
        (**self).update_note_prerequisites(id, prerequisites)
    }

    fn delete_links_for(&self, id: NoteId) -> RepoResult<usize> {
        (**self).delete_links_for(id)
    }

    fn delete_note(&self, id: NoteId) -> RepoResult<()> {
        (**self).delete_note(id)
    }
}
