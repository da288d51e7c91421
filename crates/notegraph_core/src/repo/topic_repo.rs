//! Topic repository contract and SQLite implementation.
//!
//! # Invariants
//! - Topic names are unique per owner, compared case-insensitively.
//! - `create_topic` on a taken name returns the existing topic.
//! - Deleting a topic only unlinks notes (FK cascade on `note_topics`).

use crate::model::topic::{Topic, TopicId};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::sqlite::{parse_uuid, SqliteStore};
use rusqlite::{params, Row};
use uuid::Uuid;

/// Repository interface for topics.
pub trait TopicRepository {
    /// Inserts a topic, or returns the owner's existing topic with that name.
    fn create_topic(&self, name: &str) -> RepoResult<Topic>;
    fn get_topic(&self, id: TopicId) -> RepoResult<Option<Topic>>;
    fn find_topic_by_name(&self, name: &str) -> RepoResult<Option<Topic>>;
    /// Lists topics sorted by name.
    fn list_topics(&self) -> RepoResult<Vec<Topic>>;
    fn delete_topic(&self, id: TopicId) -> RepoResult<()>;
}

impl TopicRepository for SqliteStore<'_> {
    fn create_topic(&self, name: &str) -> RepoResult<Topic> {
        self.conn.execute(
            "INSERT OR IGNORE INTO topics (uuid, owner, name) VALUES (?1, ?2, ?3);",
            params![Uuid::new_v4().to_string(), self.owner.as_str(), name],
        )?;

        self.find_topic_by_name(name)?.ok_or_else(|| {
            RepoError::InvalidData(format!("topic `{name}` missing after insert"))
        })
    }

    fn get_topic(&self, id: TopicId) -> RepoResult<Option<Topic>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, owner, name
             FROM topics
             WHERE uuid = ?1 AND owner = ?2;",
        )?;
        let mut rows = stmt.query(params![id.to_string(), self.owner.as_str()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_topic_row(row)?)),
            None => Ok(None),
        }
    }

    fn find_topic_by_name(&self, name: &str) -> RepoResult<Option<Topic>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, owner, name
             FROM topics
             WHERE owner = ?1 AND name = ?2 COLLATE NOCASE;",
        )?;
        let mut rows = stmt.query(params![self.owner.as_str(), name])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_topic_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_topics(&self) -> RepoResult<Vec<Topic>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, owner, name
             FROM topics
             WHERE owner = ?1
             ORDER BY name COLLATE NOCASE ASC, uuid ASC;",
        )?;
        let mut rows = stmt.query([self.owner.as_str()])?;
        let mut topics = Vec::new();
        while let Some(row) = rows.next()? {
            topics.push(parse_topic_row(row)?);
        }
        Ok(topics)
    }

    fn delete_topic(&self, id: TopicId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM topics WHERE uuid = ?1 AND owner = ?2;",
            params![id.to_string(), self.owner.as_str()],
        )?;
        if changed == 0 {
            return Err(RepoError::TopicNotFound(id));
        }
        Ok(())
    }
}

impl<T: TopicRepository + ?Sized> TopicRepository for &T {
    fn create_topic(&self, name: &str) -> RepoResult<Topic> {
        (**self).create_topic(name)
    }

    fn get_topic(&self, id: TopicId) -> RepoResult<Option<Topic>> {
        (**self).get_topic(id)
    }

    fn find_topic_by_name(&self, name: &str) -> RepoResult<Option<Topic>> {
        (**self).find_topic_by_name(name)
    }

    fn list_topics(&self) -> RepoResult<Vec<Topic>> {
        (**self).list_topics()
    }

    fn delete_topic(&self, id: TopicId) -> RepoResult<()> {
        (**self).delete_topic(id)
    }
}

fn parse_topic_row(row: &Row<'_>) -> RepoResult<Topic> {
    let uuid_text: String = row.get("uuid")?;
    Ok(Topic {
        id: parse_uuid(&uuid_text, "topics.uuid")?,
        owner: row.get("owner")?,
        name: row.get("name")?,
    })
}
