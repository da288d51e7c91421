//! Owner-scoped SQLite store handle.
//!
//! # Responsibility
//! - Bind a migrated connection to one owner partition.
//! - Refuse connections whose schema does not match this binary.
//!
//! # Invariants
//! - Every query issued through `SqliteStore` filters on `owner`.

use crate::db::migrations::latest_version;
use crate::model::note::OwnerId;
use crate::repo::error::{RepoError, RepoResult};
use rusqlite::Connection;
use uuid::Uuid;

const REQUIRED_TABLES: [&str; 4] = ["topics", "notes", "note_topics", "note_prerequisites"];

/// SQLite-backed implementation of the note and topic repositories.
#[derive(Clone)]
pub struct SqliteStore<'conn> {
    pub(crate) conn: &'conn Connection,
    pub(crate) owner: OwnerId,
}

impl<'conn> SqliteStore<'conn> {
    /// Binds a connection from `db::open_db*` to one owner.
    pub fn try_new(conn: &'conn Connection, owner: impl Into<OwnerId>) -> RepoResult<Self> {
        ensure_store_connection_ready(conn)?;
        Ok(Self {
            conn,
            owner: owner.into(),
        })
    }
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

fn ensure_store_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in REQUIRED_TABLES {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    Ok(())
}
