//! Note repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist notes and own every write to `notes.position`.
//! - Execute reorder plans as one immediate transaction.
//!
//! # Invariants
//! - Per category, positions stay exactly `0..N` after each committed write:
//!   inserts append at `N`, deletes close the gap, moves shift one bounded
//!   range and then place the moved note.
//! - Every position-changing write runs under `BEGIN IMMEDIATE`, so writers
//!   touching the same category are serialized by SQLite's write lock.
//! - Listing is deterministic: `position ASC, name ASC, id ASC`.

use crate::model::category::CategoryId;
use crate::model::note::{Note, NoteId};
use crate::model::ordering::PositionShift;
use crate::repo::{ensure_table_ready, parse_position, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

/// Committed effect of one move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteMove {
    /// Category read from the moved note's record.
    pub category_id: CategoryId,
    /// Number of other notes whose position changed.
    pub displaced: usize,
}

/// Repository interface for notes.
pub trait NoteRepository {
    /// Appends one note at the end of its category.
    fn create_note(
        &self,
        category_id: CategoryId,
        name: &str,
        content: Option<&str>,
    ) -> RepoResult<Note>;
    /// Point read by id.
    fn get_note(&self, note_id: NoteId) -> RepoResult<Option<Note>>;
    /// Lists one category in display order.
    fn list_notes(&self, category_id: CategoryId) -> RepoResult<Vec<Note>>;
    /// Deletes one note and closes the gap it leaves.
    fn delete_note(&self, note_id: NoteId) -> RepoResult<()>;
    /// Applies `shift` to the note `note_id` and its category siblings.
    ///
    /// Fails with `PositionMismatch` when the stored position differs from
    /// `shift.from()`, and with `PositionOutOfRange` when `shift.to()` is not
    /// a valid slot.
    fn move_note(&self, note_id: NoteId, shift: PositionShift) -> RepoResult<NoteMove>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(
            conn,
            "notes",
            &["id", "category_id", "name", "content", "position"],
        )?;
        Ok(Self { conn })
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn create_note(
        &self,
        category_id: CategoryId,
        name: &str,
        content: Option<&str>,
    ) -> RepoResult<Note> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !category_exists(&tx, category_id)? {
            return Err(RepoError::CategoryNotFound(category_id));
        }

        let next_position: i64 = tx.query_row(
            "SELECT COALESCE(MAX(position), -1) + 1
             FROM notes
             WHERE category_id = ?1;",
            [category_id.to_string()],
            |row| row.get(0),
        )?;

        let note_id = Uuid::new_v4();
        tx.execute(
            "INSERT INTO notes (id, category_id, name, content, position)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                note_id.to_string(),
                category_id.to_string(),
                name,
                content,
                next_position,
            ],
        )?;
        tx.commit()?;

        Ok(Note {
            id: note_id,
            category_id,
            name: name.to_string(),
            content: content.map(str::to_string),
            position: parse_position(next_position, "notes.position")?,
        })
    }

    fn get_note(&self, note_id: NoteId) -> RepoResult<Option<Note>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, category_id, name, content, position
             FROM notes
             WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([note_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_note_row(row)?));
        }
        Ok(None)
    }

    fn list_notes(&self, category_id: CategoryId) -> RepoResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, category_id, name, content, position
             FROM notes
             WHERE category_id = ?1
             ORDER BY position ASC, name ASC, id ASC;",
        )?;
        let mut rows = stmt.query([category_id.to_string()])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn delete_note(&self, note_id: NoteId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let (category_text, position) =
            load_slot(&tx, note_id)?.ok_or(RepoError::NoteNotFound(note_id))?;

        tx.execute("DELETE FROM notes WHERE id = ?1;", [note_id.to_string()])?;
        tx.execute(
            "UPDATE notes
             SET position = position - 1,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE category_id = ?1
               AND position > ?2;",
            params![category_text, position],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn move_note(&self, note_id: NoteId, shift: PositionShift) -> RepoResult<NoteMove> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let (category_text, stored_position) =
            load_slot(&tx, note_id)?.ok_or(RepoError::NoteNotFound(note_id))?;
        let category_id = parse_uuid(&category_text, "notes.category_id")?;

        let actual = parse_position(stored_position, "notes.position")?;
        if actual != shift.from() {
            return Err(RepoError::PositionMismatch {
                note_id,
                expected: shift.from(),
                actual,
            });
        }

        let len: i64 = tx.query_row(
            "SELECT COUNT(*) FROM notes WHERE category_id = ?1;",
            [category_text.as_str()],
            |row| row.get(0),
        )?;
        if i64::from(shift.to()) >= len {
            return Err(RepoError::PositionOutOfRange {
                position: shift.to(),
                len: parse_position(len, "COUNT(notes)")?,
            });
        }

        let range = shift.displaced_range();
        let displaced = tx.execute(
            "UPDATE notes
             SET position = position + ?5,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE category_id = ?1
               AND id <> ?2
               AND position BETWEEN ?3 AND ?4;",
            params![
                category_text.as_str(),
                note_id.to_string(),
                range.start(),
                range.end(),
                shift.delta(),
            ],
        )?;

        tx.execute(
            "UPDATE notes
             SET position = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![note_id.to_string(), shift.to()],
        )?;

        tx.commit()?;
        Ok(NoteMove {
            category_id,
            displaced,
        })
    }
}

fn category_exists(conn: &Connection, category_id: CategoryId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM categories WHERE id = ?1);",
        [category_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn load_slot(conn: &Connection, note_id: NoteId) -> RepoResult<Option<(String, i64)>> {
    let slot = conn
        .query_row(
            "SELECT category_id, position FROM notes WHERE id = ?1;",
            [note_id.to_string()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;
    Ok(slot)
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let id_text: String = row.get("id")?;
    let category_text: String = row.get("category_id")?;
    Ok(Note {
        id: parse_uuid(&id_text, "notes.id")?,
        category_id: parse_uuid(&category_text, "notes.category_id")?,
        name: row.get("name")?,
        content: row.get("content")?,
        position: parse_position(row.get("position")?, "notes.position")?,
    })
}
