//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist task records scoped by owner.
//! - Offer a compare-and-set write for the `(status, due)` lifecycle pair.
//!
//! # Invariants
//! - Every read and write filters on `owner_id`; foreign rows are invisible.
//! - `due` is stored as epoch milliseconds.
//! - Unknown stored `recurrence` values read back as `None`.
//! - A lifecycle write changes `status` and `due` in one statement, only when
//!   both still hold the values the caller read.

use crate::model::category::OwnerId;
use crate::model::task::{Recurrence, Task, TaskId, TaskState};
use crate::repo::{
    bool_to_int, ensure_table_ready, parse_timestamp_ms, parse_uuid, RepoError, RepoResult,
};
use rusqlite::{params, Connection, Row};

const TASK_SELECT_SQL: &str = "SELECT
    id,
    owner_id,
    category_id,
    name,
    content,
    status,
    due,
    recurrence
FROM tasks";

/// Repository interface for task records.
pub trait TaskRepository {
    /// Inserts one validated task into a category owned by the same owner.
    fn create_task(&self, task: &Task) -> RepoResult<TaskId>;
    /// Point read by id, scoped by owner.
    fn get_task(&self, owner_id: OwnerId, task_id: TaskId) -> RepoResult<Option<Task>>;
    /// Replaces the lifecycle pair when it still equals `expected`.
    ///
    /// Returns `false` without writing when the row changed since it was read
    /// or no longer exists.
    fn compare_and_set_state(
        &self,
        owner_id: OwnerId,
        task_id: TaskId,
        expected: TaskState,
        next: TaskState,
    ) -> RepoResult<bool>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(
            conn,
            "tasks",
            &[
                "id",
                "owner_id",
                "category_id",
                "name",
                "content",
                "status",
                "due",
                "recurrence",
            ],
        )?;
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;

        let inserted = self.conn.execute(
            "INSERT INTO tasks (
                id,
                owner_id,
                category_id,
                name,
                content,
                status,
                due,
                recurrence
            )
            SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8
            WHERE EXISTS (
                SELECT 1 FROM categories WHERE id = ?3 AND owner_id = ?2
            );",
            params![
                task.id.to_string(),
                task.owner_id.to_string(),
                task.category_id.to_string(),
                task.name.trim(),
                task.content.as_deref(),
                bool_to_int(task.status),
                task.due.map(|due| due.timestamp_millis()),
                task.recurrence.map(Recurrence::as_str),
            ],
        )?;

        if inserted == 0 {
            return Err(RepoError::CategoryNotFound(task.category_id));
        }

        Ok(task.id)
    }

    fn get_task(&self, owner_id: OwnerId, task_id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE id = ?1
               AND owner_id = ?2;"
        ))?;

        let mut rows = stmt.query(params![task_id.to_string(), owner_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }

        Ok(None)
    }

    fn compare_and_set_state(
        &self,
        owner_id: OwnerId,
        task_id: TaskId,
        expected: TaskState,
        next: TaskState,
    ) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                status = ?3,
                due = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1
               AND owner_id = ?2
               AND status = ?5
               AND due IS ?6;",
            params![
                task_id.to_string(),
                owner_id.to_string(),
                bool_to_int(next.status),
                next.due.map(|due| due.timestamp_millis()),
                bool_to_int(expected.status),
                expected.due.map(|due| due.timestamp_millis()),
            ],
        )?;

        Ok(changed == 1)
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id_text: String = row.get("id")?;
    let owner_text: String = row.get("owner_id")?;
    let category_text: String = row.get("category_id")?;

    let status = match row.get::<_, i64>("status")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid status value `{other}` in tasks.status"
            )));
        }
    };

    let due = row
        .get::<_, Option<i64>>("due")?
        .map(|value| parse_timestamp_ms(value, "tasks.due"))
        .transpose()?;
    let recurrence = Recurrence::normalize(row.get::<_, Option<String>>("recurrence")?.as_deref());

    Ok(Task {
        id: parse_uuid(&id_text, "tasks.id")?,
        owner_id: parse_uuid(&owner_text, "tasks.owner_id")?,
        category_id: parse_uuid(&category_text, "tasks.category_id")?,
        name: row.get("name")?,
        content: row.get("content")?,
        status,
        due,
        recurrence,
    })
}
