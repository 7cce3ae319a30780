//! Task store trait and `SQLite` implementation.

use crate::error::{Error, Result};
use crate::tasks::models::{NewTask, Priority, Status, Task, TaskId};
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info};

/// Format used for stored timestamps (UTC, millisecond precision).
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// SQL expression producing the current time in [`TIMESTAMP_FORMAT`].
const SQL_NOW: &str = "strftime('%Y-%m-%d %H:%M:%f', 'now')";

const TASK_COLUMNS: &str = "id, title, description, status, priority, created_at, updated_at";

/// Storage primitives the task service is built on.
///
/// Implementations own durability and the assignment of IDs and timestamps;
/// they do not validate field contents.
#[allow(clippy::missing_errors_doc)]
pub trait TaskStore {
    /// Insert a new row and return its generated ID.
    fn insert(&self, task: &NewTask) -> Result<TaskId>;

    /// Fetch one task by ID.
    fn fetch_one(&self, id: TaskId) -> Result<Option<Task>>;

    /// Fetch all tasks matching the filter, newest first.
    fn fetch_many(&self, filter: &TaskFilter) -> Result<Vec<Task>>;

    /// Apply the changes to one row and return the number of rows affected.
    fn mutate(&self, id: TaskId, changes: &TaskChanges) -> Result<usize>;

    /// Delete one row and return the number of rows affected.
    fn remove(&self, id: TaskId) -> Result<usize>;

    /// Count tasks per status. Statuses with no tasks are absent.
    fn count_by_status(&self) -> Result<BTreeMap<Status, u64>>;
}

/// Typed, already validated changes for a partial update.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskChanges {
    /// New title (if Some).
    pub title: Option<String>,
    /// New description (if Some); `Some(None)` clears it.
    pub description: Option<Option<String>>,
    /// New status (if Some).
    pub status: Option<Status>,
    /// New priority (if Some).
    pub priority: Option<Priority>,
}

impl TaskChanges {
    /// Check if any fields are set for update.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
    }
}

/// Filter options for listing tasks.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TaskFilter {
    /// Filter by status.
    pub status: Option<Status>,
    /// Filter by priority.
    pub priority: Option<Priority>,
}

impl TaskFilter {
    /// Build a filter from raw query values.
    ///
    /// Absent or blank values mean "no filter" for that field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a value that is not a known status or priority.
    pub fn parse(status: Option<&str>, priority: Option<&str>) -> Result<Self> {
        fn present(value: Option<&str>) -> Option<&str> {
            value.filter(|v| !v.trim().is_empty())
        }

        let status = present(status)
            .map(str::parse::<Status>)
            .transpose()
            .map_err(|e| Error::InvalidInput(e.to_string()))?;
        let priority = present(priority)
            .map(str::parse::<Priority>)
            .transpose()
            .map_err(|e| Error::InvalidInput(e.to_string()))?;

        Ok(Self { status, priority })
    }
}

/// SQLite-based task store holding one long-lived connection.
#[derive(Debug)]
pub struct SqliteTaskStore {
    conn: Mutex<Connection>,
}

impl SqliteTaskStore {
    /// Open (creating if needed) the database at `db_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the
    /// database cannot be opened and initialized.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(db_path)?;
        let store = Self::with_connection(conn)?;
        info!(path = %db_path.display(), "task store opened");
        Ok(store)
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let store = Self::with_connection(Connection::open_in_memory()?)?;
        debug!("in-memory task store opened");
        Ok(store)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::init_schema(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Close the underlying connection, reporting any error from `SQLite`.
    ///
    /// # Errors
    ///
    /// Returns an error if `SQLite` refuses to close the connection.
    pub fn close(self) -> Result<()> {
        let conn = self.conn.into_inner().unwrap_or_else(PoisonError::into_inner);
        conn.close().map_err(|(_, e)| e)?;
        info!("task store closed");
        Ok(())
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(&format!(
            r"
            CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT,
                status TEXT NOT NULL DEFAULT 'todo'
                    CHECK (status IN ('todo', 'doing', 'done')),
                priority TEXT NOT NULL DEFAULT 'medium'
                    CHECK (priority IN ('low', 'medium', 'high')),
                created_at TEXT NOT NULL DEFAULT ({SQL_NOW}),
                updated_at TEXT NOT NULL DEFAULT ({SQL_NOW})
            );

            CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status);
            CREATE INDEX IF NOT EXISTS idx_tasks_priority ON tasks(priority);
            CREATE INDEX IF NOT EXISTS idx_tasks_created_at ON tasks(created_at);
            "
        ))?;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Parse a task from a row selected with [`TASK_COLUMNS`].
    fn parse_task(row: &rusqlite::Row) -> rusqlite::Result<Task> {
        let status_str: String = row.get(3)?;
        let priority_str: String = row.get(4)?;

        Ok(Task {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            status: status_str.parse().map_err(|e| conversion_error(3, e))?,
            priority: priority_str.parse().map_err(|e| conversion_error(4, e))?,
            created_at: parse_timestamp(row, 5)?,
            updated_at: parse_timestamp(row, 6)?,
        })
    }
}

fn parse_timestamp(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&text, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| conversion_error(idx, e))
}

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

impl TaskStore for SqliteTaskStore {
    fn insert(&self, task: &NewTask) -> Result<TaskId> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO tasks (title, description, status, priority) VALUES (?1, ?2, ?3, ?4)",
            params![task.title, task.description, task.status.as_str(), task.priority.as_str()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn fetch_one(&self, id: TaskId) -> Result<Option<Task>> {
        let conn = self.lock();
        let task = conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                Self::parse_task,
            )
            .optional()?;
        Ok(task)
    }

    fn fetch_many(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let mut conditions = Vec::new();
        let mut params_vec: Vec<&dyn rusqlite::ToSql> = Vec::new();

        let status = filter.status.map(|s| s.as_str());
        if let Some(ref status) = status {
            conditions.push("status = ?");
            params_vec.push(status);
        }

        let priority = filter.priority.map(|p| p.as_str());
        if let Some(ref priority) = priority {
            conditions.push("priority = ?");
            params_vec.push(priority);
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks {where_clause} ORDER BY created_at DESC, id DESC"
        );

        let conn = self.lock();
        let mut stmt = conn.prepare(&sql)?;
        let tasks = stmt
            .query_map(params_vec.as_slice(), Self::parse_task)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(tasks)
    }

    fn mutate(&self, id: TaskId, changes: &TaskChanges) -> Result<usize> {
        if changes.is_empty() {
            return Ok(0);
        }

        // Build dynamic UPDATE statement
        let updated_at = format!("updated_at = {SQL_NOW}");
        let mut updates = vec![updated_at.as_str()];
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref title) = changes.title {
            updates.push("title = ?");
            values.push(Box::new(title.clone()));
        }
        if let Some(ref description) = changes.description {
            updates.push("description = ?");
            values.push(Box::new(description.clone()));
        }
        if let Some(status) = changes.status {
            updates.push("status = ?");
            values.push(Box::new(status.as_str()));
        }
        if let Some(priority) = changes.priority {
            updates.push("priority = ?");
            values.push(Box::new(priority.as_str()));
        }

        values.push(Box::new(id));

        let sql = format!("UPDATE tasks SET {} WHERE id = ?", updates.join(", "));
        let params: Vec<&dyn rusqlite::ToSql> = values.iter().map(AsRef::as_ref).collect();

        let rows = self.lock().execute(&sql, params.as_slice())?;
        Ok(rows)
    }

    fn remove(&self, id: TaskId) -> Result<usize> {
        let rows = self.lock().execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        Ok(rows)
    }

    fn count_by_status(&self) -> Result<BTreeMap<Status, u64>> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM tasks GROUP BY status")?;
        let rows = stmt.query_map([], |row| {
            let status: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            let status = status.parse::<Status>().map_err(|e| conversion_error(0, e))?;
            Ok((status, u64::try_from(count).unwrap_or(0)))
        })?;

        let mut counts = BTreeMap::new();
        for row in rows {
            let (status, count) = row?;
            counts.insert(status, count);
        }
        Ok(counts)
    }
}
