//! Task lifecycle service.
//!
//! All validation and transition rules live here. Storage is injected as a
//! [`TaskStore`] and is only asked to persist already-validated values.

use crate::error::{Error, Result};
use crate::tasks::models::{
    normalize_description, title_errors, Priority, Status, Task, TaskDraft, TaskFields, TaskId,
};
use crate::tasks::store::{TaskChanges, TaskFilter, TaskStore};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// A sparse update. `None` means "leave unchanged".
///
/// An explicit empty `description` is a change: it clears the description.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct TaskPatch {
    /// New title, untrimmed.
    pub title: Option<String>,
    /// New description; `Some(None)` clears it.
    #[serde(default, deserialize_with = "present_or_null")]
    pub description: Option<Option<String>>,
    /// New status text in any case.
    pub status: Option<String>,
    /// New priority text in any case.
    pub priority: Option<String>,
}

/// Keeps an explicit JSON `null` distinct from an absent key.
fn present_or_null<'de, D>(deserializer: D) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Validated task operations over a task store.
#[derive(Debug)]
pub struct TaskService<S: TaskStore> {
    store: S,
}

impl<S: TaskStore> TaskService<S> {
    /// Create a service that owns the given store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Give back the underlying store, e.g. to close it.
    pub fn into_store(self) -> S {
        self.store
    }

    /// List tasks matching the filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let tasks = self.store.fetch_many(filter)?;
        debug!(
            status = ?filter.status,
            priority = ?filter.priority,
            count = tasks.len(),
            "listed tasks"
        );
        Ok(tasks)
    }

    /// Get one task.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no task has this ID.
    pub fn get_task(&self, id: TaskId) -> Result<Task> {
        self.store.fetch_one(id)?.ok_or(Error::NotFound(id))
    }

    /// Create a task from raw fields.
    ///
    /// Absent status and priority default to `todo` and `medium`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the title is missing or blank, or if
    /// any field fails validation.
    pub fn create_task(&self, fields: TaskFields) -> Result<Task> {
        if fields.title.as_deref().map_or(true, |t| t.trim().is_empty()) {
            return Err(Error::InvalidInput("must have task details: title is required".into()));
        }

        let record = TaskDraft::from_fields(fields).to_record()?;
        let id = self.store.insert(&record)?;
        info!(task_id = id, status = %record.status, priority = %record.priority, "task created");

        self.get_task(id)
    }

    /// Apply a partial update.
    ///
    /// Status may be set to any value here; only [`Self::advance_status`]
    /// enforces board order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if a present field is invalid or the
    /// patch is empty, and [`Error::NotFound`] if no task has this ID.
    pub fn update_task(&self, id: TaskId, patch: TaskPatch) -> Result<Task> {
        let changes = validate_patch(patch)?;
        if changes.is_empty() {
            return Err(Error::InvalidInput("nothing to update".into()));
        }

        if self.store.mutate(id, &changes)? == 0 {
            return Err(Error::NotFound(id));
        }
        info!(task_id = id, status = ?changes.status, "task updated");

        self.get_task(id)
    }

    /// Permanently delete a task.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no task has this ID.
    pub fn delete_task(&self, id: TaskId) -> Result<()> {
        if self.store.remove(id)? == 0 {
            return Err(Error::NotFound(id));
        }
        info!(task_id = id, "task deleted");
        Ok(())
    }

    /// Count tasks per status. Statuses with no tasks are absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn get_statistics(&self) -> Result<BTreeMap<Status, u64>> {
        self.store.count_by_status()
    }

    /// Move a task one step along `todo -> doing -> done`.
    ///
    /// The read and the write are separate store calls; a concurrent update
    /// in between is overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no task has this ID and
    /// [`Error::InvalidState`] if the task is already `done`.
    pub fn advance_status(&self, id: TaskId) -> Result<Task> {
        let task = self.get_task(id)?;
        let Some(next) = task.status.next() else {
            return Err(Error::InvalidState(format!("task {id} is already complete")));
        };
        debug!(task_id = id, from = %task.status, to = %next, "advancing task");

        self.update_task(
            id,
            TaskPatch { status: Some(next.as_str().to_string()), ..TaskPatch::default() },
        )
    }
}

/// Turn a raw patch into typed changes, checking each present field.
fn validate_patch(patch: TaskPatch) -> Result<TaskChanges> {
    let title = match patch.title {
        Some(title) => {
            let errors = title_errors(&title);
            if !errors.is_empty() {
                return Err(Error::InvalidInput(errors.join("; ")));
            }
            Some(title.trim().to_string())
        }
        None => None,
    };

    let status = patch
        .status
        .map(|s| s.parse::<Status>())
        .transpose()
        .map_err(|e| Error::InvalidInput(e.to_string()))?;

    let priority = patch
        .priority
        .map(|p| p.parse::<Priority>())
        .transpose()
        .map_err(|e| Error::InvalidInput(e.to_string()))?;

    let description =
        patch.description.map(|d| d.as_deref().and_then(normalize_description));

    Ok(TaskChanges { title, description, status, priority })
}
