//! Task board core.
//!
//! This module provides:
//! - Tasks with title, description, status (`todo`, `doing`, `done`) and priority
//! - A validator that normalizes raw input before anything is stored
//! - A [`TaskStore`] abstraction with a `SQLite` implementation
//! - [`TaskService`], which owns every lifecycle rule
//!
//! # Example
//!
//! ```no_run
//! use taskboard::tasks::{SqliteTaskStore, TaskFields, TaskService};
//!
//! let service = TaskService::new(SqliteTaskStore::open("/tmp/tasks.sqlite3").unwrap());
//!
//! let task = service
//!     .create_task(TaskFields { title: Some("Fix login bug".into()), ..TaskFields::default() })
//!     .unwrap();
//!
//! // todo -> doing
//! let task = service.advance_status(task.id).unwrap();
//! println!("{} is now {}", task.title, task.status);
//! ```

pub mod models;
pub mod service;
pub mod store;

pub use models::{
    InvalidPriority, InvalidStatus, NewTask, Priority, Status, Task, TaskDraft, TaskFields, TaskId,
    ValidationReport,
};
pub use service::{TaskPatch, TaskService};
pub use store::{SqliteTaskStore, TaskChanges, TaskFilter, TaskStore};
