//! Task model types and the field validator.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Storage-assigned task identifier.
pub type TaskId = i64;

/// Minimum title length, in characters, after trimming.
pub const TITLE_MIN_CHARS: usize = 3;

/// Maximum title length, in characters, after trimming.
pub const TITLE_MAX_CHARS: usize = 100;

/// Workflow state of a task.
///
/// Variants are declared in board order, so `Ord` follows `todo < doing < done`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Not started.
    #[default]
    Todo,
    /// In progress.
    Doing,
    /// Finished. Terminal for [`Status::next`].
    Done,
}

impl Status {
    /// All statuses in board order.
    pub const ALL: [Self; 3] = [Self::Todo, Self::Doing, Self::Done];

    /// Get the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::Doing => "doing",
            Self::Done => "done",
        }
    }

    /// The status that follows this one, or `None` if this is the last.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Todo => Some(Self::Doing),
            Self::Doing => Some(Self::Done),
            Self::Done => None,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = InvalidStatus;

    /// Parses after trimming and lowercasing, so `" Doing "` is accepted.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "todo" => Ok(Self::Todo),
            "doing" => Ok(Self::Doing),
            "done" => Ok(Self::Done),
            _ => Err(InvalidStatus(s.to_string())),
        }
    }
}

/// Error when an invalid status string is provided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidStatus(pub String);

impl std::fmt::Display for InvalidStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid status: '{}' (must be one of: todo, doing, done)", self.0)
    }
}

impl std::error::Error for InvalidStatus {}

/// Task priority.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Low priority.
    Low,
    /// Medium priority (default).
    #[default]
    Medium,
    /// High priority.
    High,
}

impl Priority {
    /// Get the string representation of the priority.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = InvalidPriority;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(InvalidPriority(s.to_string())),
        }
    }
}

/// Error when an invalid priority string is provided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPriority(pub String);

impl std::fmt::Display for InvalidPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid priority: '{}' (must be one of: low, medium, high)", self.0)
    }
}

impl std::error::Error for InvalidPriority {}

/// A persisted task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Storage-assigned identifier.
    pub id: TaskId,
    /// Short title, 3-100 characters.
    pub title: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Current workflow state.
    pub status: Status,
    /// Priority level.
    pub priority: Priority,
    /// When storage created the row.
    pub created_at: DateTime<Utc>,
    /// When storage last modified the row.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Check if the task has reached the terminal status.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status.next().is_none()
    }
}

/// Raw, caller-supplied task fields. Any of them may be absent.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct TaskFields {
    /// Title text, untrimmed.
    pub title: Option<String>,
    /// Description text, untrimmed.
    pub description: Option<String>,
    /// Status text in any case, possibly padded.
    pub status: Option<String>,
    /// Priority text in any case, possibly padded.
    pub priority: Option<String>,
}

/// A task that has not been stored yet, with defaults applied.
///
/// `status` and `priority` are kept as normalized text so that an unknown
/// value survives until [`TaskDraft::validate`] reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    /// Title as supplied; empty when absent.
    pub title: String,
    /// Description as supplied; empty when absent.
    pub description: String,
    /// Trimmed, lowercased status; `todo` when absent.
    pub status: String,
    /// Trimmed, lowercased priority; `medium` when absent.
    pub priority: String,
}

/// Outcome of [`TaskDraft::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// True when `errors` is empty.
    pub valid: bool,
    /// Human-readable problems, in check order.
    pub errors: Vec<String>,
}

/// The exact field set written by an insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Trimmed title.
    pub title: String,
    /// Trimmed description, `None` when blank.
    pub description: Option<String>,
    /// Status.
    pub status: Status,
    /// Priority.
    pub priority: Priority,
}

impl TaskDraft {
    /// Build a draft from raw fields, filling defaults and normalizing enums.
    #[must_use]
    pub fn from_fields(fields: TaskFields) -> Self {
        Self {
            title: fields.title.unwrap_or_default(),
            description: fields.description.unwrap_or_default(),
            status: normalize_enum_text(fields.status.as_deref(), Status::default().as_str()),
            priority: normalize_enum_text(fields.priority.as_deref(), Priority::default().as_str()),
        }
    }

    /// Check every rule and collect all failures.
    #[must_use]
    pub fn validate(&self) -> ValidationReport {
        let mut errors = title_errors(&self.title);
        if let Err(e) = self.status.parse::<Status>() {
            errors.push(e.to_string());
        }
        if let Err(e) = self.priority.parse::<Priority>() {
            errors.push(e.to_string());
        }
        ValidationReport { valid: errors.is_empty(), errors }
    }

    /// Produce the record to persist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] listing every failed rule if the draft
    /// is not valid.
    pub fn to_record(&self) -> Result<NewTask> {
        let report = self.validate();
        if !report.valid {
            return Err(Error::InvalidInput(report.errors.join("; ")));
        }

        // Both parses succeeded inside validate().
        let status = self.status.parse::<Status>().unwrap_or_default();
        let priority = self.priority.parse::<Priority>().unwrap_or_default();

        Ok(NewTask {
            title: self.title.trim().to_string(),
            description: normalize_description(&self.description),
            status,
            priority,
        })
    }
}

/// Title rule violations, in check order. Empty when the title is acceptable.
#[must_use]
pub fn title_errors(title: &str) -> Vec<String> {
    let len = title.trim().chars().count();
    let mut errors = Vec::new();
    if len < TITLE_MIN_CHARS {
        errors.push(format!("title must be at least {TITLE_MIN_CHARS} characters"));
    }
    if len > TITLE_MAX_CHARS {
        errors.push(format!("title must be at most {TITLE_MAX_CHARS} characters"));
    }
    errors
}

/// Trim a description, mapping blank text to `None`.
#[must_use]
pub fn normalize_description(description: &str) -> Option<String> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn normalize_enum_text(value: Option<&str>, default: &str) -> String {
    match value {
        Some(v) => v.trim().to_lowercase(),
        None => default.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn fields(title: &str, status: Option<&str>, priority: Option<&str>) -> TaskFields {
        TaskFields {
            title: Some(title.to_string()),
            description: None,
            status: status.map(str::to_string),
            priority: priority.map(str::to_string),
        }
    }

    #[test]
    fn test_status_parse_normalizes() {
        assert_eq!(" DOING ".parse::<Status>().unwrap(), Status::Doing);
        assert_eq!("todo".parse::<Status>().unwrap(), Status::Todo);
        assert!("open".parse::<Status>().is_err());
    }

    #[test]
    fn test_priority_parse_normalizes() {
        assert_eq!("High\n".parse::<Priority>().unwrap(), Priority::High);
        assert!("critical".parse::<Priority>().is_err());
    }

    #[test]
    fn test_status_next_is_linear() {
        assert_eq!(Status::Todo.next(), Some(Status::Doing));
        assert_eq!(Status::Doing.next(), Some(Status::Done));
        assert_eq!(Status::Done.next(), None);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Status::Doing).unwrap(), "\"doing\"");
        assert_eq!(serde_json::to_string(&Priority::Low).unwrap(), "\"low\"");
    }

    #[test]
    fn test_invalid_status_display() {
        let err = InvalidStatus("bogus".to_string());
        assert_eq!(err.to_string(), "invalid status: 'bogus' (must be one of: todo, doing, done)");
    }

    #[test]
    fn test_draft_fills_defaults() {
        let draft = TaskDraft::from_fields(TaskFields::default());
        assert_eq!(draft.title, "");
        assert_eq!(draft.description, "");
        assert_eq!(draft.status, "todo");
        assert_eq!(draft.priority, "medium");
    }

    #[test]
    fn test_draft_normalizes_enum_text() {
        let draft = TaskDraft::from_fields(fields("Title", Some("  DONE "), Some("HiGh")));
        assert_eq!(draft.status, "done");
        assert_eq!(draft.priority, "high");
    }

    #[test]
    fn test_missing_title_is_a_failure_not_a_crash() {
        let report = TaskDraft::from_fields(TaskFields::default()).validate();
        assert!(!report.valid);
        assert_eq!(report.errors, vec!["title must be at least 3 characters".to_string()]);
    }

    #[test]
    fn test_short_title_rejected_by_validator() {
        let report = TaskDraft::from_fields(fields("ab", Some("todo"), Some("low"))).validate();
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn test_title_length_counts_trimmed_characters() {
        let padded = format!("   {}   ", "x".repeat(TITLE_MAX_CHARS));
        assert!(title_errors(&padded).is_empty());
        assert!(title_errors("  ab  ").len() == 1);
        assert_eq!(title_errors(&"é".repeat(TITLE_MAX_CHARS)), Vec::<String>::new());
    }

    #[test]
    fn test_all_checks_are_evaluated_in_order() {
        let long = "x".repeat(TITLE_MAX_CHARS + 1);
        let report = TaskDraft::from_fields(fields(&long, Some("bogus"), Some("urgent"))).validate();
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 3);
        assert!(report.errors[0].contains("at most"));
        assert!(report.errors[1].contains("status"));
        assert!(report.errors[2].contains("priority"));
    }

    #[test]
    fn test_to_record_trims_and_nulls_blank_description() {
        let draft = TaskDraft::from_fields(TaskFields {
            title: Some("  Write docs  ".to_string()),
            description: Some("   ".to_string()),
            status: Some("Doing".to_string()),
            priority: None,
        });
        let record = draft.to_record().unwrap();
        assert_eq!(record.title, "Write docs");
        assert_eq!(record.description, None);
        assert_eq!(record.status, Status::Doing);
        assert_eq!(record.priority, Priority::Medium);
    }

    #[test]
    fn test_to_record_rejects_invalid_draft() {
        let draft = TaskDraft::from_fields(fields("Valid Title", Some("bogus"), None));
        let err = draft.to_record().unwrap_err();
        assert!(matches!(err, Error::InvalidInput(ref msg) if msg.contains("status")));
    }

    fn status_spelling() -> impl Strategy<Value = (String, Status)> {
        prop::sample::select(vec![
            ("todo", Status::Todo),
            (" TODO", Status::Todo),
            ("Doing", Status::Doing),
            ("doing\t", Status::Doing),
            ("DONE ", Status::Done),
        ])
        .prop_map(|(s, v)| (s.to_string(), v))
    }

    fn priority_spelling() -> impl Strategy<Value = (String, Priority)> {
        prop::sample::select(vec![
            ("low", Priority::Low),
            ("LOW ", Priority::Low),
            (" Medium", Priority::Medium),
            ("high", Priority::High),
            ("HIGH", Priority::High),
        ])
        .prop_map(|(s, v)| (s.to_string(), v))
    }

    proptest! {
        #[test]
        fn prop_valid_fields_produce_normalized_record(
            title in "[a-z][a-z0-9 ]{1,97}[a-z]",
            (status_text, status) in status_spelling(),
            (priority_text, priority) in priority_spelling(),
        ) {
            let draft = TaskDraft::from_fields(fields(&title, Some(&status_text), Some(&priority_text)));
            let report = draft.validate();
            prop_assert!(report.valid, "{:?}", report.errors);
            let record = draft.to_record().unwrap();
            prop_assert_eq!(record.status, status);
            prop_assert_eq!(record.priority, priority);
            prop_assert_eq!(record.title, title.trim().to_string());
        }

        #[test]
        fn prop_overlong_titles_rejected(extra in 1usize..50) {
            let title = "t".repeat(TITLE_MAX_CHARS + extra);
            prop_assert_eq!(title_errors(&title).len(), 1);
        }
    }
}
