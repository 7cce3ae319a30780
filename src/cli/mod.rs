//! Command-line interface for the task board.
//!
//! Every command opens the database, performs one service call and prints
//! the result as JSON.

mod run;


pub use run::{execute, run, CliOutput};

use crate::tasks::TaskId;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Task board CLI - manage tasks on a todo/doing/done board.
///
/// ```bash
/// taskboard create "Fix login bug" --priority high
/// taskboard next 1
/// taskboard list --status doing
/// ```
#[derive(Parser, Debug)]
#[command(name = "taskboard")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Database file (defaults to the platform data directory)
    #[arg(long, global = true, env = "DB_PATH")]
    pub db: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Task commands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List tasks, newest first.
    List {
        /// Filter by status: todo, doing, done
        #[arg(short, long)]
        status: Option<String>,

        /// Filter by priority: low, medium, high
        #[arg(short, long)]
        priority: Option<String>,
    },

    /// Show one task.
    Get {
        /// Task ID
        id: TaskId,
    },

    /// Create a task. Status defaults to todo and priority to medium.
    Create {
        /// Title, 3 to 100 characters
        title: String,

        /// Longer description
        #[arg(short, long)]
        description: Option<String>,

        /// Initial status: todo, doing, done
        #[arg(short, long)]
        status: Option<String>,

        /// Priority: low, medium, high
        #[arg(short, long)]
        priority: Option<String>,
    },

    /// Change some fields of a task. Unspecified fields are left alone.
    Update {
        /// Task ID
        id: TaskId,

        /// New title
        #[arg(short, long)]
        title: Option<String>,

        /// New description
        #[arg(short, long, conflicts_with = "clear_description")]
        description: Option<String>,

        /// Remove the description
        #[arg(long)]
        clear_description: bool,

        /// New status: todo, doing, done (any transition is allowed)
        #[arg(short, long)]
        status: Option<String>,

        /// New priority: low, medium, high
        #[arg(short, long)]
        priority: Option<String>,
    },

    /// Delete a task permanently.
    Delete {
        /// Task ID
        id: TaskId,
    },

    /// Move a task one step along todo -> doing -> done.
    Next {
        /// Task ID
        id: TaskId,
    },

    /// Count tasks per status.
    Stats,
}
