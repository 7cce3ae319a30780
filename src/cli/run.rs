//! Command execution.

use super::{Cli, Command};
use crate::error::Error;
use crate::paths;
use crate::tasks::{SqliteTaskStore, TaskFields, TaskFilter, TaskPatch, TaskService, TaskStore};
use serde::Serialize;
use std::process::ExitCode;

/// Output from running the CLI, with separate stdout and stderr messages.
#[derive(Debug)]
pub struct CliOutput {
    /// Exit code for the process.
    pub exit_code: ExitCode,
    /// Messages to print to stdout.
    pub stdout: Vec<String>,
    /// Messages to print to stderr.
    pub stderr: Vec<String>,
}

/// Open the configured database and run one command against it.
pub fn run(cli: Cli) -> CliOutput {
    let db_path = cli.db.unwrap_or_else(paths::default_db_path);
    let store = match SqliteTaskStore::open(&db_path) {
        Ok(store) => store,
        Err(e) => return error_output(&e),
    };

    let service = TaskService::new(store);
    let output = execute(&service, cli.command);

    if let Err(e) = service.into_store().close() {
        return error_output(&e);
    }
    output
}

/// Run one command against an existing service.
pub fn execute<S: TaskStore>(service: &TaskService<S>, command: Command) -> CliOutput {
    match command {
        Command::List { status, priority } => {
            match TaskFilter::parse(status.as_deref(), priority.as_deref())
                .and_then(|filter| service.list_tasks(&filter))
            {
                Ok(tasks) => json_output(&tasks),
                Err(e) => error_output(&e),
            }
        }
        Command::Get { id } => result_output(service.get_task(id)),
        Command::Create { title, description, status, priority } => {
            result_output(service.create_task(TaskFields {
                title: Some(title),
                description,
                status,
                priority,
            }))
        }
        Command::Update { id, title, description, clear_description, status, priority } => {
            let description = if clear_description { Some(None) } else { description.map(Some) };
            result_output(service.update_task(id, TaskPatch { title, description, status, priority }))
        }
        Command::Delete { id } => match service.delete_task(id) {
            Ok(()) => success_output(format!("Deleted task {id}")),
            Err(e) => error_output(&e),
        },
        Command::Next { id } => result_output(service.advance_status(id)),
        Command::Stats => result_output(service.get_statistics()),
    }
}

fn result_output<T: Serialize>(result: crate::error::Result<T>) -> CliOutput {
    match result {
        Ok(value) => json_output(&value),
        Err(e) => error_output(&e),
    }
}

fn json_output<T: Serialize>(value: &T) -> CliOutput {
    match serde_json::to_string_pretty(value) {
        Ok(json) => CliOutput { exit_code: ExitCode::SUCCESS, stdout: vec![json], stderr: vec![] },
        Err(e) => error_output(&Error::from(e)),
    }
}

fn success_output(message: String) -> CliOutput {
    CliOutput { exit_code: ExitCode::SUCCESS, stdout: vec![message], stderr: vec![] }
}

fn error_output(err: &Error) -> CliOutput {
    CliOutput { exit_code: ExitCode::from(1), stdout: vec![], stderr: vec![format!("Error: {err}")] }
}
