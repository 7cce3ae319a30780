//! # `taskboard`
//!
//! A task board service: tasks move through `todo -> doing -> done`, are
//! stored in `SQLite` and exposed over a JSON REST API and a CLI.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
#[cfg(feature = "server")]
pub mod http;
pub mod logging;
pub mod paths;
pub mod tasks;

pub use error::{Error, ErrorKind, Result};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
