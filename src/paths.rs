//! Path utilities for determining data storage locations.
//!
//! The database lives in the platform data directory (for example
//! `~/.local/share/taskboard/` on Linux) unless configured otherwise.

use std::path::{Path, PathBuf};

/// The directory name used under the platform data directory.
const DATA_DIR_NAME: &str = "taskboard";

/// The database filename.
pub const DATABASE_FILENAME: &str = "tasks.sqlite3";

/// Database path used when no data directory can be determined.
const FALLBACK_DB_PATH: &str = "database/tasks.sqlite3";

/// Get the base data directory for taskboard.
///
/// Returns `None` if the platform data directory cannot be determined.
#[must_use]
pub fn data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(DATA_DIR_NAME))
}

/// Get the default database path.
///
/// Falls back to `database/tasks.sqlite3` relative to the working directory
/// when there is no platform data directory.
#[must_use]
pub fn default_db_path() -> PathBuf {
    data_dir().map_or_else(|| PathBuf::from(FALLBACK_DB_PATH), |dir| dir.join(DATABASE_FILENAME))
}

/// Resolve `path` against `base` unless it is already absolute.
#[must_use]
pub fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
