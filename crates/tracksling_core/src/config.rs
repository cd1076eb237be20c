//! Store configuration.
//!
//! # Responsibility
//! - Resolve the persisted state file location once, outside the store.
//!
//! # Invariants
//! - An explicit `TRACKSLING_DATA_PATH` always wins over profile defaults.

use std::path::{Path, PathBuf};

/// Environment variable overriding the persisted file location.
pub const DATA_PATH_ENV: &str = "TRACKSLING_DATA_PATH";
/// File name of the persisted state inside the profile directory.
pub const DATA_FILE_NAME: &str = "tracksling-data.json";
const APP_DIR_NAME: &str = "tracksling";

/// Configuration injected into `BoardStore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Absolute or relative path of the persisted JSON file.
    pub data_path: PathBuf,
}

impl StoreConfig {
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
        }
    }

    /// Resolves configuration from the environment.
    ///
    /// Order:
    /// - `TRACKSLING_DATA_PATH` when set and non-blank.
    /// - `<user data dir>/tracksling/tracksling-data.json`.
    /// - `<temp dir>/tracksling/tracksling-data.json` when no profile dir exists.
    pub fn from_env() -> Self {
        if let Ok(raw) = std::env::var(DATA_PATH_ENV) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Self::new(trimmed);
            }
        }
        Self::in_profile_dir(dirs::data_dir().as_deref())
    }

    fn in_profile_dir(profile_dir: Option<&Path>) -> Self {
        let base = profile_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(std::env::temp_dir);
        Self::new(base.join(APP_DIR_NAME).join(DATA_FILE_NAME))
    }
}
