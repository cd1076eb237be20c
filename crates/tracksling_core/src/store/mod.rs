//! JSON file persistence and board mutations.
//!
//! # Responsibility
//! - Load, repair and persist the whole state file.
//! - Expose one entry point per board/grid/widget mutation.
//! - Import and export state through a file-dialog collaborator.
//!
//! # Invariants
//! - Every entry point re-reads the file; no state is cached between calls.
//! - Unknown ids are no-ops that still return the current state.
//! - Only disk writes surface as errors.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod board_store;
pub mod transfer;

pub use board_store::{BoardStore, NewBoard, WidgetPreset};
pub use transfer::{FileDialog, FileFilter, OpenDialogRequest, SaveDialogRequest, TransferOutcome};

pub type StoreResult<T> = Result<T, StoreError>;

/// Failures that escape the store.
#[derive(Debug)]
pub enum StoreError {
    /// Writing the state (or an export) to disk failed.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// State could not be encoded as JSON.
    Serialize(serde_json::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to write `{}`: {source}", path.display())
            }
            Self::Serialize(err) => write!(f, "failed to encode state: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Serialize(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}
