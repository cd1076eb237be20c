//! JSON import/export through a file-dialog collaborator.
//!
//! # Responsibility
//! - Ask the host for a destination/source path and report cancellation
//!   distinctly from success or failure.
//! - Validate imported content before it replaces the persisted state.
//!
//! # Invariants
//! - A rejected or cancelled import never touches the persisted file.
//! - Export writes the current state verbatim.

use super::board_store::{write_pretty_json, BoardStore};
use super::StoreResult;
use crate::model::board::State;
use crate::normalize::{has_boards_array, normalize_value};
use log::{info, warn};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Suggested file name for exports.
pub const EXPORT_DEFAULT_FILE_NAME: &str = "tracksling-export.json";
const EXPORT_DIALOG_TITLE: &str = "Exporter Tracksling en JSON";
const IMPORT_DIALOG_TITLE: &str = "Importer un fichier JSON";
const IMPORT_INVALID_FORMAT: &str = "Format invalide";
const IMPORT_FAILED: &str = "Import impossible";

/// Extension filter shown by a file dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFilter {
    pub name: &'static str,
    pub extensions: &'static [&'static str],
}

const JSON_FILTER: FileFilter = FileFilter {
    name: "JSON",
    extensions: &["json"],
};

/// Parameters of a save-file interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveDialogRequest {
    pub title: &'static str,
    pub default_file_name: &'static str,
    pub filters: Vec<FileFilter>,
}

/// Parameters of an open-file interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenDialogRequest {
    pub title: &'static str,
    pub filters: Vec<FileFilter>,
}

/// Host-provided file selection.
///
/// Returning `None` means the user declined the dialog.
pub trait FileDialog {
    fn pick_save_path(&self, request: &SaveDialogRequest) -> Option<PathBuf>;
    fn pick_open_path(&self, request: &OpenDialogRequest) -> Option<PathBuf>;
}

/// Result envelope for import/export.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferOutcome {
    pub ok: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub canceled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<State>,
}

impl TransferOutcome {
    fn canceled(state: Option<State>) -> Self {
        Self {
            ok: false,
            canceled: true,
            message: None,
            path: None,
            state,
        }
    }

    fn failure(message: impl Into<String>, state: State) -> Self {
        Self {
            ok: false,
            canceled: false,
            message: Some(message.into()),
            path: None,
            state: Some(state),
        }
    }
}

impl BoardStore {
    /// Asks `dialog` for a destination and exports the current state there.
    pub fn export_json(&self, dialog: &dyn FileDialog) -> StoreResult<TransferOutcome> {
        let request = SaveDialogRequest {
            title: EXPORT_DIALOG_TITLE,
            default_file_name: EXPORT_DEFAULT_FILE_NAME,
            filters: vec![JSON_FILTER],
        };
        let destination = dialog.pick_save_path(&request);
        self.export_to(destination.as_deref())
    }

    /// Exports the current state to `destination`; `None` means cancelled.
    ///
    /// # Errors
    /// - Returns an error when the export file cannot be written.
    pub fn export_to(&self, destination: Option<&Path>) -> StoreResult<TransferOutcome> {
        let state = self.load()?;
        let Some(destination) = destination.filter(|path| !path.as_os_str().is_empty()) else {
            info!("event=state_export module=store status=skip reason=canceled");
            return Ok(TransferOutcome::canceled(None));
        };

        write_pretty_json(destination, &state)?;
        info!(
            "event=state_export module=store status=ok boards={}",
            state.boards.len()
        );
        Ok(TransferOutcome {
            ok: true,
            canceled: false,
            message: None,
            path: Some(destination.to_path_buf()),
            state: None,
        })
    }

    /// Asks `dialog` for a source file and imports it.
    pub fn import_json(&self, dialog: &dyn FileDialog) -> StoreResult<TransferOutcome> {
        let request = OpenDialogRequest {
            title: IMPORT_DIALOG_TITLE,
            filters: vec![JSON_FILTER],
        };
        let source = dialog.pick_open_path(&request);
        self.import_from(source.as_deref())
    }

    /// Imports `source`, replacing the persisted state on success.
    ///
    /// Cancelled, unreadable or malformed imports leave the store untouched
    /// and carry the current state with a message.
    ///
    /// # Errors
    /// - Returns an error only when persisting fails.
    pub fn import_from(&self, source: Option<&Path>) -> StoreResult<TransferOutcome> {
        let Some(source) = source.filter(|path| !path.as_os_str().is_empty()) else {
            info!("event=state_import module=store status=skip reason=canceled");
            return Ok(TransferOutcome::canceled(Some(self.load()?)));
        };

        let value = match read_json(source) {
            Ok(value) => value,
            Err(message) => {
                warn!("event=state_import module=store status=error error_code=read_failed");
                return Ok(TransferOutcome::failure(message, self.load()?));
            }
        };
        if !has_boards_array(&value) {
            warn!("event=state_import module=store status=error error_code=invalid_format");
            return Ok(TransferOutcome::failure(IMPORT_INVALID_FORMAT, self.load()?));
        }

        let normalized = normalize_value(value);
        if normalized.report.changed() {
            warn!(
                "event=state_normalized module=store status=ok source=import repairs={}",
                normalized.report.repairs.len()
            );
        }
        self.save(&normalized.state)?;
        info!(
            "event=state_import module=store status=ok boards={}",
            normalized.state.boards.len()
        );
        Ok(TransferOutcome {
            ok: true,
            canceled: false,
            message: None,
            path: None,
            state: Some(normalized.state),
        })
    }
}

fn read_json(source: &Path) -> Result<Value, String> {
    let raw = fs::read_to_string(source).map_err(|err| describe(err.to_string()))?;
    serde_json::from_str(&raw).map_err(|err| describe(err.to_string()))
}

fn describe(message: String) -> String {
    if message.trim().is_empty() {
        IMPORT_FAILED.to_string()
    } else {
        message
    }
}
