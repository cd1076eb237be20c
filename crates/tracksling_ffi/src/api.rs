//! FFI request surface for the board UI.
//!
//! # Responsibility
//! - Expose one sync entry point per board mutation.
//! - Return the full resulting state as pretty JSON in a stable envelope.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every call re-reads the state file; nothing is cached except the path.
//! - The host runs file dialogs; `None` paths mean the user cancelled.

use log::error;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracksling_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    BoardStore, NewBoard, State, StoreConfig, StoreError, StoreResult, TransferOutcome,
    WidgetPreset,
};

static DATA_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Pins the state file location for this process.
///
/// # FFI contract
/// - Must be called before the first board call to take effect.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_data_path(path: String) -> String {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return "data path cannot be empty".to_string();
    }
    let requested = PathBuf::from(trimmed);
    let active = DATA_PATH.get_or_init(|| requested.clone());
    if *active == requested {
        String::new()
    } else {
        format!(
            "data path already set to `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        )
    }
}

/// Full-state response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateResponse {
    /// Whether the state could be read and persisted.
    pub ok: bool,
    /// Pretty JSON of the resulting state; empty when `ok` is false.
    pub state_json: String,
    /// Empty on success, diagnostic text otherwise.
    pub message: String,
}

/// Import/export response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferResponse {
    pub ok: bool,
    pub canceled: bool,
    pub message: Option<String>,
    pub path: Option<String>,
    pub state_json: Option<String>,
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_get_state() -> StateResponse {
    respond("get_state", |store| store.load())
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_create(
    name: Option<String>,
    description: Option<String>,
    use_custom_colors: bool,
    border_color: Option<String>,
    fill_color: Option<String>,
) -> StateResponse {
    let request = NewBoard {
        name,
        description,
        use_custom_colors,
        border_color,
        fill_color,
    };
    respond("create_board", |store| store.create_board(&request))
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_set_active(board_id: String) -> StateResponse {
    respond("set_active_board", |store| store.set_active_board(&board_id))
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_delete(board_id: String) -> StateResponse {
    respond("delete_board", |store| store.delete_board(&board_id))
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_update_name(board_id: String, name: Option<String>) -> StateResponse {
    respond("update_board_name", |store| {
        store.update_board_name(&board_id, name.as_deref())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_update_color(board_id: String, color: Option<String>) -> StateResponse {
    respond("update_board_color", |store| {
        store.update_board_color(&board_id, color.as_deref())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_update_fill_color(board_id: String, color: Option<String>) -> StateResponse {
    respond("update_board_fill_color", |store| {
        store.update_board_fill_color(&board_id, color.as_deref())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_add_column(board_id: String, label: Option<String>) -> StateResponse {
    respond("add_column", |store| {
        store.add_column(&board_id, label.as_deref())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_add_row(board_id: String, label: Option<String>) -> StateResponse {
    respond("add_row", |store| store.add_row(&board_id, label.as_deref()))
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_update_cell(
    board_id: String,
    row_id: String,
    column_id: String,
    value: Option<String>,
) -> StateResponse {
    respond("update_cell", |store| {
        store.update_cell(&board_id, &row_id, &column_id, value.as_deref())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_rename_row(board_id: String, row_id: String, label: Option<String>) -> StateResponse {
    respond("rename_row", |store| {
        store.rename_row(&board_id, &row_id, label.as_deref())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_delete_row(board_id: String, row_id: String) -> StateResponse {
    respond("delete_row", |store| store.delete_row(&board_id, &row_id))
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_rename_column(
    board_id: String,
    column_id: String,
    label: Option<String>,
) -> StateResponse {
    respond("rename_column", |store| {
        store.rename_column(&board_id, &column_id, label.as_deref())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_delete_column(board_id: String, column_id: String) -> StateResponse {
    respond("delete_column", |store| {
        store.delete_column(&board_id, &column_id)
    })
}

/// Adds a widget from a JSON preset (`{ "title", "type", "values" }`).
///
/// Unparsable preset text is treated as an empty preset.
#[flutter_rust_bridge::frb(sync)]
pub fn board_add_widget_preset(board_id: String, preset_json: String) -> StateResponse {
    let preset = serde_json::from_str::<serde_json::Value>(&preset_json)
        .map(|value| WidgetPreset::from_value(&value))
        .unwrap_or_default();
    respond("add_widget_preset", |store| {
        store.add_widget_preset(&board_id, &preset)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_rename_widget(
    board_id: String,
    widget_id: String,
    title: Option<String>,
) -> StateResponse {
    respond("rename_widget", |store| {
        store.rename_widget(&board_id, &widget_id, title.as_deref())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_delete_widget(board_id: String, widget_id: String) -> StateResponse {
    respond("delete_widget", |store| {
        store.delete_widget(&board_id, &widget_id)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_move_widget(board_id: String, from_index: i64, to_index: i64) -> StateResponse {
    respond("move_widget", |store| {
        store.move_widget(&board_id, from_index, to_index)
    })
}

/// Exports the state to the path the host's save dialog returned.
#[flutter_rust_bridge::frb(sync)]
pub fn board_export_json(destination: Option<String>) -> TransferResponse {
    let destination = destination.map(PathBuf::from);
    transfer("export_json", |store| store.export_to(destination.as_deref()))
}

/// Imports the file the host's open dialog returned.
#[flutter_rust_bridge::frb(sync)]
pub fn board_import_json(source: Option<String>) -> TransferResponse {
    let source = source.map(PathBuf::from);
    transfer("import_json", |store| store.import_from(source.as_deref()))
}

fn resolve_store() -> BoardStore {
    let path = DATA_PATH.get_or_init(|| StoreConfig::from_env().data_path);
    BoardStore::new(StoreConfig::new(path.clone()))
}

fn respond(op: &str, f: impl FnOnce(&BoardStore) -> StoreResult<State>) -> StateResponse {
    let result = f(&resolve_store())
        .and_then(|state| serde_json::to_string_pretty(&state).map_err(StoreError::from));
    match result {
        Ok(state_json) => StateResponse {
            ok: true,
            state_json,
            message: String::new(),
        },
        Err(err) => {
            error!("event=ffi_call module=ffi op={op} status=error error={err}");
            StateResponse {
                ok: false,
                state_json: String::new(),
                message: format!("{op} failed: {err}"),
            }
        }
    }
}

fn transfer(
    op: &str,
    f: impl FnOnce(&BoardStore) -> StoreResult<TransferOutcome>,
) -> TransferResponse {
    transfer_response(op, f(&resolve_store()))
}

fn transfer_response(op: &str, result: StoreResult<TransferOutcome>) -> TransferResponse {
    let result = result.and_then(|outcome| {
        let state_json = outcome
            .state
            .as_ref()
            .map(serde_json::to_string_pretty)
            .transpose()?;
        Ok((outcome, state_json))
    });
    match result {
        Ok((outcome, state_json)) => TransferResponse {
            ok: outcome.ok,
            canceled: outcome.canceled,
            message: outcome.message,
            path: outcome.path.map(|path| path.display().to_string()),
            state_json,
        },
        Err(err) => {
            error!("event=ffi_call module=ffi op={op} status=error error={err}");
            TransferResponse {
                ok: false,
                canceled: false,
                message: Some(format!("{op} failed: {err}")),
                path: None,
                state_json: None,
            }
        }
    }
}
