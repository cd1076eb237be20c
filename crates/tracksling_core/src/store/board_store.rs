//! File-backed board store.
//!
//! # Responsibility
//! - Own the persisted file path and the whole-file read/repair/write cycle.
//! - Apply single-board CRUD mutations and return the resulting state.
//!
//! # Invariants
//! - `load` never fails on bad input; it repairs and re-persists instead.
//! - A mutation writes the file only when it changed something.
//! - Widget positions are renumbered after every insert/delete/move.

use super::{StoreError, StoreResult};
use crate::config::StoreConfig;
use crate::model::board::{
    new_id, Board, Column, ExtraFields, Row, State, Widget, DEFAULT_BORDER_COLOR,
    DEFAULT_FILL_COLOR, DEFAULT_WIDGET_KIND, DEFAULT_WIDGET_TITLE,
};
use crate::normalize::{normalize_color, normalize_value, numbers_only};
use log::{debug, error, info, warn};
use serde_json::{Number, Value};
use std::fs;
use std::io::ErrorKind;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Input for `BoardStore::create_board`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewBoard {
    /// Blank or missing names become `Tableau N`.
    pub name: Option<String>,
    pub description: Option<String>,
    /// When `false`, supplied colours are ignored and defaults are used.
    pub use_custom_colors: bool,
    pub border_color: Option<String>,
    pub fill_color: Option<String>,
}

/// Widget template passed to `BoardStore::add_widget_preset`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WidgetPreset {
    pub title: Option<String>,
    pub kind: Option<String>,
    pub values: Option<Vec<Number>>,
}

impl WidgetPreset {
    /// Reads a preset leniently from caller-supplied JSON.
    ///
    /// Non-string `title`/`type` and non-array `values` are treated as absent;
    /// non-numeric entries inside `values` are dropped.
    pub fn from_value(value: &Value) -> Self {
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            title: text("title"),
            kind: text("type"),
            values: value
                .get("values")
                .and_then(Value::as_array)
                .map(|items| numbers_only(items.clone())),
        }
    }

    fn into_widget(self, position: usize) -> Widget {
        Widget {
            id: new_id(),
            title: non_empty(self.title).unwrap_or_else(|| DEFAULT_WIDGET_TITLE.to_string()),
            kind: non_empty(self.kind).unwrap_or_else(|| DEFAULT_WIDGET_KIND.to_string()),
            values: self.values.unwrap_or_else(Widget::default_values),
            position,
            extra: ExtraFields::new(),
        }
    }
}

/// Synchronous read-modify-write store over one JSON file.
#[derive(Debug, Clone)]
pub struct BoardStore {
    config: StoreConfig,
}

impl BoardStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Path of the persisted state file.
    pub fn data_path(&self) -> &Path {
        self.config.data_path.as_path()
    }

    /// Reads, repairs and re-persists the current state.
    ///
    /// - Missing file: default state is created and written.
    /// - Unreadable, unparsable or no `boards` array: default state replaces
    ///   the file. Unparsable content is first copied to `corrupt_backup_path`.
    /// - Otherwise the normalized state is written back.
    ///
    /// # Errors
    /// - Returns an error only when writing the file fails.
    pub fn load(&self) -> StoreResult<State> {
        let path = self.data_path();
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("event=state_load module=store status=ok mode=missing");
                return self.save_default();
            }
            Err(err) => {
                warn!("event=state_load module=store status=error mode=corrupt error={err}");
                return self.save_default();
            }
        };

        let value = match serde_json::from_str::<Value>(&raw) {
            Ok(value) => value,
            Err(err) => {
                error!(
                    "event=state_load module=store status=error mode=corrupt error_code=parse_failed line={} column={}",
                    err.line(),
                    err.column()
                );
                self.keep_corrupt_copy(&raw)?;
                return self.save_default();
            }
        };

        let normalized = normalize_value(value);
        if normalized.report.replaced_with_default {
            error!("event=state_load module=store status=error mode=corrupt error_code=missing_boards");
            self.keep_corrupt_copy(&raw)?;
        } else if normalized.report.changed() {
            warn!(
                "event=state_normalized module=store status=ok repairs={} first={}",
                normalized.report.repairs.len(),
                normalized.report.repairs[0]
            );
        } else {
            debug!("event=state_load module=store status=ok mode=ok");
        }

        self.save(&normalized.state)?;
        Ok(normalized.state)
    }

    /// Where the last unparsable state file is copied before being replaced.
    pub fn corrupt_backup_path(&self) -> PathBuf {
        let path = self.data_path();
        let mut name = path
            .file_name()
            .map(OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".corrupt");
        path.with_file_name(name)
    }

    /// Writes `state` as pretty JSON, creating parent directories.
    ///
    /// # Errors
    /// - Returns an error when encoding or any filesystem step fails.
    pub fn save(&self, state: &State) -> StoreResult<()> {
        write_pretty_json(self.data_path(), state)?;
        debug!(
            "event=state_save module=store status=ok boards={}",
            state.boards.len()
        );
        Ok(())
    }

    /// Appends a board and makes it active.
    pub fn create_board(&self, request: &NewBoard) -> StoreResult<State> {
        self.mutate("create_board", |state| {
            let name = trimmed(request.name.as_deref())
                .unwrap_or_else(|| format!("Tableau {}", state.boards.len() + 1));
            let description = request
                .description
                .as_deref()
                .map(str::trim)
                .unwrap_or_default();
            let (border, fill) = if request.use_custom_colors {
                (
                    normalize_color(request.border_color.as_deref(), DEFAULT_BORDER_COLOR),
                    normalize_color(request.fill_color.as_deref(), DEFAULT_FILL_COLOR),
                )
            } else {
                (
                    DEFAULT_BORDER_COLOR.to_string(),
                    DEFAULT_FILL_COLOR.to_string(),
                )
            };
            let board = Board::new(name, description, border, fill);
            state.active_board_id = Some(board.id.clone());
            state.boards.push(board);
            true
        })
    }

    /// Marks an existing board as active.
    pub fn set_active_board(&self, board_id: &str) -> StoreResult<State> {
        self.mutate("set_active_board", |state| {
            if !state.has_board(board_id) {
                return false;
            }
            state.active_board_id = Some(board_id.to_string());
            true
        })
    }

    /// Removes a board; the active id falls back to the first remaining board.
    pub fn delete_board(&self, board_id: &str) -> StoreResult<State> {
        self.mutate("delete_board", |state| {
            let before = state.boards.len();
            state.boards.retain(|board| board.id != board_id);
            let removed = state.boards.len() != before;
            let repaired = state.repair_active_board();
            removed || repaired
        })
    }

    /// Renames a board; blank names are ignored.
    pub fn update_board_name(&self, board_id: &str, name: Option<&str>) -> StoreResult<State> {
        self.mutate_board("update_board_name", board_id, |board| {
            let Some(name) = trimmed(name) else {
                return false;
            };
            board.name = name;
            true
        })
    }

    /// Sets the border colour; invalid input resets it to the default.
    pub fn update_board_color(&self, board_id: &str, color: Option<&str>) -> StoreResult<State> {
        self.mutate_board("update_board_color", board_id, |board| {
            board.border_color = normalize_color(color, DEFAULT_BORDER_COLOR);
            true
        })
    }

    /// Sets the fill colour; invalid input resets it to the default.
    pub fn update_board_fill_color(
        &self,
        board_id: &str,
        color: Option<&str>,
    ) -> StoreResult<State> {
        self.mutate_board("update_board_fill_color", board_id, |board| {
            board.fill_color = normalize_color(color, DEFAULT_FILL_COLOR);
            true
        })
    }

    /// Appends a column and backfills an empty cell in every row.
    pub fn add_column(&self, board_id: &str, label: Option<&str>) -> StoreResult<State> {
        self.mutate_board("add_column", board_id, |board| {
            let label =
                trimmed(label).unwrap_or_else(|| format!("Colonne {}", board.columns.len() + 1));
            board.columns.push(Column::new(label));
            board.backfill_cells();
            true
        })
    }

    /// Appends a row with one empty cell per column.
    pub fn add_row(&self, board_id: &str, label: Option<&str>) -> StoreResult<State> {
        self.mutate_board("add_row", board_id, |board| {
            let label = trimmed(label).unwrap_or_else(|| format!("Ligne {}", board.rows.len() + 1));
            let row = Row::new(label, &board.columns);
            board.rows.push(row);
            true
        })
    }

    /// Sets one cell; `None` stores an empty string.
    ///
    /// The column id is not checked against the board's columns.
    pub fn update_cell(
        &self,
        board_id: &str,
        row_id: &str,
        column_id: &str,
        value: Option<&str>,
    ) -> StoreResult<State> {
        self.mutate_board("update_cell", board_id, |board| {
            let Some(row) = board.row_mut(row_id) else {
                return false;
            };
            row.cells
                .insert(column_id.to_string(), value.unwrap_or_default().to_string());
            true
        })
    }

    pub fn rename_row(
        &self,
        board_id: &str,
        row_id: &str,
        label: Option<&str>,
    ) -> StoreResult<State> {
        self.mutate_board("rename_row", board_id, |board| {
            match (board.row_mut(row_id), trimmed(label)) {
                (Some(row), Some(label)) => {
                    row.label = label;
                    true
                }
                _ => false,
            }
        })
    }

    pub fn delete_row(&self, board_id: &str, row_id: &str) -> StoreResult<State> {
        self.mutate_board("delete_row", board_id, |board| {
            let before = board.rows.len();
            board.rows.retain(|row| row.id != row_id);
            board.rows.len() != before
        })
    }

    pub fn rename_column(
        &self,
        board_id: &str,
        column_id: &str,
        label: Option<&str>,
    ) -> StoreResult<State> {
        self.mutate_board("rename_column", board_id, |board| {
            match (board.column_mut(column_id), trimmed(label)) {
                (Some(column), Some(label)) => {
                    column.label = label;
                    true
                }
                _ => false,
            }
        })
    }

    /// Removes a column and its key from every row's cells.
    pub fn delete_column(&self, board_id: &str, column_id: &str) -> StoreResult<State> {
        self.mutate_board("delete_column", board_id, |board| {
            let before = board.columns.len();
            board.columns.retain(|column| column.id != column_id);
            let mut changed = board.columns.len() != before;
            for row in &mut board.rows {
                changed |= row.cells.remove(column_id).is_some();
            }
            changed
        })
    }

    /// Appends a widget built from `preset` at the end of the board.
    pub fn add_widget_preset(&self, board_id: &str, preset: &WidgetPreset) -> StoreResult<State> {
        self.mutate_board("add_widget_preset", board_id, |board| {
            let widget = preset.clone().into_widget(board.widgets.len());
            board.widgets.push(widget);
            board.renumber_widgets();
            true
        })
    }

    pub fn rename_widget(
        &self,
        board_id: &str,
        widget_id: &str,
        title: Option<&str>,
    ) -> StoreResult<State> {
        self.mutate_board("rename_widget", board_id, |board| {
            match (board.widget_mut(widget_id), trimmed(title)) {
                (Some(widget), Some(title)) => {
                    widget.title = title;
                    true
                }
                _ => false,
            }
        })
    }

    /// Removes a widget and renumbers the remaining positions.
    pub fn delete_widget(&self, board_id: &str, widget_id: &str) -> StoreResult<State> {
        self.mutate_board("delete_widget", board_id, |board| {
            let before = board.widgets.len();
            board.widgets.retain(|widget| widget.id != widget_id);
            if board.widgets.len() == before {
                return false;
            }
            board.renumber_widgets();
            true
        })
    }

    /// Moves the widget at `from` to index `to`.
    ///
    /// No-op unless both indices are in `[0, count)` and differ.
    pub fn move_widget(&self, board_id: &str, from: i64, to: i64) -> StoreResult<State> {
        self.mutate_board("move_widget", board_id, |board| {
            let count = board.widgets.len();
            let (Some(from), Some(to)) = (widget_slot(from, count), widget_slot(to, count)) else {
                return false;
            };
            if from == to {
                return false;
            }
            let widget = board.widgets.remove(from);
            board.widgets.insert(to, widget);
            board.renumber_widgets();
            true
        })
    }

    /// Text-input variant of `move_widget` for callers holding raw strings.
    ///
    /// Indices that do not parse as whole numbers make the call a no-op.
    pub fn move_widget_str(&self, board_id: &str, from: &str, to: &str) -> StoreResult<State> {
        match (parse_widget_index(from), parse_widget_index(to)) {
            (Some(from), Some(to)) => self.move_widget(board_id, from, to),
            _ => {
                debug!("event=board_mutation module=store op=move_widget status=skip reason=not_a_number");
                self.load()
            }
        }
    }

    fn keep_corrupt_copy(&self, raw: &str) -> StoreResult<()> {
        let backup = self.corrupt_backup_path();
        fs::write(&backup, raw).map_err(|source| StoreError::Io {
            path: backup.clone(),
            source,
        })?;
        warn!(
            "event=state_backup module=store status=ok bytes={} path={}",
            raw.len(),
            backup.display()
        );
        Ok(())
    }

    fn save_default(&self) -> StoreResult<State> {
        let state = State::with_default_board();
        self.save(&state)?;
        Ok(state)
    }

    fn mutate(
        &self,
        op: &'static str,
        apply: impl FnOnce(&mut State) -> bool,
    ) -> StoreResult<State> {
        let mut state = self.load()?;
        if apply(&mut state) {
            self.save(&state)?;
            debug!("event=board_mutation module=store op={op} status=ok");
        } else {
            debug!("event=board_mutation module=store op={op} status=skip");
        }
        Ok(state)
    }

    fn mutate_board(
        &self,
        op: &'static str,
        board_id: &str,
        apply: impl FnOnce(&mut Board) -> bool,
    ) -> StoreResult<State> {
        self.mutate(op, |state| match state.board_mut(board_id) {
            Some(board) => apply(board),
            None => false,
        })
    }
}

/// Writes any serializable value as pretty JSON, creating parent directories.
pub(crate) fn write_pretty_json<T: serde::Serialize>(path: &Path, value: &T) -> StoreResult<()> {
    let content = serde_json::to_string_pretty(value)?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| StoreError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, content).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

fn widget_slot(index: i64, count: usize) -> Option<usize> {
    usize::try_from(index).ok().filter(|slot| *slot < count)
}

fn parse_widget_index(raw: &str) -> Option<i64> {
    let value = raw.trim().parse::<f64>().ok()?;
    if !value.is_finite() || value.fract() != 0.0 {
        return None;
    }
    Some(value as i64)
}
