//! Board, grid and widget records.
//!
//! # Responsibility
//! - Define the canonical `State` persisted as pretty JSON.
//! - Provide constructors that apply the default names/colours.
//!
//! # Invariants
//! - Every row's `cells` map has an entry for every column on its board.
//! - Widget `position` equals its index in `Board::widgets` after any
//!   add/delete/move.
//! - Unknown JSON fields are kept in `extra` and written back unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Border colour used when none (or an invalid one) is supplied.
pub const DEFAULT_BORDER_COLOR: &str = "#4f46e5";
/// Fill colour used when none (or an invalid one) is supplied.
pub const DEFAULT_FILL_COLOR: &str = "#eef2ff";
/// Name of the board created on first run.
pub const DEFAULT_BOARD_NAME: &str = "Nouveau tableau";
/// Widget title used when a preset carries none.
pub const DEFAULT_WIDGET_TITLE: &str = "Widget";
/// Widget type used when a preset carries none.
pub const DEFAULT_WIDGET_KIND: &str = "number";

/// Opaque entity identifier.
///
/// Kept as a type alias so files written with non-UUID ids stay loadable.
pub type EntityId = String;

/// Fields this version does not know about, keyed by their JSON name.
pub type ExtraFields = Map<String, Value>;

/// Generates a fresh identifier for any entity.
pub fn new_id() -> EntityId {
    Uuid::new_v4().to_string()
}

/// Whole persisted application state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    pub active_board_id: Option<EntityId>,
    pub boards: Vec<Board>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl State {
    /// Builds the first-run state: one empty board, marked active.
    pub fn with_default_board() -> Self {
        let board = Board::new(
            DEFAULT_BOARD_NAME,
            "",
            DEFAULT_BORDER_COLOR,
            DEFAULT_FILL_COLOR,
        );
        Self {
            active_board_id: Some(board.id.clone()),
            boards: vec![board],
            extra: ExtraFields::new(),
        }
    }

    pub fn board(&self, board_id: &str) -> Option<&Board> {
        self.boards.iter().find(|board| board.id == board_id)
    }

    pub fn board_mut(&mut self, board_id: &str) -> Option<&mut Board> {
        self.boards.iter_mut().find(|board| board.id == board_id)
    }

    pub fn has_board(&self, board_id: &str) -> bool {
        self.board(board_id).is_some()
    }

    /// Re-points `active_board_id` at the first board when it is dangling.
    ///
    /// Returns `true` when the active id changed.
    pub fn repair_active_board(&mut self) -> bool {
        let next = match self.boards.first() {
            None => None,
            Some(first) => match self.active_board_id.as_deref() {
                Some(active) if self.has_board(active) => return false,
                _ => Some(first.id.clone()),
            },
        };
        let changed = self.active_board_id != next;
        self.active_board_id = next;
        changed
    }
}

/// Named workspace holding a grid and a widget list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    /// `#RRGGBB`, always sanitised.
    pub border_color: String,
    /// `#RRGGBB`, always sanitised.
    pub fill_color: String,
    pub widgets: Vec<Widget>,
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl Board {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        border_color: impl Into<String>,
        fill_color: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            description: description.into(),
            border_color: border_color.into(),
            fill_color: fill_color.into(),
            widgets: Vec::new(),
            columns: Vec::new(),
            rows: Vec::new(),
            extra: ExtraFields::new(),
        }
    }

    pub fn row_mut(&mut self, row_id: &str) -> Option<&mut Row> {
        self.rows.iter_mut().find(|row| row.id == row_id)
    }

    pub fn column_mut(&mut self, column_id: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|column| column.id == column_id)
    }

    pub fn widget_mut(&mut self, widget_id: &str) -> Option<&mut Widget> {
        self.widgets.iter_mut().find(|widget| widget.id == widget_id)
    }

    /// Adds an empty cell for every column a row is missing.
    ///
    /// Returns how many cells were inserted. Keys of removed columns are left
    /// in place.
    pub fn backfill_cells(&mut self) -> usize {
        let mut inserted = 0;
        for row in &mut self.rows {
            for column in &self.columns {
                if !row.cells.contains_key(&column.id) {
                    row.cells.insert(column.id.clone(), String::new());
                    inserted += 1;
                }
            }
        }
        inserted
    }

    /// Rewrites widget positions to match their sequence index.
    pub fn renumber_widgets(&mut self) {
        for (index, widget) in self.widgets.iter_mut().enumerate() {
            widget.position = index;
        }
    }
}

/// Grid column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: EntityId,
    pub label: String,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl Column {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            label: label.into(),
            extra: ExtraFields::new(),
        }
    }
}

/// Grid row; `cells` is keyed by column id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub id: EntityId,
    pub label: String,
    pub cells: BTreeMap<EntityId, String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl Row {
    /// Creates a row with one empty cell per given column.
    pub fn new(label: impl Into<String>, columns: &[Column]) -> Self {
        Self {
            id: new_id(),
            label: label.into(),
            cells: columns
                .iter()
                .map(|column| (column.id.clone(), String::new()))
                .collect(),
            extra: ExtraFields::new(),
        }
    }
}

/// Positioned numeric tracker attached to a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub id: EntityId,
    pub title: String,
    /// Free-form; serialised as `type`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Raw JSON numbers so integer values are written back without a fraction.
    pub values: Vec<Number>,
    pub position: usize,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl Widget {
    /// Default widget values: a single zero.
    pub fn default_values() -> Vec<Number> {
        vec![Number::from(0)]
    }
}

#[cfg(test)]
mod tests {
    use super::{new_id, Board, Column, ExtraFields, Row, State, Widget, DEFAULT_BOARD_NAME};
    use std::collections::HashSet;

    #[test]
    fn generated_ids_are_unique() {
        let ids = (0..10_000).map(|_| new_id()).collect::<HashSet<_>>();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn default_state_has_one_active_board() {
        let state = State::with_default_board();
        assert_eq!(state.boards.len(), 1);
        assert_eq!(state.boards[0].name, DEFAULT_BOARD_NAME);
        assert_eq!(state.active_board_id.as_deref(), Some(state.boards[0].id.as_str()));
    }

    #[test]
    fn new_row_has_cell_per_column() {
        let columns = vec![Column::new("a"), Column::new("b")];
        let row = Row::new("r", &columns);
        assert_eq!(row.cells.len(), 2);
        assert!(row.cells.values().all(String::is_empty));
    }

    #[test]
    fn repair_active_board_points_at_first_board() {
        let mut state = State {
            active_board_id: Some("missing".to_string()),
            boards: vec![
                Board::new("a", "", "#000000", "#ffffff"),
                Board::new("b", "", "#000000", "#ffffff"),
            ],
            extra: ExtraFields::new(),
        };
        assert!(state.repair_active_board());
        assert_eq!(state.active_board_id.as_deref(), Some(state.boards[0].id.as_str()));
        assert!(!state.repair_active_board());

        state.boards.clear();
        assert!(state.repair_active_board());
        assert_eq!(state.active_board_id, None);
    }

    #[test]
    fn widget_serializes_kind_as_type_and_keeps_integer_values() {
        let widget = Widget {
            id: "w1".to_string(),
            title: "Count".to_string(),
            kind: "number".to_string(),
            values: Widget::default_values(),
            position: 0,
            extra: ExtraFields::new(),
        };
        let json = serde_json::to_string(&widget).unwrap();
        assert!(json.contains(r#""type":"number""#));
        assert!(json.contains(r#""values":[0]"#));
    }
}
