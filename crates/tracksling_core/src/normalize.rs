//! Repair pass from arbitrary JSON into a valid `State`.
//!
//! # Responsibility
//! - Sanitize externally supplied colours.
//! - Coerce partial or malformed persisted JSON into the canonical shape.
//! - Report every repair so callers can surface silent data loss.
//!
//! # Invariants
//! - Normalization never fails: anything without a `boards` array becomes the
//!   default state.
//! - After normalization every row has a cell for every column of its board.
//! - Cell keys of columns no longer on the board are kept untouched.
//! - Unknown fields are carried through in each record's `extra` map.
//! - Normalizing an already-normalized state reports no repairs.

use crate::model::board::{
    new_id, Board, Column, Row, State, Widget, DEFAULT_BORDER_COLOR, DEFAULT_FILL_COLOR,
    DEFAULT_WIDGET_KIND, DEFAULT_WIDGET_TITLE,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

static HEX6_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("valid hex6 regex"));
static HEX3_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{3}$").expect("valid hex3 regex"));

/// Returns a `#RRGGBB` colour derived from `color`, or `fallback`.
///
/// Rules:
/// - Surrounding whitespace is ignored.
/// - `#RRGGBB` is returned as-is (case preserved).
/// - `#RGB` is expanded to `#RRGGBB`.
/// - Anything else, including `None`, yields `fallback`.
pub fn normalize_color(color: Option<&str>, fallback: &str) -> String {
    let Some(trimmed) = color.map(str::trim) else {
        return fallback.to_string();
    };
    if HEX6_RE.is_match(trimmed) {
        return trimmed.to_string();
    }
    if HEX3_RE.is_match(trimmed) {
        let mut expanded = String::with_capacity(7);
        expanded.push('#');
        for channel in trimmed.chars().skip(1) {
            expanded.push(channel);
            expanded.push(channel);
        }
        return expanded;
    }
    fallback.to_string()
}

/// Summary of what a normalization pass had to repair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    /// Whole input was replaced by the default state.
    pub replaced_with_default: bool,
    /// One short metadata entry per repair (no user content).
    pub repairs: Vec<String>,
}

impl NormalizeReport {
    /// Whether the normalized output differs from the input.
    pub fn changed(&self) -> bool {
        self.replaced_with_default || !self.repairs.is_empty()
    }

    fn note(&mut self, repair: impl Into<String>) {
        self.repairs.push(repair.into());
    }
}

/// Normalized state plus its repair report.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub state: State,
    pub report: NormalizeReport,
}

/// Returns whether `value` carries a `boards` array.
pub fn has_boards_array(value: &Value) -> bool {
    value.get("boards").is_some_and(Value::is_array)
}

/// Normalizes arbitrary JSON into a valid `State`.
pub fn normalize_value(value: Value) -> Normalized {
    let Value::Object(mut root) = value else {
        return replaced_with_default();
    };
    let Some(Value::Array(raw_boards)) = root.remove("boards") else {
        return replaced_with_default();
    };

    let mut report = NormalizeReport::default();
    let mut boards = Vec::with_capacity(raw_boards.len());
    for (index, raw_board) in raw_boards.into_iter().enumerate() {
        match raw_board {
            Value::Object(object) => boards.push(normalize_board(object, index, &mut report)),
            _ => report.note(format!("boards[{index}]:dropped_non_object")),
        }
    }

    let active_board_id = match root.remove("activeBoardId") {
        Some(Value::String(id)) => Some(id),
        Some(Value::Null) | None => None,
        Some(_) => {
            report.note("activeBoardId:non_string");
            None
        }
    };

    let mut state = State {
        active_board_id,
        boards,
        extra: root,
    };
    if state.repair_active_board() {
        report.note("activeBoardId:reassigned");
    }

    Normalized { state, report }
}

fn replaced_with_default() -> Normalized {
    Normalized {
        state: State::with_default_board(),
        report: NormalizeReport {
            replaced_with_default: true,
            repairs: Vec::new(),
        },
    }
}

fn normalize_board(
    mut object: Map<String, Value>,
    index: usize,
    report: &mut NormalizeReport,
) -> Board {
    let path = format!("boards[{index}]");
    let id = take_id(&mut object, &path, report);
    let name = take_string(&mut object, "name").unwrap_or_else(|| {
        report.note(format!("{path}.name:defaulted"));
        format!("Tableau {}", index + 1)
    });
    let description = take_string(&mut object, "description").unwrap_or_else(|| {
        report.note(format!("{path}.description:defaulted"));
        String::new()
    });

    let raw_border = object.remove("borderColor");
    let raw_border = raw_border.as_ref().and_then(Value::as_str);
    let border_color = normalize_color(raw_border, DEFAULT_BORDER_COLOR);
    if raw_border != Some(border_color.as_str()) {
        report.note(format!("{path}.borderColor:sanitized"));
    }
    let raw_fill = object.remove("fillColor");
    let raw_fill = raw_fill.as_ref().and_then(Value::as_str);
    let fill_color = normalize_color(raw_fill, DEFAULT_FILL_COLOR);
    if raw_fill != Some(fill_color.as_str()) {
        report.note(format!("{path}.fillColor:sanitized"));
    }

    let columns = take_array(&mut object, "columns", &path, report)
        .into_iter()
        .enumerate()
        .filter_map(|(i, raw)| normalize_column(raw, i, &path, report))
        .collect::<Vec<_>>();
    let rows = take_array(&mut object, "rows", &path, report)
        .into_iter()
        .enumerate()
        .filter_map(|(i, raw)| normalize_row(raw, i, &path, report))
        .collect::<Vec<_>>();
    let widgets = take_array(&mut object, "widgets", &path, report)
        .into_iter()
        .enumerate()
        .filter_map(|(i, raw)| normalize_widget(raw, i, &path, report))
        .collect::<Vec<_>>();

    let mut board = Board {
        id,
        name,
        description,
        border_color,
        fill_color,
        widgets,
        columns,
        rows,
        extra: object,
    };
    let inserted = board.backfill_cells();
    if inserted > 0 {
        report.note(format!("{path}.rows:backfilled_cells={inserted}"));
    }
    board
}

fn normalize_column(
    raw: Value,
    index: usize,
    board_path: &str,
    report: &mut NormalizeReport,
) -> Option<Column> {
    let path = format!("{board_path}.columns[{index}]");
    let Value::Object(mut object) = raw else {
        report.note(format!("{path}:dropped_non_object"));
        return None;
    };
    let id = take_id(&mut object, &path, report);
    let label = take_string(&mut object, "label").unwrap_or_else(|| {
        report.note(format!("{path}.label:defaulted"));
        format!("Colonne {}", index + 1)
    });
    Some(Column {
        id,
        label,
        extra: object,
    })
}

fn normalize_row(
    raw: Value,
    index: usize,
    board_path: &str,
    report: &mut NormalizeReport,
) -> Option<Row> {
    let path = format!("{board_path}.rows[{index}]");
    let Value::Object(mut object) = raw else {
        report.note(format!("{path}:dropped_non_object"));
        return None;
    };
    let id = take_id(&mut object, &path, report);
    let label = take_string(&mut object, "label").unwrap_or_else(|| {
        report.note(format!("{path}.label:defaulted"));
        format!("Ligne {}", index + 1)
    });
    let cells = match object.remove("cells") {
        Some(Value::Object(raw_cells)) => raw_cells
            .into_iter()
            .map(|(key, value)| {
                let text = match value {
                    Value::String(text) => text,
                    Value::Null => {
                        report.note(format!("{path}.cells:null_to_empty"));
                        String::new()
                    }
                    other => {
                        report.note(format!("{path}.cells:coerced_to_string"));
                        other.to_string()
                    }
                };
                (key, text)
            })
            .collect::<BTreeMap<_, _>>(),
        _ => {
            report.note(format!("{path}.cells:defaulted"));
            BTreeMap::new()
        }
    };
    Some(Row {
        id,
        label,
        cells,
        extra: object,
    })
}

fn normalize_widget(
    raw: Value,
    index: usize,
    board_path: &str,
    report: &mut NormalizeReport,
) -> Option<Widget> {
    let path = format!("{board_path}.widgets[{index}]");
    let Value::Object(mut object) = raw else {
        report.note(format!("{path}:dropped_non_object"));
        return None;
    };
    let id = take_id(&mut object, &path, report);
    let title = take_string(&mut object, "title").unwrap_or_else(|| {
        report.note(format!("{path}.title:defaulted"));
        DEFAULT_WIDGET_TITLE.to_string()
    });
    let kind = take_string(&mut object, "type").unwrap_or_else(|| {
        report.note(format!("{path}.type:defaulted"));
        DEFAULT_WIDGET_KIND.to_string()
    });
    let values = match object.remove("values") {
        Some(Value::Array(items)) => {
            let total = items.len();
            let numbers = numbers_only(items);
            if numbers.len() != total {
                report.note(format!("{path}.values:dropped_non_numeric"));
            }
            numbers
        }
        _ => {
            report.note(format!("{path}.values:defaulted"));
            Widget::default_values()
        }
    };
    let position = match object.remove("position").as_ref().and_then(Value::as_u64) {
        Some(position) => usize::try_from(position).unwrap_or(index),
        None => {
            report.note(format!("{path}.position:defaulted"));
            index
        }
    };
    Some(Widget {
        id,
        title,
        kind,
        values,
        position,
        extra: object,
    })
}

/// Keeps only the numeric entries of a JSON array.
pub(crate) fn numbers_only(items: Vec<Value>) -> Vec<Number> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::Number(number) => Some(number),
            _ => None,
        })
        .collect()
}

fn take_id(object: &mut Map<String, Value>, path: &str, report: &mut NormalizeReport) -> String {
    match take_string(object, "id") {
        Some(id) if !id.is_empty() => id,
        _ => {
            report.note(format!("{path}.id:generated"));
            new_id()
        }
    }
}

fn take_string(object: &mut Map<String, Value>, key: &str) -> Option<String> {
    match object.remove(key) {
        Some(Value::String(value)) => Some(value),
        _ => None,
    }
}

fn take_array(
    object: &mut Map<String, Value>,
    key: &str,
    path: &str,
    report: &mut NormalizeReport,
) -> Vec<Value> {
    match object.remove(key) {
        Some(Value::Array(items)) => items,
        _ => {
            report.note(format!("{path}.{key}:defaulted"));
            Vec::new()
        }
    }
}
