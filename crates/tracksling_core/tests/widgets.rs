use serde_json::json;
use tempfile::TempDir;
use tracksling_core::{Board, BoardStore, StoreConfig, WidgetPreset};

fn temp_store() -> (TempDir, BoardStore, String) {
    let dir = tempfile::tempdir().unwrap();
    let store = BoardStore::new(StoreConfig::new(dir.path().join("tracksling-data.json")));
    let board_id = store.load().unwrap().boards[0].id.clone();
    (dir, store, board_id)
}

fn titled(title: &str) -> WidgetPreset {
    WidgetPreset {
        title: Some(title.to_string()),
        ..WidgetPreset::default()
    }
}

fn seed_widgets(store: &BoardStore, board_id: &str, titles: &[&str]) {
    for title in titles {
        store.add_widget_preset(board_id, &titled(title)).unwrap();
    }
}

fn titles(board: &Board) -> Vec<&str> {
    board.widgets.iter().map(|w| w.title.as_str()).collect()
}

fn assert_positions_sequential(board: &Board) {
    for (index, widget) in board.widgets.iter().enumerate() {
        assert_eq!(widget.position, index, "widget {} out of place", widget.id);
    }
}

#[test]
fn add_widget_preset_applies_defaults_and_appends() {
    let (_dir, store, board_id) = temp_store();
    store
        .add_widget_preset(&board_id, &WidgetPreset::default())
        .unwrap();
    let preset = WidgetPreset::from_value(&json!({
        "title": "Budget",
        "type": "sum",
        "values": [10, 2.5]
    }));
    let state = store.add_widget_preset(&board_id, &preset).unwrap();

    let board = &state.boards[0];
    assert_eq!(board.widgets.len(), 2);
    assert_eq!(board.widgets[0].title, "Widget");
    assert_eq!(board.widgets[0].kind, "number");
    assert_eq!(serde_json::to_value(&board.widgets[0].values).unwrap(), json!([0]));
    assert_eq!(board.widgets[1].title, "Budget");
    assert_eq!(board.widgets[1].kind, "sum");
    assert_eq!(serde_json::to_value(&board.widgets[1].values).unwrap(), json!([10, 2.5]));
    assert_positions_sequential(board);
}

#[test]
fn rename_widget_requires_non_blank_title() {
    let (_dir, store, board_id) = temp_store();
    seed_widgets(&store, &board_id, &["a"]);
    let widget_id = store.load().unwrap().boards[0].widgets[0].id.clone();

    let state = store
        .rename_widget(&board_id, &widget_id, Some(" Steps "))
        .unwrap();
    assert_eq!(state.boards[0].widgets[0].title, "Steps");

    let state = store.rename_widget(&board_id, &widget_id, Some("  ")).unwrap();
    assert_eq!(state.boards[0].widgets[0].title, "Steps");

    let unchanged = store.rename_widget(&board_id, "missing", Some("x")).unwrap();
    assert_eq!(unchanged, state);
}

#[test]
fn delete_widget_renumbers_positions() {
    let (_dir, store, board_id) = temp_store();
    seed_widgets(&store, &board_id, &["a", "b", "c", "d"]);
    let middle = store.load().unwrap().boards[0].widgets[1].id.clone();

    let state = store.delete_widget(&board_id, &middle).unwrap();
    let board = &state.boards[0];
    assert_eq!(titles(board), vec!["a", "c", "d"]);
    assert_positions_sequential(board);
}

#[test]
fn move_widget_reorders_and_renumbers() {
    let (_dir, store, board_id) = temp_store();
    seed_widgets(&store, &board_id, &["a", "b", "c", "d"]);

    let state = store.move_widget(&board_id, 0, 2).unwrap();
    assert_eq!(titles(&state.boards[0]), vec!["b", "c", "a", "d"]);
    assert_positions_sequential(&state.boards[0]);

    let state = store.move_widget(&board_id, 3, 0).unwrap();
    assert_eq!(titles(&state.boards[0]), vec!["d", "b", "c", "a"]);
    assert_positions_sequential(&state.boards[0]);

    let reloaded = store.load().unwrap();
    assert_eq!(titles(&reloaded.boards[0]), vec!["d", "b", "c", "a"]);
}

#[test]
fn move_widget_rejects_equal_or_out_of_range_indices() {
    let (_dir, store, board_id) = temp_store();
    seed_widgets(&store, &board_id, &["a", "b", "c"]);
    let before = store.load().unwrap();

    for (from, to) in [(1, 1), (-1, 0), (0, 3), (3, 0), (0, -2), (i64::MAX, 0)] {
        let after = store.move_widget(&board_id, from, to).unwrap();
        assert_eq!(after, before, "move {from}->{to} should be a no-op");
    }
    assert_eq!(store.move_widget("missing", 0, 1).unwrap(), before);
}

#[test]
fn move_widget_str_rejects_non_numeric_indices() {
    let (_dir, store, board_id) = temp_store();
    seed_widgets(&store, &board_id, &["a", "b", "c"]);
    let before = store.load().unwrap();

    for (from, to) in [("x", "1"), ("0", "NaN"), ("0.5", "1"), ("", "1")] {
        let after = store.move_widget_str(&board_id, from, to).unwrap();
        assert_eq!(after, before, "move {from:?}->{to:?} should be a no-op");
    }

    let moved = store.move_widget_str(&board_id, "2", "0").unwrap();
    assert_eq!(titles(&moved.boards[0]), vec!["c", "a", "b"]);
}

#[test]
fn widget_ids_are_unique_across_many_adds() {
    let (_dir, store, board_id) = temp_store();
    for _ in 0..50 {
        store
            .add_widget_preset(&board_id, &WidgetPreset::default())
            .unwrap();
    }
    let state = store.load().unwrap();
    let mut ids = state.boards[0]
        .widgets
        .iter()
        .map(|w| w.id.clone())
        .collect::<Vec<_>>();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 50);
    assert_positions_sequential(&state.boards[0]);
}
