use tempfile::TempDir;
use tracksling_core::{BoardStore, State, StoreConfig};

fn temp_store() -> (TempDir, BoardStore, String) {
    let dir = tempfile::tempdir().unwrap();
    let store = BoardStore::new(StoreConfig::new(dir.path().join("tracksling-data.json")));
    let board_id = store.load().unwrap().boards[0].id.clone();
    (dir, store, board_id)
}

fn assert_cells_complete(state: &State) {
    for board in &state.boards {
        for row in &board.rows {
            for column in &board.columns {
                assert!(
                    row.cells.contains_key(&column.id),
                    "row {} missing column {}",
                    row.id,
                    column.id
                );
            }
        }
    }
}

#[test]
fn add_column_and_row_use_numbered_defaults() {
    let (_dir, store, board_id) = temp_store();
    store.add_column(&board_id, None).unwrap();
    store.add_column(&board_id, Some("  ")).unwrap();
    store.add_row(&board_id, None).unwrap();
    let state = store.add_row(&board_id, Some(" Total ")).unwrap();

    let board = &state.boards[0];
    let labels = board.columns.iter().map(|c| c.label.as_str()).collect::<Vec<_>>();
    assert_eq!(labels, vec!["Colonne 1", "Colonne 2"]);
    let rows = board.rows.iter().map(|r| r.label.as_str()).collect::<Vec<_>>();
    assert_eq!(rows, vec!["Ligne 1", "Total"]);
    assert_cells_complete(&state);
}

#[test]
fn add_column_backfills_existing_rows() {
    let (_dir, store, board_id) = temp_store();
    store.add_row(&board_id, Some("a")).unwrap();
    store.add_row(&board_id, Some("b")).unwrap();
    let state = store.add_column(&board_id, Some("c")).unwrap();

    let board = &state.boards[0];
    let column_id = &board.columns[0].id;
    for row in &board.rows {
        assert_eq!(row.cells.get(column_id).map(String::as_str), Some(""));
    }
}

#[test]
fn update_cell_sets_value_and_defaults_none_to_empty() {
    let (_dir, store, board_id) = temp_store();
    store.add_column(&board_id, Some("c")).unwrap();
    let state = store.add_row(&board_id, Some("r")).unwrap();
    let row_id = state.boards[0].rows[0].id.clone();
    let column_id = state.boards[0].columns[0].id.clone();

    let state = store
        .update_cell(&board_id, &row_id, &column_id, Some("42 km"))
        .unwrap();
    assert_eq!(state.boards[0].rows[0].cells[&column_id], "42 km");

    let state = store.update_cell(&board_id, &row_id, &column_id, None).unwrap();
    assert_eq!(state.boards[0].rows[0].cells[&column_id], "");

    let reloaded = store.load().unwrap();
    assert_eq!(reloaded.boards[0].rows[0].cells[&column_id], "");
}

#[test]
fn update_cell_on_unknown_row_is_noop() {
    let (_dir, store, board_id) = temp_store();
    let before = store.add_column(&board_id, Some("c")).unwrap();
    let column_id = before.boards[0].columns[0].id.clone();
    let after = store
        .update_cell(&board_id, "missing", &column_id, Some("x"))
        .unwrap();
    assert_eq!(after, before);
}

#[test]
fn rename_row_and_column_ignore_blank_labels() {
    let (_dir, store, board_id) = temp_store();
    store.add_column(&board_id, Some("c")).unwrap();
    let state = store.add_row(&board_id, Some("r")).unwrap();
    let row_id = state.boards[0].rows[0].id.clone();
    let column_id = state.boards[0].columns[0].id.clone();

    let state = store.rename_row(&board_id, &row_id, Some(" Week 1 ")).unwrap();
    assert_eq!(state.boards[0].rows[0].label, "Week 1");
    let state = store.rename_row(&board_id, &row_id, Some("")).unwrap();
    assert_eq!(state.boards[0].rows[0].label, "Week 1");

    let state = store
        .rename_column(&board_id, &column_id, Some("Distance"))
        .unwrap();
    assert_eq!(state.boards[0].columns[0].label, "Distance");
    let state = store.rename_column(&board_id, &column_id, None).unwrap();
    assert_eq!(state.boards[0].columns[0].label, "Distance");
}

#[test]
fn delete_row_removes_only_target() {
    let (_dir, store, board_id) = temp_store();
    store.add_row(&board_id, Some("a")).unwrap();
    let state = store.add_row(&board_id, Some("b")).unwrap();
    let first = state.boards[0].rows[0].id.clone();

    let state = store.delete_row(&board_id, &first).unwrap();
    assert_eq!(state.boards[0].rows.len(), 1);
    assert_eq!(state.boards[0].rows[0].label, "b");

    let unchanged = store.delete_row(&board_id, "missing").unwrap();
    assert_eq!(unchanged, state);
}

#[test]
fn delete_column_purges_cells_and_readding_starts_empty() {
    let (_dir, store, board_id) = temp_store();
    store.add_column(&board_id, Some("Temp")).unwrap();
    store.add_column(&board_id, Some("Keep")).unwrap();
    store.add_row(&board_id, Some("a")).unwrap();
    let state = store.add_row(&board_id, Some("b")).unwrap();
    let temp_id = state.boards[0].columns[0].id.clone();
    let keep_id = state.boards[0].columns[1].id.clone();
    for row in &state.boards[0].rows {
        store
            .update_cell(&board_id, &row.id, &temp_id, Some("old"))
            .unwrap();
    }

    let state = store.delete_column(&board_id, &temp_id).unwrap();
    let board = &state.boards[0];
    assert_eq!(board.columns.len(), 1);
    assert_eq!(board.columns[0].id, keep_id);
    for row in &board.rows {
        assert!(!row.cells.contains_key(&temp_id));
    }

    let state = store.add_column(&board_id, Some("Temp")).unwrap();
    let board = &state.boards[0];
    let new_id = &board.columns[1].id;
    assert_ne!(new_id, &temp_id);
    for row in &board.rows {
        assert_eq!(row.cells[new_id], "");
        assert!(!row.cells.values().any(|value| value == "old"));
    }
    assert_cells_complete(&state);
}
