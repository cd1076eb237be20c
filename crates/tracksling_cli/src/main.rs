//! Command-line driver over the Tracksling board store.
//!
//! # Responsibility
//! - Run one store operation per invocation and print the resulting JSON.
//! - Double as a linkage probe (`ping`) for the core crate.
//!
//! Uses `TRACKSLING_DATA_PATH` for the state file and, when set,
//! `TRACKSLING_LOG_DIR` (absolute) for rolling logs.

use std::path::Path;
use std::process::ExitCode;
use tracksling_core::logging::LogLevel;
use tracksling_core::{BoardStore, NewBoard, StoreConfig, StoreResult, WidgetPreset};

const USAGE: &str = "usage: tracksling_cli <command> [args]

commands:
  ping | version | show
  create-board [name] [description] [custom-colors:true|false] [border] [fill]
  set-active <board> | delete-board <board>
  rename-board <board> <name>
  border-color <board> <color> | fill-color <board> <color>
  add-column <board> [label] | rename-column <board> <column> <label> | delete-column <board> <column>
  add-row <board> [label] | rename-row <board> <row> <label> | delete-row <board> <row>
  set-cell <board> <row> <column> [value]
  add-widget <board> [preset-json] | rename-widget <board> <widget> <title>
  delete-widget <board> <widget> | move-widget <board> <from> <to>
  export <path> | import <path>";

fn main() -> ExitCode {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let Some((command, rest)) = args.split_first() else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };

    match command.as_str() {
        "ping" => {
            println!("tracksling_core ping={}", tracksling_core::ping());
            return ExitCode::SUCCESS;
        }
        "version" => {
            println!("tracksling_core version={}", tracksling_core::core_version());
            return ExitCode::SUCCESS;
        }
        _ => {}
    }

    if let Ok(log_dir) = std::env::var("TRACKSLING_LOG_DIR") {
        let level = LogLevel::build_default();
        if let Err(err) = tracksling_core::init_logging(level.as_str(), &log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let store = BoardStore::new(StoreConfig::from_env());
    match run(&store, command, rest) {
        Ok(Some(output)) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Ok(None) => {
            eprintln!("{USAGE}");
            ExitCode::from(2)
        }
        Err(err) => {
            eprintln!("{command} failed: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Runs `command`; `Ok(None)` signals a usage error.
fn run(store: &BoardStore, command: &str, args: &[String]) -> StoreResult<Option<String>> {
    let arg = |index: usize| args.get(index).map(String::as_str);
    let state = match (command, args.len()) {
        ("show", 0) => store.load()?,
        ("create-board", 0..=5) => {
            let Some(use_custom_colors) = arg(2).map_or(Some(false), parse_flag) else {
                return Ok(None);
            };
            store.create_board(&NewBoard {
                name: arg(0).map(str::to_string),
                description: arg(1).map(str::to_string),
                use_custom_colors,
                border_color: arg(3).map(str::to_string),
                fill_color: arg(4).map(str::to_string),
            })?
        }
        ("set-active", 1) => store.set_active_board(&args[0])?,
        ("delete-board", 1) => store.delete_board(&args[0])?,
        ("rename-board", 2) => store.update_board_name(&args[0], arg(1))?,
        ("border-color", 2) => store.update_board_color(&args[0], arg(1))?,
        ("fill-color", 2) => store.update_board_fill_color(&args[0], arg(1))?,
        ("add-column", 1..=2) => store.add_column(&args[0], arg(1))?,
        ("rename-column", 3) => store.rename_column(&args[0], &args[1], arg(2))?,
        ("delete-column", 2) => store.delete_column(&args[0], &args[1])?,
        ("add-row", 1..=2) => store.add_row(&args[0], arg(1))?,
        ("rename-row", 3) => store.rename_row(&args[0], &args[1], arg(2))?,
        ("delete-row", 2) => store.delete_row(&args[0], &args[1])?,
        ("set-cell", 3..=4) => store.update_cell(&args[0], &args[1], &args[2], arg(3))?,
        ("add-widget", 1..=2) => {
            let preset = arg(1)
                .and_then(|raw| serde_json::from_str::<serde_json::Value>(raw).ok())
                .map(|value| WidgetPreset::from_value(&value))
                .unwrap_or_default();
            store.add_widget_preset(&args[0], &preset)?
        }
        ("rename-widget", 3) => store.rename_widget(&args[0], &args[1], arg(2))?,
        ("delete-widget", 2) => store.delete_widget(&args[0], &args[1])?,
        ("move-widget", 3) => store.move_widget_str(&args[0], &args[1], &args[2])?,
        ("export", 1) => {
            let outcome = store.export_to(Some(Path::new(&args[0])))?;
            return Ok(Some(serde_json::to_string_pretty(&outcome)?));
        }
        ("import", 1) => {
            let outcome = store.import_from(Some(Path::new(&args[0])))?;
            return Ok(Some(serde_json::to_string_pretty(&outcome)?));
        }
        _ => return Ok(None),
    };
    Ok(Some(serde_json::to_string_pretty(&state)?))
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
