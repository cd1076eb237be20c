//! Core state layer for Tracksling boards.
//! This crate owns the persisted state shape, its repair rules and every
//! board/grid/widget mutation.

pub mod config;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod store;

pub use config::StoreConfig;
pub use logging::{init_logging, logging_status, LogLevel};
pub use model::board::{new_id, Board, Column, EntityId, Row, State, Widget};
pub use normalize::{normalize_color, normalize_value, NormalizeReport, Normalized};
pub use store::{
    BoardStore, FileDialog, FileFilter, NewBoard, OpenDialogRequest, SaveDialogRequest,
    StoreError, StoreResult, TransferOutcome, WidgetPreset,
};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
