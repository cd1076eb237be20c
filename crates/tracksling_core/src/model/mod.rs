//! Board domain model.
//!
//! # Responsibility
//! - Define the persisted state shape shared by store, FFI and CLI layers.
//! - Keep wire field names stable for files written by earlier versions.
//!
//! # Invariants
//! - Every entity is identified by an opaque string id.
//! - `State::active_board_id` is `None` only when `boards` is empty.
//!
//! # See also
//! - crate::normalize for the repair pass that establishes these invariants.

pub mod board;
