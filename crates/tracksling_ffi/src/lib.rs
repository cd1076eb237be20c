//! Host-facing bindings for Tracksling core.

pub mod api;
