//! Flutter-facing bindings for Packrat core.

pub mod api;
