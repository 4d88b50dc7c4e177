//! User configuration for the sweeper.
//!
//! # Responsibility
//! - Own the persisted settings shape, defaults and key-level editing.
//!
//! # Invariants
//! - Settings are passed to services as explicit values, never read from a
//!   process-wide global.

pub mod settings;
