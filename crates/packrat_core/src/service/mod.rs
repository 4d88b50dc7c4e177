//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into the sweep use-case.
//! - Keep host layers (CLI/FFI) decoupled from storage details.

pub mod command;
pub mod sweep_service;
