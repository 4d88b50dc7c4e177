//! Line-level domain model for completed recurring tasks.
//!
//! # Responsibility
//! - Classify individual note lines.
//! - Plan the redistribution of a whole note without touching storage.
//!
//! # Invariants
//! - Everything in this module is pure and storage-agnostic.

pub mod sweep_plan;
pub mod task_line;
