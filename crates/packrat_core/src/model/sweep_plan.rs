//! Pure sweep planning over note text.
//!
//! # Responsibility
//! - Partition note lines into retained, appended and archived buckets.
//! - Compose rewritten note and archive text from those buckets.
//!
//! # Invariants
//! - Lines are split and joined on `\n` only; `\r` stays part of line content.
//! - Every input line lands in exactly one bucket or is counted as deleted.
//! - Relative order is preserved inside every bucket.

use crate::config::settings::PackratSettings;
use crate::model::task_line::{classify_line, LineDisposition};

/// Line separator used for both split and join.
pub const LINE_SEPARATOR: &str = "\n";

/// Per-disposition counters for one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepCounts {
    pub deleted: usize,
    pub moved: usize,
    pub archived: usize,
}

impl SweepCounts {
    /// Returns whether the pass changed nothing.
    pub fn is_empty(&self) -> bool {
        self.deleted == 0 && self.moved == 0 && self.archived == 0
    }
}

/// Result of classifying every line of one note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepPlan {
    /// Lines that keep their original position.
    pub retained: Vec<String>,
    /// Lines appended after `retained`, in match order.
    pub appended: Vec<String>,
    /// Lines destined for the archive note, in match order.
    pub archived: Vec<String>,
    pub counts: SweepCounts,
}

impl SweepPlan {
    /// Returns whether the archive note needs to be touched.
    pub fn has_archive_lines(&self) -> bool {
        !self.archived.is_empty()
    }

    /// Composes the rewritten active note text.
    pub fn active_text(&self) -> String {
        let lines: Vec<&str> = self
            .retained
            .iter()
            .chain(self.appended.iter())
            .map(String::as_str)
            .collect();
        lines.join(LINE_SEPARATOR)
    }

    /// Appends archived lines after the existing archive text.
    ///
    /// An empty archive splits into one empty line, so the first archived
    /// line of a fresh archive is preceded by a newline.
    pub fn merge_into_archive(&self, existing: &str) -> String {
        let mut lines: Vec<&str> = existing.split(LINE_SEPARATOR).collect();
        lines.extend(self.archived.iter().map(String::as_str));
        lines.join(LINE_SEPARATOR)
    }
}

/// Classifies every line of `text` and collects the buckets.
pub fn plan_sweep(text: &str, settings: &PackratSettings) -> SweepPlan {
    let mut plan = SweepPlan::default();
    for line in text.split(LINE_SEPARATOR) {
        match classify_line(line, settings) {
            LineDisposition::Retain => plan.retained.push(line.to_string()),
            LineDisposition::Delete => plan.counts.deleted += 1,
            LineDisposition::Archive => {
                plan.counts.archived += 1;
                plan.archived.push(line.to_string());
            }
            LineDisposition::MoveToEnd => {
                plan.counts.moved += 1;
                plan.appended.push(line.to_string());
            }
        }
    }
    plan
}
