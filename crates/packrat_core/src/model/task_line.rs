//! Task line classification.
//!
//! # Responsibility
//! - Decide whether one markdown line is a completed recurring task.
//! - Map completed recurring tasks to a disposition using configured triggers.
//!
//! # Invariants
//! - Classification reads the raw line; it never rewrites line content.
//! - Trigger priority is fixed: delete, archive, end-of-note.
//! - A trigger found only at byte index 0 is treated as absent.

use crate::config::settings::PackratSettings;

/// Uppercased prefix of a checked markdown list item.
pub const COMPLETED_ITEM_PREFIX: &str = "- [X]";
/// Recurrence emoji used by the Tasks plugin.
pub const RECURRENCE_EMOJI: &str = "\u{1F501}";
/// Dataview-style inline recurrence field.
pub const RECURRENCE_FIELD: &str = "[repeat::";

const COMPLETED_ITEM_PREFIX_CHARS: usize = 5;

/// Destination of one line after a sweep pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineDisposition {
    /// Line stays at its original position.
    Retain,
    /// Line is dropped from the note.
    Delete,
    /// Line is appended to the archive note.
    Archive,
    /// Line is moved after all retained lines.
    MoveToEnd,
}

/// Returns whether the trimmed line starts with a checked list marker.
///
/// The check is case-insensitive on the marker (`- [x]` and `- [X]`).
pub fn is_completed_item(line: &str) -> bool {
    let head: String = line
        .trim()
        .chars()
        .take(COMPLETED_ITEM_PREFIX_CHARS)
        .collect();
    head.to_uppercase() == COMPLETED_ITEM_PREFIX
}

/// Returns whether the raw line carries a recurrence marker.
pub fn is_recurring(line: &str) -> bool {
    line.contains(RECURRENCE_EMOJI) || line.contains(RECURRENCE_FIELD)
}

/// Returns whether `trigger` first occurs in `line` strictly after index 0.
///
/// An empty trigger is found at index 0 and therefore never matches.
pub fn trigger_matches(line: &str, trigger: &str) -> bool {
    matches!(line.find(trigger), Some(index) if index > 0)
}

/// Classifies one raw line against configured triggers.
pub fn classify_line(line: &str, settings: &PackratSettings) -> LineDisposition {
    if !is_completed_item(line) || !is_recurring(line) {
        return LineDisposition::Retain;
    }

    if trigger_matches(line, &settings.deletion_trigger) {
        LineDisposition::Delete
    } else if trigger_matches(line, &settings.archive_trigger) {
        LineDisposition::Archive
    } else if trigger_matches(line, &settings.bottom_trigger) {
        LineDisposition::MoveToEnd
    } else {
        LineDisposition::Retain
    }
}

#[cfg(test)]
mod tests {
    use super::{
        classify_line, is_completed_item, is_recurring, trigger_matches, LineDisposition,
    };
    use crate::config::settings::PackratSettings;

    #[test]
    fn completed_item_accepts_both_cases_and_indentation() {
        assert!(is_completed_item("- [x] lower"));
        assert!(is_completed_item("    - [X] upper indented"));
        assert!(!is_completed_item("- [ ] open"));
        assert!(!is_completed_item("* [x] star bullet"));
        assert!(!is_completed_item("- [x"));
        assert!(!is_completed_item(""));
    }

    #[test]
    fn recurring_requires_emoji_or_repeat_field() {
        assert!(is_recurring("- [x] pills \u{1F501} every day"));
        assert!(is_recurring("- [x] report [repeat:: monthly]"));
        assert!(!is_recurring("- [x] one-off"));
        assert!(!is_recurring("- [x] [repeat: typo]"));
    }

    #[test]
    fn trigger_at_index_zero_is_ignored() {
        assert!(!trigger_matches("%%done_del%% - [x] x", "%%done_del%%"));
        assert!(trigger_matches(" %%done_del%%", "%%done_del%%"));
        assert!(!trigger_matches("anything", ""));
    }

    #[test]
    fn classification_follows_trigger_priority() {
        let settings = PackratSettings::default();
        assert_eq!(
            classify_line(
                "- [x] a \u{1F501} %%done_end%% %%done_log%% %%done_del%%",
                &settings
            ),
            LineDisposition::Delete
        );
        assert_eq!(
            classify_line("- [x] a \u{1F501} %%done_end%% %%done_log%%", &settings),
            LineDisposition::Archive
        );
        assert_eq!(
            classify_line("- [x] a [repeat:: daily] %%done_end%%", &settings),
            LineDisposition::MoveToEnd
        );
        assert_eq!(
            classify_line("- [x] a \u{1F501} daily", &settings),
            LineDisposition::Retain
        );
    }

    #[test]
    fn non_completed_or_non_recurring_lines_are_retained() {
        let settings = PackratSettings::default();
        assert_eq!(
            classify_line("- [ ] buy milk \u{1F501} weekly %%done_del%%", &settings),
            LineDisposition::Retain
        );
        assert_eq!(
            classify_line("- [x] one-off %%done_del%%", &settings),
            LineDisposition::Retain
        );
    }
}
