//! Per-value key sanitization.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

use super::{CaseMode, RepairOptions};

static ZERO_WIDTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x{200B}\x{200C}\x{200D}\x{FEFF}]").expect("Invalid regex: zero-width characters")
});

/// Remove zero-width characters and the BOM; non-breaking spaces become
/// ordinary spaces.
pub(crate) fn strip_invisible(value: &str) -> Cow<'_, str> {
    let stripped = ZERO_WIDTH.replace_all(value, "");
    if stripped.contains('\u{00A0}') {
        Cow::Owned(stripped.replace('\u{00A0}', " "))
    } else {
        stripped
    }
}

pub(crate) fn apply_case(value: &str, mode: CaseMode) -> String {
    match mode {
        CaseMode::Lower => value.to_lowercase(),
        CaseMode::Upper => value.to_uppercase(),
    }
}

/// Which steps changed a value.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ValueChanges {
    pub invisible: bool,
    pub trimmed: bool,
    pub case: bool,
    pub emptied: bool,
}

impl ValueChanges {
    pub fn any(&self) -> bool {
        self.invisible || self.trimmed || self.case || self.emptied
    }
}

/// Apply the enabled repairs to one value.
///
/// Order: invisible characters, whitespace, case, then empty-to-missing,
/// so a value made only of invisible characters and spaces ends up
/// missing. Returns `None` for a value that became missing.
pub(crate) fn repair_value(value: &str, options: &RepairOptions) -> (Option<String>, ValueChanges) {
    let mut changes = ValueChanges::default();
    let mut current = value.to_string();

    if options.remove_invisible {
        let stripped = strip_invisible(&current);
        if stripped != current {
            changes.invisible = true;
            current = stripped.into_owned();
        }
    }

    if options.trim_whitespace {
        let trimmed = current.trim();
        if trimmed.len() != current.len() {
            changes.trimmed = true;
            current = trimmed.to_string();
        }
    }

    if let Some(mode) = options.case {
        let cased = apply_case(&current, mode);
        if cased != current {
            changes.case = true;
            current = cased;
        }
    }

    if options.empty_to_missing && current.is_empty() {
        changes.emptied = true;
        return (None, changes);
    }

    (Some(current), changes)
}
