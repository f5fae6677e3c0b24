//! Invisible characters and mixed encodings.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

use super::{Issue, IssueDetail, IssueKind, Severity, distinct_examples};
use crate::keys::TableSide;
use crate::table::Column;

/// Zero-width space/non-joiner/joiner, byte-order mark, non-breaking space.
static INVISIBLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x{200B}\x{200C}\x{200D}\x{FEFF}\x{00A0}]")
        .expect("Invalid regex: invisible characters")
});

/// UTF-8 bytes decoded as Latin-1 (`Ã©`, `Â `) or a replacement character.
static MOJIBAKE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x{00C3}\x{00C2}][\x{0080}-\x{00BF}]|\x{FFFD}")
        .expect("Invalid regex: mojibake")
});

/// Flag text values containing invisible code points.
pub fn detect_invisible_characters(column: &Column, side: TableSide) -> Option<Issue> {
    if !column.kind().is_textual() {
        return None;
    }

    let mut indices = Vec::new();
    let mut affected = Vec::new();
    let mut code_points = BTreeSet::new();

    for (idx, value) in column.text_values() {
        let mut hit = false;
        for m in INVISIBLE.find_iter(value) {
            hit = true;
            if let Some(c) = m.as_str().chars().next() {
                code_points.insert(c as u32);
            }
        }
        if hit {
            indices.push(idx);
            affected.push(value);
        }
    }

    if indices.is_empty() {
        return None;
    }

    Some(Issue::new(
        IssueKind::InvisibleCharacters,
        Severity::Warning,
        side,
        vec![column.name().to_string()],
        format!(
            "{} value(s) in {}.{} contain invisible characters",
            indices.len(),
            side,
            column.name()
        ),
        IssueDetail::InvisibleCharacters {
            indices,
            affected_values: distinct_examples(affected),
            code_points: code_points
                .into_iter()
                .map(|c| format!("U+{:04X}", c))
                .collect(),
        },
    ))
}

/// Flag a column whose values mix mis-decoded and clean text.
///
/// A column where every value looks mis-decoded is consistent and is not
/// reported.
pub fn detect_mixed_encoding(column: &Column, side: TableSide) -> Option<Issue> {
    if !column.kind().is_textual() {
        return None;
    }

    let mut indices = Vec::new();
    let mut examples = Vec::new();
    let mut clean = 0usize;

    for (idx, value) in column.text_values() {
        if MOJIBAKE.is_match(value) {
            indices.push(idx);
            examples.push(value);
        } else if !value.is_empty() {
            clean += 1;
        }
    }

    if indices.is_empty() || clean == 0 {
        return None;
    }

    Some(Issue::new(
        IssueKind::MixedEncoding,
        Severity::Info,
        side,
        vec![column.name().to_string()],
        format!(
            "{}.{} mixes encodings: {} value(s) look mis-decoded",
            side,
            column.name(),
            indices.len()
        ),
        IssueDetail::MixedEncoding {
            indices,
            examples: distinct_examples(examples),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invisible_code_points_reported() {
        let col = Column::text(
            "id",
            vec![Some("abc\u{200B}"), Some("abc"), Some("\u{FEFF}x\u{00A0}")],
        );
        let issue = detect_invisible_characters(&col, TableSide::X).unwrap();
        let IssueDetail::InvisibleCharacters {
            indices,
            code_points,
            ..
        } = issue.detail
        else {
            panic!("wrong detail");
        };
        assert_eq!(indices, vec![0, 2]);
        assert_eq!(code_points, vec!["U+00A0", "U+200B", "U+FEFF"]);
    }

    #[test]
    fn test_no_invisible_characters() {
        let col = Column::text("id", vec![Some("plain")]);
        assert!(detect_invisible_characters(&col, TableSide::X).is_none());
    }

    #[test]
    fn test_mixed_encoding_is_informational() {
        let col = Column::text("city", vec![Some("Montréal"), Some("MontrÃ©al")]);
        let issue = detect_mixed_encoding(&col, TableSide::Y).unwrap();
        assert_eq!(issue.severity, Severity::Info);
        assert!(matches!(issue.detail, IssueDetail::MixedEncoding { ref indices, .. } if indices == &[1]));
    }

    #[test]
    fn test_uniform_encoding_not_reported() {
        let col = Column::text("city", vec![Some("Montréal"), Some("Zürich")]);
        assert!(detect_mixed_encoding(&col, TableSide::X).is_none());

        let col = Column::integer("n", vec![Some(1)]);
        assert!(detect_mixed_encoding(&col, TableSide::X).is_none());
    }
}
