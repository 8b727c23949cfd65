//! Text search over section rows.
//!
//! Matching is a case-insensitive substring test over the visible row text.
//! Form control values are not part of `ConfigRow::text` and therefore
//! never match. Highlights are recomputed from scratch on every call, so a
//! repeated search can never leave stale spans behind.

use crate::{ConfigSection, ConfigTable};

/// Byte range of one match inside a row's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightSpan {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowHighlights {
    pub row: usize,
    pub spans: Vec<HighlightSpan>,
}

/// All case-insensitive occurrences of `needle` in `haystack`, as byte
/// ranges into `haystack`. Comparison lowercases one char at a time, so
/// spans always fall on character boundaries.
pub fn find_matches(haystack: &str, needle: &str) -> Vec<HighlightSpan> {
    if needle.is_empty() {
        return Vec::new();
    }
    let hay: Vec<(usize, char)> = haystack.char_indices().collect();
    let pat: Vec<char> = needle
        .chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect();

    let mut spans = Vec::new();
    let mut i = 0;
    while i + pat.len() <= hay.len() {
        let matched = hay[i..i + pat.len()]
            .iter()
            .zip(&pat)
            .all(|(&(_, h), &p)| h.to_lowercase().next().unwrap_or(h) == p);
        if matched {
            let start = hay[i].0;
            let end = hay
                .get(i + pat.len())
                .map(|&(pos, _)| pos)
                .unwrap_or(haystack.len());
            spans.push(HighlightSpan { start, end });
            i += pat.len();
        } else {
            i += 1;
        }
    }
    spans
}

/// True when the section's title or any of its rows contains the text.
/// Rows inside nested row groups belong to the section's row list, so text
/// hidden behind a toggle still matches and still activates the section.
pub fn section_has_text(table: &ConfigTable, section: &ConfigSection, text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    if !find_matches(&section.title, text).is_empty() {
        return true;
    }
    section
        .rows
        .iter()
        .filter_map(|&idx| table.rows.get(idx))
        .any(|row| !find_matches(&row.text, text).is_empty())
}

/// Highlight spans for every matching row of a section. The result fully
/// replaces any previous highlight state.
pub fn highlight_section(
    table: &ConfigTable,
    section: &ConfigSection,
    text: &str,
) -> Vec<RowHighlights> {
    let mut highlights = Vec::new();
    if text.is_empty() {
        return highlights;
    }
    for &idx in &section.rows {
        let Some(row) = table.rows.get(idx) else {
            continue;
        };
        let spans = find_matches(&row.text, text);
        if !spans.is_empty() {
            highlights.push(RowHighlights { row: idx, spans });
        }
    }
    highlights
}
