//! Generic codec for arrays of object literals.
//!
//! A record section is read by locating the array with the depth-aware
//! scanner, splitting it into top-level objects, and pulling each field out
//! of an object with an ordered list of patterns (first match wins, which is
//! how legacy key names are accepted). Writing renders every kept record in a
//! fixed field order and replaces the whole declaration.
//!
//! Regeneration never writes an empty array: when every submitted record is
//! blank the document is returned unchanged, so a broken submission cannot
//! wipe a populated section.

use super::{scan, splice, string_literals, unescape_literal};
use regex::Regex;

/// One record type stored as `const NAME = [ {...}, {...} ];`.
pub trait Record: Sized {
    /// Name of the constant holding the records.
    const NAME: &'static str;

    /// Extract a record from one object literal. Missing fields take defaults.
    fn from_literal(raw: &str) -> Self;

    /// Trim and normalize a submitted record before it is checked and rendered.
    fn normalize(self) -> Self;

    /// A blank record carries no data and is dropped on save.
    fn is_blank(&self) -> bool;

    /// Render as an object literal, indented for a position inside the array.
    fn render(&self) -> String;
}

/// Read every record of section `R`; empty when the section is absent.
pub fn parse<R: Record>(text: &str) -> Vec<R> {
    let Some(span) = scan::find_array_span(text, R::NAME) else {
        return Vec::new();
    };
    scan::split_top_level_objects(&text[span])
        .into_iter()
        .map(R::from_literal)
        .collect()
}

/// Render section `R` from already normalized, non-blank records.
pub fn render<R: Record>(records: &[R]) -> String {
    let inner = records
        .iter()
        .map(R::render)
        .collect::<Vec<_>>()
        .join(",\n  ");
    format!("const {} = [\n  {inner},\n];", R::NAME)
}

/// Replace section `R` with the submitted records.
///
/// Blank records are dropped. If nothing is left the document is returned as-is.
pub fn regenerate<R: Record>(text: &str, records: Vec<R>) -> String {
    let kept: Vec<R> = records
        .into_iter()
        .map(R::normalize)
        .filter(|record| !record.is_blank())
        .collect();

    if kept.is_empty() {
        return text.to_owned();
    }

    splice(text, scan::find_block_span(text, R::NAME), &render(&kept))
}

// ============================================================================
// Field Extraction
// ============================================================================

/// Pattern for `key: '<single-quoted text>'`, capturing the raw literal body.
pub fn text_field(key: &str) -> Regex {
    Regex::new(&format!(r"(?s)\b{}\s*:\s*'((?:[^'\\]|\\.)*)'", regex::escape(key))).unwrap()
}

/// Pattern for `key: <digits>`.
pub fn number_field(key: &str) -> Regex {
    Regex::new(&format!(r"\b{}\s*:\s*(\d+)", regex::escape(key))).unwrap()
}

/// Pattern for the opening of `key: [`.
pub fn list_field(key: &str) -> Regex {
    Regex::new(&format!(r"\b{}\s*:\s*\[", regex::escape(key))).unwrap()
}

/// First matching text field among `patterns`, unescaped; empty when none match.
pub fn text(raw: &str, patterns: &[&Regex]) -> String {
    patterns
        .iter()
        .find_map(|pattern| pattern.captures(raw))
        .map(|caps| unescape_literal(&caps[1]))
        .unwrap_or_default()
}

/// Numeric field; zero when absent or out of range.
pub fn number(raw: &str, pattern: &Regex) -> u32 {
    pattern
        .captures(raw)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0)
}

/// Strings of the first nested `key: [ ... ]` list; empty when absent or unbalanced.
pub fn strings(raw: &str, pattern: &Regex) -> Vec<String> {
    pattern
        .find(raw)
        .and_then(|open| {
            let close = scan::matching_bracket(raw, open.end())?;
            Some(string_literals(&raw[open.end()..close]))
        })
        .unwrap_or_default()
}
