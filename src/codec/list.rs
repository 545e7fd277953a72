//! Flat string lists: `const NAME = [ 'a', 'b' ];`.
//!
//! The block runs from the declaration to its matching `];`, found with the
//! same string-aware scan as the record blocks, so an item such as `'a];'`
//! does not end the list early. Order is presentation order and is kept
//! exactly as submitted.

use super::{escape_literal, scan, splice, string_literals};
use std::ops::Range;

/// Locate the list block: `(whole declaration span, inner content span)`.
fn find_list(text: &str, name: &str) -> Option<(Range<usize>, Range<usize>)> {
    Some((
        scan::find_block_span(text, name)?,
        scan::find_array_span(text, name)?,
    ))
}

/// Read the items of list `name`; empty when the list is absent.
pub fn parse(text: &str, name: &str) -> Vec<String> {
    find_list(text, name)
        .map(|(_, inner)| string_literals(&text[inner]))
        .unwrap_or_default()
}

/// Render list `name` in canonical form.
///
/// Items are trimmed and blank ones dropped.
pub fn render<S: AsRef<str>>(name: &str, items: &[S]) -> String {
    let items: Vec<String> = items
        .iter()
        .map(|item| item.as_ref().trim())
        .filter(|item| !item.is_empty())
        .map(|item| format!("'{}'", escape_literal(item)))
        .collect();

    if items.is_empty() {
        format!("const {name} = [];")
    } else {
        format!("const {name} = [\n  {}\n];", items.join(",\n  "))
    }
}

/// Replace list `name` with `items`, inserting it before the exports when absent.
pub fn regenerate<S: AsRef<str>>(text: &str, name: &str, items: &[S]) -> String {
    let span = find_list(text, name).map(|(block, _)| block);
    splice(text, span, &render(name, items))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "\
// cards
const GENDERS = [
  'Мужской',
  'Женский'
];

const BODIES = ['Худое', 'Полное'];

module.exports = { GENDERS, BODIES };
";

    #[test]
    fn test_parse_list() {
        assert_eq!(parse(DOC, "GENDERS"), vec!["Мужской", "Женский"]);
        assert_eq!(parse(DOC, "BODIES"), vec!["Худое", "Полное"]);
    }

    #[test]
    fn test_parse_missing_list() {
        assert!(parse(DOC, "PHOBIAS").is_empty());
    }

    #[test]
    fn test_regenerate_appends_item() {
        let out = regenerate(DOC, "GENDERS", &["Мужской", "Женский", "Другое"]);
        assert_eq!(parse(&out, "GENDERS"), vec!["Мужской", "Женский", "Другое"]);
        assert!(out.contains("const GENDERS = [\n  'Мужской',\n  'Женский',\n  'Другое'\n];"));
        // Neighbours are untouched
        assert!(out.starts_with("// cards\n"));
        assert!(out.contains("const BODIES = ['Худое', 'Полное'];"));
    }

    #[test]
    fn test_regenerate_trims_and_drops_blank() {
        let out = regenerate(DOC, "BODIES", &["  Худое ", "", "   ", "Спортивное"]);
        assert_eq!(parse(&out, "BODIES"), vec!["Худое", "Спортивное"]);
    }

    #[test]
    fn test_regenerate_inserts_missing_list() {
        let out = regenerate(DOC, "PHOBIAS", &["Темнота"]);
        assert!(out.contains("const PHOBIAS = [\n  'Темнота'\n];\n\nmodule.exports = {"));
        assert_eq!(parse(&out, "PHOBIAS"), vec!["Темнота"]);
    }

    #[test]
    fn test_regenerate_is_idempotent() {
        let items = ["a", "b's", "c\\d"];
        let once = regenerate(DOC, "GENDERS", &items);
        let twice = regenerate(&once, "GENDERS", &items);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_round_trip_any_document() {
        let items = vec!["x".to_string(), "it's".to_string(), "две\nстроки".to_string()];
        for doc in ["", "const X = [];", DOC] {
            let out = regenerate(doc, "EXTRAS", &items);
            assert_eq!(parse(&out, "EXTRAS"), items);
        }
    }

    #[test]
    fn test_item_with_closing_bracket() {
        let out = regenerate(DOC, "GENDERS", &["a];", "b"]);
        assert_eq!(parse(&out, "GENDERS"), vec!["a];", "b"]);
        assert!(out.contains("const BODIES = ['Худое', 'Полное'];"));
    }

    #[test]
    fn test_regenerate_empty_list() {
        let out = regenerate(DOC, "BODIES", &[] as &[&str]);
        assert!(out.contains("const BODIES = [];"));
        assert!(parse(&out, "BODIES").is_empty());
    }
}
