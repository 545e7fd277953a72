//! Extraction and regeneration of named blocks in `cards.js`.
//!
//! The data module is a sequence of `const NAME = [ ... ];` declarations
//! followed by `module.exports = { ... };`. Nothing here parses JavaScript:
//! each codec recognizes one known declaration shape, replaces only that
//! span, and leaves every other byte of the document alone.
//!
//! | Codec        | Block(s)                            | Shape                    |
//! |--------------|-------------------------------------|--------------------------|
//! | `list`       | `GENDERS` .. `EXTRAS`               | single-quoted strings    |
//! | `bunker`     | `BUNKERS`                           | object literals          |
//! | `cataclysm`  | `CATAclySMS`                        | object literals          |
//! | `preserve`   | `ABILITIES`                         | never edited, only kept  |
//!
//! When a name is declared more than once, only the first declaration is
//! read and only the first is replaced.

pub mod bunker;
pub mod cataclysm;
pub mod list;
pub mod preserve;
pub mod record;
pub mod scan;

use regex::Regex;
use std::{ops::Range, sync::LazyLock};

/// Simple list constants in form order, with their display labels.
pub const LIST_KEYS: &[(&str, &str)] = &[
    ("GENDERS", "Пол"),
    ("BODIES", "Телосложение"),
    ("TRAITS", "Человеческая черта"),
    ("PROFESSIONS", "Профессия"),
    ("HEALTHS", "Здоровье"),
    ("HOBBIES", "Хобби/Увлечение"),
    ("PHOBIAS", "Фобия/Страх"),
    ("BIG_ITEMS", "Крупный инвентарь"),
    ("BACKPACK", "Рюкзак"),
    ("EXTRAS", "Доп. сведение"),
];

static DECLARATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"const\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*=\s*\[").unwrap());

static EXPORTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"module\.exports\s*=\s*\{").unwrap());

/// A single-quoted literal, allowing backslash escapes inside.
static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)'((?:[^'\\]|\\.)*)'").unwrap());

// ============================================================================
// Declarations
// ============================================================================

/// Locate the first `const <name> = [` header that sits in code.
///
/// Header-like text inside string literals or comments is skipped. The
/// returned range spans from `const` through the opening bracket.
pub fn find_declaration(text: &str, name: &str) -> Option<Range<usize>> {
    let mut code = scan::Structural::new(text).map(|(i, _)| i).peekable();
    DECLARATION
        .captures_iter(text)
        .filter(|caps| &caps[1] == name)
        .filter_map(|caps| caps.get(0))
        .find(|m| {
            // Matches come in order, so one pass over the code offsets suffices
            while code.next_if(|&i| i < m.start()).is_some() {}
            code.peek() == Some(&m.start())
        })
        .map(|m| m.range())
}

/// Insert a rendered block right before `module.exports = {`.
///
/// A module without an export statement gets the block appended instead,
/// so a new section is never silently dropped.
pub fn insert_before_exports(text: &str, block: &str) -> String {
    match EXPORTS.find(text) {
        Some(m) => format!(
            "{}{block}\n\nmodule.exports = {{{}",
            &text[..m.start()],
            &text[m.end()..]
        ),
        None => {
            let mut out = text.to_owned();
            if !out.is_empty() {
                if !out.ends_with('\n') {
                    out.push('\n');
                }
                out.push('\n');
            }
            out.push_str(block);
            out.push('\n');
            out
        }
    }
}

/// Replace `span` with `block`, or insert the block before the exports when absent.
pub fn splice(text: &str, span: Option<Range<usize>>, block: &str) -> String {
    match span {
        Some(span) => format!("{}{block}{}", &text[..span.start], &text[span.end..]),
        None => insert_before_exports(text, block),
    }
}

// ============================================================================
// String Literals
// ============================================================================

/// Collect every single-quoted literal in `inner`, unescaped, in source order.
pub fn string_literals(inner: &str) -> Vec<String> {
    QUOTED
        .captures_iter(inner)
        .map(|caps| unescape_literal(&caps[1]))
        .collect()
}

/// Escape text for a single-quoted, single-line literal.
///
/// CRLF is folded to LF and LF is written as the two characters `\n`, so a
/// multi-line description still occupies one line of the module.
pub fn escape_literal(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace("\r\n", "\n")
        .replace('\n', "\\n")
}

/// Inverse of [`escape_literal`]; unknown escapes are kept verbatim.
pub fn unescape_literal(s: &str) -> String {
    if !s.contains('\\') {
        return s.to_owned();
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(q @ ('\\' | '\'' | '"')) => out.push(q),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_declaration_first_match() {
        let text = "const A = [1];\nconst GENDERS = ['a'];\nconst GENDERS = ['b'];";
        let span = find_declaration(text, "GENDERS").unwrap();
        assert_eq!(&text[span.clone()], "const GENDERS = [");
        assert_eq!(span.start, 15);
    }

    #[test]
    fn test_find_declaration_exact_name() {
        let text = "const GENDERS_OLD = ['x'];";
        assert!(find_declaration(text, "GENDERS").is_none());
    }

    #[test]
    fn test_find_declaration_skips_strings_and_comments() {
        let text = "\
// const BUNKERS = [ disabled
const GENDERS = ['const BUNKERS = [', \"const BUNKERS = [\"];
/* const BUNKERS = [ */
const BUNKERS = [];";
        let span = find_declaration(text, "BUNKERS").unwrap();
        assert_eq!(&text[span.clone()], "const BUNKERS = [");
        assert_eq!(span.start, text.rfind("const BUNKERS").unwrap());
    }

    #[test]
    fn test_find_declaration_only_in_string() {
        assert!(find_declaration("const A = ['const B = ['];", "B").is_none());
    }

    #[test]
    fn test_insert_before_exports() {
        let text = "const A = [];\n\nmodule.exports  =  { A };\n";
        let out = insert_before_exports(text, "const B = [];");
        assert_eq!(
            out,
            "const A = [];\n\nconst B = [];\n\nmodule.exports = { A };\n"
        );
    }

    #[test]
    fn test_insert_without_exports_appends() {
        assert_eq!(
            insert_before_exports("const A = [];", "const B = [];"),
            "const A = [];\n\nconst B = [];\n"
        );
        assert_eq!(insert_before_exports("", "const B = [];"), "const B = [];\n");
    }

    #[test]
    fn test_escape_literal() {
        assert_eq!(escape_literal("it's"), "it\\'s");
        assert_eq!(escape_literal("a\\b"), "a\\\\b");
        assert_eq!(escape_literal("line1\r\nline2\nline3"), "line1\\nline2\\nline3");
    }

    #[test]
    fn test_unescape_inverts_escape() {
        for s in ["plain", "it's", "C:\\temp", "две\nстроки", "\\n literal"] {
            assert_eq!(unescape_literal(&escape_literal(s)), s);
        }
    }

    #[test]
    fn test_unescape_keeps_unknown_escapes() {
        assert_eq!(unescape_literal("\\u0041"), "\\u0041");
        assert_eq!(unescape_literal("trailing\\"), "trailing\\");
    }

    #[test]
    fn test_string_literals() {
        let inner = "\n  'Мужской',\n  'Женский', 'it\\'s'\n";
        assert_eq!(string_literals(inner), vec!["Мужской", "Женский", "it's"]);
    }
}
