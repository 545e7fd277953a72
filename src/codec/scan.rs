//! Depth-aware structural scanning.
//!
//! A small state machine walks the text and reports only characters that sit
//! in plain code: string literals (`'`, `"`, `` ` ``, with backslash escapes),
//! `//` line comments and `/* */` block comments are skipped, so a `]` inside a
//! description or a comment never closes an array.
//!
//! Malformed input (unbalanced brackets, unterminated strings) yields `None`
//! or fewer objects, never a panic.

use super::find_declaration;
use std::{iter::Peekable, ops::Range, str::CharIndices};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    Str(char),
    LineComment,
    BlockComment,
}

/// Iterator over `(byte_offset, char)` pairs that are outside strings and comments.
pub struct Structural<'a> {
    chars: Peekable<CharIndices<'a>>,
    state: State,
}

impl<'a> Structural<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            chars: text.char_indices().peekable(),
            state: State::Code,
        }
    }

    fn next_is(&mut self, expected: char) -> bool {
        matches!(self.chars.peek(), Some(&(_, c)) if c == expected)
    }
}

impl Iterator for Structural<'_> {
    type Item = (usize, char);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((i, c)) = self.chars.next() {
            match self.state {
                State::Code => match c {
                    '\'' | '"' | '`' => self.state = State::Str(c),
                    '/' if self.next_is('/') => {
                        self.chars.next();
                        self.state = State::LineComment;
                    }
                    '/' if self.next_is('*') => {
                        self.chars.next();
                        self.state = State::BlockComment;
                    }
                    _ => return Some((i, c)),
                },
                State::Str(quote) => {
                    if c == '\\' {
                        self.chars.next();
                    } else if c == quote {
                        self.state = State::Code;
                    }
                }
                State::LineComment => {
                    if c == '\n' {
                        self.state = State::Code;
                        return Some((i, c));
                    }
                }
                State::BlockComment => {
                    if c == '*' && self.next_is('/') {
                        self.chars.next();
                        self.state = State::Code;
                    }
                }
            }
        }
        None
    }
}

/// Find the `]` that closes an array whose content starts at `from`.
///
/// `from` is the offset just past the opening `[`; the result is the offset
/// of the matching `]`.
pub fn matching_bracket(text: &str, from: usize) -> Option<usize> {
    let mut depth = 1usize;
    for (i, c) in Structural::new(text.get(from..)?) {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(from + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Span of the inner content of `const <name> = [ ... ]`, brackets excluded.
///
/// Returns `None` when the declaration is absent or its brackets never balance.
pub fn find_array_span(text: &str, name: &str) -> Option<Range<usize>> {
    let header = find_declaration(text, name)?;
    let close = matching_bracket(text, header.end)?;
    Some(header.end..close)
}

/// Span of the whole declaration, from `const` through the closing `];`.
///
/// The trailing `;` (and whitespace before it) is included when present.
pub fn find_block_span(text: &str, name: &str) -> Option<Range<usize>> {
    let header = find_declaration(text, name)?;
    let close = matching_bracket(text, header.end)?;
    let after = close + 1;
    let rest = &text[after..];
    let trimmed = rest.trim_start();
    let end = if trimmed.starts_with(';') {
        after + (rest.len() - trimmed.len()) + 1
    } else {
        after
    };
    Some(header.start..end)
}

/// Split array content into its top-level `{ ... }` object literals.
///
/// Anything between objects (commas, whitespace, stray tokens) is ignored;
/// an object left open at the end of the block is dropped.
pub fn split_top_level_objects(block: &str) -> Vec<&str> {
    let mut objects = Vec::new();
    let mut depth = 0usize;
    let mut start = None;

    for (i, c) in Structural::new(block) {
        match c {
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0
                    && let Some(s) = start.take()
                {
                    objects.push(&block[s..=i]);
                }
            }
            _ => {}
        }
    }
    objects
}
