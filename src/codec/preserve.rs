//! Carry the `ABILITIES` block through every save.
//!
//! The editor never offers this block for editing. After all other codecs
//! have run, the block must still be present exactly as it was in the
//! document that was loaded for this request.

use super::{insert_before_exports, scan};

/// The block that is never edited.
pub const PRESERVED: &str = "ABILITIES";

/// Written when neither the candidate nor the original document has the block.
pub const PLACEHOLDER: &str = "const ABILITIES = [\n  // редактор не изменяет этот блок\n];";

/// Exact text of block `name` (from `const` through `];`), if present.
pub fn extract_verbatim<'a>(text: &'a str, name: &str) -> Option<&'a str> {
    scan::find_block_span(text, name).map(|span| &text[span])
}

/// Whether the document carries the preserved block.
pub fn is_present(text: &str) -> bool {
    extract_verbatim(text, PRESERVED).is_some()
}

/// Make sure `candidate` contains the preserved block.
///
/// Order of preference: the candidate's own block, the original document's
/// block (inserted before the exports), then [`PLACEHOLDER`].
pub fn ensure_preserved(original: &str, candidate: &str) -> String {
    if is_present(candidate) {
        return candidate.to_owned();
    }
    let block = extract_verbatim(original, PRESERVED).unwrap_or(PLACEHOLDER);
    insert_before_exports(candidate, block)
}
