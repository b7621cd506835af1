//! HTML text helpers shared by the tree and the renderer.
//!
//! - `escape_attr()` - escape a value for a double-quoted attribute
//! - `collapse_whitespace()` - rendered-text whitespace folding
//! - `is_raw_text_element()` - elements whose content is not rendered text

use std::borrow::Cow;

// =============================================================================
// Escaping
// =============================================================================

/// Escape an attribute value for output inside double quotes.
///
/// Only `&` and `"` are significant there. Borrowed when nothing changes.
#[inline]
pub fn escape_attr(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '"']) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Fold whitespace runs into single spaces and trim both ends.
///
/// Approximates what a browser reports as the rendered text of an element.
pub fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for word in s.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

// =============================================================================
// Element Classification
// =============================================================================

/// Raw text elements: content is not markup and is not rendered as text.
#[inline]
pub fn is_raw_text_element(tag: &str) -> bool {
    matches!(tag, "script" | "style")
}
