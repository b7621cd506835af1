//! Shared helpers.

pub mod html;
pub mod path;

/// Return "s" suffix for plural counts
///
/// `plural_s(1)` -> `""`, anything else -> `"s"`.
#[inline]
pub fn plural_s(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Format count with noun, e.g. `3 pages`, `1 link`.
#[inline]
pub fn plural_count(count: usize, noun: &str) -> String {
    format!("{} {}{}", count, noun, plural_s(count))
}
