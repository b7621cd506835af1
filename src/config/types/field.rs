//! Config field paths.

/// Dotted key of a config value, e.g. `filter.hidden_class`.
///
/// Sections declare one associated constant per validated key, so a
/// diagnostic can only name a key that exists:
///
/// ```ignore
/// diag.error(FilterConfig::HIDDEN_CLASS, "class name must not be empty");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath(&'static str);

impl FieldPath {
    pub const fn new(path: &'static str) -> Self {
        Self(path)
    }

    pub const fn as_str(self) -> &'static str {
        self.0
    }
}
