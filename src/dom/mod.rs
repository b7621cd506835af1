//! Queryable HTML documents.
//!
//! ```text
//! dom/
//! ├── selector   # AttrSelector: `[name="value"]`
//! ├── tree       # Document arena (NodeId handles)
//! ├── parse      # HTML -> Document (via scraper)
//! ├── source     # start-tag spans in the source text
//! └── render     # Document -> HTML (class edits spliced into the source)
//! ```
//!
//! The exclusion filter only talks to [`DocumentLike`], so it runs the same
//! against a parsed page or a hand-built test fixture.

mod parse;
mod render;
mod selector;
mod source;
mod tree;

pub use render::RenderError;
pub use selector::AttrSelector;
pub use tree::{Document, Element, NodeId, NodeKind};

/// A document exposing the handful of queries the filter needs.
pub trait DocumentLike {
    /// Opaque element reference, valid for the lifetime of the document.
    type Handle: Copy;

    /// Elements whose class list contains `class`, in document order.
    fn elements_by_class(&self, class: &str) -> Vec<Self::Handle>;

    /// `tag` elements (any case) that are descendants of an element matching
    /// `container`, in document order, each at most once.
    fn descendants_within(&self, container: &AttrSelector, tag: &str) -> Vec<Self::Handle>;

    /// Attribute value, entity-decoded.
    fn attr(&self, handle: Self::Handle, name: &str) -> Option<&str>;

    /// Rendered text of the element.
    fn text(&self, handle: Self::Handle) -> String;

    /// Add `class` to the element's class list. Returns `false` if already present.
    fn add_class(&mut self, handle: Self::Handle, class: &str) -> bool;
}
