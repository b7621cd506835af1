//! Arena-backed HTML tree.

use super::source::StartTag;
use super::{AttrSelector, DocumentLike};
use crate::utils::html::{collapse_whitespace, is_raw_text_element};

/// Index of a node inside its [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element(Element),
    /// Character data, entities decoded.
    Text(String),
}

/// An element with lowercase tag name and ordered attributes.
///
/// Attribute values are stored decoded; `None` is a bare attribute (`<a download>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, Option<String>)>,
    /// Index of the start tag this element was parsed from, if it could be located.
    pub(super) source_tag: Option<usize>,
    pub(super) class_edited: bool,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_lowercase(),
            attrs: Vec::new(),
            source_tag: None,
            class_edited: false,
        }
    }

    /// Builder-style attribute setter for fixtures.
    #[cfg(test)]
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_deref().unwrap_or(""))
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        match self
            .attrs
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            Some((_, slot)) => *slot = Some(value.to_string()),
            None => self.attrs.push((name.to_string(), Some(value.to_string()))),
        }
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.get_attr("class")
            .unwrap_or("")
            .split_ascii_whitespace()
    }

    #[inline]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Append `class` unless already present. Existing tokens and spacing are kept.
    pub fn add_class(&mut self, class: &str) -> bool {
        if self.has_class(class) {
            return false;
        }
        let value = match self.get_attr("class").map(str::trim_end) {
            Some(existing) if !existing.is_empty() => format!("{existing} {class}"),
            _ => class.to_string(),
        };
        self.set_attr("class", &value);
        self.class_edited = true;
        true
    }
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    children: Vec<NodeId>,
}

/// A parsed (or hand-built) HTML document.
///
/// A parsed document keeps its source text and the start tags located in it,
/// so rendering can rewrite edited attributes in place.
#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    source: String,
    tags: Vec<StartTag>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub(super) fn set_source(&mut self, source: &str, tags: Vec<StartTag>) {
        self.source = source.to_string();
        self.tags = tags;
    }

    pub(super) fn source(&self) -> &str {
        &self.source
    }

    pub(super) fn start_tag(&self, index: usize) -> Option<&StartTag> {
        self.tags.get(index)
    }

    /// Append a node under `parent`, or at the top level when `None`.
    pub fn append(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            children: Vec::new(),
        });
        match parent {
            Some(parent) => self.nodes[parent.0].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    /// Shorthand for appending an element.
    pub fn append_element(&mut self, parent: Option<NodeId>, element: Element) -> NodeId {
        self.append(parent, NodeKind::Element(element))
    }

    /// Shorthand for appending a text node.
    #[cfg(test)]
    pub fn append_text(&mut self, parent: Option<NodeId>, text: &str) -> NodeId {
        self.append(parent, NodeKind::Text(text.to_string()))
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(elem) => Some(elem),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Element(elem) => Some(elem),
            _ => None,
        }
    }

    /// Every element with its handle, in the order appended (document order
    /// for a parsed page).
    pub fn elements(&self) -> impl Iterator<Item = (NodeId, &Element)> {
        self.nodes.iter().enumerate().filter_map(|(i, node)| match &node.kind {
            NodeKind::Element(elem) => Some((NodeId(i), elem)),
            NodeKind::Text(_) => None,
        })
    }

    /// Depth-first, document-order walk. `visit` receives each node and
    /// whether one of its ancestors matched `scope`.
    fn walk_scoped(&self, scope: Option<&AttrSelector>, mut visit: impl FnMut(NodeId, bool)) {
        let mut stack: Vec<(NodeId, bool)> = self.roots.iter().rev().map(|&id| (id, false)).collect();

        while let Some((id, inside)) = stack.pop() {
            visit(id, inside);

            let opens_scope = scope.is_some_and(|sel| {
                self.element(id)
                    .is_some_and(|elem| sel.matches(elem.get_attr(&sel.name)))
            });
            let child_inside = inside || opens_scope;

            for &child in self.children(id).iter().rev() {
                stack.push((child, child_inside));
            }
        }
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element(elem) => {
                if is_raw_text_element(&elem.name) {
                    return;
                }
                // Keep words from adjacent elements apart
                if elem.name == "br" {
                    out.push(' ');
                }
                for &child in self.children(id) {
                    self.collect_text(child, out);
                }
            }
        }
    }
}

impl DocumentLike for Document {
    type Handle = NodeId;

    fn elements_by_class(&self, class: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.walk_scoped(None, |id, _| {
            if self.element(id).is_some_and(|elem| elem.has_class(class)) {
                found.push(id);
            }
        });
        found
    }

    fn descendants_within(&self, container: &AttrSelector, tag: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.walk_scoped(Some(container), |id, inside| {
            if inside
                && self
                    .element(id)
                    .is_some_and(|elem| elem.name.eq_ignore_ascii_case(tag))
            {
                found.push(id);
            }
        });
        found
    }

    fn attr(&self, handle: NodeId, name: &str) -> Option<&str> {
        self.element(handle)?.get_attr(name)
    }

    fn text(&self, handle: NodeId) -> String {
        let mut raw = String::new();
        self.collect_text(handle, &mut raw);
        collapse_whitespace(&raw)
    }

    fn add_class(&mut self, handle: NodeId, class: &str) -> bool {
        self.element_mut(handle)
            .is_some_and(|elem| elem.add_class(class))
    }
}
