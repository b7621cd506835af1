//! HTML source to [`Document`] conversion using `scraper` (html5ever).
//!
//! The tree comes from a conforming HTML5 parser, so implied end tags, raw
//! text elements and misnested markup end up where a browser puts them. Each
//! element is then tied back to its start tag in the source for rendering.

use rustc_hash::FxHashMap;
use scraper::{Html, Node};

use super::source::{StartTag, attr_key, scan_start_tags};
use super::{Document, Element, NodeId, NodeKind};

impl Document {
    /// Parse a full HTML page. Never fails: malformed markup is recovered the
    /// way a browser recovers it.
    pub fn parse(html: &str) -> Self {
        let parsed = Html::parse_document(html);

        let mut doc = Document::new();
        // The document node itself maps to "no parent", so its children become roots
        let mut handles = FxHashMap::default();
        handles.insert(parsed.tree.root().id(), None::<NodeId>);

        // Pre-order, so every parent is converted before its children
        for node in parsed.tree.root().descendants() {
            let Some(parent) = node.parent() else {
                continue;
            };
            let kind = match node.value() {
                Node::Element(elem) => {
                    let mut element = Element::new(elem.name());
                    for (name, value) in elem.attrs() {
                        element.attrs.push((name.to_string(), Some(value.to_string())));
                    }
                    NodeKind::Element(element)
                }
                Node::Text(text) => NodeKind::Text(String::from(&**text)),
                _ => continue,
            };
            let parent = handles.get(&parent.id()).copied().flatten();
            handles.insert(node.id(), Some(doc.append(parent, kind)));
        }

        let tags = scan_start_tags(html);
        link_start_tags(&mut doc, &tags);
        doc.set_source(html, tags);
        doc
    }
}

/// Tie elements to the start tags they came from.
///
/// The k-th `<name>` element of the tree is the k-th `<name>` start tag of the
/// source, as long as the parser neither invented nor dropped any element of
/// that name. Names failing that check (implied `<tbody>`, merged duplicate
/// `<body>` tags, formatting elements the parser cloned, ...) stay unlinked.
fn link_start_tags(doc: &mut Document, tags: &[StartTag]) {
    let mut in_source: FxHashMap<&str, Vec<usize>> = FxHashMap::default();
    for (index, tag) in tags.iter().enumerate() {
        in_source.entry(tag.name.as_str()).or_default().push(index);
    }

    let mut in_tree: FxHashMap<String, Vec<NodeId>> = FxHashMap::default();
    for (id, elem) in doc.elements() {
        in_tree.entry(elem.name.clone()).or_default().push(id);
    }

    for (name, ids) in in_tree {
        let Some(indices) = in_source.get(name.as_str()) else {
            continue;
        };
        if indices.len() != ids.len() {
            continue;
        }
        let aligned = ids
            .iter()
            .zip(indices)
            .all(|(&id, &index)| doc.element(id).is_some_and(|elem| same_attributes(elem, &tags[index])));
        if !aligned {
            continue;
        }
        for (&id, &index) in ids.iter().zip(indices) {
            if let Some(elem) = doc.element_mut(id) {
                elem.source_tag = Some(index);
            }
        }
    }
}

fn same_attributes(elem: &Element, tag: &StartTag) -> bool {
    let mut keys: Vec<String> = elem.attrs.iter().map(|(name, _)| attr_key(name)).collect();
    keys.sort_unstable();
    keys.dedup();
    keys == tag.attr_keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{AttrSelector, DocumentLike};

    fn first(doc: &Document, name: &str) -> NodeId {
        doc.elements()
            .find(|(_, elem)| elem.name == name)
            .map(|(id, _)| id)
            .unwrap()
    }

    #[test]
    fn test_parse_exclusion_markers() {
        let doc = Document::parse(
            r#"<main><div class="exclude" id="legacy-notes">Legacy</div><p class="note">Keep</p></main>"#,
        );

        let excluded = doc.elements_by_class("exclude");
        assert_eq!(excluded.len(), 1);
        assert_eq!(doc.attr(excluded[0], "id"), Some("legacy-notes"));
        assert_eq!(doc.text(excluded[0]), "Legacy");
    }

    #[test]
    fn test_parse_toc_links() {
        let doc = Document::parse(
            r##"<nav data-md-component="toc"><ul><li><a href="#intro">Intro</a></li><li><a href="#usage">Usage</a></li></ul></nav><a href="#outside">x</a>"##,
        );

        let links = doc.descendants_within(&AttrSelector::default(), "a");
        let hrefs: Vec<_> = links.iter().filter_map(|&l| doc.attr(l, "href")).collect();
        assert_eq!(hrefs, vec!["#intro", "#usage"]);
    }

    #[test]
    fn test_parse_implied_end_tags_close_the_toc() {
        // `</ul>` closes the open `<li>`, `</nav>` then closes the container
        let doc = Document::parse(
            r##"<nav data-md-component="toc"><ul><li><a href="#intro">Intro</a></ul></nav><div class="exclude" id="x">X</div><p><a href="#x-ref">body link</a></p>"##,
        );

        let links = doc.descendants_within(&AttrSelector::default(), "a");
        assert_eq!(links.len(), 1);
        assert_eq!(doc.attr(links[0], "href"), Some("#intro"));
    }

    #[test]
    fn test_parse_decodes_attributes_and_text() {
        let doc = Document::parse(r#"<a href="?a=1&amp;b=2">Q &amp; A</a>"#);
        let a = first(&doc, "a");
        assert_eq!(doc.attr(a, "href"), Some("?a=1&b=2"));
        assert_eq!(doc.text(a), "Q & A");
    }

    #[test]
    fn test_parse_script_is_not_markup() {
        let doc = Document::parse(
            r#"<script>if (a<b && c>d) { document.write("<p>hi</p>"); }</script><p class="exclude" id="x">X</p>"#,
        );
        assert_eq!(doc.elements().filter(|(_, elem)| elem.name == "p").count(), 1);
        assert_eq!(doc.elements().filter(|(_, elem)| elem.name == "b").count(), 0);
    }

    #[test]
    fn test_parse_links_elements_to_start_tags() {
        let html = r##"<nav data-md-component="toc"><a href="#one">1</a><a class="x" href="#two">2</a></nav>"##;
        let doc = Document::parse(html);

        let links: Vec<&Element> = doc
            .elements()
            .filter(|(_, elem)| elem.name == "a")
            .map(|(_, elem)| elem)
            .collect();
        let first_tag = doc.start_tag(links[0].source_tag.unwrap()).unwrap();
        let second_tag = doc.start_tag(links[1].source_tag.unwrap()).unwrap();
        assert_eq!(first_tag.class, None);
        assert_eq!(&html[second_tag.class.clone().unwrap()], r#"class="x""#);

        // Implied by the parser, not written in the source
        let body = first(&doc, "body");
        assert_eq!(doc.element(body).unwrap().source_tag, None);
    }

    #[test]
    fn test_parse_cloned_formatting_element_is_unlinked() {
        // The parser reopens `<a>` inside the second paragraph
        let doc = Document::parse(r##"<p><a href="#x">one<p>two</a>"##);
        let count = doc.elements().filter(|(_, elem)| elem.name == "a").count();
        assert_eq!(count, 2);
        assert!(
            doc.elements()
                .filter(|(_, elem)| elem.name == "a")
                .all(|(_, elem)| elem.source_tag.is_none())
        );
    }
}
