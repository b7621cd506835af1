//! Writing a parsed [`Document`] back out.
//!
//! Only `class` attributes are ever edited, so the output is the original
//! source with those attributes replaced (or inserted). Everything else,
//! scripts, comments, whitespace and attribute order included, is kept
//! byte for byte.

use std::ops::Range;

use thiserror::Error;

use super::Document;
use crate::utils::html::escape_attr;

#[derive(Debug, Error)]
#[error("cannot locate the `<{0}>` start tag to rewrite")]
pub struct RenderError(String);

impl Document {
    /// The source with every edited `class` attribute written in.
    pub fn to_html(&self) -> Result<String, RenderError> {
        let mut edits: Vec<(Range<usize>, String)> = Vec::new();

        for (_, elem) in self.elements().filter(|(_, elem)| elem.class_edited) {
            let tag = elem
                .source_tag
                .and_then(|index| self.start_tag(index))
                .ok_or_else(|| RenderError(elem.name.clone()))?;
            let attr = format!("class=\"{}\"", escape_attr(elem.get_attr("class").unwrap_or("")));
            match &tag.class {
                Some(span) => edits.push((span.clone(), attr)),
                None => edits.push((tag.insert_at..tag.insert_at, format!(" {attr}"))),
            }
        }

        let source = self.source();
        if edits.is_empty() {
            return Ok(source.to_string());
        }

        edits.sort_unstable_by_key(|(span, _)| span.start);
        let mut out = String::with_capacity(source.len() + edits.len() * 16);
        let mut pos = 0;
        for (span, text) in edits {
            out.push_str(&source[pos..span.start]);
            out.push_str(&text);
            pos = span.end;
        }
        out.push_str(&source[pos..]);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use crate::dom::{AttrSelector, Document, DocumentLike, Element};

    fn hide_toc_links(doc: &mut Document) {
        for link in doc.descendants_within(&AttrSelector::default(), "a") {
            doc.add_class(link, "hidden");
        }
    }

    #[test]
    fn test_render_untouched_is_source() {
        let html = "<!doctype html>\n<p title='a &amp; b'>x<br/>  <!-- c --></P>";
        assert_eq!(Document::parse(html).to_html().unwrap(), html);
    }

    #[test]
    fn test_render_inserts_and_replaces_class() {
        let html = r##"<nav data-md-component="toc"><a href="#x" data-k=1>X</a><a CLASS = 'md-nav__link' href="#y" >Y</a><a href="#z"/></nav>"##;
        let mut doc = Document::parse(html);
        hide_toc_links(&mut doc);

        assert_eq!(
            doc.to_html().unwrap(),
            r##"<nav data-md-component="toc"><a href="#x" data-k=1 class="hidden">X</a><a class="md-nav__link hidden" href="#y" >Y</a><a href="#z" class="hidden"/></nav>"##
        );
    }

    #[test]
    fn test_render_keeps_inline_script() {
        let script = r#"<script>if (a<b && c>d) { document.write("<p>hi</p>"); }</script>"#;
        let html = format!(
            r##"<html><head>{script}</head><body><nav data-md-component="toc"><a href="#x">X</a></nav></body></html>"##
        );
        let mut doc = Document::parse(&html);
        hide_toc_links(&mut doc);

        let out = doc.to_html().unwrap();
        assert!(out.contains(script), "{out}");
        assert_eq!(out, html.replace(r##"<a href="#x">"##, r##"<a href="#x" class="hidden">"##));
    }

    #[test]
    fn test_render_escapes_class_value() {
        let mut doc = Document::parse(r##"<nav data-md-component="toc"><a href="#x">X</a></nav>"##);
        let link = doc.descendants_within(&AttrSelector::default(), "a")[0];
        doc.add_class(link, "say\"hi\"&");
        assert!(doc.to_html().unwrap().contains(r#"class="say&quot;hi&quot;&amp;""#));
    }

    #[test]
    fn test_render_unlinked_edit_is_error() {
        let mut doc = Document::new();
        let a = doc.append_element(None, Element::new("a"));
        doc.add_class(a, "hidden");
        let err = doc.to_html().unwrap_err();
        assert_eq!(err.to_string(), "cannot locate the `<a>` start tag to rewrite");
    }
}
