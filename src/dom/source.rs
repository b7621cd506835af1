//! Start-tag positions in the page source.
//!
//! Rewriting only touches `class` attributes, so instead of serializing the
//! parsed tree the renderer splices new values into the original bytes. This
//! module finds where each start tag sits. It follows the HTML tokenizer
//! closely enough to agree with the parser on which `<` opens a tag: comments,
//! doctypes, end tags and the bodies of raw text elements (`script`, `style`,
//! `textarea`, ...) produce no start tags.

use std::ops::Range;

/// A start tag located in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    /// Lowercase tag name.
    pub name: String,
    /// Attribute keys (see [`attr_key`]), sorted and deduplicated.
    pub attr_keys: Vec<String>,
    /// The first `class` attribute, from its name to the end of its value.
    pub class: Option<Range<usize>>,
    /// Where a new attribute goes: before `>`, or before `/>`.
    pub insert_at: usize,
}

/// Normalized attribute name for comparing the source with the parsed tree:
/// lowercase, namespace prefix dropped (`xlink:href` -> `href`).
pub fn attr_key(name: &str) -> String {
    let local = name.rsplit(':').next().unwrap_or(name);
    local.to_ascii_lowercase()
}

/// Every start tag in `html`, in source order.
///
/// A tag cut off by the end of input is not reported, as the parser drops it too.
pub fn scan_start_tags(html: &str) -> Vec<StartTag> {
    let bytes = html.as_bytes();
    let mut tags = Vec::new();
    let mut pos = 0;

    while let Some(offset) = find_lt(&bytes[pos..]) {
        let lt = pos + offset;
        let next = bytes.get(lt + 1).copied();

        pos = match next {
            Some(b'!') => skip_markup_declaration(bytes, lt),
            Some(b'?') => skip_past(bytes, lt, b">"),
            Some(b'/') => skip_end_tag(bytes, lt),
            Some(c) if c.is_ascii_alphabetic() => match read_start_tag(html, lt) {
                Some((tag, end)) => {
                    let body_end = raw_text_end(html, &tag.name, end);
                    tags.push(tag);
                    body_end
                }
                None => break,
            },
            _ => lt + 1,
        };
    }

    tags
}

fn find_lt(bytes: &[u8]) -> Option<usize> {
    bytes.iter().position(|&b| b == b'<')
}

#[inline]
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0C')
}

/// Index just past the first `needle` at or after `from`, or the end of input.
fn skip_past(bytes: &[u8], from: usize, needle: &[u8]) -> usize {
    bytes[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map_or(bytes.len(), |i| from + i + needle.len())
}

/// `<!-- ... -->`, `<!DOCTYPE ...>`, `<![CDATA[ ... ]]>` and bogus `<!...>`.
fn skip_markup_declaration(bytes: &[u8], lt: usize) -> usize {
    let rest = &bytes[lt..];
    if rest.starts_with(b"<!--") {
        let body = lt + 4;
        // `<!-->` and `<!--->` are complete (empty) comments
        if bytes.get(body) == Some(&b'>') {
            return body + 1;
        }
        if bytes[body..].starts_with(b"->") {
            return body + 2;
        }
        let dashes = skip_past(bytes, body, b"-->");
        let bang = skip_past(bytes, body, b"--!>");
        return dashes.min(bang);
    }
    skip_past(bytes, lt, b">")
}

/// `</name ...>`; `</>` is dropped and `</` before a non-letter is a bogus comment.
fn skip_end_tag(bytes: &[u8], lt: usize) -> usize {
    match bytes.get(lt + 2) {
        Some(c) if c.is_ascii_alphabetic() => {
            // End tags tokenize attributes too, so a quoted `>` does not close them
            let mut pos = lt + 2;
            while pos < bytes.len() && !is_space(bytes[pos]) && !matches!(bytes[pos], b'/' | b'>') {
                pos += 1;
            }
            skip_attributes(bytes, pos).map_or(bytes.len(), |(_, end)| end)
        }
        Some(b'>') => lt + 3,
        _ => skip_past(bytes, lt, b">"),
    }
}

/// One attribute as written.
struct RawAttr {
    name: Range<usize>,
    /// Name start to the end of the value (or of the name when bare).
    whole: Range<usize>,
}

/// Walk the attributes of a tag starting at `pos` (just after the name).
///
/// Returns the attributes, the insertion point and the index past `>`.
/// `None` when the input ends inside the tag.
fn read_attributes(bytes: &[u8], mut pos: usize) -> Option<(Vec<RawAttr>, usize, usize)> {
    let mut attrs = Vec::new();

    loop {
        while pos < bytes.len() && is_space(bytes[pos]) {
            pos += 1;
        }
        match *bytes.get(pos)? {
            b'>' => return Some((attrs, pos, pos + 1)),
            b'/' => {
                if bytes.get(pos + 1) == Some(&b'>') {
                    return Some((attrs, pos, pos + 2));
                }
                pos += 1;
                continue;
            }
            _ => {}
        }

        // A leading `=` belongs to the name
        let name_start = pos;
        pos += 1;
        while pos < bytes.len() && !is_space(bytes[pos]) && !matches!(bytes[pos], b'/' | b'>' | b'=') {
            pos += 1;
        }
        let name = name_start..pos;

        let mut lookahead = pos;
        while lookahead < bytes.len() && is_space(bytes[lookahead]) {
            lookahead += 1;
        }
        if bytes.get(lookahead) != Some(&b'=') {
            attrs.push(RawAttr {
                whole: name.clone(),
                name,
            });
            continue;
        }

        pos = lookahead + 1;
        while pos < bytes.len() && is_space(bytes[pos]) {
            pos += 1;
        }
        let value_end = match *bytes.get(pos)? {
            quote @ (b'"' | b'\'') => {
                let close = bytes[pos + 1..].iter().position(|&b| b == quote)?;
                pos + 1 + close + 1
            }
            // `<a href=>` has an empty value; `>` closes the tag
            b'>' => pos,
            _ => {
                let mut end = pos;
                while end < bytes.len() && !is_space(bytes[end]) && bytes[end] != b'>' {
                    end += 1;
                }
                if end == bytes.len() {
                    return None;
                }
                end
            }
        };
        attrs.push(RawAttr {
            whole: name_start..value_end,
            name,
        });
        pos = value_end;
    }
}

fn skip_attributes(bytes: &[u8], pos: usize) -> Option<(usize, usize)> {
    read_attributes(bytes, pos).map(|(_, insert_at, end)| (insert_at, end))
}

/// Read the start tag at `lt`. Returns the tag and the index past its `>`.
fn read_start_tag(html: &str, lt: usize) -> Option<(StartTag, usize)> {
    let bytes = html.as_bytes();
    let name_start = lt + 1;
    let mut pos = name_start;
    while pos < bytes.len() && !is_space(bytes[pos]) && !matches!(bytes[pos], b'/' | b'>') {
        pos += 1;
    }
    let name = html[name_start..pos].to_ascii_lowercase();

    let (raw_attrs, insert_at, end) = read_attributes(bytes, pos)?;

    let mut attr_keys: Vec<String> = raw_attrs
        .iter()
        .map(|attr| attr_key(&html[attr.name.clone()]))
        .collect();
    // Later duplicates are dropped by the parser, so only the first counts
    let class = raw_attrs
        .iter()
        .find(|attr| html[attr.name.clone()].eq_ignore_ascii_case("class"))
        .map(|attr| attr.whole.clone());
    attr_keys.sort_unstable();
    attr_keys.dedup();

    let tag = StartTag {
        name,
        attr_keys,
        class,
        insert_at,
    };
    Some((tag, end))
}

/// End of the text content of a raw text element opened by `name`, i.e. the
/// position of its closing `</name`. Other elements return `from` unchanged.
fn raw_text_end(html: &str, name: &str, from: usize) -> usize {
    match name {
        "script" | "style" | "xmp" | "iframe" | "noembed" | "noframes" | "noscript" | "textarea"
        | "title" => find_closing_tag(html.as_bytes(), name, from),
        "plaintext" => html.len(),
        _ => from,
    }
}

/// Position of the first `</name` followed by whitespace, `/` or `>`.
fn find_closing_tag(bytes: &[u8], name: &str, from: usize) -> usize {
    let name = name.as_bytes();
    let mut pos = from;

    while let Some(offset) = find_lt(&bytes[pos..]) {
        let lt = pos + offset;
        let name_end = lt + 2 + name.len();
        let closes = bytes.get(lt + 1) == Some(&b'/')
            && bytes
                .get(lt + 2..name_end)
                .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name))
            && bytes
                .get(name_end)
                .is_some_and(|&b| is_space(b) || matches!(b, b'/' | b'>'));
        if closes {
            return lt;
        }
        pos = lt + 1;
    }

    bytes.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(html: &str) -> Vec<String> {
        scan_start_tags(html).into_iter().map(|t| t.name).collect()
    }

    #[test]
    fn test_scan_basic_tags() {
        let html = r##"<!DOCTYPE html><html><body><a href="#x" class="md-nav__link">X</a></body></html>"##;
        let tags = scan_start_tags(html);
        assert_eq!(names(html), vec!["html", "body", "a"]);

        let a = &tags[2];
        assert_eq!(a.attr_keys, vec!["class", "href"]);
        assert_eq!(&html[a.class.clone().unwrap()], r#"class="md-nav__link""#);
        assert_eq!(&html[a.insert_at..a.insert_at + 1], ">");
    }

    #[test]
    fn test_scan_skips_script_body() {
        let html = r#"<script>if (a<b && c>d) { document.write("<p>hi</p>"); }</script><p>after</p>"#;
        assert_eq!(names(html), vec!["script", "p"]);
    }

    #[test]
    fn test_scan_closing_tag_needs_delimiter() {
        let html = "<script>var s = '</scripts>';</SCRIPT ><i>x</i>";
        assert_eq!(names(html), vec!["script", "i"]);
    }

    #[test]
    fn test_scan_skips_rcdata_and_comments() {
        let html = "<title>a <b> c</title><!-- <em> --><!--><textarea><u></textarea><?php <s> ?><p>";
        assert_eq!(names(html), vec!["title", "textarea", "p"]);
    }

    #[test]
    fn test_scan_end_tag_with_quoted_gt() {
        assert_eq!(names(r#"</div data-x=">"><span>"#), vec!["span"]);
    }

    #[test]
    fn test_scan_insertion_points() {
        let html = r#"<a href=foo/><br/><img src="x" />"#;
        let tags = scan_start_tags(html);

        // The unquoted value swallows the slash
        assert_eq!(&html[tags[0].insert_at..], r#"><br/><img src="x" />"#);
        assert_eq!(&html[tags[1].insert_at..tags[1].insert_at + 2], "/>");
        assert_eq!(&html[tags[2].insert_at..], "/>");
    }

    #[test]
    fn test_scan_first_class_and_bare_attribute() {
        let html = r#"<a class class="second"><b CLASS = 'x y' data-k>"#;
        let tags = scan_start_tags(html);
        assert_eq!(&html[tags[0].class.clone().unwrap()], "class");
        assert_eq!(tags[0].attr_keys, vec!["class"]);
        assert_eq!(&html[tags[1].class.clone().unwrap()], "CLASS = 'x y'");
        assert_eq!(tags[1].attr_keys, vec!["class", "data-k"]);
    }

    #[test]
    fn test_scan_drops_truncated_tag() {
        assert_eq!(names(r#"<p>ok</p><a href="unterminated"#), vec!["p"]);
        assert_eq!(names("a < b and 1<2"), Vec::<String>::new());
    }

    #[test]
    fn test_attr_key() {
        assert_eq!(attr_key("xlink:href"), "href");
        assert_eq!(attr_key("viewBox"), "viewbox");
        assert_eq!(attr_key("data-md-component"), "data-md-component");
    }
}
