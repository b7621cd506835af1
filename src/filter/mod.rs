//! The exclusion filter.
//!
//! For one document:
//!
//! 1. collect every element carrying the exclusion class
//! 2. take their `id`s
//! 3. collect the links inside the table-of-contents container
//! 4. add the hidden class to every link whose resolved URL matches an id
//!
//! The pass never fails. A page without markers or without a TOC is left alone,
//! and running it twice changes nothing the second time.

mod matcher;

pub use matcher::{MatchMode, resolve_href};

use serde::Serialize;
use url::Url;

use crate::config::FilterConfig;
use crate::dom::DocumentLike;

/// An element marked for exclusion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExcludedElement {
    /// `None` when the element has no `id` or an empty one.
    pub id: Option<String>,
    pub text: String,
}

/// A table-of-contents link matched by an excluded id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HiddenLink {
    pub href: String,
    /// First excluded id that matched.
    pub matched: String,
    /// `false` when the link already carried the hidden class.
    pub newly_hidden: bool,
}

/// What one filter pass found and did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterReport {
    pub excluded: Vec<ExcludedElement>,
    pub hidden: Vec<HiddenLink>,
    /// Number of links inspected inside the TOC.
    pub toc_links: usize,
}

impl FilterReport {
    /// Whether the pass mutated the document.
    pub fn changed(&self) -> bool {
        self.hidden.iter().any(|link| link.newly_hidden)
    }

    pub fn newly_hidden(&self) -> usize {
        self.hidden.iter().filter(|link| link.newly_hidden).count()
    }

    /// Excluded elements without an `id`.
    pub fn missing_ids(&self) -> usize {
        self.excluded.iter().filter(|e| e.id.is_none()).count()
    }

    /// Display text of the excluded elements as a JSON array, e.g. `["Legacy"]`.
    pub fn excluded_text_line(&self) -> String {
        let texts: Vec<&str> = self.excluded.iter().map(|e| e.text.as_str()).collect();
        serde_json::to_string(&texts).unwrap_or_else(|_| "[]".to_string())
    }
}

/// Run the exclusion filter over `doc`.
///
/// `page_url` is the address the page is served at; when known, link hrefs are
/// resolved against it before matching.
pub fn apply<D: DocumentLike>(
    doc: &mut D,
    config: &FilterConfig,
    page_url: Option<&Url>,
) -> FilterReport {
    let excluded: Vec<ExcludedElement> = doc
        .elements_by_class(&config.exclude_class)
        .into_iter()
        .map(|handle| ExcludedElement {
            id: doc
                .attr(handle, "id")
                .filter(|id| !id.is_empty())
                .map(str::to_string),
            text: doc.text(handle),
        })
        .collect();

    // A missing id reads as "", which every URL contains as a substring
    let ids: Vec<&str> = excluded
        .iter()
        .filter_map(|e| match (e.id.as_deref(), config.match_mode) {
            (Some(id), _) => Some(id),
            (None, MatchMode::Substring) => Some(""),
            (None, MatchMode::Fragment) => None,
        })
        .collect();

    let links = doc.descendants_within(&config.toc_container, &config.link_tag);
    let mut hidden = Vec::new();

    if !ids.is_empty() {
        for &link in &links {
            let Some(href) = doc.attr(link, "href") else {
                continue;
            };
            let url = resolve_href(page_url, href);
            let Some(matched) = ids.iter().find(|id| config.match_mode.matches(&url, id)) else {
                continue;
            };

            let entry = HiddenLink {
                href: href.to_string(),
                matched: matched.to_string(),
                newly_hidden: false,
            };
            hidden.push((link, entry));
        }
    }

    let hidden = hidden
        .into_iter()
        .map(|(link, mut entry)| {
            entry.newly_hidden = doc.add_class(link, &config.hidden_class);
            entry
        })
        .collect();

    FilterReport {
        toc_links: links.len(),
        excluded,
        hidden,
    }
}
