//! Link-to-identifier matching.

use std::borrow::Cow;

use clap::ValueEnum;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use url::Url;

/// How an excluded identifier is compared against a link URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// The identifier appears anywhere in the URL (`a` also hides `#ab`).
    #[default]
    Substring,
    /// The URL fragment, percent-decoded, equals the identifier.
    Fragment,
}

impl MatchMode {
    pub fn matches(self, url: &str, id: &str) -> bool {
        match self {
            Self::Substring => url.contains(id),
            Self::Fragment => fragment(url).is_some_and(|frag| frag == id),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Substring => "substring",
            Self::Fragment => "fragment",
        }
    }
}

/// Decoded fragment of `url`, without the leading `#`.
fn fragment(url: &str) -> Option<Cow<'_, str>> {
    let (_, frag) = url.split_once('#')?;
    Some(percent_decode_str(frag).decode_utf8_lossy())
}

/// Resolve an `href` the way a browser computes `link.href`.
///
/// Without a page URL there is nothing to resolve against and the attribute
/// is used as written. Unparseable hrefs are also kept as written.
pub fn resolve_href<'a>(page_url: Option<&Url>, href: &'a str) -> Cow<'a, str> {
    match page_url.and_then(|base| base.join(href.trim()).ok()) {
        Some(resolved) => Cow::Owned(resolved.into()),
        None => Cow::Borrowed(href),
    }
}
