//! Attribute selectors used to locate the table-of-contents container.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// `[name]` or `[name=value]` with optional single or double quotes.
static RE_ATTR_SELECTOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^\[[ \t]*([A-Za-z_:][-A-Za-z0-9_:.]*)[ \t]*(?:=[ \t]*(?:"([^"]*)"|'([^']*)'|([^ \t"'\]]+))[ \t]*)?\]$"#,
    )
    .unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid attribute selector `{0}`, expected `[name]` or `[name=\"value\"]`")]
pub struct SelectorError(pub String);

/// Matches elements by the presence (and optionally the value) of one attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrSelector {
    pub name: String,
    pub value: Option<String>,
}

impl AttrSelector {
    pub fn new(name: impl Into<String>, value: Option<&str>) -> Self {
        Self {
            name: name.into().to_ascii_lowercase(),
            value: value.map(str::to_string),
        }
    }

    /// Check an element's attribute value against this selector.
    ///
    /// `attr` is the element's value for `self.name`, `None` when absent.
    #[inline]
    pub fn matches(&self, attr: Option<&str>) -> bool {
        match (&self.value, attr) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(expected), Some(actual)) => expected == actual,
        }
    }
}

impl Default for AttrSelector {
    fn default() -> Self {
        Self::new("data-md-component", Some("toc"))
    }
}

impl FromStr for AttrSelector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = RE_ATTR_SELECTOR
            .captures(s.trim())
            .ok_or_else(|| SelectorError(s.to_string()))?;

        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|m| m.as_str());

        Ok(Self::new(&caps[1], value))
    }
}

impl fmt::Display for AttrSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "[{}=\"{}\"]", self.name, value),
            None => write!(f, "[{}]", self.name),
        }
    }
}

impl Serialize for AttrSelector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AttrSelector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
