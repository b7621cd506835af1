//! `[filter]` section configuration.
//!
//! Describes what marks an element as excluded, where the table of contents
//! lives, and how matched links are hidden.
//!
//! # Example
//!
//! ```toml
//! [filter]
//! exclude_class = "exclude"                     # Marker class on excluded sections
//! toc_container = '[data-md-component="toc"]'   # Attribute selector for the TOC
//! link_tag = "a"                                # Link elements inside the TOC
//! hidden_class = "hidden"                       # Class added to matched links
//! match = "substring"                           # substring | fragment
//! ```
//!
//! The defaults fit Material for MkDocs output. `hidden_class` needs a
//! stylesheet rule (e.g. `.hidden { display: none }`) to have any effect.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::dom::AttrSelector;
use crate::filter::MatchMode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Class marking an element whose TOC entries should disappear.
    pub exclude_class: String,

    /// Selector for the element containing the table of contents.
    pub toc_container: AttrSelector,

    /// Tag name of the links inside the container.
    pub link_tag: String,

    /// Class added to every matched link.
    pub hidden_class: String,

    /// Identifier matching strategy.
    #[serde(rename = "match")]
    pub match_mode: MatchMode,
}

impl FilterConfig {
    pub const EXCLUDE_CLASS: FieldPath = FieldPath::new("filter.exclude_class");
    pub const LINK_TAG: FieldPath = FieldPath::new("filter.link_tag");
    pub const HIDDEN_CLASS: FieldPath = FieldPath::new("filter.hidden_class");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        check_class_name(&self.exclude_class, Self::EXCLUDE_CLASS, diag);
        check_class_name(&self.hidden_class, Self::HIDDEN_CLASS, diag);

        if self.link_tag.is_empty() || !self.link_tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            diag.error_with_hint(
                Self::LINK_TAG,
                format!("`{}` is not a tag name", self.link_tag),
                "use a plain element name such as \"a\"",
            );
        }

        if self.exclude_class == self.hidden_class && !self.exclude_class.is_empty() {
            diag.error_with_hint(
                Self::HIDDEN_CLASS,
                "hidden class is the same as the exclusion marker",
                "hidden links would themselves become exclusion markers on the next run",
            );
        }
    }
}

fn check_class_name(name: &str, field: FieldPath, diag: &mut ConfigDiagnostics) {
    if name.is_empty() {
        diag.error(field, "class name must not be empty");
    } else if name.chars().any(char::is_whitespace) {
        diag.error_with_hint(
            field,
            format!("`{name}` contains whitespace"),
            "a class list token cannot contain spaces",
        );
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            exclude_class: "exclude".to_string(),
            toc_container: AttrSelector::default(),
            link_tag: "a".to_string(),
            hidden_class: "hidden".to_string(),
            match_mode: MatchMode::Substring,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_filter_config_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.filter.exclude_class, "exclude");
        assert_eq!(config.filter.toc_container, AttrSelector::new("data-md-component", Some("toc")));
        assert_eq!(config.filter.link_tag, "a");
        assert_eq!(config.filter.hidden_class, "hidden");
        assert_eq!(config.filter.match_mode, MatchMode::Substring);
    }

    #[test]
    fn test_filter_config_custom() {
        let config = test_parse_config(
            "[filter]\nexclude_class = \"toc-skip\"\ntoc_container = \"[data-toc]\"\nhidden_class = \"is-hidden\"\nmatch = \"fragment\"",
        );
        assert_eq!(config.filter.exclude_class, "toc-skip");
        assert_eq!(config.filter.toc_container, AttrSelector::new("data-toc", None));
        assert_eq!(config.filter.hidden_class, "is-hidden");
        assert_eq!(config.filter.match_mode, MatchMode::Fragment);
    }

    #[test]
    fn test_filter_config_invalid_selector() {
        let result = crate::config::Config::parse_with_ignored("[filter]\ntoc_container = \"nav.toc\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_filter_validate() {
        let mut diag = ConfigDiagnostics::new();
        FilterConfig::default().validate(&mut diag);
        assert!(diag.is_empty());

        let config = FilterConfig {
            exclude_class: "two words".to_string(),
            hidden_class: String::new(),
            link_tag: "a b".to_string(),
            ..FilterConfig::default()
        };
        let mut diag = ConfigDiagnostics::new();
        config.validate(&mut diag);
        assert_eq!(diag.len(), 3);
    }

    #[test]
    fn test_filter_validate_same_classes() {
        let config = FilterConfig {
            hidden_class: "exclude".to_string(),
            ..FilterConfig::default()
        };
        let mut diag = ConfigDiagnostics::new();
        config.validate(&mut diag);
        assert_eq!(diag.errors()[0].field, FilterConfig::HIDDEN_CLASS);
    }
}
