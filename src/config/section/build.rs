//! `[build]` section configuration.
//!
//! Where the built site lives and how its pages are addressed.
//!
//! # Example
//!
//! ```toml
//! [build]
//! input = "site"                              # Built documentation directory
//! output = "public"                           # Optional, defaults to `input`
//! site_url = "https://docs.example.com/"      # Optional, enables href resolution
//! extensions = ["html", "htm"]                # Page file extensions
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Directory holding the generated site.
    pub input: PathBuf,

    /// Destination for processed pages. `None` rewrites pages in place.
    pub output: Option<PathBuf>,

    /// Public URL the site is served from.
    pub site_url: Option<String>,

    /// File extensions treated as pages (without the dot).
    pub extensions: Vec<String>,
}

impl BuildConfig {
    pub const SITE_URL: FieldPath = FieldPath::new("build.site_url");
    pub const EXTENSIONS: FieldPath = FieldPath::new("build.extensions");
    pub const OUTPUT: FieldPath = FieldPath::new("build.output");

    /// Directory processed pages are written to.
    pub fn output_dir(&self) -> &Path {
        self.output.as_deref().unwrap_or(&self.input)
    }

    /// Whether pages are rewritten where they were read.
    pub fn in_place(&self) -> bool {
        self.output_dir() == self.input
    }

    /// Check whether `path` has one of the configured page extensions.
    pub fn is_page(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
    }

    /// Parsed `site_url`, normalized to end with `/` so pages join beneath it.
    pub fn base_url(&self) -> Option<Url> {
        let raw = self.site_url.as_deref()?;
        let mut url = Url::parse(raw).ok()?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Some(url)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if let Some(raw) = &self.site_url {
            match Url::parse(raw) {
                Ok(url) if url.cannot_be_a_base() => {
                    diag.error(Self::SITE_URL, format!("`{raw}` cannot be used as a base URL"));
                }
                Ok(_) => {}
                Err(err) => diag.error_with_hint(
                    Self::SITE_URL,
                    format!("invalid URL `{raw}`: {err}"),
                    "use an absolute URL such as \"https://docs.example.com/\"",
                ),
            }
        }

        if self.extensions.is_empty() {
            diag.error(Self::EXTENSIONS, "at least one page extension is required");
        } else if let Some(bad) = self.extensions.iter().find(|e| e.is_empty() || e.starts_with('.')) {
            diag.error_with_hint(
                Self::EXTENSIONS,
                format!("invalid extension `{bad}`"),
                "write extensions without the leading dot, e.g. \"html\"",
            );
        }

        if let Some(output) = &self.output
            && output != &self.input
            && output.starts_with(&self.input)
        {
            diag.error(
                Self::OUTPUT,
                "output directory must not be nested inside the input directory",
            );
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("site"),
            output: None,
            site_url: None,
            extensions: vec!["html".to_string(), "htm".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_build_config_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.build.input, PathBuf::from("site"));
        assert!(config.build.output.is_none());
        assert!(config.build.in_place());
        assert!(config.build.base_url().is_none());
    }

    #[test]
    fn test_build_config_custom() {
        let config = test_parse_config(
            "[build]\ninput = \"dist\"\noutput = \"public\"\nsite_url = \"https://example.github.io/project\"\nextensions = [\"xhtml\"]",
        );
        assert_eq!(config.build.output_dir(), Path::new("public"));
        assert!(!config.build.in_place());
        assert_eq!(
            config.build.base_url().unwrap().as_str(),
            "https://example.github.io/project/"
        );
        assert!(config.build.is_page(Path::new("a/b.XHTML")));
        assert!(!config.build.is_page(Path::new("a/b.html")));
    }

    #[test]
    fn test_is_page_defaults() {
        let build = BuildConfig::default();
        assert!(build.is_page(Path::new("index.html")));
        assert!(build.is_page(Path::new("old/page.htm")));
        assert!(!build.is_page(Path::new("assets/site.css")));
        assert!(!build.is_page(Path::new("README")));
    }

    #[test]
    fn test_build_validate() {
        let build = BuildConfig {
            site_url: Some("not a url".to_string()),
            extensions: vec![".html".to_string()],
            output: Some(PathBuf::from("site/processed")),
            ..BuildConfig::default()
        };
        let mut diag = ConfigDiagnostics::new();
        build.validate(&mut diag);
        assert_eq!(diag.len(), 3);

        let mut diag = ConfigDiagnostics::new();
        BuildConfig::default().validate(&mut diag);
        assert!(diag.is_empty());
    }
}
