//! Processing of a single built page.
//!
//! Read -> parse -> filter -> (render -> write). Pages are independent, so the
//! batch driver runs this for many pages in parallel.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use thiserror::Error;
use url::Url;

use crate::config::Config;
use crate::dom::Document;
use crate::filter::{self, FilterReport};
use crate::utils::path::url_path_for;

/// Page-level failures. Each carries the page path for the final report.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("failed to read `{0}`")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("failed to rewrite `{0}`")]
    Render(PathBuf, #[source] crate::dom::RenderError),

    #[error("failed to write `{0}`")]
    Write(PathBuf, #[source] std::io::Error),
}

impl PageError {
    pub fn path(&self) -> &Path {
        match self {
            Self::Read(path, _) | Self::Render(path, _) | Self::Write(path, _) => path,
        }
    }
}

/// Whether a processed page is written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    /// Write changed pages (and, for a separate output dir, copy unchanged ones).
    Apply,
    /// Report only.
    Check,
}

/// Result of processing one page.
#[derive(Debug, Clone)]
pub struct PageOutcome {
    /// Path relative to the input directory.
    pub rel_path: PathBuf,
    pub report: FilterReport,
    /// Whether a file was written.
    pub written: bool,
}

/// Site-relative path of a page, falling back to the file name for pages
/// outside the input directory.
pub fn relative_path(path: &Path, input: &Path) -> PathBuf {
    path.strip_prefix(input)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.file_name().map(PathBuf::from).unwrap_or_default())
}

/// Stand-in site root when `site_url` is not configured.
///
/// Only the scheme and host are made up: the page path still comes from the
/// page's location, so `../legacy/` on `guide/index.html` resolves to
/// `http://localhost/legacy/`.
static PLACEHOLDER_BASE: LazyLock<Url> =
    LazyLock::new(|| Url::parse("http://localhost/").unwrap());

/// URL a page is served at, given the site base URL.
pub fn page_url(base: &Url, rel: &Path) -> Option<Url> {
    base.join(&url_path_for(rel)).ok()
}

/// Run the exclusion filter on the page at `path`.
pub fn process_page(path: &Path, config: &Config, mode: PageMode) -> Result<PageOutcome, PageError> {
    let input = &config.build.input;
    let rel_path = relative_path(path, input);

    let source = fs::read_to_string(path).map_err(|e| PageError::Read(path.to_path_buf(), e))?;
    let mut doc = Document::parse(&source);

    let base = config.build.base_url().unwrap_or_else(|| PLACEHOLDER_BASE.clone());
    let url = page_url(&base, &rel_path);
    let report = filter::apply(&mut doc, &config.filter, url.as_ref());

    crate::debug!("exclude"; "{}: {}", rel_path.display(), report.excluded_text_line());

    if mode == PageMode::Check {
        return Ok(PageOutcome {
            rel_path,
            report,
            written: false,
        });
    }

    let target = config.build.output_dir().join(&rel_path);
    let written = if report.changed() {
        let html = doc
            .to_html()
            .map_err(|e| PageError::Render(path.to_path_buf(), e))?;
        write_file(&target, html.as_bytes())?;
        true
    } else if !config.build.in_place() {
        // Separate output directory: keep the site complete
        write_file(&target, source.as_bytes())?;
        true
    } else {
        false
    };

    Ok(PageOutcome {
        rel_path,
        report,
        written,
    })
}

/// Write `content` to `path`, creating parent directories.
pub fn write_file(path: &Path, content: &[u8]) -> Result<(), PageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| PageError::Write(path.to_path_buf(), e))?;
    }
    fs::write(path, content).map_err(|e| PageError::Write(path.to_path_buf(), e))
}
