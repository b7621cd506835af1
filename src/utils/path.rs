//! Path normalization utilities.

use std::path::{Component, Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to the path itself when absolute, or cwd-joined when relative.
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Resolve a user-supplied path: absolute as-is, cwd-relative if it exists,
/// otherwise relative to `fallback_dir`.
#[inline]
pub fn resolve_path(path: &Path, fallback_dir: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    if path.exists() {
        return normalize_path(path);
    }
    normalize_path(&fallback_dir.join(path))
}

/// Turn a site-relative file path into a URL path.
///
/// `index.html` maps to its directory, the way static hosts serve it:
///
/// - `index.html` -> ``
/// - `guide/setup/index.html` -> `guide/setup/`
/// - `guide/legacy.html` -> `guide/legacy.html`
pub fn url_path_for(rel: &Path) -> String {
    let mut segments: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    let is_index = segments
        .last()
        .is_some_and(|name| name.eq_ignore_ascii_case("index.html"));
    if is_index {
        segments.pop();
        if segments.is_empty() {
            return String::new();
        }
        return format!("{}/", segments.join("/"));
    }
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_absolute() {
        let normalized = normalize_path(Path::new("/absolute/path/file.html"));
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_normalize_path_relative() {
        let normalized = normalize_path(Path::new("relative/path/file.html"));
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_resolve_path_fallback() {
        let resolved = resolve_path(Path::new("no-such-dir/page.html"), Path::new("/srv/site"));
        assert_eq!(resolved, PathBuf::from("/srv/site/no-such-dir/page.html"));
    }

    #[test]
    fn test_url_path_for() {
        assert_eq!(url_path_for(Path::new("index.html")), "");
        assert_eq!(url_path_for(Path::new("guide/setup/index.html")), "guide/setup/");
        assert_eq!(url_path_for(Path::new("guide/legacy.html")), "guide/legacy.html");
        assert_eq!(url_path_for(Path::new("./api/index.html")), "api/");
    }
}
