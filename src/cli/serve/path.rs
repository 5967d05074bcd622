//! URL to filesystem path resolution.

use std::path::{Path, PathBuf};

/// Resolve URL to filesystem path, handling index.html for directories
pub fn resolve_path(url: &str, serve_root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url);

    // Reject paths with suspicious patterns early
    if clean.contains("..") {
        return None;
    }

    let local = serve_root.join(&clean);

    // Canonicalize to resolve symlinks and verify path is under serve_root
    let canonical = local.canonicalize().ok()?;
    let root_canonical = serve_root.canonicalize().ok()?;

    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }

    if canonical.is_dir() {
        let index = canonical.join("index.html");
        if index.is_file() {
            return Some(index);
        }
    }

    None
}

/// Normalize URL: decode, strip query string and fragment, trim slashes
fn normalize_url(url: &str) -> String {
    use percent_encoding::percent_decode_str;

    let path = url.split(['?', '#']).next().unwrap_or(url);
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();

    decoded.trim_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("stylesheets")).unwrap();
        fs::write(dir.path().join("stylesheets/screen.css"), "body{}").unwrap();
        fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        fs::write(dir.path().join("two words.css"), "").unwrap();
        dir
    }

    #[test]
    fn test_resolve_file() {
        let dir = site();
        let path = resolve_path("/stylesheets/screen.css?v=2", dir.path()).unwrap();
        assert!(path.ends_with("stylesheets/screen.css"));
    }

    #[test]
    fn test_resolve_index() {
        let dir = site();
        let path = resolve_path("/", dir.path()).unwrap();
        assert!(path.ends_with("index.html"));
    }

    #[test]
    fn test_percent_decoding() {
        let dir = site();
        assert!(resolve_path("/two%20words.css", dir.path()).is_some());
    }

    #[test]
    fn test_rejects_traversal() {
        let dir = site();
        assert!(resolve_path("/../etc/passwd", dir.path()).is_none());
        assert!(resolve_path("/stylesheets/%2e%2e/%2e%2e/etc/passwd", dir.path()).is_none());
    }

    #[test]
    fn test_missing_file() {
        let dir = site();
        assert!(resolve_path("/stylesheets/print.css", dir.path()).is_none());
        assert!(resolve_path("/stylesheets/", dir.path()).is_none());
    }
}
