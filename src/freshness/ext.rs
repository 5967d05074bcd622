//! Extension filtering for folder listings.

use super::FolderEntry;
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Extensions of Sass sources tracked by the compile gate.
pub const SASS_EXTENSIONS: [&str; 2] = ["scss", "sass"];

/// Normalised set of file extensions: lower-cased, without the leading dot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtensionSet(Vec<String>);

impl ExtensionSet {
    pub fn new<I, S>(exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = exts
            .into_iter()
            .map(|ext| {
                let ext = ext.as_ref().trim();
                ext.strip_prefix('.').unwrap_or(ext).to_ascii_lowercase()
            })
            .filter(|ext| !ext.is_empty())
            .collect();
        normalized.sort();
        normalized.dedup();
        Self(normalized)
    }

    /// Whether `path` has one of the extensions (case-insensitive).
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.0.iter().any(|known| known.eq_ignore_ascii_case(ext)))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// List the files in `dir` whose extension is in `exts`, sorted.
pub async fn find_files_with_exts(dir: &Path, exts: &ExtensionSet) -> Result<Vec<PathBuf>> {
    let children = FolderEntry::new(dir.to_path_buf()).list().await?;
    Ok(children.into_iter().filter(|p| exts.matches(p)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        let set = ExtensionSet::new([".SCSS", "sass", "scss", " .Css ", ""]);
        assert_eq!(set.as_slice(), ["css", "sass", "scss"]);
    }

    #[test]
    fn test_matches_case_insensitive() {
        let set = ExtensionSet::new(SASS_EXTENSIONS);
        assert!(set.matches(Path::new("/p/screen.scss")));
        assert!(set.matches(Path::new("/p/PRINT.SASS")));
        assert!(!set.matches(Path::new("/p/screen.css")));
        assert!(!set.matches(Path::new("/p/scss")));
        assert!(!set.matches(Path::new("/p/.scss.bak")));
    }

    #[test]
    fn test_empty_set_matches_nothing() {
        let set = ExtensionSet::new(Vec::<String>::new());
        assert!(set.is_empty());
        assert!(!set.matches(Path::new("a.scss")));
    }
}
