//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Find config file by searching upward from current directory
///
/// Starts from cwd and walks up parent directories until finding `config_name`.
/// Returns the absolute path to the config file if found.
///
/// # Example
/// ```text
/// /home/user/site/public/sass/   ← cwd
/// /home/user/site/compass.toml   ← found!
/// ```
pub fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let cwd = std::env::current_dir().ok()?;
    find_upward(&cwd, config_name)
}

/// Walk up from `start` looking for `config_name`.
fn find_upward(start: &Path, config_name: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(config_name))
        .find(|candidate| candidate.is_file())
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_find_upward() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("public/sass/partials");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("compass.toml"), "").unwrap();

        let found = find_upward(&nested, Path::new("compass.toml")).unwrap();
        assert_eq!(found, dir.path().join("compass.toml"));
    }

    #[test]
    fn test_find_upward_skips_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("compass.toml")).unwrap();
        let found = find_upward(dir.path(), Path::new("compass.toml"));
        assert!(found.is_none_or(|path| !path.starts_with(dir.path())));
    }

    #[test]
    fn test_absolute_missing() {
        let dir = TempDir::new().unwrap();
        assert!(find_config_file(&dir.path().join("missing.toml")).is_none());
    }
}
