//! Which requests trigger a compile.

use crate::error::{GateError, Result};

/// Anything carrying a request path (`/stylesheets/screen.css?v=3`).
pub trait AssetRequest {
    /// Raw request path, query string included. `None` when the request has
    /// no path at all.
    fn path(&self) -> Option<&str>;
}

impl AssetRequest for str {
    fn path(&self) -> Option<&str> {
        Some(self)
    }
}

impl AssetRequest for String {
    fn path(&self) -> Option<&str> {
        Some(self)
    }
}

impl<T: AssetRequest + ?Sized> AssetRequest for &T {
    fn path(&self) -> Option<&str> {
        (**self).path()
    }
}

impl<T: AssetRequest> AssetRequest for Option<T> {
    fn path(&self) -> Option<&str> {
        self.as_ref().and_then(AssetRequest::path)
    }
}

/// Matches requests whose final path segment has the configured extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFilter {
    extension: String,
}

impl Default for RequestFilter {
    fn default() -> Self {
        Self::new(".css")
    }
}

impl RequestFilter {
    /// `extension` includes the dot and is compared case-sensitively.
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Whether `request` asks for a file with the watched extension.
    ///
    /// The query string and fragment are ignored. A request without a path,
    /// or with an empty or relative one, is rejected.
    pub fn should_handle<R: AssetRequest + ?Sized>(&self, request: &R) -> Result<bool> {
        let raw = request
            .path()
            .ok_or_else(|| GateError::InvalidInput("request has no path".into()))?;
        if raw.is_empty() {
            return Err(GateError::InvalidInput("request path is empty".into()));
        }
        if !raw.starts_with('/') {
            return Err(GateError::InvalidInput(format!(
                "request path `{raw}` is not absolute"
            )));
        }

        let path = raw.split(['?', '#']).next().unwrap_or(raw);
        Ok(extension_of(path) == Some(self.extension.as_str()))
    }
}

/// Extension of the last segment, dot included. Dotfiles have none.
fn extension_of(path: &str) -> Option<&str> {
    let name = path.rsplit('/').next()?;
    match name.rfind('.') {
        Some(0) | None => None,
        Some(dot) => Some(&name[dot..]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handles(path: &str) -> bool {
        RequestFilter::default().should_handle(path).unwrap()
    }

    #[test]
    fn test_matches_css() {
        assert!(handles("/stylesheets/screen.css"));
        assert!(handles("/screen.min.css"));
        assert!(handles("/stylesheets/screen.css?v=12"));
        assert!(handles("/screen.css#top"));
    }

    #[test]
    fn test_ignores_other_assets() {
        assert!(!handles("/"));
        assert!(!handles("/index.html"));
        assert!(!handles("/stylesheets/screen.scss"));
        assert!(!handles("/css/"));
        assert!(!handles("/screen.css.map"));
        assert!(!handles("/page?file=screen.css"));
    }

    #[test]
    fn test_case_sensitive() {
        assert!(!handles("/SCREEN.CSS"));
    }

    #[test]
    fn test_dotfile_has_no_extension() {
        assert!(!handles("/.css"));
        assert!(!handles("/stylesheets/.css"));
    }

    #[test]
    fn test_custom_extension() {
        let filter = RequestFilter::new(".scss");
        assert!(filter.should_handle("/a.scss").unwrap());
        assert!(!filter.should_handle("/a.css").unwrap());
    }

    #[test]
    fn test_invalid_requests() {
        let filter = RequestFilter::default();
        for bad in ["", "screen.css", "stylesheets/screen.css"] {
            let err = filter.should_handle(bad).unwrap_err();
            assert!(matches!(err, GateError::InvalidInput(_)), "{bad:?}");
        }

        let missing: Option<&str> = None;
        assert!(matches!(
            filter.should_handle(&missing),
            Err(GateError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_owned_and_optional_requests() {
        let filter = RequestFilter::default();
        assert!(filter.should_handle(&String::from("/a.css")).unwrap());
        assert!(filter.should_handle(&Some("/a.css")).unwrap());
    }
}
