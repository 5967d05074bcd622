//! `[middleware]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [middleware]
//! extension = ".css"      # requests ending in this extension trigger the gate
//! on_error = "open"       # "open": log and serve anyway, "closed": answer 500
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};

/// What happens to a request when compiling fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log the failure and continue handling the request.
    #[default]
    Open,
    /// Stop and surface the failure to the caller.
    Closed,
}

/// Request interception settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiddlewareConfig {
    /// Asset extension that triggers the gate, including the dot.
    pub extension: String,
    pub on_error: FailurePolicy,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            extension: ".css".into(),
            on_error: FailurePolicy::Open,
        }
    }
}

impl MiddlewareConfig {
    pub const EXTENSION: FieldPath = FieldPath::new("middleware.extension");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        let ext = &self.extension;
        if ext.len() < 2 || !ext.starts_with('.') || ext.contains('/') {
            diag.error_with_hint(
                Self::EXTENSION,
                format!("invalid extension `{ext}`"),
                "use a dot followed by the extension, e.g. \".css\"",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_middleware_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.middleware.extension, ".css");
        assert_eq!(config.middleware.on_error, FailurePolicy::Open);
    }

    #[test]
    fn test_middleware_closed() {
        let config = test_parse_config("[middleware]\non_error = \"closed\"");
        assert_eq!(config.middleware.on_error, FailurePolicy::Closed);
        assert_eq!(config.middleware.extension, ".css");
    }

    #[test]
    fn test_validate_extension() {
        for bad in ["css", ".", "", "./css"] {
            let mut diag = ConfigDiagnostics::new();
            let config = MiddlewareConfig {
                extension: bad.into(),
                ..MiddlewareConfig::default()
            };
            config.validate(&mut diag);
            assert!(diag.has_errors(), "`{bad}` should be rejected");
        }

        let mut diag = ConfigDiagnostics::new();
        MiddlewareConfig::default().validate(&mut diag);
        assert!(!diag.has_errors());
    }
}
