//! Surface identity types.
//!
//! A surface names the display slot that propositions target. Identity is the
//! URI alone, so two surfaces built from the same app id and path are the same
//! cache key.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// URI scheme used by every surface.
pub const SURFACE_SCHEME: &str = "mobileapp";

const SCHEME_SEPARATOR: &str = "://";

/// A content display slot, identified by its `mobileapp://` URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Surface {
    uri: String,
}

impl Surface {
    /// The base surface of an application: `mobileapp://<app_id>`.
    ///
    /// Built through [`Surface::from_uri`], so the result always survives a
    /// serialize/deserialize cycle unchanged.
    pub fn for_app(app_id: &str) -> Result<Self, ValidationError> {
        Self::from_uri(&format!(
            "{}{}{}",
            SURFACE_SCHEME,
            SCHEME_SEPARATOR,
            app_id.trim()
        ))
    }

    /// A surface below the application's base: `mobileapp://<app_id>/<path>`.
    ///
    /// Leading and trailing slashes on `path` are ignored; an empty path yields
    /// the base surface.
    pub fn with_path(app_id: &str, path: &str) -> Result<Self, ValidationError> {
        let path = path.trim().trim_matches('/');
        if path.is_empty() {
            return Self::for_app(app_id);
        }
        Self::from_uri(&format!(
            "{}{}{}/{}",
            SURFACE_SCHEME,
            SCHEME_SEPARATOR,
            app_id.trim().trim_end_matches('/'),
            path
        ))
    }

    /// Parse and validate an existing surface URI.
    pub fn from_uri(uri: &str) -> Result<Self, ValidationError> {
        let uri = uri.trim();
        let rest = uri
            .strip_prefix(SURFACE_SCHEME)
            .and_then(|r| r.strip_prefix(SCHEME_SEPARATOR))
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "surface".to_string(),
                reason: format!("'{}' does not use the {} scheme", uri, SURFACE_SCHEME),
            })?;

        let authority = rest.split('/').next().unwrap_or_default();
        if authority.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "surface".to_string(),
                reason: format!("'{}' has no application id", uri),
            });
        }
        if rest.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidValue {
                field: "surface".to_string(),
                reason: format!("'{}' contains whitespace", uri),
            });
        }

        Ok(Self {
            uri: uri.trim_end_matches('/').to_string(),
        })
    }

    /// The full surface URI.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The application id (URI authority).
    pub fn app_id(&self) -> &str {
        self.remainder().split('/').next().unwrap_or_default()
    }

    /// The path below the application, if any.
    pub fn path(&self) -> Option<&str> {
        self.remainder()
            .split_once('/')
            .map(|(_, path)| path)
            .filter(|path| !path.is_empty())
    }

    fn remainder(&self) -> &str {
        self.uri
            .split_once(SCHEME_SEPARATOR)
            .map(|(_, rest)| rest)
            .unwrap_or_default()
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

impl TryFrom<String> for Surface {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_uri(&value)
    }
}

impl From<Surface> for String {
    fn from(surface: Surface) -> Self {
        surface.uri
    }
}
