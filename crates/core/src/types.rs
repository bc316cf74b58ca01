use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The opaque identifier of a file group.
///
/// Generated at creation time, immutable, and never reused. This is the
/// public link token: anyone holding it can resolve the group until it
/// expires.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileGroupId(String);

impl FileGroupId {
    /// Create an id from an existing string value (e.g. a path parameter).
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generate a fresh random id (UUID v4).
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Return the inner string as a str slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for FileGroupId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for FileGroupId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl AsRef<str> for FileGroupId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
