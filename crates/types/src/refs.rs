//! References to the published package and its declared repository

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default public registry
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

/// A published package version on a registry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageRef {
    pub name: String,
    pub version: String,
    pub registry: String,
}

impl PackageRef {
    /// Reference on the default registry
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            registry: DEFAULT_REGISTRY.to_string(),
        }
    }

    #[must_use]
    pub fn with_registry(mut self, registry: impl Into<String>) -> Self {
        self.registry = registry.into().trim_end_matches('/').to_string();
        self
    }
}

impl fmt::Display for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// Source repository at an optional commit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl RepoRef {
    pub fn git(url: impl Into<String>) -> Self {
        Self {
            kind: "git".to_string(),
            url: url.into(),
            hash: None,
        }
    }

    #[must_use]
    pub fn at_commit(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    /// Commit to check out; `HEAD` when none was recorded
    #[must_use]
    pub fn commit(&self) -> &str {
        self.hash.as_deref().unwrap_or("HEAD")
    }
}
