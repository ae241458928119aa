//! Version documents published by the registry

use std::collections::BTreeMap;

use crumbs_errors::FetchError;
use crumbs_types::RepoRef;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The fields of a version document that provenance checks read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Packument {
    pub name: String,
    pub version: String,
    /// Commit the package was published from, as recorded by the client
    #[serde(default)]
    pub git_head: Option<String>,
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default)]
    pub exports: Option<Value>,
}

/// `repository` is either a bare URL/shorthand or an object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Repository {
    Url(String),
    Detailed {
        #[serde(rename = "type", default = "default_repository_type")]
        kind: String,
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        directory: Option<String>,
    },
}

fn default_repository_type() -> String {
    "git".to_string()
}

impl Repository {
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Url(url) | Self::Detailed { url, .. } => url,
        }
    }

    /// Subdirectory the package lives in, for monorepos that declare it
    #[must_use]
    pub fn directory(&self) -> Option<&str> {
        match self {
            Self::Url(_) => None,
            Self::Detailed { directory, .. } => directory.as_deref(),
        }
    }
}

impl Packument {
    /// Repository reference without a commit; the commit is resolved
    /// separately because attestations may override `gitHead`.
    ///
    /// # Errors
    /// Returns `FetchError::MissingRepository` when none is declared.
    pub fn repo_ref(&self) -> Result<RepoRef, FetchError> {
        match &self.repository {
            Some(Repository::Detailed { kind, url, .. }) => Ok(RepoRef {
                kind: kind.clone(),
                url: url.clone(),
                hash: None,
            }),
            Some(Repository::Url(url)) => Ok(RepoRef::git(url.clone())),
            None => Err(FetchError::MissingRepository {
                name: self.name.clone(),
            }),
        }
    }

    /// Entry points declared by `exports`, keyed by subpath.
    ///
    /// Conditional exports are flattened to their target files in condition
    /// key order; a manifest
    /// without subpath keys exports everything under `.`.
    #[must_use]
    pub fn entry_points(&self) -> BTreeMap<String, Vec<String>> {
        self.exports.as_ref().map(entry_points).unwrap_or_default()
    }
}

/// See [`Packument::entry_points`].
#[must_use]
pub fn entry_points(exports: &Value) -> BTreeMap<String, Vec<String>> {
    match exports {
        Value::Object(map) if map.keys().any(|k| k.starts_with('.')) => map
            .iter()
            .map(|(subpath, target)| (subpath.clone(), flatten_conditions(target)))
            .collect(),
        Value::Null => BTreeMap::new(),
        other => BTreeMap::from([(".".to_string(), flatten_conditions(other))]),
    }
}

fn flatten_conditions(target: &Value) -> Vec<String> {
    match target {
        Value::String(path) => vec![path.clone()],
        Value::Array(items) => items.iter().flat_map(flatten_conditions).collect(),
        Value::Object(conditions) => conditions.values().flat_map(flatten_conditions).collect(),
        _ => Vec::new(),
    }
}
