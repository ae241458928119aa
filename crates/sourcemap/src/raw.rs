//! Sourcemap document parsing

use crumbs_errors::VerifyError;
use serde::{Deserialize, Serialize};

/// The fields of a version 3 sourcemap document that matching relies on.
///
/// `sources` is required; a document without it cannot make a provenance
/// claim and is treated as malformed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSourceMap {
    #[serde(default)]
    pub version: Option<serde_json::Value>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub source_root: Option<String>,
    pub sources: Vec<String>,
    #[serde(default)]
    pub sources_content: Option<Vec<Option<String>>>,
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub mappings: String,
}

impl RawSourceMap {
    /// Whether the document declares version 3, as number or string
    #[must_use]
    pub fn is_version_3(&self) -> bool {
        match &self.version {
            Some(serde_json::Value::Number(n)) => n.as_u64() == Some(3),
            Some(serde_json::Value::String(s)) => s == "3",
            _ => false,
        }
    }

    /// Embedded content for the source at `index`, if the map carries it
    #[must_use]
    pub fn embedded_content(&self, index: usize) -> Option<&str> {
        self.sources_content
            .as_ref()
            .and_then(|contents| contents.get(index))
            .and_then(Option::as_deref)
    }
}

/// Parse the map published at `path`.
///
/// # Errors
/// Returns `VerifyError::MalformedSourcemap` if the text is not a JSON
/// sourcemap document.
pub fn parse_sourcemap(path: &str, text: &str) -> Result<RawSourceMap, VerifyError> {
    serde_json::from_str(text).map_err(|e| VerifyError::MalformedSourcemap {
        path: path.to_string(),
        message: e.to_string(),
    })
}
