//! Matching a target's companion sourcemap against the repository sources

use std::sync::Arc;

use crate::coherence::{BundleCoherence, Unscored};
use crumbs_errors::{SourcemapError, VerifyError};
use crumbs_sourcemap::{parse_sourcemap, validate_guarded, SourcemapValidator, StructuralValidator};
use crumbs_types::{FileSet, PackageRoot, SourcemapInfo};

/// Suffix of the map published next to a bundle
pub const MAP_SUFFIX: &str = ".map";

/// Sourcemap verdict plus the validator's reason when it rejected the map
#[derive(Debug, Clone, PartialEq)]
pub struct SourcemapMatch {
    pub info: SourcemapInfo,
    pub rejection: Option<SourcemapError>,
}

/// Locates `<target>.map`, roots its declared sources and validates it.
#[derive(Clone)]
pub struct SourcemapMatcher {
    validator: Arc<dyn SourcemapValidator>,
    coherence: Arc<dyn BundleCoherence>,
}

impl SourcemapMatcher {
    #[must_use]
    pub fn new() -> Self {
        Self {
            validator: Arc::new(StructuralValidator),
            coherence: Arc::new(Unscored),
        }
    }

    #[must_use]
    pub fn with_validator(mut self, validator: Arc<dyn SourcemapValidator>) -> Self {
        self.validator = validator;
        self
    }

    #[must_use]
    pub fn with_coherence(mut self, coherence: Arc<dyn BundleCoherence>) -> Self {
        self.coherence = coherence;
        self
    }

    /// `Ok(None)` when no map is published for `target_path`.
    ///
    /// # Errors
    /// Returns `VerifyError::MalformedSourcemap` when the map is not a JSON
    /// sourcemap document. Validator failures, panics included, only make
    /// the map invalid.
    pub fn match_sourcemap(
        &self,
        target_path: &str,
        targets: &FileSet,
        sources: &FileSet,
        root: &PackageRoot,
    ) -> Result<Option<SourcemapMatch>, VerifyError> {
        let map_path = format!("{target_path}{MAP_SUFFIX}");
        let Some(map_text) = targets.get(&map_path) else {
            return Ok(None);
        };

        let raw = parse_sourcemap(&map_path, map_text)?;
        let declared_sources: Vec<String> =
            raw.sources.iter().map(|source| root.join(source)).collect();

        let target_content = targets.get(target_path).map_or("", String::as_str);
        let rejection =
            validate_guarded(self.validator.as_ref(), target_content, map_text, sources).err();
        let coherence =
            self.coherence
                .score(target_path, target_content, &declared_sources, sources);

        Ok(Some(SourcemapMatch {
            info: SourcemapInfo {
                declared_sources,
                valid: rejection.is_none(),
                coherence,
            },
            rejection,
        }))
    }
}

impl Default for SourcemapMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SourcemapMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourcemapMatcher").finish_non_exhaustive()
    }
}

/// Match the sourcemap of one target with the default validator.
///
/// # Errors
/// Returns `VerifyError::MalformedSourcemap` for an unparseable map.
pub fn match_sourcemap(
    target_path: &str,
    targets: &FileSet,
    sources: &FileSet,
    root: &PackageRoot,
) -> Result<Option<SourcemapInfo>, VerifyError> {
    Ok(SourcemapMatcher::new()
        .match_sourcemap(target_path, targets, sources, root)?
        .map(|m| m.info))
}
