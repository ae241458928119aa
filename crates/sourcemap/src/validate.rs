//! Sourcemap validator adapter

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::raw::RawSourceMap;
use crate::text::LineIndex;
use crumbs_errors::SourcemapError;
use crumbs_types::{path, FileSet};
use sourcemap::SourceMap;

/// Checks that a sourcemap is structurally and positionally valid for a
/// bundle and a set of candidate original sources.
pub trait SourcemapValidator: Send + Sync {
    /// # Errors
    /// Returns the first problem found; callers treat any error as an
    /// invalid map.
    fn validate(
        &self,
        minified: &str,
        sourcemap: &str,
        candidates: &FileSet,
    ) -> Result<(), SourcemapError>;
}

/// Run `validator`, turning a panic inside it into an error.
///
/// # Errors
/// Returns the validator's error, or `ValidatorPanicked`.
pub fn validate_guarded(
    validator: &dyn SourcemapValidator,
    minified: &str,
    sourcemap: &str,
    candidates: &FileSet,
) -> Result<(), SourcemapError> {
    catch_unwind(AssertUnwindSafe(|| {
        validator.validate(minified, sourcemap, candidates)
    }))
    .unwrap_or_else(|panic| {
        let message = panic
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Err(SourcemapError::ValidatorPanicked { message })
    })
}

/// Default validator.
///
/// Every source must have content, either embedded in `sourcesContent` or
/// found among the candidates by its declared name. Every mapping must land
/// inside the bundle and inside its original source, and a named mapping
/// must point at that name in the original.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralValidator;

impl StructuralValidator {
    fn resolve_content<'a>(
        raw: &'a RawSourceMap,
        index: usize,
        name: &str,
        candidates: &'a FileSet,
    ) -> Option<&'a str> {
        raw.embedded_content(index)
            .or_else(|| candidates.get(name).map(String::as_str))
            .or_else(|| candidates.get(&path::normalize(name)).map(String::as_str))
    }
}

impl SourcemapValidator for StructuralValidator {
    fn validate(
        &self,
        minified: &str,
        sourcemap: &str,
        candidates: &FileSet,
    ) -> Result<(), SourcemapError> {
        let raw: RawSourceMap =
            serde_json::from_str(sourcemap).map_err(|e| SourcemapError::InvalidMap {
                message: e.to_string(),
            })?;
        if !raw.is_version_3() {
            return Err(SourcemapError::UnsupportedVersion {
                version: raw
                    .version
                    .as_ref()
                    .map_or_else(|| "missing".to_string(), ToString::to_string),
            });
        }

        let decoded =
            SourceMap::from_slice(sourcemap.as_bytes()).map_err(|e| SourcemapError::InvalidMap {
                message: e.to_string(),
            })?;

        let originals = raw
            .sources
            .iter()
            .enumerate()
            .map(|(index, name)| {
                Self::resolve_content(&raw, index, name, candidates)
                    .map(LineIndex::new)
                    .ok_or_else(|| SourcemapError::MissingSourceContent {
                        source_name: name.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let bundle = LineIndex::new(minified);

        for token in decoded.tokens() {
            let (line, column) = (token.get_dst_line(), token.get_dst_col());
            if !bundle.contains(line, column) {
                return Err(SourcemapError::GeneratedOutOfBounds { line, column });
            }

            if token.get_source().is_none() {
                continue;
            }
            let src_id = token.get_src_id() as usize;
            let (Some(original), Some(source_name)) = (originals.get(src_id), raw.sources.get(src_id))
            else {
                return Err(SourcemapError::InvalidMap {
                    message: format!("mapping refers to unknown source #{src_id}"),
                });
            };

            let (src_line, src_col) = (token.get_src_line(), token.get_src_col());
            if !original.contains(src_line, src_col) {
                return Err(SourcemapError::OriginalOutOfBounds {
                    source_name: source_name.clone(),
                    line: src_line,
                    column: src_col,
                });
            }

            if let Some(name) = token.get_name() {
                if !original.starts_with_at(src_line, src_col, name) {
                    return Err(SourcemapError::NameMismatch {
                        source_name: source_name.clone(),
                        name: name.to_string(),
                        line: src_line,
                        column: src_col,
                    });
                }
            }
        }

        tracing::trace!(sources = raw.sources.len(), "sourcemap validated");
        Ok(())
    }
}
