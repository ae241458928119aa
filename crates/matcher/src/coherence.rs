//! Bundle coherence scoring for sourcemaps

use crumbs_types::FileSet;

/// Scores how well a bundle agrees with the sources its sourcemap declares.
///
/// No formula is fixed yet; the engine reports `None` unless a scorer is
/// plugged in.
pub trait BundleCoherence: Send + Sync {
    fn score(
        &self,
        target_path: &str,
        target_content: &str,
        declared_sources: &[String],
        sources: &FileSet,
    ) -> Option<f64>;
}

/// Leaves sourcemap coherence unscored
#[derive(Debug, Clone, Copy, Default)]
pub struct Unscored;

impl BundleCoherence for Unscored {
    fn score(&self, _: &str, _: &str, _: &[String], _: &FileSet) -> Option<f64> {
        None
    }
}
