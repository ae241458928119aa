//! Package root resolution inside a possibly multi-package repository

use crumbs_errors::VerifyError;
use crumbs_types::{FileSet, PackageRoot};

/// Outcome of root resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootResolution {
    pub root: PackageRoot,
    /// Manifest that declared the package, `None` when the default was used
    pub manifest: Option<String>,
}

impl RootResolution {
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.manifest.is_none()
    }
}

/// Finds the directory of the manifest declaring a package.
///
/// The name check is a substring match on `"name": "<package>"` rather than
/// a manifest parse, so malformed manifests still anchor the root. Nested
/// manifests take priority over a top-level one declaring the same name,
/// as monorepo roots often reuse the name of their main package.
#[derive(Debug, Clone)]
pub struct RootResolver {
    manifest_file: String,
    default_root: PackageRoot,
}

impl RootResolver {
    #[must_use]
    pub fn new(manifest_file: impl Into<String>, default_root: &str) -> Self {
        Self {
            manifest_file: manifest_file.into(),
            default_root: PackageRoot::new(default_root),
        }
    }

    #[must_use]
    pub fn manifest_file(&self) -> &str {
        &self.manifest_file
    }

    /// Resolve the root, falling back to the default root silently.
    #[must_use]
    pub fn resolve(&self, sources: &FileSet, package_name: &str) -> RootResolution {
        let declaration = format!("\"name\": \"{package_name}\"");
        let nested_suffix = format!("/{}", self.manifest_file);
        let declares = |content: &str| content.contains(&declaration);

        let manifest = sources
            .iter()
            .find_map(|(source_path, content)| {
                (source_path.ends_with(&nested_suffix) && declares(content.as_str()))
                    .then_some(source_path)
            })
            .or_else(|| {
                sources
                    .get_key_value(&self.manifest_file)
                    .filter(|(_, content)| declares(content.as_str()))
                    .map(|(source_path, _)| source_path)
            });

        match manifest {
            Some(manifest) => RootResolution {
                root: PackageRoot::from_manifest_path(manifest),
                manifest: Some(manifest.clone()),
            },
            None => RootResolution {
                root: self.default_root.clone(),
                manifest: None,
            },
        }
    }

    /// Resolve the root, failing when no manifest declares the package.
    ///
    /// # Errors
    /// Returns `VerifyError::RootNotFound` when the default would be used.
    pub fn resolve_strict(
        &self,
        sources: &FileSet,
        package_name: &str,
    ) -> Result<RootResolution, VerifyError> {
        let resolution = self.resolve(sources, package_name);
        if resolution.is_fallback() {
            return Err(VerifyError::RootNotFound {
                package: package_name.to_string(),
                manifest: self.manifest_file.clone(),
            });
        }
        Ok(resolution)
    }
}

impl Default for RootResolver {
    fn default() -> Self {
        Self::new("package.json", ".")
    }
}

/// Resolve the package root with the default manifest name and fallback.
#[must_use]
pub fn resolve_root(sources: &FileSet, package_name: &str) -> PackageRoot {
    RootResolver::default().resolve(sources, package_name).root
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(entries: &[(&str, &str)]) -> FileSet {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn resolves_nested_package_in_monorepo() {
        let sources = files(&[
            ("package.json", r#"{ "name": "monorepo", "private": true }"#),
            ("packages/core/package.json", r#"{ "name": "@acme/core" }"#),
            ("packages/web/package.json", r#"{ "name": "@acme/web" }"#),
        ]);
        let resolution = RootResolver::default().resolve(&sources, "@acme/web");
        assert_eq!(resolution.root.as_str(), "packages/web");
        assert_eq!(
            resolution.manifest.as_deref(),
            Some("packages/web/package.json")
        );
    }

    #[test]
    fn falls_back_to_repository_root() {
        let sources = files(&[("src/index.ts", "export {}")]);
        let resolution = RootResolver::default().resolve(&sources, "left-pad");
        assert!(resolution.is_fallback());
        assert!(resolution.root.is_repository_root());
        assert_eq!(resolve_root(&sources, "left-pad").as_str(), ".");
    }

    #[test]
    fn requires_exact_declaration_spacing() {
        let sources = files(&[("lib/package.json", r#"{"name":"tight"}"#)]);
        assert!(RootResolver::default()
            .resolve(&sources, "tight")
            .is_fallback());
    }

    #[test]
    fn ignores_files_that_only_end_with_manifest_name() {
        let sources = files(&[("docs/not-package.json", r#"{ "name": "pkg" }"#)]);
        assert!(RootResolver::default().resolve(&sources, "pkg").is_fallback());
    }

    #[test]
    fn tolerates_malformed_manifest() {
        let sources = files(&[("pkg/package.json", r#"{ "name": "pkg", oops"#)]);
        assert_eq!(resolve_root(&sources, "pkg").as_str(), "pkg");
    }

    #[test]
    fn first_declaring_manifest_in_key_order_wins() {
        let sources = files(&[
            ("b/package.json", r#"{ "name": "dup" }"#),
            ("a/package.json", r#"{ "name": "dup" }"#),
        ]);
        assert_eq!(resolve_root(&sources, "dup").as_str(), "a");
    }

    #[test]
    fn nested_manifest_wins_over_top_level_with_same_name() {
        let sources = files(&[
            ("package.json", r#"{ "name": "dup" }"#),
            ("packages/dup/package.json", r#"{ "name": "dup" }"#),
        ]);
        let resolution = RootResolver::default().resolve(&sources, "dup");
        assert_eq!(resolution.root.as_str(), "packages/dup");
        assert_eq!(
            resolution.manifest.as_deref(),
            Some("packages/dup/package.json")
        );
    }

    #[test]
    fn top_level_manifest_anchors_single_package_repo() {
        let sources = files(&[
            ("package.json", r#"{ "name": "solo" }"#),
            ("packages/other/package.json", r#"{ "name": "other" }"#),
        ]);
        let resolution = RootResolver::new("package.json", "fallback")
            .resolve_strict(&sources, "solo")
            .unwrap();
        assert!(resolution.root.is_repository_root());
        assert_eq!(resolution.manifest.as_deref(), Some("package.json"));
    }

    #[test]
    fn resolution_is_idempotent() {
        let sources = files(&[("x/package.json", r#"{ "name": "x" }"#)]);
        let resolver = RootResolver::default();
        assert_eq!(resolver.resolve(&sources, "x"), resolver.resolve(&sources, "x"));
    }

    #[test]
    fn strict_mode_reports_missing_manifest() {
        let sources = files(&[("index.js", "")]);
        let err = RootResolver::default()
            .resolve_strict(&sources, "ghost")
            .unwrap_err();
        assert_eq!(
            err,
            VerifyError::RootNotFound {
                package: "ghost".to_string(),
                manifest: "package.json".to_string(),
            }
        );
    }

    #[test]
    fn custom_manifest_and_default_root() {
        let resolver = RootResolver::new("Cargo.toml", "crates");
        let sources = files(&[("crates/a/Cargo.toml", "name = \"a\"")]);
        let resolution = resolver.resolve(&sources, "a");
        assert_eq!(resolution.root.as_str(), "crates");
        assert!(resolution.is_fallback());
    }
}
