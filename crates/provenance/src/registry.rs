//! Registry endpoints and repository URL normalization

use crumbs_errors::FetchError;
use crumbs_types::PackageRef;
use url::Url;

/// Document describing one published version
#[must_use]
pub fn packument_url(package: &PackageRef) -> String {
    format!("{}/{}/{}", package.registry, package.name, package.version)
}

/// Tarball of one published version; scoped names drop their scope in the
/// file name (`@acme/core` -> `core-1.0.0.tgz`).
#[must_use]
pub fn tarball_url(package: &PackageRef) -> String {
    format!(
        "{}/{}/-/{}-{}.tgz",
        package.registry,
        package.name,
        unscoped_name(&package.name),
        package.version
    )
}

/// Sigstore bundles attached to one published version
#[must_use]
pub fn attestations_url(package: &PackageRef) -> String {
    format!(
        "{}/-/npm/v1/attestations/{}@{}",
        package.registry, package.name, package.version
    )
}

/// Name with everything up to the last `/` (or encoded `%2f`) removed
#[must_use]
pub fn unscoped_name(name: &str) -> &str {
    let slash = name.rfind('/').filter(|&i| i > 0).map(|i| i + 1);
    let encoded = name.rfind("%2f").filter(|&i| i > 0).map(|i| i + 3);
    match slash.max(encoded) {
        Some(start) => &name[start..],
        None => name,
    }
}

/// Rewrite a declared repository URL into the `git@host:path` form used
/// for checkouts.
///
/// Accepts URL forms (`git+https://`, `https://`, `git://`, `ssh://`),
/// scp-style `git@host:path`, and the `github:owner/repo` or bare
/// `owner/repo` shorthands.
///
/// # Errors
/// Returns `FetchError::InvalidRepositoryUrl` when no host and path can be
/// extracted.
pub fn normalize_repo_url(raw: &str) -> Result<String, FetchError> {
    let invalid = || FetchError::InvalidRepositoryUrl {
        url: raw.to_string(),
    };
    let trimmed = raw.trim();

    if let Some((host, path)) = shorthand(trimmed) {
        return Ok(format!("git@{host}:{path}"));
    }

    if !trimmed.contains("://") {
        // scp-style: [user@]host:path
        let (authority, path) = trimmed.split_once(':').ok_or_else(invalid)?;
        let host = authority.rsplit('@').next().unwrap_or(authority);
        let path = path.trim_start_matches('/');
        if host.is_empty() || path.is_empty() {
            return Err(invalid());
        }
        return Ok(format!("git@{host}:{path}"));
    }

    let url = Url::parse(trimmed).map_err(|_| invalid())?;
    let host = url.host_str().filter(|h| !h.is_empty()).ok_or_else(invalid)?;
    let path = url.path().trim_start_matches('/');
    if path.is_empty() {
        return Err(invalid());
    }
    Ok(format!("git@{host}:{path}"))
}

fn shorthand(value: &str) -> Option<(&'static str, &str)> {
    const PROVIDERS: [(&str, &str); 3] = [
        ("github:", "github.com"),
        ("gitlab:", "gitlab.com"),
        ("bitbucket:", "bitbucket.org"),
    ];
    for (prefix, host) in PROVIDERS {
        if let Some(path) = value.strip_prefix(prefix) {
            return Some((host, path));
        }
    }

    let is_bare = !value.contains(':')
        && !value.starts_with('/')
        && value.split('/').count() == 2
        && value.split('/').all(|part| !part.is_empty());
    is_bare.then_some(("github.com", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_registry_urls() {
        let pkg = PackageRef::new("toposource", "1.1.4");
        assert_eq!(
            packument_url(&pkg),
            "https://registry.npmjs.org/toposource/1.1.4"
        );
        assert_eq!(
            tarball_url(&pkg),
            "https://registry.npmjs.org/toposource/-/toposource-1.1.4.tgz"
        );
        assert_eq!(
            attestations_url(&pkg),
            "https://registry.npmjs.org/-/npm/v1/attestations/toposource@1.1.4"
        );
    }

    #[test]
    fn scoped_tarball_drops_scope() {
        let pkg = PackageRef::new("@acme/core", "2.0.0").with_registry("https://npm.acme.dev/");
        assert_eq!(
            tarball_url(&pkg),
            "https://npm.acme.dev/@acme/core/-/core-2.0.0.tgz"
        );
        assert_eq!(unscoped_name("@acme%2fcore"), "core");
        assert_eq!(unscoped_name("plain"), "plain");
    }

    #[test]
    fn normalizes_repository_urls() {
        let cases = [
            (
                "git+https://github.com/semrel-extra/toposource.git",
                "git@github.com:semrel-extra/toposource.git",
            ),
            ("https://gitlab.com/a/b", "git@gitlab.com:a/b"),
            ("ssh://git@github.com/a/b.git", "git@github.com:a/b.git"),
            ("git://github.com/a/b.git", "git@github.com:a/b.git"),
            ("git@github.com:a/b.git", "git@github.com:a/b.git"),
            ("github:a/b", "git@github.com:a/b"),
            ("a/b", "git@github.com:a/b"),
        ];
        for (input, expected) in cases {
            assert_eq!(normalize_repo_url(input).unwrap(), expected, "{input}");
        }
    }

    #[test]
    fn rejects_urls_without_path() {
        assert!(matches!(
            normalize_repo_url("https://github.com/"),
            Err(FetchError::InvalidRepositoryUrl { .. })
        ));
        assert!(normalize_repo_url("not a url").is_err());
    }
}
