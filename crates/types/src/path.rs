//! Path normalization for repository-relative paths
//!
//! Every path built from untrusted input (target file names, sourcemap
//! `sources` entries) goes through here. `..` segments are clamped at the
//! anchor instead of climbing above it, so a crafted path can never leave
//! the package root it is joined under.

/// Collapse empty, `.` and `..` segments.
///
/// Leading `/` is dropped and `..` at the top is discarded. An empty result
/// is reported as `.`.
#[must_use]
pub fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        ".".to_string()
    } else {
        segments.join("/")
    }
}

/// Join `path` under `root`, anchoring it first so that an absolute-looking
/// path (`/src/index.ts`) or a traversal (`../../x`) resolves inside `root`.
#[must_use]
pub fn join_rooted(root: &str, path: &str) -> String {
    let root = normalize(root);
    let relative = normalize(path);

    match (root.as_str(), relative.as_str()) {
        (".", rel) => rel.to_string(),
        (root, ".") => root.to_string(),
        (root, rel) => format!("{root}/{rel}"),
    }
}

/// Directory portion of a `/`-separated path, `.` when there is none.
#[must_use]
pub fn dirname(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) => "/".to_string(),
        Some(idx) => trimmed[..idx].to_string(),
        None => ".".to_string(),
    }
}

/// Final segment of a `/`-separated path.
#[must_use]
pub fn basename(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}
