//! End-to-end runs of the verification engine over in-memory file sets

mod common;

use std::sync::Arc;

use common::{collect_events, files};
use crumbs_config::Config;
use crumbs_errors::{Error, SourcemapError, VerifyError};
use crumbs_events::{AppEvent, MatchOutcome, VerifyEvent};
use crumbs_matcher::{
    match_file, match_sourcemap, resolve_root, similarity, verify, BundleCoherence,
    VerificationEngine,
};
use crumbs_sourcemap::SourcemapValidator;
use crumbs_types::{Coherence, FileSet, PackageRef, PackageRoot, RepoRef};
use serde_json::json;

#[test]
fn scenario_a_identical_file() {
    let entries = verify("a", &files(&[("a.js", "x")]), &files(&[("a.js", "x")])).unwrap();
    assert_eq!(
        serde_json::to_value(&entries).unwrap(),
        json!({ "a.js": { "source": { "matchedPaths": ["a.js"], "coherence": 100 }, "sourcemap": null } })
    );
}

#[test]
fn scenario_b_malformed_map_fails_but_file_match_still_works() {
    let targets = files(&[
        ("pkg/dist/a.js", "x"),
        ("pkg/dist/a.js.map", "{invalid json"),
    ]);
    let sources = files(&[
        ("pkg/package.json", r#"{ "name": "pkg", "version": "1.0.0" }"#),
        ("pkg/src/a.js", "x"),
    ]);
    let root = resolve_root(&sources, "pkg");
    assert_eq!(root.as_str(), "pkg");

    let err = match_sourcemap("pkg/dist/a.js", &targets, &sources, &root).unwrap_err();
    assert!(matches!(err, VerifyError::MalformedSourcemap { .. }));

    let source = match_file("pkg/dist/a.js", "x", &sources, &root).unwrap();
    assert_eq!(source.matched_paths, vec!["pkg/src/a.js"]);
    assert_eq!(source.coherence, Coherence::Exact);

    assert!(matches!(
        verify("pkg", &targets, &sources),
        Err(Error::Verify(VerifyError::MalformedSourcemap { .. }))
    ));
}

#[test]
fn scenario_c_missing_manifest_uses_top_level_paths() {
    let sources = files(&[
        ("index.js", "module.exports = 1\n"),
        ("nested/index.js", "module.exports = 1;\n"),
    ]);
    assert!(resolve_root(&sources, "anything").is_repository_root());

    let entries = verify(
        "anything",
        &files(&[("index.js", "module.exports = 2\n")]),
        &sources,
    )
    .unwrap();
    let source = entries["index.js"].source.as_ref().unwrap();
    assert_eq!(source.matched_paths, vec!["index.js"]);
    assert!(!source.coherence.is_exact());
}

#[test]
fn scenario_d_duplicate_sources_are_deterministic() {
    let sources = files(&[
        ("packages/b/util.js", "export const id = (x) => x"),
        ("packages/a/util.js", "export const id = (x) => x"),
    ]);
    let targets = files(&[("util.js", "export const id = (x) => x")]);

    let first = verify("p", &targets, &sources).unwrap();
    for _ in 0..10 {
        assert_eq!(verify("p", &targets, &sources).unwrap(), first);
    }
    assert_eq!(
        first["util.js"].source.as_ref().unwrap().matched_paths,
        vec!["packages/a/util.js"]
    );

    let mut config = Config::default();
    config.matching.all_exact_matches = true;
    let all = VerificationEngine::new(&config)
        .verify("p", &targets, &sources)
        .unwrap();
    assert_eq!(
        all["util.js"].source.as_ref().unwrap().matched_paths,
        vec!["packages/a/util.js", "packages/b/util.js"]
    );
}

#[test]
fn same_path_identity_reports_target_path() {
    let targets = files(&[("lib/a.js", "same")]);
    let sources = files(&[("aaa/first.js", "same"), ("lib/a.js", "same")]);
    let entries = verify("p", &targets, &sources).unwrap();
    assert_eq!(
        entries["lib/a.js"].source.as_ref().unwrap().matched_paths,
        vec!["lib/a.js"]
    );
}

#[test]
fn monorepo_package_verifies_against_its_own_subtree() {
    let sources = files(&[
        ("package.json", r#"{ "name": "acme", "private": true }"#),
        ("packages/core/package.json", r#"{ "name": "@acme/core", "version": "2.0.0" }"#),
        ("packages/core/index.js", "export const core = () => 'core'\n"),
        ("packages/web/package.json", r#"{ "name": "@acme/web", "version": "2.0.0" }"#),
        ("packages/web/index.js", "export const web = () => 'web'\n"),
        ("index.js", "export const web = () => 'web!'\n"),
    ]);
    let targets = files(&[
        ("package.json", r#"{ "name": "@acme/web", "version": "2.0.0", "files": [] }"#),
        ("index.js", "export const web = () => 'web';\n"),
    ]);

    let (tx, mut rx) = crumbs_events::channel();
    let engine = VerificationEngine::default().with_event_sender(tx);
    let entries = engine.verify("@acme/web", &targets, &sources).unwrap();

    let index = entries["index.js"].source.as_ref().unwrap();
    assert_eq!(index.matched_paths, vec!["packages/web/index.js"]);
    match index.coherence {
        Coherence::Similarity(ratio) => assert!(ratio > 0.95 && ratio < 1.0),
        Coherence::Exact => panic!("reformatted file cannot be exact"),
    }
    let manifest = entries["package.json"].source.as_ref().unwrap();
    assert_eq!(manifest.matched_paths, vec!["packages/web/package.json"]);

    let events = collect_events(&mut rx);
    assert!(events.iter().any(|e| matches!(
        e,
        AppEvent::Verify(VerifyEvent::RootResolved { root, manifest: Some(m), .. })
            if root == "packages/web" && m == "packages/web/package.json"
    )));
}

#[test]
fn valid_sourcemap_flow() {
    let original = "let answer = 42;\nexport { answer };\n";
    let map = json!({
        "version": 3,
        "file": "index.js",
        "sources": ["/src/index.js"],
        "sourcesContent": [original],
        "names": ["answer"],
        "mappings": "AAAA,IAAIA"
    })
    .to_string();
    let targets = files(&[
        ("dist/index.js", "let answer=42;export{answer};"),
        ("dist/index.js.map", &map),
    ]);
    let sources = files(&[
        ("lib/package.json", r#"{ "name": "answer" }"#),
        ("lib/src/index.js", original),
    ]);

    let entries = verify("answer", &targets, &sources).unwrap();
    let info = entries["dist/index.js"].sourcemap.as_ref().unwrap();
    assert_eq!(info.declared_sources, vec!["lib/src/index.js"]);
    assert!(info.valid);
    assert!(info.coherence.is_none());

    let map_verdict = &entries["dist/index.js.map"];
    assert!(map_verdict.sourcemap.is_none());
    assert!(map_verdict.source.is_none());

    let summary = crumbs_types::VerificationSummary::from_entries(&entries);
    assert_eq!(summary.files, 2);
    assert_eq!(summary.sourcemaps, 1);
    assert_eq!(summary.invalid_sourcemaps, 0);
}

#[test]
fn sourcemap_escape_attempts_stay_in_root() {
    let map = r#"{"version":3,"sources":["../../../../home/user/.ssh/id_rsa","/etc/passwd"],"mappings":""}"#;
    let targets = files(&[("a.js", ""), ("a.js.map", map)]);
    let sources = files(&[("pkg/package.json", r#"{ "name": "pkg" }"#)]);
    let entries = verify("pkg", &targets, &sources).unwrap();
    let declared = &entries["a.js"].sourcemap.as_ref().unwrap().declared_sources;
    assert_eq!(declared, &vec!["pkg/home/user/.ssh/id_rsa", "pkg/etc/passwd"]);
    assert!(declared.iter().all(|p| p.starts_with("pkg/")));
}

struct Rejecting;

impl SourcemapValidator for Rejecting {
    fn validate(&self, _: &str, _: &str, _: &FileSet) -> Result<(), SourcemapError> {
        Err(SourcemapError::InvalidMap {
            message: "rejected".to_string(),
        })
    }
}

struct MeanSimilarity;

impl BundleCoherence for MeanSimilarity {
    fn score(
        &self,
        _target_path: &str,
        target_content: &str,
        declared_sources: &[String],
        sources: &FileSet,
    ) -> Option<f64> {
        let scores: Vec<f64> = declared_sources
            .iter()
            .filter_map(|path| sources.get(path))
            .map(|content| similarity(target_content, content))
            .collect();
        #[allow(clippy::cast_precision_loss)]
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        (!scores.is_empty()).then_some(mean)
    }
}

#[test]
fn pluggable_validator_and_coherence() {
    let map = r#"{"version":3,"sources":["a.ts"],"mappings":""}"#;
    let targets = files(&[("a.js", "abc"), ("a.js.map", map)]);
    let sources = files(&[("a.ts", "abc")]);

    let (tx, mut rx) = crumbs_events::channel();
    let entries = VerificationEngine::default()
        .with_validator(Arc::new(Rejecting))
        .with_coherence(Arc::new(MeanSimilarity))
        .with_event_sender(tx)
        .verify("p", &targets, &sources)
        .unwrap();

    let info = entries["a.js"].sourcemap.as_ref().unwrap();
    assert!(!info.valid);
    assert_eq!(info.coherence, Some(1.0));
    assert!(collect_events(&mut rx).iter().any(|e| matches!(
        e,
        AppEvent::Verify(VerifyEvent::SourcemapRejected { reason, .. }) if reason.contains("rejected")
    )));
}

#[test]
fn digest_serializes_with_metadata() {
    let digest = VerificationEngine::default()
        .verify_digest(
            PackageRef::new("a", "1.0.0"),
            RepoRef::git("https://github.com/acme/a").at_commit("abc"),
            &files(&[("a.js", "x"), ("b.js", "y")]),
            &files(&[("a.js", "x")]),
        )
        .unwrap();
    let value = serde_json::to_value(&digest).unwrap();
    assert_eq!(value["meta"]["packageRef"]["name"], "a");
    assert_eq!(value["meta"]["repoRef"]["type"], "git");
    assert_eq!(value["meta"]["repoRef"]["hash"], "abc");
    assert_eq!(value["entries"]["b.js"]["source"], serde_json::Value::Null);

    let back: crumbs_types::Digest = serde_json::from_value(value).unwrap();
    assert_eq!(back, digest);
}

#[test]
fn file_level_events_follow_key_order() {
    let targets: FileSet = (0..100)
        .map(|i| (format!("f{i:03}.js"), format!("{i}")))
        .collect();
    let sources = targets.clone();

    let (tx, mut rx) = crumbs_events::channel();
    let mut config = Config::default();
    config.engine.parallel_threshold = 8;
    VerificationEngine::new(&config)
        .with_event_sender(tx)
        .verify("p", &targets, &sources)
        .unwrap();

    let matched: Vec<String> = collect_events(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            AppEvent::Verify(VerifyEvent::FileMatched { path, outcome }) => {
                assert!(matches!(outcome, MatchOutcome::Exact { .. }));
                Some(path)
            }
            _ => None,
        })
        .collect();
    assert_eq!(matched, targets.keys().cloned().collect::<Vec<_>>());
}

#[test]
fn root_default_can_be_configured() {
    let config = Config::from_toml(
        r#"
        [matching]
        default_root = "app"
        "#,
    )
    .unwrap();
    let entries = VerificationEngine::new(&config)
        .verify(
            "p",
            &files(&[("main.js", "a+b")]),
            &files(&[("app/main.js", "a + b")]),
        )
        .unwrap();
    assert_eq!(
        entries["main.js"].source.as_ref().unwrap().matched_paths,
        vec!["app/main.js"]
    );
    assert_eq!(
        PackageRoot::new(&config.matching.default_root).join("main.js"),
        "app/main.js"
    );
}
