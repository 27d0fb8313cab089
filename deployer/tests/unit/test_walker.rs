//! Source tree walker tests

use crate::mocks::MockSource;
use gh2hf::github::walker::list_files;

fn paths(entries: &[gh2hf::github::walker::TreeEntry]) -> Vec<String> {
    let mut paths: Vec<String> = entries.iter().map(|e| e.path.clone()).collect();
    paths.sort();
    paths
}

fn source(truncated: bool) -> MockSource {
    let mut source = MockSource::new(&[
        ("Dockerfile", "FROM alpine\n"),
        ("src/main.go", "package main\n"),
        ("src/util/strings.go", "package util\n"),
        ("node_modules/left-pad/index.js", "module.exports = 1\n"),
        (".git/HEAD", "ref: refs/heads/main\n"),
        ("dist/bundle.js", "!function(){}\n"),
    ]);
    source.truncated = truncated;
    source
}

#[tokio::test]
async fn test_list_files_filters_excluded_prefixes() {
    let source = source(false);
    let entries = list_files(&source, "octo", "demo", "main").await.unwrap();

    assert_eq!(
        paths(&entries),
        vec!["Dockerfile", "src/main.go", "src/util/strings.go"]
    );
    assert!(entries.iter().all(|e| e.size > 0));
}

#[tokio::test]
async fn test_truncated_listing_walks_directories() {
    let source = source(true);
    let entries = list_files(&source, "octo", "demo", "main").await.unwrap();

    assert_eq!(
        paths(&entries),
        vec!["Dockerfile", "src/main.go", "src/util/strings.go"]
    );
    let nested = entries
        .iter()
        .find(|e| e.path == "src/util/strings.go")
        .unwrap();
    assert_eq!(nested.sha, "src/util/strings.go");
}

#[test]
fn test_empty_repository_lists_nothing() {
    let source = MockSource::new(&[(".github/workflows/ci.yml", "on: push\n")]);
    let entries = tokio_test::block_on(list_files(&source, "octo", "demo", "main"));
    assert!(tokio_test::assert_ok!(entries).is_empty());
}
