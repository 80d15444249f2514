//! Engine adapters driven against small shell-script engines.
#![cfg(unix)]

use std::collections::BTreeSet;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use domain_sift::initialization::ScratchDir;
use domain_sift::resolve::MassdnsResolver;
use domain_sift::wildcard::CommandDetector;
use domain_sift::{EngineError, Record, Resolver, ResolverSet, WildcardDetector};

/// Answers every name except `nx.*` with 10.0.0.1, in massdns simple format.
const FAKE_MASSDNS: &str = r#"#!/bin/sh
out=""
while [ $# -gt 0 ]; do
  case "$1" in
    -w) out="$2"; shift 2 ;;
    *) shift ;;
  esac
done
: > "$out"
while read -r name; do
  case "$name" in
    nx.*) ;;
    *) echo "$name. A 10.0.0.1" >> "$out" ;;
  esac
done
"#;

const FAILING_ENGINE: &str = "#!/bin/sh\nexit 3\n";

/// Reports one wildcard root when the cache mentions it, nothing otherwise.
const FAKE_DETECTOR: &str = r#"#!/bin/sh
while [ $# -gt 0 ]; do
  case "$1" in
    --cache) cache="$2"; shift 2 ;;
    --roots-output) roots="$2"; shift 2 ;;
    --answers-output) answers="$2"; shift 2 ;;
    *) shift 2 ;;
  esac
done
if grep -q "wild.example.com" "$cache"; then
  echo "*.wild.example.com" > "$roots"
  echo "9.9.9.9" > "$answers"
fi
"#;

fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).expect("Failed to write script");
    let mut permissions = std::fs::metadata(&path).unwrap().permissions();
    permissions.set_mode(0o755);
    std::fs::set_permissions(&path, permissions).unwrap();
    path
}

fn resolver_set(dir: &Path, rate_limit: u32) -> ResolverSet {
    let path = dir.join("resolvers.txt");
    std::fs::write(&path, "127.0.0.1\n").unwrap();
    ResolverSet {
        label: "public".to_string(),
        path,
        addresses: vec!["127.0.0.1".to_string()],
        rate_limit,
    }
}

fn scratch() -> Arc<ScratchDir> {
    Arc::new(ScratchDir::create(false).expect("Failed to create scratch directory"))
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_massdns_adapter_parses_engine_output() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let bin = script(dir.path(), "massdns", FAKE_MASSDNS);
    let resolver = MassdnsResolver::new(bin, 100, scratch(), CancellationToken::new());

    let records = resolver
        .resolve(
            &names(&["a.example.com", "nx.example.com", "b.example.com"]),
            &resolver_set(dir.path(), 0),
        )
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert!(records.contains(&Record::a("a.example.com", "10.0.0.1")));
    assert!(records.contains(&Record::a("b.example.com", "10.0.0.1")));
}

#[tokio::test]
async fn test_massdns_adapter_with_rate_limit() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let bin = script(dir.path(), "massdns", FAKE_MASSDNS);
    let resolver = MassdnsResolver::new(bin, 100, scratch(), CancellationToken::new());

    let records = resolver
        .resolve(
            &names(&["a.example.com", "b.example.com", "c.example.com"]),
            &resolver_set(dir.path(), 1000),
        )
        .await
        .unwrap();
    assert_eq!(records.domains().len(), 3);
}

#[tokio::test]
async fn test_massdns_nonzero_exit_is_fatal() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let bin = script(dir.path(), "massdns", FAILING_ENGINE);
    let resolver = MassdnsResolver::new(bin, 100, scratch(), CancellationToken::new());

    let result = resolver
        .resolve(&names(&["a.example.com"]), &resolver_set(dir.path(), 0))
        .await;
    assert!(matches!(
        result,
        Err(EngineError::Exited { code: Some(3), .. })
    ));
}

#[tokio::test]
async fn test_massdns_cancellation_kills_engine() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let bin = script(dir.path(), "massdns", "#!/bin/sh\nsleep 30\n");
    let cancel = CancellationToken::new();
    let resolver = MassdnsResolver::new(bin, 100, scratch(), cancel.clone());

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        canceller.cancel();
    });
    let result = tokio::time::timeout(
        std::time::Duration::from_secs(10),
        resolver.resolve(&names(&["a.example.com"]), &resolver_set(dir.path(), 0)),
    )
    .await
    .expect("cancellation did not stop the engine");
    assert!(matches!(result, Err(EngineError::Cancelled)));
}

#[tokio::test]
async fn test_detector_adapter_reads_both_lists() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let bin = script(dir.path(), "detect", FAKE_DETECTOR);
    let detector = CommandDetector::new(
        bin,
        dir.path().join("trusted.txt"),
        scratch(),
        CancellationToken::new(),
    );

    let domains: BTreeSet<String> = names(&["x.wild.example.com"]).into_iter().collect();
    let cache = [Record::a("x.wild.example.com", "9.9.9.9")]
        .into_iter()
        .collect();
    let found = detector.detect(&domains, &cache).await.unwrap();

    assert_eq!(found.root_names(), vec!["wild.example.com"]);
    assert!(found.answers.contains("9.9.9.9"));
}

#[tokio::test]
async fn test_detector_without_output_files_reports_nothing() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let bin = script(dir.path(), "detect", FAKE_DETECTOR);
    let detector = CommandDetector::new(
        bin,
        dir.path().join("trusted.txt"),
        scratch(),
        CancellationToken::new(),
    );

    let domains: BTreeSet<String> = names(&["www.example.com"]).into_iter().collect();
    let cache = [Record::a("www.example.com", "5.5.5.5")].into_iter().collect();
    let found = detector.detect(&domains, &cache).await.unwrap();
    assert!(found.is_empty());
}

#[tokio::test]
async fn test_detector_nonzero_exit_is_fatal() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let bin = script(dir.path(), "detect", FAILING_ENGINE);
    let detector = CommandDetector::new(
        bin,
        dir.path().join("trusted.txt"),
        scratch(),
        CancellationToken::new(),
    );

    let domains: BTreeSet<String> = names(&["a.example.com"]).into_iter().collect();
    let result = detector
        .detect(&domains, &Default::default())
        .await;
    assert!(matches!(result, Err(EngineError::Exited { .. })));
}
