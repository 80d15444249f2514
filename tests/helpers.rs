// Shared test helpers: in-memory engines and test file setup.
//
// The fake engines answer from fixed tables so pipeline scenarios can run
// without massdns, a detector or the network.

#![allow(dead_code)] // Each test file uses a different subset

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use domain_sift::{
    EngineError, Record, RecordSet, Resolver, ResolverSet, WildcardDetector, WildcardSet,
};

/// Resolver answering from one table per resolver set label.
#[derive(Default)]
pub struct FakeResolver {
    answers: HashMap<String, HashMap<String, Vec<String>>>,
    calls: Mutex<Vec<(String, Vec<String>)>>,
    fail_label: Option<String>,
}

impl FakeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// `name` resolves to `answer` when queried through resolver set `label`.
    pub fn answer(mut self, label: &str, name: &str, answer: &str) -> Self {
        self.answers
            .entry(label.to_string())
            .or_default()
            .entry(name.to_string())
            .or_default()
            .push(answer.to_string());
        self
    }

    /// Every invocation against `label` fails like a crashed engine.
    pub fn failing(mut self, label: &str) -> Self {
        self.fail_label = Some(label.to_string());
        self
    }

    /// Label and domain list of every invocation, in order.
    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Resolver for FakeResolver {
    async fn resolve(
        &self,
        domains: &[String],
        resolvers: &ResolverSet,
    ) -> Result<RecordSet, EngineError> {
        self.calls
            .lock()
            .unwrap()
            .push((resolvers.label.clone(), domains.to_vec()));
        if self.fail_label.as_deref() == Some(resolvers.label.as_str()) {
            return Err(EngineError::Exited {
                engine: "fake".to_string(),
                code: Some(2),
            });
        }
        let table = self.answers.get(&resolvers.label);
        let mut records = RecordSet::new();
        for domain in domains {
            if let Some(answers) = table.and_then(|t| t.get(domain)) {
                for answer in answers {
                    records.insert(Record::a(domain.clone(), answer.clone()));
                }
            }
        }
        Ok(records)
    }
}

/// Detector returning a fixed result and remembering what it was shown.
#[derive(Default)]
pub struct FakeDetector {
    result: WildcardSet,
    seen: Mutex<Option<(BTreeSet<String>, RecordSet)>>,
}

impl FakeDetector {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn reporting(roots: &[&str], answers: &[&str]) -> Self {
        Self {
            result: WildcardSet::from_lines(roots.iter().copied(), answers.iter().copied()),
            seen: Mutex::new(None),
        }
    }

    pub fn seen(&self) -> Option<(BTreeSet<String>, RecordSet)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl WildcardDetector for FakeDetector {
    async fn detect(
        &self,
        domains: &BTreeSet<String>,
        cache: &RecordSet,
    ) -> Result<WildcardSet, EngineError> {
        *self.seen.lock().unwrap() = Some((domains.clone(), cache.clone()));
        Ok(self.result.clone())
    }
}

pub fn resolver_set(label: &str) -> ResolverSet {
    ResolverSet {
        label: label.to_string(),
        path: PathBuf::from(format!("{}.txt", label)),
        addresses: vec!["127.0.0.1".to_string()],
        rate_limit: 0,
    }
}

/// Writes `lines` to `dir/name`, one per line, and returns the path.
pub fn write_file(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut contents = lines.join("\n");
    contents.push('\n');
    std::fs::write(&path, contents).expect("Failed to write test file");
    path
}
