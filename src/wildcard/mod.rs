//! Wildcard detection and filtering.
//!
//! A wildcard root is a name whose whole subtree answers identically, so
//! every guessed subdomain under it "resolves". Detection is delegated to an
//! external engine behind the [`WildcardDetector`] seam; filtering is the set
//! algebra in [`filter_wildcards`].

mod detector;
mod filter;

use std::collections::BTreeSet;
use std::fmt;

use async_trait::async_trait;

use crate::error_handling::EngineError;
use crate::records::RecordSet;

pub use detector::CommandDetector;
pub use filter::{filter_wildcards, FilterOutcome};

/// Marker the detector puts in front of a wildcard root.
pub const WILDCARD_PREFIX: &str = "*.";

/// A wildcard root, stored without its `*.` marker.
///
/// `Display` re-adds the marker.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WildcardRoot(String);

impl WildcardRoot {
    /// Builds a root from a detector line, with or without the `*.` marker.
    /// The name is lowercased.
    ///
    /// Returns `None` for a blank line or a bare marker.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let name = line.strip_prefix(WILDCARD_PREFIX).unwrap_or(line);
        let name = name.trim_end_matches('.');
        if name.is_empty() {
            None
        } else {
            Some(Self(name.to_ascii_lowercase()))
        }
    }

    /// The literal root name, e.g. `foo.example.com` for `*.foo.example.com`.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WildcardRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", WILDCARD_PREFIX, self.0)
    }
}

/// Detector findings: wildcard roots and the answers they produce.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WildcardSet {
    pub roots: BTreeSet<WildcardRoot>,
    pub answers: BTreeSet<String>,
}

impl WildcardSet {
    /// Builds a set from raw detector lines.
    pub fn from_lines<R, A>(roots: R, answers: A) -> Self
    where
        R: IntoIterator,
        R::Item: AsRef<str>,
        A: IntoIterator,
        A::Item: AsRef<str>,
    {
        Self {
            roots: roots
                .into_iter()
                .filter_map(|line| WildcardRoot::parse(line.as_ref()))
                .collect(),
            answers: answers
                .into_iter()
                .map(|line| line.as_ref().trim().to_string())
                .filter(|answer| !answer.is_empty())
                .collect(),
        }
    }

    /// No roots found; wildcard handling is skipped entirely.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Literal root names, for re-resolution against trusted resolvers.
    pub fn root_names(&self) -> Vec<String> {
        self.roots.iter().map(|r| r.name().to_string()).collect()
    }
}

/// Wildcard detection engine seam.
#[async_trait]
pub trait WildcardDetector: Send + Sync {
    /// Finds wildcard roots among `domains`, using `cache` as prior answers.
    async fn detect(
        &self,
        domains: &BTreeSet<String>,
        cache: &RecordSet,
    ) -> Result<WildcardSet, EngineError>;
}

#[async_trait]
impl<T: WildcardDetector + ?Sized> WildcardDetector for &T {
    async fn detect(
        &self,
        domains: &BTreeSet<String>,
        cache: &RecordSet,
    ) -> Result<WildcardSet, EngineError> {
        (**self).detect(domains, cache).await
    }
}
