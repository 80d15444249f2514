//! Wildcard filtering.
//!
//! A record is pollution when both hold:
//! - its name is a wildcard root or lies beneath one
//! - its answer is one of the answers the wildcard roots produce
//!
//! Pollution is subtracted from the cache, then the verified records of the
//! roots themselves are added back: a root is a real name even though its
//! answer matches the signature of its own subtree.

use std::collections::{BTreeSet, HashSet};

use log::debug;

use super::WildcardSet;
use crate::records::RecordSet;

/// Result of one filter pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutcome {
    /// Cleaned record cache
    pub records: RecordSet,
    /// Query-name projection of `records`
    pub domains: BTreeSet<String>,
    /// Number of records classified as pollution (before restoration)
    pub removed: usize,
}

/// Removes wildcard pollution from `cache`.
///
/// # Arguments
///
/// * `cache` - Records to clean
/// * `wildcards` - Detected roots and their answers
/// * `verified_roots` - Records obtained by resolving the literal root names
///   against trusted resolvers; always present in the output
///
/// The result does not depend on input order, and applying the filter again
/// with the same arguments changes nothing.
pub fn filter_wildcards(
    cache: &RecordSet,
    wildcards: &WildcardSet,
    verified_roots: &RecordSet,
) -> FilterOutcome {
    let roots: HashSet<&str> = wildcards.roots.iter().map(|r| r.name()).collect();
    let polluted = cache.filtered(|record| {
        wildcards.answers.contains(&record.answer) && under_any_root(&record.name, &roots)
    });

    let cleaned = cache.difference(&polluted);
    let records = cleaned.union(verified_roots);
    let domains = records.domains();
    debug!(
        "Wildcard filter: {} records in, {} polluted, {} restored roots, {} records out",
        cache.len(),
        polluted.len(),
        verified_roots.len(),
        records.len()
    );

    FilterOutcome {
        records,
        domains,
        removed: polluted.len(),
    }
}

/// Walks `name` and each of its parent names, checking for a root.
fn under_any_root(name: &str, roots: &HashSet<&str>) -> bool {
    let mut candidate = name;
    loop {
        if roots.contains(candidate) {
            return true;
        }
        match candidate.split_once('.') {
            Some((_, parent)) if !parent.is_empty() => candidate = parent,
            _ => return false,
        }
    }
}
