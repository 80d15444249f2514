//! Resolution records and the record cache.
//!
//! A [`Record`] is one successful answer for one queried name, as printed by
//! the resolution engine in its simple text format:
//!
//! ```text
//! www.example.com. A 93.184.216.34
//! ```
//!
//! A [`RecordSet`] is an ordered, duplicate-free collection of records. It is
//! the in-memory form of the record cache threaded through the pipeline, and
//! all set algebra on records goes through it so results never depend on
//! input order.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use crate::utils::{read_lines_if_exists, write_lines};

/// Separator between the queried name and the rest of an engine output line.
const NAME_SEPARATOR: &str = ". ";

/// One (queried name, answer) pair.
///
/// Equality and ordering cover the name, the record type and the answer.
/// Names are stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Record {
    /// Queried name, lowercase and without the trailing dot
    pub name: String,
    /// Record type as reported by the engine (`A`, `CNAME`, ...)
    pub kind: String,
    /// Answer data
    pub answer: String,
}

impl Record {
    pub fn new(name: impl Into<String>, kind: impl Into<String>, answer: impl Into<String>) -> Self {
        let mut name = name.into();
        name.make_ascii_lowercase();
        Self {
            name,
            kind: kind.into(),
            answer: answer.into(),
        }
    }

    /// An `A` record.
    pub fn a(name: impl Into<String>, answer: impl Into<String>) -> Self {
        Self::new(name, "A", answer)
    }

    /// Parses one engine output line.
    ///
    /// The queried name is everything before the first `". "`; the next field
    /// is the record type and the remainder is the answer. Returns `None` for
    /// lines that do not follow this shape.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let (name, rest) = line.split_once(NAME_SEPARATOR)?;
        let (kind, answer) = rest.trim_start().split_once(char::is_whitespace)?;
        let answer = answer.trim();
        if name.is_empty() || answer.is_empty() {
            return None;
        }
        Some(Self::new(name, kind, answer))
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{} {}", self.name, NAME_SEPARATOR, self.kind, self.answer)
    }
}

/// Ordered, duplicate-free set of records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    records: BTreeSet<Record>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses engine output, skipping malformed lines.
    pub fn parse(text: &str) -> Self {
        Self::parse_lines(text.lines())
    }

    /// Parses engine output lines, skipping malformed ones.
    pub fn parse_lines<'a, I>(lines: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut set = Self::new();
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            match Record::parse(line) {
                Some(record) => {
                    set.insert(record);
                }
                None => log::debug!("Skipping malformed record line: {:?}", line),
            }
        }
        set
    }

    /// Reads a record file; a missing file is an empty set.
    pub async fn load(path: &Path) -> std::io::Result<Self> {
        let lines = read_lines_if_exists(path).await?;
        Ok(Self::parse_lines(lines.iter().map(String::as_str)))
    }

    /// Writes the records in engine text format, sorted.
    pub async fn save(&self, path: &Path) -> std::io::Result<()> {
        write_lines(path, self.iter()).await
    }

    pub fn insert(&mut self, record: Record) -> bool {
        self.records.insert(record)
    }

    pub fn contains(&self, record: &Record) -> bool {
        self.records.contains(record)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Records present in either set.
    pub fn union(&self, other: &RecordSet) -> RecordSet {
        self.records.union(&other.records).cloned().collect()
    }

    /// Records of `self` that are not in `other`.
    pub fn difference(&self, other: &RecordSet) -> RecordSet {
        self.records.difference(&other.records).cloned().collect()
    }

    /// Records matching `predicate`.
    pub fn filtered<F>(&self, mut predicate: F) -> RecordSet
    where
        F: FnMut(&Record) -> bool,
    {
        self.records
            .iter()
            .filter(|r| predicate(r))
            .cloned()
            .collect()
    }

    /// Deduplicated, sorted projection onto the queried names.
    pub fn domains(&self) -> BTreeSet<String> {
        self.records.iter().map(|r| r.name.clone()).collect()
    }

    /// Engine text rendering, one sorted record per line.
    pub fn to_text(&self) -> String {
        self.records
            .iter()
            .map(|r| format!("{}\n", r))
            .collect()
    }
}

impl FromIterator<Record> for RecordSet {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl Extend<Record> for RecordSet {
    fn extend<T: IntoIterator<Item = Record>>(&mut self, iter: T) {
        self.records.extend(iter);
    }
}

impl IntoIterator for RecordSet {
    type Item = Record;
    type IntoIter = std::collections::btree_set::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::collections::btree_set::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
