//! Input preparation.
//!
//! Builds the initial working domain list from either a file of literal
//! domains or a wordlist combined with a base domain, optionally sanitizing
//! every line against a strict character allow-list.
//!
//! Key functions:
//! - `sanitize_domain()` - Lowercases a line and rejects anything outside `[a-z0-9.-]`
//! - `prepare_domains()` - Reads the input and produces the domain list

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

// Pattern is a compile-time constant
static DOMAIN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9.-]+$").expect("domain pattern is valid"));

/// Where the candidate domains come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    /// A file of literal domains (`-` for stdin).
    ResolveFile(PathBuf),
    /// Every wordlist line `w` becomes `w.<base_domain>`.
    Bruteforce {
        wordlist: PathBuf,
        base_domain: String,
    },
}

/// Returns true when `path` designates standard input.
pub fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Lowercases `line` and keeps it only if it matches `^[a-z0-9.-]+$`.
///
/// Invalid lines are filtered, not reported: the return value is `None`.
pub fn sanitize_domain(line: &str) -> Option<String> {
    let lowered = line.to_lowercase();
    DOMAIN_PATTERN.is_match(&lowered).then_some(lowered)
}

/// Builds the bruteforce candidate for one wordlist line.
pub fn bruteforce_candidate(word: &str, base_domain: &str) -> String {
    format!("{}.{}", word, base_domain)
}

/// Reads the input described by `mode` into the initial domain list.
///
/// Blank lines are skipped. Duplicates are kept; later stages deduplicate.
/// An empty result is valid and simply yields no records downstream.
///
/// # Errors
///
/// Returns an error if the input file (or stdin) cannot be read.
pub async fn prepare_domains(mode: &InputMode, sanitize: bool) -> Result<Vec<String>> {
    match mode {
        InputMode::ResolveFile(path) if is_stdin(path) => {
            let reader = BufReader::new(tokio::io::stdin());
            collect_lines(reader, sanitize, |line| line.to_string())
                .await
                .context("Failed to read domains from stdin")
        }
        InputMode::ResolveFile(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open domain list {}", path.display()))?;
            collect_lines(BufReader::new(file), sanitize, |line| line.to_string())
                .await
                .with_context(|| format!("Failed to read domain list {}", path.display()))
        }
        InputMode::Bruteforce {
            wordlist,
            base_domain,
        } => {
            let file = tokio::fs::File::open(wordlist)
                .await
                .with_context(|| format!("Failed to open wordlist {}", wordlist.display()))?;
            let base_domain = base_domain.trim();
            collect_lines(BufReader::new(file), sanitize, |word| {
                bruteforce_candidate(word, base_domain)
            })
            .await
            .with_context(|| format!("Failed to read wordlist {}", wordlist.display()))
        }
    }
}

async fn collect_lines<R, F>(reader: R, sanitize: bool, build: F) -> std::io::Result<Vec<String>>
where
    R: AsyncBufRead + Unpin,
    F: Fn(&str) -> String,
{
    let mut lines = reader.lines();
    let mut domains = Vec::new();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let candidate = build(line);
        if sanitize {
            if let Some(domain) = sanitize_domain(&candidate) {
                domains.push(domain);
            }
        } else {
            domains.push(candidate);
        }
    }
    Ok(domains)
}
