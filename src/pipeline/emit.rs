//! Output artifacts.

use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use super::PipelineOutcome;
use crate::config::OutputPaths;
use crate::utils::write_lines;

/// Writes every output file the operator asked for.
///
/// Domains, records and answers are written sorted; wildcard roots get their
/// `*.` marker back.
///
/// # Errors
///
/// Returns an error naming the file that could not be written.
pub async fn emit_outputs(outcome: &PipelineOutcome, outputs: &OutputPaths) -> Result<()> {
    if let Some(path) = &outputs.domains {
        write_lines(path, &outcome.domains)
            .await
            .with_context(|| written("domains", path))?;
        info!("Wrote {} domains to {}", outcome.domains.len(), path.display());
    }
    if let Some(path) = &outputs.records {
        outcome
            .records
            .save(path)
            .await
            .with_context(|| written("records", path))?;
        info!("Wrote {} records to {}", outcome.records.len(), path.display());
    }
    if let Some(path) = &outputs.wildcard_roots {
        write_lines(path, &outcome.wildcards.roots)
            .await
            .with_context(|| written("wildcard roots", path))?;
        info!(
            "Wrote {} wildcard roots to {}",
            outcome.wildcards.roots.len(),
            path.display()
        );
    }
    if let Some(path) = &outputs.wildcard_answers {
        write_lines(path, &outcome.wildcards.answers)
            .await
            .with_context(|| written("wildcard answers", path))?;
        info!(
            "Wrote {} wildcard answers to {}",
            outcome.wildcards.answers.len(),
            path.display()
        );
    }
    Ok(())
}

fn written(what: &str, path: &Path) -> String {
    format!("Failed to write {} to {}", what, path.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::StageStats;
    use crate::records::{Record, RecordSet};
    use crate::wildcard::WildcardSet;

    fn outcome() -> PipelineOutcome {
        let records: RecordSet = [
            Record::a("www.example.com", "5.6.7.8"),
            Record::a("foo.example.com", "1.2.3.4"),
        ]
        .into_iter()
        .collect();
        PipelineOutcome {
            domains: records.domains(),
            records,
            wildcards: WildcardSet::from_lines(["*.foo.example.com"], ["1.2.3.4"]),
            stats: StageStats::new(),
        }
    }

    #[tokio::test]
    async fn test_emit_all_outputs() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        let outputs = OutputPaths {
            domains: Some(dir.path().join("domains.txt")),
            records: Some(dir.path().join("massdns.txt")),
            wildcard_roots: Some(dir.path().join("wildcards.txt")),
            wildcard_answers: Some(dir.path().join("answers.txt")),
        };
        emit_outputs(&outcome(), &outputs).await.unwrap();

        let read = |name: &str| std::fs::read_to_string(dir.path().join(name)).unwrap();
        assert_eq!(read("domains.txt"), "foo.example.com\nwww.example.com\n");
        assert_eq!(
            read("massdns.txt"),
            "foo.example.com. A 1.2.3.4\nwww.example.com. A 5.6.7.8\n"
        );
        assert_eq!(read("wildcards.txt"), "*.foo.example.com\n");
        assert_eq!(read("answers.txt"), "1.2.3.4\n");
    }

    #[tokio::test]
    async fn test_emit_nothing_requested() {
        emit_outputs(&outcome(), &OutputPaths::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_emit_unwritable_path_names_file() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        let outputs = OutputPaths {
            domains: Some(dir.path().join("missing").join("domains.txt")),
            ..Default::default()
        };
        let err = emit_outputs(&outcome(), &outputs).await.unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to write domains"));
    }
}
