//! External wildcard detector adapter.
//!
//! The detector is given the candidate domains and the record cache as files
//! in the scratch directory and writes two line lists back: wildcard roots
//! (`*.name`) and the answers those roots produce. A missing output file is
//! read as an empty list.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use super::{WildcardDetector, WildcardSet};
use crate::config::{DETECTOR_ANSWERS_FILE, DETECTOR_CACHE_FILE, DETECTOR_DOMAINS_FILE, DETECTOR_ROOTS_FILE};
use crate::error_handling::EngineError;
use crate::initialization::ScratchDir;
use crate::records::RecordSet;
use crate::utils::{read_lines_if_exists, write_lines};

/// Runs a wildcard detection executable.
pub struct CommandDetector {
    bin: PathBuf,
    resolvers: PathBuf,
    scratch: Arc<ScratchDir>,
    cancel: CancellationToken,
}

/// Files exchanged with one detector invocation.
struct DetectorFiles {
    domains: PathBuf,
    cache: PathBuf,
    roots: PathBuf,
    answers: PathBuf,
}

impl DetectorFiles {
    fn in_dir(scratch: &ScratchDir) -> Self {
        Self {
            domains: scratch.file(DETECTOR_DOMAINS_FILE),
            cache: scratch.file(DETECTOR_CACHE_FILE),
            roots: scratch.file(DETECTOR_ROOTS_FILE),
            answers: scratch.file(DETECTOR_ANSWERS_FILE),
        }
    }
}

impl CommandDetector {
    /// # Arguments
    ///
    /// * `bin` - detector executable
    /// * `resolvers` - trusted resolver list the detector queries with
    /// * `scratch` - directory for the exchanged files
    /// * `cancel` - aborts a running invocation and kills the process
    pub fn new(
        bin: PathBuf,
        resolvers: PathBuf,
        scratch: Arc<ScratchDir>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            bin,
            resolvers,
            scratch,
            cancel,
        }
    }

    fn command(&self, files: &DetectorFiles) -> Command {
        let mut command = Command::new(&self.bin);
        command
            .arg("--domains")
            .arg(&files.domains)
            .arg("--cache")
            .arg(&files.cache)
            .arg("--resolvers")
            .arg(&self.resolvers)
            .arg("--roots-output")
            .arg(&files.roots)
            .arg("--answers-output")
            .arg(&files.answers)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        command
    }

    fn engine_name(&self) -> String {
        self.bin.display().to_string()
    }
}

async fn remove_stale(path: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

#[async_trait]
impl WildcardDetector for CommandDetector {
    async fn detect(
        &self,
        domains: &BTreeSet<String>,
        cache: &RecordSet,
    ) -> Result<WildcardSet, EngineError> {
        if domains.is_empty() {
            debug!("No domains to check for wildcards");
            return Ok(WildcardSet::default());
        }

        let files = DetectorFiles::in_dir(&self.scratch);
        write_lines(&files.domains, domains).await?;
        cache.save(&files.cache).await?;
        // Outputs from an earlier invocation must not be mistaken for this one's
        remove_stale(&files.roots).await?;
        remove_stale(&files.answers).await?;

        info!(
            "Detecting wildcards among {} domains ({} cached records)",
            domains.len(),
            cache.len()
        );
        let mut child = self
            .command(&files)
            .spawn()
            .map_err(|source| EngineError::Spawn {
                engine: self.engine_name(),
                source,
            })?;

        let status = tokio::select! {
            status = child.wait() => status?,
            _ = self.cancel.cancelled() => {
                if let Err(e) = child.kill().await {
                    debug!("Failed to kill wildcard detector after cancellation: {}", e);
                }
                return Err(EngineError::Cancelled);
            }
        };
        if !status.success() {
            return Err(EngineError::Exited {
                engine: self.engine_name(),
                code: status.code(),
            });
        }

        let roots = read_lines_if_exists(&files.roots).await?;
        let answers = read_lines_if_exists(&files.answers).await?;
        let found = WildcardSet::from_lines(roots, answers);
        debug!(
            "Detector reported {} roots and {} answers",
            found.roots.len(),
            found.answers.len()
        );
        Ok(found)
    }
}
