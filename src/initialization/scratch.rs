//! Per-run scratch directory.
//!
//! Engine inputs and outputs are exchanged through files in a uniquely named
//! temporary directory owned by the run. The directory is removed when the
//! [`ScratchDir`] is dropped, on success and on every error path, unless the
//! run was started in debug mode.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use tempfile::TempDir;

use crate::config::SCRATCH_DIR_PREFIX;
use crate::error_handling::InitializationError;

/// Scratch directory for one run.
#[derive(Debug)]
pub struct ScratchDir {
    dir: Option<TempDir>,
    path: PathBuf,
    keep: bool,
    sequence: AtomicUsize,
}

impl ScratchDir {
    /// Creates a fresh directory under the system temp location.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::ScratchDirError` if the directory
    /// cannot be created.
    pub fn create(keep: bool) -> Result<Self, InitializationError> {
        let dir = tempfile::Builder::new()
            .prefix(SCRATCH_DIR_PREFIX)
            .tempdir()
            .map_err(InitializationError::ScratchDirError)?;
        let path = dir.path().to_path_buf();
        log::debug!("Scratch directory: {}", path.display());
        Ok(Self {
            dir: Some(dir),
            path,
            keep,
            sequence: AtomicUsize::new(0),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of a fixed-name file in the directory.
    pub fn file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    /// Path of a file name never handed out before in this run.
    ///
    /// Every engine invocation writes a new snapshot instead of overwriting
    /// the previous stage's output.
    pub fn unique_file(&self, stem: &str, extension: &str) -> PathBuf {
        let n = self.sequence.fetch_add(1, Ordering::SeqCst);
        self.path.join(format!("{:02}_{}.{}", n, stem, extension))
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if !self.keep {
            return;
        }
        if let Some(dir) = self.dir.take() {
            let kept = dir.keep();
            log::info!("Debug mode: kept working directory {}", kept.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scratch_dir_removed_on_drop() {
        let scratch = ScratchDir::create(false).unwrap();
        let path = scratch.path().to_path_buf();
        std::fs::write(scratch.file("probe.txt"), "x").unwrap();
        assert!(path.is_dir());
        drop(scratch);
        assert!(!path.exists());
    }

    #[test]
    fn test_scratch_dir_kept_in_debug_mode() {
        let scratch = ScratchDir::create(true).unwrap();
        let path = scratch.path().to_path_buf();
        drop(scratch);
        assert!(path.is_dir());
        std::fs::remove_dir_all(&path).unwrap();
    }

    #[test]
    fn test_unique_file_names_do_not_repeat() {
        let scratch = ScratchDir::create(false).unwrap();
        let a = scratch.unique_file("massdns_public", "txt");
        let b = scratch.unique_file("massdns_public", "txt");
        assert_ne!(a, b);
        assert!(a.starts_with(scratch.path()));
        assert_eq!(a.file_name().unwrap(), "00_massdns_public.txt");
    }
}
