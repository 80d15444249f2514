//! Resolver invocation.
//!
//! A [`Resolver`] takes a domain list and a resolver set and returns every
//! record the resolution engine produced. Two implementations exist:
//! - [`MassdnsResolver`] streams the domains through an external massdns process
//! - [`NativeResolver`] resolves in-process with hickory-resolver
//!
//! Both are used identically for the public and the trusted resolver sets.
//! Only whole-invocation failures are errors; a domain that does not resolve
//! simply produces no record.

mod massdns;
mod native;
mod pacing;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error_handling::{ConfigError, EngineError};
use crate::records::RecordSet;
use crate::utils::read_lines;

pub use massdns::MassdnsResolver;
pub use native::{parse_resolver_address, NativeResolver};

/// A list of resolvers plus the query rate allowed against them.
#[derive(Debug, Clone)]
pub struct ResolverSet {
    /// Short name used in logs and scratch file names ("public", "trusted")
    pub label: String,
    /// File the addresses were read from (handed to massdns as-is)
    pub path: PathBuf,
    /// Resolver addresses, one per entry
    pub addresses: Vec<String>,
    /// Queries per second (0 = unlimited)
    pub rate_limit: u32,
}

impl ResolverSet {
    /// Reads a resolver list from `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or holds no address.
    pub async fn load(label: &str, path: &Path, rate_limit: u32) -> Result<Self, ConfigError> {
        let addresses = load_resolver_list(path).await?;
        Ok(Self {
            label: label.to_string(),
            path: path.to_path_buf(),
            addresses,
            rate_limit,
        })
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Same resolvers under a different rate limit.
    pub fn with_rate_limit(mut self, rate_limit: u32) -> Self {
        self.rate_limit = rate_limit;
        self
    }
}

/// Reads resolver addresses, ignoring blank lines and `#` comments.
///
/// # Errors
///
/// Returns `ConfigError::Unreadable` if the file cannot be read and
/// `ConfigError::EmptyResolvers` if it lists no address.
pub async fn load_resolver_list(path: &Path) -> Result<Vec<String>, ConfigError> {
    let lines = read_lines(path)
        .await
        .map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
    let addresses: Vec<String> = lines
        .into_iter()
        .filter(|line| !line.starts_with('#'))
        .collect();
    if addresses.is_empty() {
        return Err(ConfigError::EmptyResolvers(path.to_path_buf()));
    }
    Ok(addresses)
}

/// Resolution engine seam.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Resolves `A` records for every domain against `resolvers`.
    ///
    /// An empty `domains` slice yields an empty set without invoking the engine.
    async fn resolve(
        &self,
        domains: &[String],
        resolvers: &ResolverSet,
    ) -> Result<RecordSet, EngineError>;
}

#[async_trait]
impl<T: Resolver + ?Sized> Resolver for &T {
    async fn resolve(
        &self,
        domains: &[String],
        resolvers: &ResolverSet,
    ) -> Result<RecordSet, EngineError> {
        (**self).resolve(domains, resolvers).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_resolver_list_skips_comments_and_blanks() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        let path = dir.path().join("resolvers.txt");
        std::fs::write(&path, "# public\n8.8.8.8\n\n 1.1.1.1 \n#9.9.9.9\n").unwrap();

        let addresses = load_resolver_list(&path).await.unwrap();
        assert_eq!(addresses, vec!["8.8.8.8", "1.1.1.1"]);
    }

    #[tokio::test]
    async fn test_load_resolver_list_empty_is_config_error() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        let path = dir.path().join("resolvers.txt");
        std::fs::write(&path, "# nothing here\n\n").unwrap();

        assert!(matches!(
            load_resolver_list(&path).await,
            Err(ConfigError::EmptyResolvers(_))
        ));
    }

    #[tokio::test]
    async fn test_load_resolver_list_missing_file() {
        assert!(matches!(
            load_resolver_list(Path::new("/nonexistent/resolvers.txt")).await,
            Err(ConfigError::Unreadable { .. })
        ));
    }

    #[tokio::test]
    async fn test_resolver_set_load() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        let path = dir.path().join("trusted.txt");
        std::fs::write(&path, "8.8.8.8\n8.8.4.4\n").unwrap();

        let set = ResolverSet::load("trusted", &path, 20).await.unwrap();
        assert_eq!(set.label, "trusted");
        assert_eq!(set.len(), 2);
        assert_eq!(set.rate_limit, 20);
        assert_eq!(set.with_rate_limit(5).rate_limit, 5);
    }
}
