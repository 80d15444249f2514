//! massdns adapter.
//!
//! Domains are written to the stdin of a massdns process, one per line, at
//! the pass's rate limit. massdns writes simple text output
//! (`name. A answer`) to a file in the scratch directory, which is parsed
//! once the process exits successfully.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::process::{Child, ChildStdin, Command};
use tokio_util::sync::CancellationToken;

use super::pacing::Pacing;
use super::{Resolver, ResolverSet};
use crate::error_handling::EngineError;
use crate::initialization::ScratchDir;
use crate::records::RecordSet;

const ENGINE_NAME: &str = "massdns";

/// Resolves domains by streaming them through an external massdns process.
pub struct MassdnsResolver {
    bin: PathBuf,
    concurrency: usize,
    scratch: Arc<ScratchDir>,
    cancel: CancellationToken,
}

impl MassdnsResolver {
    /// # Arguments
    ///
    /// * `bin` - massdns executable
    /// * `concurrency` - massdns `-s` value
    /// * `scratch` - directory receiving the raw output files
    /// * `cancel` - aborts a running invocation and kills the process
    pub fn new(
        bin: PathBuf,
        concurrency: usize,
        scratch: Arc<ScratchDir>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            bin,
            concurrency,
            scratch,
            cancel,
        }
    }

    fn command(&self, resolvers: &ResolverSet, output: &std::path::Path) -> Command {
        let mut command = Command::new(&self.bin);
        command
            .arg("-q")
            .arg("-r")
            .arg(&resolvers.path)
            .arg("-t")
            .arg("A")
            .arg("-o")
            .arg("S")
            .arg("-s")
            .arg(self.concurrency.max(1).to_string())
            .arg("-w")
            .arg(output)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl Resolver for MassdnsResolver {
    async fn resolve(
        &self,
        domains: &[String],
        resolvers: &ResolverSet,
    ) -> Result<RecordSet, EngineError> {
        if domains.is_empty() {
            debug!("[{}] No domains to resolve, skipping massdns", resolvers.label);
            return Ok(RecordSet::new());
        }

        let output = self
            .scratch
            .unique_file(&format!("massdns_{}", resolvers.label), "txt");
        info!(
            "[{}] Resolving {} domains with {} resolvers{}",
            resolvers.label,
            domains.len(),
            resolvers.len(),
            if resolvers.rate_limit > 0 {
                format!(" at {} q/s", resolvers.rate_limit)
            } else {
                String::new()
            }
        );

        let mut child =
            self.command(resolvers, &output)
                .spawn()
                .map_err(|source| EngineError::Spawn {
                    engine: self.bin.display().to_string(),
                    source,
                })?;
        let stdin = child.stdin.take().ok_or_else(|| {
            EngineError::Io(std::io::Error::other("massdns stdin was not captured"))
        })?;

        let outcome = tokio::select! {
            result = drive(&mut child, stdin, domains, resolvers) => result,
            _ = self.cancel.cancelled() => Err(EngineError::Cancelled),
        };
        if let Err(EngineError::Cancelled) = outcome {
            if let Err(e) = child.kill().await {
                debug!("Failed to kill massdns after cancellation: {}", e);
            }
            return Err(EngineError::Cancelled);
        }
        outcome?;

        let records = RecordSet::load(&output).await?;
        debug!(
            "[{}] massdns produced {} records in {}",
            resolvers.label,
            records.len(),
            output.display()
        );
        Ok(records)
    }
}

/// Feeds the domains and waits for massdns to exit.
///
/// An unsuccessful exit status takes precedence over a write error: when
/// massdns dies early the broken pipe is only a symptom.
async fn drive(
    child: &mut Child,
    stdin: ChildStdin,
    domains: &[String],
    resolvers: &ResolverSet,
) -> Result<(), EngineError> {
    let pacing = Pacing::start(&resolvers.label, domains.len(), resolvers.rate_limit);
    let fed = stream_domains(stdin, domains, &pacing).await;
    let status = child.wait().await;
    pacing.finish().await;

    let status = status?;
    if !status.success() {
        return Err(EngineError::Exited {
            engine: ENGINE_NAME.to_string(),
            code: status.code(),
        });
    }
    fed?;
    Ok(())
}

async fn stream_domains(
    stdin: ChildStdin,
    domains: &[String],
    pacing: &Pacing,
) -> std::io::Result<()> {
    let mut writer = BufWriter::new(stdin);
    for domain in domains {
        pacing.ready().await;
        writer.write_all(domain.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        // Buffering would let rate-limited queries reach massdns in bursts
        if pacing.is_limited() {
            writer.flush().await?;
        }
        pacing.mark_sent();
    }
    writer.flush().await?;
    // Dropping the writer closes stdin, which tells massdns the list is complete
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver_set(path: PathBuf) -> ResolverSet {
        ResolverSet {
            label: "public".to_string(),
            path,
            addresses: vec!["8.8.8.8".to_string()],
            rate_limit: 0,
        }
    }

    #[test]
    fn test_command_arguments() {
        let scratch = Arc::new(ScratchDir::create(false).unwrap());
        let resolver = MassdnsResolver::new(
            PathBuf::from("massdns"),
            500,
            scratch,
            CancellationToken::new(),
        );
        let command = resolver.command(
            &resolver_set(PathBuf::from("resolvers.txt")),
            std::path::Path::new("out.txt"),
        );
        let args: Vec<String> = command
            .as_std()
            .get_args()
            .map(|a| a.to_string_lossy().to_string())
            .collect();
        assert_eq!(
            args,
            vec!["-q", "-r", "resolvers.txt", "-t", "A", "-o", "S", "-s", "500", "-w", "out.txt"]
        );
    }

    #[tokio::test]
    async fn test_empty_domain_list_does_not_spawn() {
        let scratch = Arc::new(ScratchDir::create(false).unwrap());
        // Spawning this binary would fail; an empty list must never try
        let resolver = MassdnsResolver::new(
            PathBuf::from("/nonexistent/massdns"),
            10,
            scratch,
            CancellationToken::new(),
        );
        let records = resolver
            .resolve(&[], &resolver_set(PathBuf::from("resolvers.txt")))
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let scratch = Arc::new(ScratchDir::create(false).unwrap());
        let resolver = MassdnsResolver::new(
            PathBuf::from("/nonexistent/massdns"),
            10,
            scratch,
            CancellationToken::new(),
        );
        let result = resolver
            .resolve(
                &["a.example.com".to_string()],
                &resolver_set(PathBuf::from("resolvers.txt")),
            )
            .await;
        assert!(matches!(result, Err(EngineError::Spawn { .. })));
    }
}
