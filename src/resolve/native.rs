//! In-process resolution with hickory-resolver.
//!
//! Queries go to exactly the addresses of the pass's resolver set, never to
//! the system configuration. Lookups run as spawned tasks bounded by a
//! semaphore; the task set is aborted if the invocation is cancelled.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::config::{NameServerConfig, Protocol, ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use log::{debug, info, trace};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::pacing::Pacing;
use super::{Resolver, ResolverSet};
use crate::config::{DNS_ATTEMPTS, DNS_PORT, DNS_TIMEOUT_SECS};
use crate::error_handling::EngineError;
use crate::records::{Record, RecordSet};

/// Resolves `A` records in-process.
pub struct NativeResolver {
    concurrency: usize,
    cancel: CancellationToken,
}

impl NativeResolver {
    /// # Arguments
    ///
    /// * `concurrency` - Maximum lookups in flight
    /// * `cancel` - Aborts a running invocation
    pub fn new(concurrency: usize, cancel: CancellationToken) -> Self {
        Self {
            concurrency: concurrency.max(1),
            cancel,
        }
    }
}

/// Parses `ip` or `ip:port`; a bare IP gets port 53.
///
/// # Errors
///
/// Returns `EngineError::InvalidResolver` for anything else.
pub fn parse_resolver_address(address: &str) -> Result<SocketAddr, EngineError> {
    let address = address.trim();
    if let Ok(socket) = address.parse::<SocketAddr>() {
        return Ok(socket);
    }
    address
        .parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, DNS_PORT))
        .map_err(|_| EngineError::InvalidResolver(address.to_string()))
}

fn build_resolver(resolvers: &ResolverSet) -> Result<TokioAsyncResolver, EngineError> {
    let mut name_servers = Vec::with_capacity(resolvers.len());
    for address in &resolvers.addresses {
        let socket = parse_resolver_address(address)?;
        name_servers.push(NameServerConfig::new(socket, Protocol::Udp));
    }

    let mut opts = ResolverOpts::default();
    opts.timeout = Duration::from_secs(DNS_TIMEOUT_SECS);
    opts.attempts = DNS_ATTEMPTS;
    // No search domains: every name is queried exactly as given
    opts.ndots = 0;

    Ok(TokioAsyncResolver::tokio(
        ResolverConfig::from_parts(None, Vec::new(), name_servers),
        opts,
    ))
}

async fn lookup_a(resolver: &TokioAsyncResolver, name: &str) -> Vec<Record> {
    match resolver.ipv4_lookup(format!("{}.", name)).await {
        Ok(lookup) => lookup
            .iter()
            .map(|a| Record::a(name, a.to_string()))
            .collect(),
        Err(e) => {
            trace!("No A record for {}: {}", name, e);
            Vec::new()
        }
    }
}

#[async_trait]
impl Resolver for NativeResolver {
    async fn resolve(
        &self,
        domains: &[String],
        resolvers: &ResolverSet,
    ) -> Result<RecordSet, EngineError> {
        if domains.is_empty() {
            debug!("[{}] No domains to resolve", resolvers.label);
            return Ok(RecordSet::new());
        }
        let resolver = Arc::new(build_resolver(resolvers)?);
        info!(
            "[{}] Resolving {} domains natively with {} resolvers",
            resolvers.label,
            domains.len(),
            resolvers.len()
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let pacing = Pacing::start(&resolvers.label, domains.len(), resolvers.rate_limit);
        let mut tasks: JoinSet<Vec<Record>> = JoinSet::new();
        let mut records = RecordSet::new();

        let work = async {
            for domain in domains {
                pacing.ready().await;
                let permit = Arc::clone(&semaphore)
                    .acquire_owned()
                    .await
                    .map_err(|e| EngineError::Io(std::io::Error::other(e)))?;
                let resolver = Arc::clone(&resolver);
                let name = domain.clone();
                tasks.spawn(async move {
                    let _permit = permit;
                    lookup_a(&resolver, &name).await
                });
                pacing.mark_sent();

                while let Some(joined) = tasks.try_join_next() {
                    collect(joined, &mut records);
                }
            }
            while let Some(joined) = tasks.join_next().await {
                collect(joined, &mut records);
            }
            Ok::<(), EngineError>(())
        };

        let outcome = tokio::select! {
            result = work => result,
            _ = self.cancel.cancelled() => Err(EngineError::Cancelled),
        };
        // Dropping the set aborts lookups still in flight
        tasks.abort_all();
        outcome?;
        pacing.finish().await;

        Ok(records)
    }
}

fn collect(joined: Result<Vec<Record>, tokio::task::JoinError>, records: &mut RecordSet) {
    match joined {
        Ok(found) => records.extend(found),
        Err(e) => debug!("Lookup task failed: {}", e),
    }
}
