//! Resolver pool: health-checked set of nameservers queried independently

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use hickory_resolver::proto::rr::{RData, RecordType as HickoryRecordType};
use hickory_resolver::TokioAsyncResolver;
use tracing::{debug, warn};

use crate::config::ResolverConfig as EsdxResolverConfig;
use crate::error::{EnumError, Result};

/// One nameserver endpoint with its own resolver instance.
pub struct Resolver {
    pub addr: SocketAddr,
    inner: TokioAsyncResolver,
}

impl Resolver {
    pub async fn lookup_ips(&self, name: &str, rtype: HickoryRecordType) -> Result<Vec<IpAddr>> {
        match rtype {
            HickoryRecordType::A | HickoryRecordType::AAAA => {
                let lookup = self
                    .inner
                    .lookup_ip(name)
                    .await
                    .map_err(|e| EnumError::resolve(e.to_string()))?;
                Ok(lookup.iter().collect())
            }
            _ => Err(EnumError::resolve("lookup_ips only supports A/AAAA")),
        }
    }
}

/// A set of health-checked resolvers queried independently for wildcard-sentinel
/// comparison, and as a round-robin pool for ordinary resolution.
pub struct ResolverPool {
    resolvers: Vec<Resolver>,
    next: AtomicU64,
    pub dns_query_errors: AtomicU64,
    retries: u32,
}

impl ResolverPool {
    /// Build a resolver instance per configured address and drop unreachable ones.
    pub async fn build(cfg: &EsdxResolverConfig) -> Result<Self> {
        let mut resolvers = Vec::new();
        for entry in &cfg.resolvers {
            let addr = match SocketAddr::from_str(entry) {
                Ok(a) => a,
                Err(_) => match IpAddr::from_str(entry) {
                    Ok(ip) => SocketAddr::new(ip, 53),
                    Err(_) => {
                        warn!("skipping unparsable resolver address: {entry}");
                        continue;
                    }
                },
            };

            let mut opts = ResolverOpts::default();
            opts.timeout = Duration::from_secs(cfg.timeout_secs);
            opts.attempts = 1;
            let group = NameServerConfigGroup::from_ips_clear(&[addr.ip()], addr.port(), true);
            let resolver_config = ResolverConfig::from_parts(None, vec![], group);
            let resolver = TokioAsyncResolver::tokio(resolver_config, opts);

            resolvers.push(Resolver { addr, inner: resolver });
        }

        if resolvers.is_empty() {
            return Err(EnumError::configuration("no usable resolvers configured"));
        }

        let pool = Self {
            resolvers,
            next: AtomicU64::new(0),
            dns_query_errors: AtomicU64::new(0),
            retries: cfg.retries,
        };
        Ok(pool.health_checked().await)
    }

    /// Drop resolvers that fail a UDP A-query against a well-known name.
    async fn health_checked(mut self) -> Self {
        let mut healthy = Vec::with_capacity(self.resolvers.len());
        for resolver in self.resolvers.drain(..) {
            match resolver.lookup_ips("a.root-servers.net.", HickoryRecordType::A).await {
                Ok(_) => healthy.push(resolver),
                Err(e) => debug!("dropping unhealthy resolver {}: {e}", resolver.addr),
            }
        }
        self.resolvers = healthy;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn all(&self) -> &[Resolver] {
        &self.resolvers
    }

    fn pick(&self) -> &Resolver {
        let idx = self.next.fetch_add(1, Ordering::Relaxed) as usize % self.resolvers.len();
        &self.resolvers[idx]
    }

    /// Query A records for `name` from a round-robin resolver, classifying errors
    /// per the absence-vs-transient split: NXDOMAIN/NODATA return `Ok(None)`
    /// immediately, other errors retry up to the configured budget.
    pub async fn query_a(&self, name: &str) -> Result<Option<Vec<IpAddr>>> {
        self.query(name, HickoryRecordType::A).await
    }

    pub async fn query(&self, name: &str, rtype: HickoryRecordType) -> Result<Option<Vec<IpAddr>>> {
        let resolver = self.pick();
        let mut last_err = None;
        for attempt in 0..self.retries.max(1) {
            match resolver.lookup_ips(name, rtype).await {
                Ok(ips) if ips.is_empty() => return Ok(None),
                Ok(ips) => return Ok(Some(ips)),
                Err(e) => {
                    if is_absence(&e) {
                        return Ok(None);
                    }
                    debug!("transient resolver error on attempt {attempt} for {name}: {e}");
                    last_err = Some(e);
                }
            }
        }
        self.dns_query_errors.fetch_add(1, Ordering::Relaxed);
        if let Some(e) = last_err {
            debug!("giving up on {name} after {} attempts: {e}", self.retries);
        }
        Ok(None)
    }
}

fn is_absence(err: &EnumError) -> bool {
    let msg = err.to_string().to_lowercase();
    msg.contains("no record") || msg.contains("nxdomain") || msg.contains("record not found")
}

/// Raw RData lookup for record types not covered by `ResolverPool::query`'s
/// IP-set decoding (SOA/TXT/MX).
pub async fn raw_lookup(resolver: &Resolver, fqdn: &str, rtype: HickoryRecordType) -> Result<Vec<RData>> {
    let lookup = resolver
        .inner
        .lookup(fqdn, rtype)
        .await
        .map_err(|e| EnumError::resolve(e.to_string()))?;
    Ok(lookup.iter().cloned().collect())
}
