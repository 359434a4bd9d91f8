use std::net::IpAddr;
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};
use trust_dns_resolver::Resolver;
use trust_dns_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};

use super::{Error, MxRecord, MxStatus};

/// Public resolver endpoints queried for redundancy: Google, Cloudflare,
/// OpenDNS.
const PUBLIC_NAMESERVERS: [IpAddr; 3] = [
    IpAddr::V4(std::net::Ipv4Addr::new(8, 8, 8, 8)),
    IpAddr::V4(std::net::Ipv4Addr::new(1, 1, 1, 1)),
    IpAddr::V4(std::net::Ipv4Addr::new(208, 67, 222, 222)),
];

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// How a failed lookup is retried before giving up.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub pause: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            pause: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// No pause between attempts; used by tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            pause: Duration::ZERO,
        }
    }
}

/// Seam between the batch pipeline and the DNS client, so tests can inject
/// scripted lookups.
pub trait MxLookup {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError>;
}

impl MxLookup for Resolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError> {
        let lookup = Resolver::mx_lookup(self, domain)?;
        let mut records = Vec::new();
        for mx in lookup.iter() {
            let exchange = normalize_exchange(mx.exchange().to_utf8());
            records.push(MxRecord::new(mx.preference(), exchange));
        }
        Ok(records)
    }
}

/// Builds a resolver over the hardcoded public endpoints with a 5s
/// per-request timeout. Retrying across attempts is the caller's job, so the
/// resolver itself does not retry.
pub fn public_resolver() -> Result<Resolver, Error> {
    let group = NameServerConfigGroup::from_ips_clear(&PUBLIC_NAMESERVERS, 53, true);
    let config = ResolverConfig::from_parts(None, Vec::new(), group);
    let mut opts = ResolverOpts::default();
    opts.timeout = LOOKUP_TIMEOUT;
    opts.attempts = 1;
    Resolver::new(config, opts).map_err(Error::resolver_init)
}

/// Looks up MX records for `domain`, retrying per `policy`.
///
/// Every failure mode collapses to [`MxStatus::NoRecords`] once attempts are
/// exhausted; the cause is logged but never propagated, so a flaky resolver
/// cannot abort a batch run.
pub fn lookup_with_retry<R: MxLookup>(resolver: &R, domain: &str, policy: &RetryPolicy) -> MxStatus {
    let attempts = policy.max_attempts.max(1);
    for attempt in 1..=attempts {
        match resolver.lookup_mx(domain) {
            Ok(mut records) => {
                records.sort();
                records.dedup();
                return if records.is_empty() {
                    MxStatus::NoRecords
                } else {
                    MxStatus::Records(records)
                };
            }
            Err(err) => {
                log_lookup_failure(domain, attempt, attempts, &err);
                if attempt < attempts {
                    thread::sleep(policy.pause);
                }
            }
        }
    }
    MxStatus::NoRecords
}

/// `true` when `domain` resolves at least one MX record via the public
/// resolvers. Resolver construction failure is logged and reported as `false`.
pub fn has_mx_record(domain: &str) -> bool {
    let trimmed = domain.trim();
    if trimmed.is_empty() {
        return false;
    }
    let resolver = match public_resolver() {
        Ok(resolver) => resolver,
        Err(err) => {
            warn!(domain = trimmed, error = %err, "could not build DNS resolver");
            return false;
        }
    };
    lookup_with_retry(&resolver, trimmed, &RetryPolicy::default()).has_records()
}

fn log_lookup_failure(domain: &str, attempt: u32, attempts: u32, err: &ResolveError) {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => {
            debug!(domain, attempt, attempts, %response_code, "no MX records");
        }
        ResolveErrorKind::Timeout => {
            debug!(domain, attempt, attempts, "MX lookup timed out");
        }
        _ => {
            warn!(domain, attempt, attempts, error = %err, "MX lookup failed");
        }
    }
}

pub(crate) fn normalize_exchange(exchange: String) -> String {
    exchange.trim_end_matches('.').to_ascii_lowercase()
}
