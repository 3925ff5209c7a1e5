// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DNS resolution with address provenance.
//!
//! Turns an ordered domain list into a deduplicated, first-seen-order address
//! list where every address remembers the domain that produced it. Each
//! domain is queried twice, once per address family, and a failure for one
//! domain never aborts the rest: that domain contributes zero addresses and
//! resolution carries on.
//!
//! The whole step is a pure function of the domain list and an
//! [`AddressLookup`] implementation; no state survives between runs.

use crate::errors::ResolveError;
use async_trait::async_trait;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError as LookupFailure, ResolveErrorKind};
use hickory_resolver::TokioAsyncResolver;
use std::collections::HashSet;
use std::fmt;
use std::net::IpAddr;
use tracing::{debug, info, warn};

/// Address record family to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordFamily {
    /// IPv4 (`A` records)
    V4,
    /// IPv6 (`AAAA` records)
    V6,
}

impl RecordFamily {
    /// Both families, in query order.
    pub const ALL: [RecordFamily; 2] = [RecordFamily::V4, RecordFamily::V6];

    /// DNS record type queried for this family.
    #[must_use]
    pub fn record_type(self) -> &'static str {
        match self {
            RecordFamily::V4 => "A",
            RecordFamily::V6 => "AAAA",
        }
    }
}

impl fmt::Display for RecordFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.record_type())
    }
}

/// Address lookup seam.
///
/// One call resolves one domain for one record family. An empty list is a
/// valid answer (no records); an `Err` is a resolver-level failure. Both are
/// non-fatal to the caller.
#[async_trait]
pub trait AddressLookup: Send + Sync {
    /// Resolve `domain` to addresses of the given family.
    async fn lookup(&self, domain: &str, family: RecordFamily)
        -> Result<Vec<IpAddr>, ResolveError>;
}

/// [`AddressLookup`] backed by hickory-resolver.
///
/// Uses the system resolver configuration (`/etc/resolv.conf`) and falls back
/// to the library defaults when no usable system configuration exists.
pub struct SystemResolver {
    inner: TokioAsyncResolver,
}

impl SystemResolver {
    /// Create a resolver from the system configuration.
    #[must_use]
    pub fn new() -> Self {
        let inner = match TokioAsyncResolver::tokio_from_system_conf() {
            Ok(resolver) => resolver,
            Err(e) => {
                warn!(error = %e, "No usable system resolver configuration, using defaults");
                TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
            }
        };

        Self { inner }
    }
}

impl Default for SystemResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a hickory failure: "no records" is an empty answer, not an error.
fn lookup_error(domain: &str, family: RecordFamily, e: &LookupFailure) -> Option<ResolveError> {
    if matches!(e.kind(), ResolveErrorKind::NoRecordsFound { .. }) {
        return None;
    }

    Some(ResolveError::LookupFailed {
        domain: domain.to_string(),
        record_type: family.record_type().to_string(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl AddressLookup for SystemResolver {
    async fn lookup(
        &self,
        domain: &str,
        family: RecordFamily,
    ) -> Result<Vec<IpAddr>, ResolveError> {
        match family {
            RecordFamily::V4 => match self.inner.ipv4_lookup(domain).await {
                Ok(lookup) => Ok(lookup.iter().map(|r| IpAddr::V4(r.0)).collect()),
                Err(e) => lookup_error(domain, family, &e).map_or(Ok(Vec::new()), Err),
            },
            RecordFamily::V6 => match self.inner.ipv6_lookup(domain).await {
                Ok(lookup) => Ok(lookup.iter().map(|r| IpAddr::V6(r.0)).collect()),
                Err(e) => lookup_error(domain, family, &e).map_or(Ok(Vec::new()), Err),
            },
        }
    }
}

/// One resolved address with its originating domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAddress {
    /// The resolved network address
    pub address: IpAddr,
    /// The first domain in directive order whose resolution produced it
    pub domain: String,
}

/// The outcome of resolving a domain directive.
///
/// Addresses appear exactly once, in first-seen order, each attributed to the
/// earliest domain that produced it. Rebuilt from scratch on every run.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    entries: Vec<ResolvedAddress>,
}

impl Resolution {
    /// Resolved entries in first-seen order.
    #[must_use]
    pub fn entries(&self) -> &[ResolvedAddress] {
        &self.entries
    }

    /// Number of distinct addresses resolved.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no domain produced any address.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Domain attributed to `address`, if it was resolved.
    #[must_use]
    pub fn domain_for(&self, address: IpAddr) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.address == address)
            .map(|entry| entry.domain.as_str())
    }
}

/// Resolve an ordered domain list into a deduplicated address set.
///
/// Queries A and AAAA independently for every domain. A failed lookup is
/// logged and contributes nothing; a domain yielding no addresses across both
/// families is reported at info level. An address produced by more than one
/// domain keeps its first attribution.
pub async fn resolve_domains(lookup: &dyn AddressLookup, domains: &[String]) -> Resolution {
    let mut resolution = Resolution::default();
    let mut seen: HashSet<IpAddr> = HashSet::new();

    for domain in domains {
        let mut answered = 0usize;

        for family in RecordFamily::ALL {
            let addresses = match lookup.lookup(domain, family).await {
                Ok(addresses) => addresses,
                Err(e) => {
                    warn!(domain = %domain, family = %family, error = %e, "Lookup failed, continuing");
                    Vec::new()
                }
            };

            for address in addresses {
                answered += 1;
                if seen.insert(address) {
                    debug!(domain = %domain, address = %address, "Resolved address");
                    resolution.entries.push(ResolvedAddress {
                        address,
                        domain: domain.clone(),
                    });
                } else {
                    debug!(domain = %domain, address = %address, "Address already attributed, keeping earlier domain");
                }
            }
        }

        if answered == 0 {
            info!(domain = %domain, "Domain resolved to no addresses");
        }
    }

    resolution
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod resolver_tests;
