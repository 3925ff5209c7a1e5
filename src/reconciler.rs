// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Per-IP-set reconciliation.
//!
//! One call of [`reconcile_ipset`] runs the full pipeline for one set:
//! inspect the comment, resolve the directive, fetch current members, clear
//! them, and populate the resolved addresses. Two early exits terminate the
//! pipeline without touching the set: a comment without a directive, and a
//! directive whose domains resolve to nothing (a transient total resolution
//! failure must not wipe a firewall rule).
//!
//! Membership is applied by full replacement — every existing member is
//! deleted by address, then one member is created per resolved address with
//! the attributed domain as its comment. Every delete and create is attempted
//! independently; failures are logged and counted, never escalated. Running
//! the pipeline twice under unchanged DNS answers converges to the same
//! member list.

use crate::api::{records, ResourceApi};
use crate::directive::domain_directive;
use crate::model::{IpSetMember, IpSetRef};
use crate::resolver::{resolve_domains, AddressLookup};
use tracing::{debug, error, info, warn};

/// How reconciling one IP set ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Comment carries no directive; the set is not managed by dnset
    Unmanaged,
    /// Directive present but names no domains; nothing to resolve
    NoDomains,
    /// Directive resolved to zero addresses; existing members left untouched
    NoAddresses {
        /// Number of domains the directive named
        domains: usize,
    },
    /// Members replaced with the resolved address set
    Applied {
        /// Members successfully created
        added: usize,
        /// Pre-existing members successfully deleted
        removed: usize,
        /// Member creations that failed
        create_failures: usize,
        /// Member deletions that failed
        delete_failures: usize,
    },
}

/// Reconcile one IP set against the current DNS resolution of its directive.
///
/// There is no fatal error path: every failure mode either terminates the
/// pipeline early without mutation or is absorbed as a per-member failure
/// count in the returned [`Outcome`].
pub async fn reconcile_ipset(
    api: &dyn ResourceApi,
    lookup: &dyn AddressLookup,
    set: &IpSetRef,
) -> Outcome {
    // Inspect
    let Some(domains) = domain_directive(set.comment.as_deref().unwrap_or_default()) else {
        debug!(set = %set, "No domain directive, skipping");
        return Outcome::Unmanaged;
    };

    if domains.is_empty() {
        info!(set = %set, "Directive names no domains, nothing to resolve");
        return Outcome::NoDomains;
    }

    debug!(set = %set, domains = ?domains, "Reconciling IP set");

    // Resolve
    let resolution = resolve_domains(lookup, &domains).await;
    if resolution.is_empty() {
        warn!(set = %set, domains = ?domains, "No IPs resolved, leaving existing members untouched");
        return Outcome::NoAddresses {
            domains: domains.len(),
        };
    }

    let path = set.members_path();

    // Fetch current members; an absent or malformed response means none
    let current: Vec<IpSetMember> = records(api.get(&path).await);
    debug!(set = %set, current = current.len(), resolved = resolution.len(), "Replacing members");

    // Clear, best-effort per member
    let mut delete_failures = 0usize;
    for member in &current {
        if let Err(e) = api.delete_member(&path, &member.cidr).await {
            error!(set = %set, error = %e, "Member removal failed");
            delete_failures += 1;
        }
    }

    // Populate, best-effort per address
    let mut create_failures = 0usize;
    for entry in resolution.entries() {
        if let Err(e) = api
            .create_member(&path, &entry.address.to_string(), &entry.domain)
            .await
        {
            error!(set = %set, error = %e, "Member creation failed");
            create_failures += 1;
        }
    }

    let added = resolution.len() - create_failures;
    let removed = current.len() - delete_failures;

    info!(set = %set, added, removed, "Applied resolved addresses");

    Outcome::Applied {
        added,
        removed,
        create_failures,
        delete_failures,
    }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod reconciler_tests;
