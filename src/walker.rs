// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Scope enumeration across the cluster.
//!
//! Walks every place an IP set can live — the cluster firewall, each node,
//! each VM and each container — and hands every discovered set to the
//! reconciler, one at a time, strictly sequentially. A scope that cannot be
//! listed (a node that does not support the sub-resource, a guest that
//! vanished mid-walk) contributes nothing and never aborts its siblings.

use crate::api::{records, ResourceApi};
use crate::constants::NODES_PATH;
use crate::model::{GuestInfo, IpSetInfo, IpSetRef, NodeInfo, Scope};
use crate::reconciler::{reconcile_ipset, Outcome};
use crate::resolver::AddressLookup;
use tracing::{debug, info};

/// Counters for one full reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// IP sets discovered across all scopes
    pub sets_seen: usize,
    /// Sets whose members were replaced
    pub sets_applied: usize,
    /// Sets without a directive
    pub sets_unmanaged: usize,
    /// Sets with a directive naming no domains
    pub sets_empty_directive: usize,
    /// Sets whose directive resolved to no addresses
    pub sets_unresolved: usize,
    /// Members created across all applied sets
    pub addresses_applied: usize,
    /// Member operations that failed across all applied sets
    pub member_failures: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &Outcome) {
        self.sets_seen += 1;
        match outcome {
            Outcome::Unmanaged => self.sets_unmanaged += 1,
            Outcome::NoDomains => self.sets_empty_directive += 1,
            Outcome::NoAddresses { .. } => self.sets_unresolved += 1,
            Outcome::Applied {
                added,
                create_failures,
                delete_failures,
                ..
            } => {
                self.sets_applied += 1;
                self.addresses_applied += added;
                self.member_failures += create_failures + delete_failures;
            }
        }
    }
}

/// Reconcile every IP set in one scope.
async fn sync_scope(
    api: &dyn ResourceApi,
    lookup: &dyn AddressLookup,
    scope: Scope,
    summary: &mut RunSummary,
) {
    let listing: Vec<IpSetInfo> = records(api.get(&scope.ipset_base()).await);
    debug!(scope = %scope, sets = listing.len(), "Discovered IP sets");

    for info in listing {
        let set = IpSetRef {
            scope: scope.clone(),
            name: info.name,
            comment: info.comment,
        };
        let outcome = reconcile_ipset(api, lookup, &set).await;
        summary.record(&outcome);
    }
}

/// Run one full reconciliation pass over every scope.
///
/// Order: cluster first, then per node its own firewall, its VMs and its
/// containers. Each set is fully reconciled before the next is considered.
pub async fn sync_all(api: &dyn ResourceApi, lookup: &dyn AddressLookup) -> RunSummary {
    let mut summary = RunSummary::default();

    sync_scope(api, lookup, Scope::Cluster, &mut summary).await;

    let nodes: Vec<NodeInfo> = records(api.get(NODES_PATH).await);
    debug!(nodes = nodes.len(), "Discovered nodes");

    for NodeInfo { node } in nodes {
        sync_scope(api, lookup, Scope::Node { node: node.clone() }, &mut summary).await;

        let vms: Vec<GuestInfo> = records(api.get(&format!("nodes/{node}/qemu")).await);
        for vm in vms {
            let scope = Scope::Vm {
                node: node.clone(),
                vmid: vm.vmid,
            };
            sync_scope(api, lookup, scope, &mut summary).await;
        }

        let containers: Vec<GuestInfo> = records(api.get(&format!("nodes/{node}/lxc")).await);
        for container in containers {
            let scope = Scope::Container {
                node: node.clone(),
                vmid: container.vmid,
            };
            sync_scope(api, lookup, scope, &mut summary).await;
        }
    }

    info!(
        sets = summary.sets_seen,
        applied = summary.sets_applied,
        unresolved = summary.sets_unresolved,
        addresses = summary.addresses_applied,
        failures = summary.member_failures,
        "Reconciliation pass complete"
    );

    summary
}

#[cfg(test)]
#[path = "walker_tests.rs"]
mod walker_tests;
