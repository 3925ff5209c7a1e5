// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Record types for the Proxmox VE firewall API.
//!
//! These mirror the JSON payloads returned by the `/api2/json` endpoints this
//! crate reads. Deserialization is deliberately lenient: unknown fields are
//! ignored and entries that fail to deserialize are dropped by the gateway's
//! normalization helpers rather than failing a run.

use crate::constants::CLUSTER_IPSET_PATH;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One entry of an IP set collection listing.
///
/// Returned by `GET {scope}/firewall/ipset`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IpSetInfo {
    /// IP set name, unique within its scope
    pub name: String,
    /// Free-text comment; may carry a domain directive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// One member of an IP set.
///
/// Returned by `GET {scope}/firewall/ipset/{name}`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IpSetMember {
    /// Network address, IPv4 or IPv6, optionally with prefix
    pub cidr: String,
    /// Comment attached to the member; dnset records the originating domain here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Match inversion flag as reported by the firewall (0 or 1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nomatch: Option<u8>,
}

/// One entry of the cluster node listing.
///
/// Returned by `GET nodes`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NodeInfo {
    /// Node name (e.g., "pve1")
    pub node: String,
}

/// One entry of a node's VM or container listing.
///
/// Returned by `GET nodes/{node}/qemu` and `GET nodes/{node}/lxc`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GuestInfo {
    /// Numeric guest identifier
    pub vmid: u32,
    /// Guest name, when configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// The level at which an IP set is defined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Cluster-wide firewall
    Cluster,
    /// Per-node firewall
    Node {
        /// Node name
        node: String,
    },
    /// Per-VM firewall
    Vm {
        /// Node hosting the VM
        node: String,
        /// VM identifier
        vmid: u32,
    },
    /// Per-container firewall
    Container {
        /// Node hosting the container
        node: String,
        /// Container identifier
        vmid: u32,
    },
}

impl Scope {
    /// API path of this scope's IP set collection, relative to the API root.
    #[must_use]
    pub fn ipset_base(&self) -> String {
        match self {
            Scope::Cluster => CLUSTER_IPSET_PATH.to_string(),
            Scope::Node { node } => format!("nodes/{node}/firewall/ipset"),
            Scope::Vm { node, vmid } => format!("nodes/{node}/qemu/{vmid}/firewall/ipset"),
            Scope::Container { node, vmid } => format!("nodes/{node}/lxc/{vmid}/firewall/ipset"),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Cluster => write!(f, "cluster"),
            Scope::Node { node } => write!(f, "node {node}"),
            Scope::Vm { node, vmid } => write!(f, "VM {vmid} on {node}"),
            Scope::Container { node, vmid } => write!(f, "CT {vmid} on {node}"),
        }
    }
}

/// A discovered IP set, addressed by scope and name.
#[derive(Debug, Clone, PartialEq)]
pub struct IpSetRef {
    /// Scope the set lives in
    pub scope: Scope,
    /// Set name within the scope
    pub name: String,
    /// Comment as listed, possibly carrying a domain directive
    pub comment: Option<String>,
}

impl IpSetRef {
    /// API path of this set's member collection, relative to the API root.
    #[must_use]
    pub fn members_path(&self) -> String {
        format!("{}/{}", self.scope.ipset_base(), self.name)
    }
}

impl fmt::Display for IpSetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' ({})", self.name, self.scope)
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod model_tests;
