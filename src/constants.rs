// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for dnset.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Directive Constants
// ============================================================================

/// Marker prefix that turns an IP set comment into a domain directive.
///
/// The match is case-sensitive and anchored at the start of the comment.
/// A comment of exactly `auto_dns` (no trailing separator) is not a directive.
pub const DIRECTIVE_PREFIX: &str = "auto_dns_";

/// Separator between domain tokens in a directive.
///
/// Domains containing literal underscores cannot be encoded; this is a known
/// limitation of the comment format.
pub const DOMAIN_SEPARATOR: char = '_';

// ============================================================================
// Proxmox API Constants
// ============================================================================

/// JSON API base path on a Proxmox VE endpoint
pub const API_BASE_PATH: &str = "/api2/json";

/// Default HTTPS port of the Proxmox VE API
pub const DEFAULT_API_PORT: u16 = 8006;

/// Cluster-scope IP set collection path
pub const CLUSTER_IPSET_PATH: &str = "cluster/firewall/ipset";

/// Node enumeration path
pub const NODES_PATH: &str = "nodes";

// ============================================================================
// Environment Variables
// ============================================================================

/// Environment variable holding the API endpoint URL
pub const ENV_ENDPOINT: &str = "PVE_ENDPOINT";

/// Environment variable holding the API token (`user@realm!tokenid=secret`)
pub const ENV_API_TOKEN: &str = "PVE_API_TOKEN";

/// Environment variable disabling TLS certificate verification
pub const ENV_INSECURE: &str = "PVE_INSECURE";

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 2;
