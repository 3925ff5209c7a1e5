// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! API and DNS lookup error types for dnset.
//!
//! This module provides specialized error types for:
//! - Proxmox VE HTTP API operations (resource reads, member create/delete)
//! - DNS address lookups via hickory-resolver
//!
//! All of these errors are non-fatal by design: callers log them and carry
//! on with the remaining domains, members, or IP sets. Keeping them as
//! structured values (rather than discarding failures at the call site)
//! keeps every failure observable to logs and tests.

use thiserror::Error;

/// Errors that can occur when talking to the Proxmox VE HTTP API.
///
/// These errors represent failures of individual API calls. The reconciler
/// treats them as per-item failures: a failed member operation is logged and
/// counted, and processing continues with the next member or IP set.
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    /// The HTTP request could not be sent or completed.
    ///
    /// Covers connection failures, TLS errors and transport-level timeouts.
    #[error("API request to '{path}' failed: {reason}")]
    RequestFailed {
        /// Resource path relative to the API root
        path: String,
        /// Transport-level failure description
        reason: String,
    },

    /// The API answered with a non-success HTTP status.
    #[error("API request to '{path}' returned HTTP {status}: {body}")]
    UnexpectedStatus {
        /// Resource path relative to the API root
        path: String,
        /// HTTP status code returned by the endpoint
        status: u16,
        /// Response body, as far as it could be read
        body: String,
    },

    /// Failed to create a member in an IP set.
    #[error("Failed to add {cidr} to IP set '{set_path}': {reason}")]
    MemberCreateFailed {
        /// Member collection path of the IP set
        set_path: String,
        /// Address that could not be added
        cidr: String,
        /// Specific reason for the failure
        reason: String,
    },

    /// Failed to delete a member from an IP set.
    ///
    /// Deleting a member that is already gone is not an error; the gateway
    /// treats HTTP 404 as success (idempotent delete).
    #[error("Failed to remove {cidr} from IP set '{set_path}': {reason}")]
    MemberDeleteFailed {
        /// Member collection path of the IP set
        set_path: String,
        /// Address that could not be removed
        cidr: String,
        /// Specific reason for the failure
        reason: String,
    },
}

/// Errors that can occur during DNS address lookups.
///
/// A lookup failure for one domain contributes zero addresses for that domain
/// and never aborts resolution of the remaining domains in a directive.
#[derive(Error, Debug, Clone)]
pub enum ResolveError {
    /// The lookup failed at the resolver level.
    ///
    /// A name that exists but has no records of the requested type is not an
    /// error; it yields an empty address list instead.
    #[error("{record_type} lookup for '{domain}' failed: {reason}")]
    LookupFailed {
        /// Domain name that was queried
        domain: String,
        /// Queried record type, `A` or `AAAA`
        record_type: String,
        /// Resolver failure description
        reason: String,
    },
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
