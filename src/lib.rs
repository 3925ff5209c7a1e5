// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # dnset - DNS-driven firewall IP sets for Proxmox VE
//!
//! dnset keeps Proxmox VE firewall IP set membership synchronized with the
//! current DNS resolution of domain names embedded in each set's comment.
//!
//! ## Overview
//!
//! An operator opts a set in by giving it a comment of the form
//! `auto_dns_<domain>[_<domain>...]`. On every run, dnset re-resolves those
//! domains (A and AAAA), replaces the set's members with the resolved
//! addresses, and records on each member which domain produced it. Sets
//! without the marker are never touched.
//!
//! Because the separator is a literal underscore, domains containing
//! underscores cannot be written in a directive; this is a limitation of the
//! comment format.
//!
//! ## Modules
//!
//! - [`directive`] - Domain directive parsing from IP set comments
//! - [`resolver`] - DNS resolution with address provenance
//! - [`reconciler`] - Per-set inspect/resolve/replace pipeline
//! - [`walker`] - IP set discovery across cluster, node, VM and container scopes
//! - [`api`] - Proxmox VE HTTP API gateway
//! - [`model`] - Record types for the firewall API payloads
//!
//! ## Example
//!
//! ```rust,no_run
//! use dnset::api::PveClient;
//! use dnset::resolver::SystemResolver;
//! use dnset::walker::sync_all;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = PveClient::new(
//!     "pve1.example.com",
//!     "sync@pve!dnset=00000000-0000-0000-0000-000000000000",
//!     false,
//! )?;
//! let resolver = SystemResolver::new();
//!
//! let summary = sync_all(&client, &resolver).await;
//! println!("replaced members in {} sets", summary.sets_applied);
//! # Ok(())
//! # }
//! ```
//!
//! ## Operational Model
//!
//! One invocation is one full reconciliation pass; scheduling is external
//! (a systemd timer or cron). Per-domain and per-member failures are logged
//! and counted but never fail the run — the next pass re-converges.

pub mod api;
pub mod constants;
pub mod directive;
pub mod errors;
pub mod model;
pub mod reconciler;
pub mod resolver;
pub mod walker;
