// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `walker.rs`

use super::*;
use crate::errors::{ApiError, ResolveError};
use crate::resolver::RecordFamily;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Mutex;

/// Gateway double with scripted reads and a creation log.
#[derive(Default)]
struct ScriptedApi {
    resources: HashMap<String, Value>,
    creates: Mutex<Vec<(String, String, String)>>,
}

impl ScriptedApi {
    fn with(mut self, path: &str, value: Value) -> Self {
        self.resources.insert(path.to_string(), value);
        self
    }

    fn creates(&self) -> Vec<(String, String, String)> {
        self.creates.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResourceApi for ScriptedApi {
    async fn get(&self, path: &str) -> Option<Value> {
        self.resources.get(path).cloned()
    }

    async fn create_member(
        &self,
        set_path: &str,
        cidr: &str,
        comment: &str,
    ) -> Result<(), ApiError> {
        self.creates.lock().unwrap().push((
            set_path.to_string(),
            cidr.to_string(),
            comment.to_string(),
        ));
        Ok(())
    }

    async fn delete_member(&self, _set_path: &str, _cidr: &str) -> Result<(), ApiError> {
        Ok(())
    }
}

/// Lookup double answering one fixed address for one domain.
struct SingleAnswer {
    domain: String,
    address: IpAddr,
}

#[async_trait]
impl AddressLookup for SingleAnswer {
    async fn lookup(
        &self,
        domain: &str,
        family: RecordFamily,
    ) -> Result<Vec<IpAddr>, ResolveError> {
        if domain == self.domain && family == RecordFamily::V4 {
            Ok(vec![self.address])
        } else {
            Ok(Vec::new())
        }
    }
}

fn example_lookup() -> SingleAnswer {
    SingleAnswer {
        domain: "example.com".to_string(),
        address: "93.184.216.34".parse().unwrap(),
    }
}

#[tokio::test]
async fn test_walks_every_scope_level() {
    let api = ScriptedApi::default()
        .with(
            "cluster/firewall/ipset",
            json!([{"name": "cluster-set", "comment": "auto_dns_example.com"}]),
        )
        .with("nodes", json!([{"node": "pve1"}]))
        .with(
            "nodes/pve1/firewall/ipset",
            json!([{"name": "node-set", "comment": "auto_dns_example.com"}]),
        )
        .with("nodes/pve1/qemu", json!([{"vmid": 100, "name": "web"}]))
        .with(
            "nodes/pve1/qemu/100/firewall/ipset",
            json!([{"name": "vm-set", "comment": "auto_dns_example.com"}]),
        )
        .with("nodes/pve1/lxc", json!([{"vmid": 201}]))
        .with(
            "nodes/pve1/lxc/201/firewall/ipset",
            json!([{"name": "ct-set", "comment": "auto_dns_example.com"}]),
        );

    let summary = sync_all(&api, &example_lookup()).await;

    assert_eq!(summary.sets_seen, 4);
    assert_eq!(summary.sets_applied, 4);
    assert_eq!(summary.addresses_applied, 4);

    let paths: Vec<String> = api.creates().into_iter().map(|(path, _, _)| path).collect();
    assert_eq!(
        paths,
        vec![
            "cluster/firewall/ipset/cluster-set",
            "nodes/pve1/firewall/ipset/node-set",
            "nodes/pve1/qemu/100/firewall/ipset/vm-set",
            "nodes/pve1/lxc/201/firewall/ipset/ct-set",
        ]
    );
}

#[tokio::test]
async fn test_unsupported_scope_does_not_abort_siblings() {
    // pve1 answers nothing at all (no ipset support, no guest listings);
    // pve2 still gets walked
    let api = ScriptedApi::default()
        .with("nodes", json!([{"node": "pve1"}, {"node": "pve2"}]))
        .with("nodes/pve2/qemu", json!([{"vmid": 100}]))
        .with(
            "nodes/pve2/qemu/100/firewall/ipset",
            json!([{"name": "vm-set", "comment": "auto_dns_example.com"}]),
        );

    let summary = sync_all(&api, &example_lookup()).await;

    assert_eq!(summary.sets_seen, 1);
    assert_eq!(summary.sets_applied, 1);
    assert_eq!(
        api.creates(),
        vec![(
            "nodes/pve2/qemu/100/firewall/ipset/vm-set".to_string(),
            "93.184.216.34".to_string(),
            "example.com".to_string(),
        )]
    );
}

#[tokio::test]
async fn test_single_object_listing_is_normalized() {
    // A collection returned as a bare object instead of a list
    let api = ScriptedApi::default().with(
        "cluster/firewall/ipset",
        json!({"name": "only-set", "comment": "auto_dns_example.com"}),
    );

    let summary = sync_all(&api, &example_lookup()).await;

    assert_eq!(summary.sets_seen, 1);
    assert_eq!(summary.sets_applied, 1);
}

#[tokio::test]
async fn test_empty_cluster_is_a_quiet_run() {
    let api = ScriptedApi::default();

    let summary = sync_all(&api, &example_lookup()).await;

    assert_eq!(summary, RunSummary::default());
    assert!(api.creates().is_empty());
}

#[tokio::test]
async fn test_summary_buckets_outcomes() {
    let api = ScriptedApi::default().with(
        "cluster/firewall/ipset",
        json!([
            {"name": "managed", "comment": "auto_dns_example.com"},
            {"name": "plain", "comment": "static allowlist"},
            {"name": "uncommented"},
            {"name": "empty-directive", "comment": "auto_dns_"},
            {"name": "dead", "comment": "auto_dns_test.invalid"}
        ]),
    );

    let summary = sync_all(&api, &example_lookup()).await;

    assert_eq!(summary.sets_seen, 5);
    assert_eq!(summary.sets_applied, 1);
    assert_eq!(summary.sets_unmanaged, 2);
    assert_eq!(summary.sets_empty_directive, 1);
    assert_eq!(summary.sets_unresolved, 1);
    assert_eq!(summary.addresses_applied, 1);
    assert_eq!(summary.member_failures, 0);
}
