// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! End-to-end tests for a full synchronization pass.
//!
//! These run the real gateway against a mocked Proxmox VE API server and a
//! scripted DNS lookup, and verify the requests a pass produces: discovery
//! across scopes, tolerance of broken scope endpoints, and the full member
//! replacement of a tagged set.

use async_trait::async_trait;
use dnset::api::PveClient;
use dnset::errors::ResolveError;
use dnset::resolver::{AddressLookup, RecordFamily};
use dnset::walker::sync_all;
use serde_json::json;
use std::net::IpAddr;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Scripted lookup: only `example.com` has an A record.
struct ExampleLookup;

#[async_trait]
impl AddressLookup for ExampleLookup {
    async fn lookup(
        &self,
        domain: &str,
        family: RecordFamily,
    ) -> Result<Vec<IpAddr>, ResolveError> {
        if domain == "example.com" && family == RecordFamily::V4 {
            Ok(vec!["93.184.216.34".parse().unwrap()])
        } else {
            Ok(Vec::new())
        }
    }
}

fn data(value: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "data": value }))
}

#[tokio::test]
async fn test_full_pass_replaces_tagged_set_and_skips_the_rest() {
    let server = MockServer::start().await;

    // Cluster scope: one tagged set, one hand-managed set
    Mock::given(method("GET"))
        .and(path("/api2/json/cluster/firewall/ipset"))
        .respond_with(data(json!([
            {"name": "webservers", "comment": "auto_dns_example.com_test.invalid"},
            {"name": "static", "comment": "hand-managed allowlist"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    // One node; its own firewall scope rejects the sub-resource and its
    // container listing is not even JSON
    Mock::given(method("GET"))
        .and(path("/api2/json/nodes"))
        .respond_with(data(json!([{"node": "pve1"}])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api2/json/nodes/pve1/firewall/ipset"))
        .respond_with(ResponseTemplate::new(501).set_body_string("not implemented"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api2/json/nodes/pve1/qemu"))
        .respond_with(data(json!([{"vmid": 100, "name": "web"}])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api2/json/nodes/pve1/qemu/100/firewall/ipset"))
        .respond_with(data(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api2/json/nodes/pve1/lxc"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .expect(1)
        .mount(&server)
        .await;

    // Tagged set currently holds one stale member
    Mock::given(method("GET"))
        .and(path("/api2/json/cluster/firewall/ipset/webservers"))
        .respond_with(data(json!([
            {"cidr": "198.51.100.7", "comment": "stale.example"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    // Full replace: the stale member goes, the resolved address arrives
    Mock::given(method("DELETE"))
        .and(path("/api2/json/cluster/firewall/ipset/webservers/198.51.100.7"))
        .respond_with(data(json!(null)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api2/json/cluster/firewall/ipset/webservers"))
        .and(body_json(json!({
            "cidr": "93.184.216.34",
            "comment": "example.com"
        })))
        .respond_with(data(json!(null)))
        .expect(1)
        .mount(&server)
        .await;

    let client = PveClient::new(&server.uri(), "sync@pve!dnset=secret", false).unwrap();
    let summary = sync_all(&client, &ExampleLookup).await;

    assert_eq!(summary.sets_seen, 2);
    assert_eq!(summary.sets_applied, 1);
    assert_eq!(summary.sets_unmanaged, 1);
    assert_eq!(summary.addresses_applied, 1);
    assert_eq!(summary.member_failures, 0);

    // Mock expectations (one delete, one create, every scope visited) are
    // verified when the server drops
}

#[tokio::test]
async fn test_unresolved_directive_performs_no_mutations() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api2/json/cluster/firewall/ipset"))
        .respond_with(data(json!([
            {"name": "ghost", "comment": "auto_dns_test.invalid"}
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api2/json/nodes"))
        .respond_with(data(json!([])))
        .mount(&server)
        .await;

    // No member read, no delete, no create may reach the server
    Mock::given(method("GET"))
        .and(path("/api2/json/cluster/firewall/ipset/ghost"))
        .respond_with(data(json!([{"cidr": "198.51.100.7"}])))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .respond_with(data(json!(null)))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .respond_with(data(json!(null)))
        .expect(0)
        .mount(&server)
        .await;

    let client = PveClient::new(&server.uri(), "sync@pve!dnset=secret", false).unwrap();
    let summary = sync_all(&client, &ExampleLookup).await;

    assert_eq!(summary.sets_seen, 1);
    assert_eq!(summary.sets_unresolved, 1);
    assert_eq!(summary.sets_applied, 0);
}

#[tokio::test]
async fn test_unreachable_api_is_a_quiet_run() {
    // Nothing is listening on the discard port; every read normalizes to
    // absent and the pass completes without work
    let client = PveClient::new("http://127.0.0.1:9", "sync@pve!dnset=secret", false).unwrap();
    let summary = sync_all(&client, &ExampleLookup).await;

    assert_eq!(summary.sets_seen, 0);
    assert_eq!(summary.sets_applied, 0);
}
