// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Proxmox VE HTTP API gateway.
//!
//! This module contains the HTTP façade the rest of the crate talks through:
//! a tolerant `get` for reads, and member create/delete operations for IP set
//! mutation. Reads normalize transport errors, non-success statuses and
//! non-JSON bodies to an absent result; mutations return structured
//! [`ApiError`] values that callers log and count without aborting the run.
//!
//! The [`ResourceApi`] trait is the seam the reconciler and scope walker are
//! written against, so tests can substitute a scripted in-memory gateway.

use crate::constants::API_BASE_PATH;
use crate::errors::ApiError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

/// Operations the reconciler and scope walker need from the management API.
#[async_trait]
pub trait ResourceApi: Send + Sync {
    /// Read a resource by its path relative to the API root.
    ///
    /// Returns the unwrapped `data` payload, or `None` for any failure:
    /// transport errors, non-success statuses, non-JSON bodies and null
    /// payloads all normalize to an absent result. Failures are logged, not
    /// raised.
    async fn get(&self, path: &str) -> Option<Value>;

    /// Add a member to an IP set, recording the originating domain as the
    /// member comment.
    async fn create_member(&self, set_path: &str, cidr: &str, comment: &str)
        -> Result<(), ApiError>;

    /// Remove a member from an IP set by address.
    ///
    /// Removing a member that is already gone is success.
    async fn delete_member(&self, set_path: &str, cidr: &str) -> Result<(), ApiError>;
}

/// Build the API base URL from an endpoint address.
///
/// A bare host gets the `https://` scheme and the default API port applied;
/// a host that already names a port only gets the scheme, and an address
/// that already carries a scheme is used as given, so deployments behind a
/// reverse proxy keep their explicit port (or none).
///
/// Converts "pve1.example.com" to `https://pve1.example.com:8006` and leaves
/// "https://pve.example.com/proxied" as-is (minus any trailing slash).
pub(crate) fn build_api_url(endpoint: &str) -> String {
    let trimmed = endpoint.trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else if trimmed.contains(':') {
        format!("https://{trimmed}")
    } else {
        format!("https://{trimmed}:{}", crate::constants::DEFAULT_API_PORT)
    }
}

/// Normalize a JSON payload into a list of objects.
///
/// The API returns collections as arrays but single resources as bare
/// objects; some error paths yield strings or null. Everything downstream
/// wants a uniform sequence, so: an array is returned as its elements, a bare
/// object becomes a one-element list, anything else is empty.
#[must_use]
pub fn as_object_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(_) => vec![value],
        _ => Vec::new(),
    }
}

/// Deserialize a normalized payload into typed records.
///
/// Entries that do not match the expected shape are dropped with a debug log;
/// a structurally surprising response degrades to fewer records, never to a
/// failed run.
#[must_use]
pub fn records<T: DeserializeOwned>(value: Option<Value>) -> Vec<T> {
    let Some(value) = value else {
        return Vec::new();
    };

    as_object_list(value)
        .into_iter()
        .filter_map(|entry| match serde_json::from_value(entry) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(error = %e, "Dropping malformed API record");
                None
            }
        })
        .collect()
}

/// HTTP client for the Proxmox VE JSON API.
///
/// Authenticates with an API token (`user@realm!tokenid=secret`) sent as a
/// `PVEAPIToken` authorization header on every request.
pub struct PveClient {
    http: HttpClient,
    base_url: String,
    token: String,
}

impl PveClient {
    /// Create a client for the given endpoint.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - API endpoint; a bare host gets `https://` and port 8006
    /// * `token` - API token in `user@realm!tokenid=secret` form
    /// * `insecure` - accept invalid or self-signed TLS certificates
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is not a valid URL or the underlying
    /// TLS client cannot be constructed.
    pub fn new(endpoint: &str, token: &str, insecure: bool) -> Result<Self> {
        let base_url = build_api_url(endpoint);

        // Validate early so a typo fails the run at startup, not mid-walk
        url::Url::parse(&base_url)
            .with_context(|| format!("Invalid API endpoint: {endpoint}"))?;

        let http = HttpClient::builder()
            .danger_accept_invalid_certs(insecure)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url,
            token: token.to_string(),
        })
    }

    /// Execute one request against the API and return the raw response body.
    async fn api_request(
        &self,
        method: &str,
        path: &str,
        body: Option<&Value>,
    ) -> Result<String, ApiError> {
        let url = format!("{}{API_BASE_PATH}/{path}", self.base_url);

        debug!(method = %method, url = %url, body = ?body, "API request");

        let mut request = match method {
            "GET" => self.http.get(&url),
            "POST" => {
                let mut req = self.http.post(&url);
                if let Some(body_data) = body {
                    req = req.json(body_data);
                }
                req
            }
            "DELETE" => self.http.delete(&url),
            _ => {
                return Err(ApiError::RequestFailed {
                    path: path.to_string(),
                    reason: format!("unsupported HTTP method: {method}"),
                })
            }
        };

        request = request.header("Authorization", format!("PVEAPIToken={}", self.token));

        let response = request.send().await.map_err(|e| ApiError::RequestFailed {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(ApiError::UnexpectedStatus {
                path: path.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }

        debug!(method = %method, url = %url, status = %status, response_len = text.len(), "API response");

        Ok(text)
    }
}

#[async_trait]
impl ResourceApi for PveClient {
    async fn get(&self, path: &str) -> Option<Value> {
        let text = match self.api_request("GET", path, None).await {
            Ok(text) => text,
            Err(e) => {
                debug!(path = %path, error = %e, "GET failed, treating as absent");
                return None;
            }
        };

        let mut value: Value = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(e) => {
                warn!(path = %path, error = %e, "Non-JSON API response, treating as absent");
                return None;
            }
        };

        match value.get_mut("data").map(Value::take) {
            Some(Value::Null) | None => None,
            Some(data) => Some(data),
        }
    }

    async fn create_member(
        &self,
        set_path: &str,
        cidr: &str,
        comment: &str,
    ) -> Result<(), ApiError> {
        let body = serde_json::json!({ "cidr": cidr, "comment": comment });

        self.api_request("POST", set_path, Some(&body))
            .await
            .map_err(|e| ApiError::MemberCreateFailed {
                set_path: set_path.to_string(),
                cidr: cidr.to_string(),
                reason: e.to_string(),
            })?;

        Ok(())
    }

    async fn delete_member(&self, set_path: &str, cidr: &str) -> Result<(), ApiError> {
        match self.api_request("DELETE", &format!("{set_path}/{cidr}"), None).await {
            Ok(_) => Ok(()),
            // Already gone counts as removed
            Err(ApiError::UnexpectedStatus { status: 404, .. }) => {
                debug!(set_path = %set_path, cidr = %cidr, "Member already absent");
                Ok(())
            }
            Err(e) => Err(ApiError::MemberDeleteFailed {
                set_path: set_path.to_string(),
                cidr: cidr.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod api_tests;
