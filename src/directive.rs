// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Domain directive parsing for IP set comments.
//!
//! An IP set opts into DNS-driven membership by carrying a comment of the form
//! `auto_dns_<domain>[_<domain>...]`. This module decodes that marker into an
//! ordered list of domain names. Anything else in the comment field means the
//! set is not managed by dnset and is skipped without comment.

use crate::constants::{DIRECTIVE_PREFIX, DOMAIN_SEPARATOR};

/// Extract the domain directive from an IP set comment, if present.
///
/// Returns `None` when the comment does not start with the marker prefix
/// (the set is unmanaged). Returns `Some(vec![])` for a bare marker with an
/// empty remainder: the set is managed but currently names no domains.
///
/// Tokens are split on `_` and trimmed of surrounding whitespace; empty
/// tokens are kept as-is, since resolving an empty name simply yields no
/// addresses. No domain syntax validation happens here — a malformed domain
/// fails at resolution time, for that domain only.
///
/// # Example
///
/// ```rust
/// use dnset::directive::domain_directive;
///
/// let domains = domain_directive("auto_dns_example.com_test.invalid").unwrap();
/// assert_eq!(domains, vec!["example.com", "test.invalid"]);
///
/// assert_eq!(domain_directive("auto_dns_"), Some(vec![]));
/// assert_eq!(domain_directive("notes: nothing special"), None);
/// ```
#[must_use]
pub fn domain_directive(comment: &str) -> Option<Vec<String>> {
    let remainder = comment.strip_prefix(DIRECTIVE_PREFIX)?;

    if remainder.is_empty() {
        return Some(Vec::new());
    }

    Some(
        remainder
            .split(DOMAIN_SEPARATOR)
            .map(|token| token.trim().to_string())
            .collect(),
    )
}

#[cfg(test)]
#[path = "directive_tests.rs"]
mod directive_tests;
