//! Allowlist compilation and matching utilities.
//!
//! Rules have the form `requester -> host`; either side may be `*`.
//! `:` is not used as a separator since endpoint names are often URNs.

use peergrant_core::error::{PeerGrantError, Result};

/// Compiled `requester -> host` rule.
#[derive(Debug, Clone)]
pub struct PeerRule {
    pub requester: Option<String>, // None => wildcard
    pub host: Option<String>,      // None => wildcard
}

pub fn compile_rules(raw: &[String]) -> Result<Vec<PeerRule>> {
    let mut out = Vec::with_capacity(raw.len());
    for s in raw {
        let (req, host) = s.split_once("->").ok_or_else(|| {
            PeerGrantError::BadRequest(format!(
                "invalid allowlist entry: {s} (expected requester -> host)"
            ))
        })?;
        let (req, host) = (req.trim(), host.trim());
        if req.is_empty() || host.is_empty() {
            return Err(PeerGrantError::BadRequest(format!(
                "invalid allowlist entry: {s} (empty side, use * for any)"
            )));
        }
        out.push(PeerRule {
            requester: wildcard(req),
            host: wildcard(host),
        });
    }
    Ok(out)
}

fn wildcard(s: &str) -> Option<String> {
    if s == "*" { None } else { Some(s.to_string()) }
}

pub fn is_allowed(rules: &[PeerRule], requester: &str, host: &str) -> bool {
    rules.iter().any(|r| {
        let req_ok = r.requester.as_deref().map_or(true, |p| p == requester);
        let host_ok = r.host.as_deref().map_or(true, |p| p == host);
        req_ok && host_ok
    })
}
