use async_trait::async_trait;

use peergrant_core::error::Result;
use peergrant_core::request::{AuthRequest, Identity};

use crate::config::{DefaultDecision, PolicySection};
use crate::directory::Registration;

use super::allowlist::{compile_rules, is_allowed, PeerRule};

/// Pluggable authorization decision.
///
/// Returning `Some` allows the request. The returned registration may differ
/// from the one passed in (an implementation may re-resolve the requester);
/// the orchestrator uses it for every later step. `None` denies.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn decide(
        &self,
        request: &AuthRequest,
        requester: &Registration,
        identity: &Identity,
    ) -> Option<Registration>;
}

/// Allowlist of `requester -> host` pairs with a configurable fallback.
/// Compile once at startup, then share via Arc.
pub struct AllowlistAuthorizer {
    rules: Vec<PeerRule>,
    default: DefaultDecision,
}

impl AllowlistAuthorizer {
    pub fn new(policy: &PolicySection) -> Result<Self> {
        Ok(Self {
            rules: compile_rules(&policy.allowlist)?,
            default: policy.default,
        })
    }

    pub fn allow_all() -> Self {
        Self {
            rules: Vec::new(),
            default: DefaultDecision::Allow,
        }
    }

    /// True if every request will be denied.
    pub fn is_strict_deny(&self) -> bool {
        self.rules.is_empty() && self.default == DefaultDecision::Deny
    }
}

#[async_trait]
impl Authorizer for AllowlistAuthorizer {
    async fn decide(
        &self,
        request: &AuthRequest,
        requester: &Registration,
        identity: &Identity,
    ) -> Option<Registration> {
        // The registration was looked up by this address; a mismatch means the
        // directory changed under us.
        if identity.peer_address() != requester.address() {
            tracing::warn!(
                requester = %requester.endpoint(),
                addr = %identity.peer_address(),
                "identity does not match requester registration"
            );
            return None;
        }

        let allowed = is_allowed(&self.rules, requester.endpoint(), request.host_endpoint())
            || self.default == DefaultDecision::Allow;

        tracing::debug!(
            requester = %requester.endpoint(),
            host = %request.host_endpoint(),
            allowed,
            "policy decision"
        );

        allowed.then(|| requester.clone())
    }
}
