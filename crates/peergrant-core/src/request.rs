//! Authorization request and the identity of the device that sent it.

use std::net::SocketAddr;

use crate::error::{PeerGrantError, Result};
use crate::grant::AccessGrant;

/// How the sender was authenticated by the secure-channel layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecurityBinding {
    Unsecure,
    Psk { identity: String },
    Rpk { public_key: Vec<u8> },
    X509 { common_name: String },
}

/// Network address plus security binding of a peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    peer_address: SocketAddr,
    security: SecurityBinding,
}

impl Identity {
    pub fn new(peer_address: SocketAddr, security: SecurityBinding) -> Self {
        Self { peer_address, security }
    }

    pub fn unsecure(peer_address: SocketAddr) -> Self {
        Self::new(peer_address, SecurityBinding::Unsecure)
    }

    pub fn psk(peer_address: SocketAddr, identity: impl Into<String>) -> Self {
        Self::new(peer_address, SecurityBinding::Psk { identity: identity.into() })
    }

    pub fn peer_address(&self) -> SocketAddr {
        self.peer_address
    }

    pub fn security(&self) -> &SecurityBinding {
        &self.security
    }

    pub fn is_secure(&self) -> bool {
        !matches!(self.security, SecurityBinding::Unsecure)
    }
}

/// A request from `requester` to access resources hosted by `host_endpoint`.
#[derive(Debug, Clone)]
pub struct AuthRequest {
    requester: Identity,
    host_endpoint: String,
    grants: Vec<AccessGrant>,
    credentials_requested: bool,
}

impl AuthRequest {
    /// Both parties must be defined; a wildcard requester address or a blank
    /// host endpoint is rejected here rather than deep in the handler.
    pub fn new(
        requester: Identity,
        host_endpoint: impl Into<String>,
        grants: Vec<AccessGrant>,
        credentials_requested: bool,
    ) -> Result<Self> {
        let host_endpoint = host_endpoint.into();
        let addr = requester.peer_address();
        if addr.ip().is_unspecified() || addr.port() == 0 {
            return Err(PeerGrantError::BadRequest("requester must be defined".into()));
        }
        if host_endpoint.trim().is_empty() {
            return Err(PeerGrantError::BadRequest("host must be defined".into()));
        }

        Ok(Self {
            requester,
            host_endpoint,
            grants,
            credentials_requested,
        })
    }

    pub fn requester(&self) -> &Identity {
        &self.requester
    }

    pub fn host_endpoint(&self) -> &str {
        &self.host_endpoint
    }

    /// Requested grants, in payload order.
    pub fn grants(&self) -> &[AccessGrant] {
        &self.grants
    }

    pub fn credentials_requested(&self) -> bool {
        self.credentials_requested
    }
}
