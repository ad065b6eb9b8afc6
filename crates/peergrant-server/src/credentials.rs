//! Credential scheme selection and key material.

use std::fmt;

use rand::RngCore;

use crate::config::{CredentialSource, CredentialsSection};
use crate::directory::Registration;

/// The two ways two devices can secure a direct exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialScheme {
    /// Pre-shared key installed in the client security object.
    Psk,
    /// OSCORE context linked from the client security object.
    Oscore,
}

impl CredentialScheme {
    pub fn as_str(self) -> &'static str {
        match self {
            CredentialScheme::Psk => "psk",
            CredentialScheme::Oscore => "oscore",
        }
    }
}

/// OSCORE when both sides advertise it, else PSK.
///
/// This is a capability check, not a ranking of security strength.
pub fn select_scheme(requester: &Registration, host: &Registration) -> CredentialScheme {
    if requester.supports_oscore() && host.supports_oscore() {
        CredentialScheme::Oscore
    } else {
        CredentialScheme::Psk
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct PskMaterial {
    pub identity: String,
    pub key: String,
}

impl fmt::Debug for PskMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PskMaterial")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct OscoreMaterial {
    pub master_secret: String,
    pub master_salt: String,
    pub sender_id: String,
    pub recipient_id: String,
}

impl OscoreMaterial {
    /// The same context seen from the other end.
    pub fn mirrored(&self) -> Self {
        Self {
            master_secret: self.master_secret.clone(),
            master_salt: self.master_salt.clone(),
            sender_id: self.recipient_id.clone(),
            recipient_id: self.sender_id.clone(),
        }
    }
}

impl fmt::Debug for OscoreMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OscoreMaterial")
            .field("sender_id", &self.sender_id)
            .field("recipient_id", &self.recipient_id)
            .finish_non_exhaustive()
    }
}

/// Key material for one peer account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountKeys {
    Psk(PskMaterial),
    Oscore(OscoreMaterial),
}

impl AccountKeys {
    pub fn scheme(&self) -> CredentialScheme {
        match self {
            AccountKeys::Psk(_) => CredentialScheme::Psk,
            AccountKeys::Oscore(_) => CredentialScheme::Oscore,
        }
    }
}

/// Material for one authorization: what the host stores about the
/// requester, and (OSCORE only) what the requester stores about the host.
#[derive(Debug, Clone)]
pub struct PeerCredentials {
    pub host: AccountKeys,
    pub requester: Option<AccountKeys>,
}

impl PeerCredentials {
    pub fn scheme(&self) -> CredentialScheme {
        self.host.scheme()
    }
}

pub struct CredentialFactory {
    cfg: CredentialsSection,
}

impl CredentialFactory {
    pub fn new(cfg: CredentialsSection) -> Self {
        Self { cfg }
    }

    pub fn source(&self) -> CredentialSource {
        self.cfg.source
    }

    pub fn issue(&self, scheme: CredentialScheme) -> PeerCredentials {
        match scheme {
            CredentialScheme::Psk => PeerCredentials {
                host: AccountKeys::Psk(PskMaterial {
                    identity: self.cfg.psk_identity.clone(),
                    key: self.secret(&self.cfg.psk_key, 16),
                }),
                requester: None,
            },
            CredentialScheme::Oscore => {
                let host = OscoreMaterial {
                    master_secret: self.secret(&self.cfg.master_secret, 16),
                    master_salt: self.secret(&self.cfg.master_salt, 8),
                    sender_id: self.cfg.sender_id.clone(),
                    recipient_id: self.cfg.recipient_id.clone(),
                };
                let requester = host.mirrored();
                PeerCredentials {
                    host: AccountKeys::Oscore(host),
                    requester: Some(AccountKeys::Oscore(requester)),
                }
            }
        }
    }

    fn secret(&self, configured: &str, len: usize) -> String {
        match self.cfg.source {
            CredentialSource::Static => configured.to_string(),
            CredentialSource::Generated => random_hex(len),
        }
    }
}

fn random_hex(len: usize) -> String {
    let mut buf = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut buf);
    hex::encode(buf)
}
