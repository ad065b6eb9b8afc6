use serde::Deserialize;
use peergrant_core::error::{PeerGrantError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub version: u32,

    #[serde(default)]
    pub auth: AuthSection,

    #[serde(default)]
    pub credentials: CredentialsSection,

    #[serde(default)]
    pub policy: PolicySection,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            version: 1,
            auth: AuthSection::default(),
            credentials: CredentialsSection::default(),
            policy: PolicySection::default(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(PeerGrantError::BadRequest(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.auth.validate()?;
        self.credentials.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthSection {
    /// Per remote call. Must outlast the transport's own MAX_TRANSMIT_WAIT
    /// (93 s) so the device gives up before the broker does.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Owner written into every access-control entry.
    #[serde(default = "default_acl_owner")]
    pub acl_owner: u16,

    /// Serialize provisioning per device endpoint.
    #[serde(default = "default_true")]
    pub serialize_per_host: bool,

    /// Delete instances created during a failed authorization.
    #[serde(default = "default_true")]
    pub rollback_on_failure: bool,
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
            acl_owner: default_acl_owner(),
            serialize_per_host: true,
            rollback_on_failure: true,
        }
    }
}

impl AuthSection {
    pub fn validate(&self) -> Result<()> {
        if !(1000..=600000).contains(&self.request_timeout_ms) {
            return Err(PeerGrantError::BadRequest(
                "auth.request_timeout_ms must be between 1000 and 600000".into(),
            ));
        }
        if self.acl_owner == 0 || self.acl_owner == u16::MAX {
            return Err(PeerGrantError::BadRequest(
                "auth.acl_owner must be between 1 and 65534".into(),
            ));
        }
        Ok(())
    }
}

fn default_request_timeout_ms() -> u64 {
    120000
}
fn default_acl_owner() -> u16 {
    1
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CredentialSource {
    /// Fresh random secrets per authorization.
    #[default]
    Generated,
    /// Fixed secrets from this file.
    Static,
}

#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialsSection {
    #[serde(default)]
    pub source: CredentialSource,

    #[serde(default = "default_psk_identity")]
    pub psk_identity: String,

    #[serde(default = "default_psk_key")]
    pub psk_key: String,

    #[serde(default = "default_master_secret")]
    pub master_secret: String,

    #[serde(default = "default_master_salt")]
    pub master_salt: String,

    /// OSCORE sender id installed on the host; the requester gets the mirror.
    #[serde(default = "default_sender_id")]
    pub sender_id: String,

    #[serde(default = "default_recipient_id")]
    pub recipient_id: String,
}

// Secrets stay out of logs.
impl std::fmt::Debug for CredentialsSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsSection")
            .field("source", &self.source)
            .field("psk_identity", &self.psk_identity)
            .field("sender_id", &self.sender_id)
            .field("recipient_id", &self.recipient_id)
            .finish_non_exhaustive()
    }
}

impl Default for CredentialsSection {
    fn default() -> Self {
        Self {
            source: CredentialSource::default(),
            psk_identity: default_psk_identity(),
            psk_key: default_psk_key(),
            master_secret: default_master_secret(),
            master_salt: default_master_salt(),
            sender_id: default_sender_id(),
            recipient_id: default_recipient_id(),
        }
    }
}

impl CredentialsSection {
    pub fn validate(&self) -> Result<()> {
        if self.psk_identity.is_empty() {
            return Err(PeerGrantError::BadRequest(
                "credentials.psk_identity must not be empty".into(),
            ));
        }
        if self.sender_id.is_empty() || self.recipient_id.is_empty() {
            return Err(PeerGrantError::BadRequest(
                "credentials.sender_id and recipient_id must not be empty".into(),
            ));
        }
        if self.sender_id == self.recipient_id {
            return Err(PeerGrantError::BadRequest(
                "credentials.sender_id must differ from recipient_id".into(),
            ));
        }
        if self.source == CredentialSource::Static
            && (self.psk_key.is_empty() || self.master_secret.is_empty())
        {
            return Err(PeerGrantError::BadRequest(
                "static credentials need psk_key and master_secret".into(),
            ));
        }
        Ok(())
    }
}

fn default_psk_identity() -> String {
    "key_identity".into()
}
fn default_psk_key() -> String {
    "secretkey".into()
}
fn default_master_secret() -> String {
    "0123456789abcdef".into()
}
fn default_master_salt() -> String {
    "mastersalt".into()
}
fn default_sender_id() -> String {
    "s".into()
}
fn default_recipient_id() -> String {
    "r".into()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DefaultDecision {
    #[default]
    Allow,
    Deny,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct PolicySection {
    /// Decision when no allowlist rule matches.
    #[serde(default)]
    pub default: DefaultDecision,

    /// `requester -> host` rules; either side may be `*`.
    #[serde(default)]
    pub allowlist: Vec<String>,
}
