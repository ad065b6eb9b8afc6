//! Server config loader (strict parsing).

pub mod schema;

use std::fs;

use peergrant_core::error::{PeerGrantError, Result};

pub use schema::{
    AuthSection, CredentialSource, CredentialsSection, DefaultDecision, PolicySection, ServerConfig,
};

pub fn load_from_file(path: &str) -> Result<ServerConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| PeerGrantError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ServerConfig> {
    let cfg: ServerConfig = serde_yaml::from_str(s)
        .map_err(|e| PeerGrantError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
