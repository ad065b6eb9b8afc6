//! Shared application state for the peergrant broker.
//!
//! Built once at startup from a validated config and the embedder's
//! directory and downlink sender, then cloned into every transport binding.

use std::sync::Arc;

use peergrant_core::error::Result;

use crate::auth::AuthHandler;
use crate::config::ServerConfig;
use crate::directory::RegistrationDirectory;
use crate::obs::PeerGrantMetrics;
use crate::policy::{AllowlistAuthorizer, Authorizer};
use crate::transport::sender::RequestSender;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ServerConfig,
    directory: Arc<dyn RegistrationDirectory>,
    handler: AuthHandler,
    metrics: Arc<PeerGrantMetrics>,
}

impl AppState {
    /// Build state with the allowlist authorizer compiled from `cfg.policy`.
    /// Returns Result so the embedder can handle a bad policy (no panic).
    pub fn new(
        cfg: ServerConfig,
        directory: Arc<dyn RegistrationDirectory>,
        sender: Arc<dyn RequestSender>,
    ) -> Result<Self> {
        cfg.validate()?;
        let authorizer = AllowlistAuthorizer::new(&cfg.policy)?;
        if authorizer.is_strict_deny() {
            tracing::warn!("policy denies every request (default deny, empty allowlist)");
        }
        Ok(Self::with_authorizer(cfg, directory, sender, Arc::new(authorizer)))
    }

    /// Build state around a custom authorizer; `cfg.policy` is ignored.
    pub fn with_authorizer(
        cfg: ServerConfig,
        directory: Arc<dyn RegistrationDirectory>,
        sender: Arc<dyn RequestSender>,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self {
        let metrics = Arc::new(PeerGrantMetrics::default());
        let handler = AuthHandler::new(
            &cfg,
            Arc::clone(&directory),
            authorizer,
            sender,
            Arc::clone(&metrics),
        );
        Self {
            inner: Arc::new(AppStateInner {
                cfg,
                directory,
                handler,
                metrics,
            }),
        }
    }

    pub fn cfg(&self) -> &ServerConfig {
        &self.inner.cfg
    }

    pub fn directory(&self) -> &dyn RegistrationDirectory {
        self.inner.directory.as_ref()
    }

    pub fn handler(&self) -> &AuthHandler {
        &self.inner.handler
    }

    pub fn metrics(&self) -> &PeerGrantMetrics {
        &self.inner.metrics
    }
}
