use std::sync::Arc;
use std::time::Duration;

use tracing::Instrument;

use peergrant_core::error::{PeerGrantError, Result};
use peergrant_core::request::AuthRequest;
use peergrant_core::response::AuthResponse;

use crate::acl;
use crate::config::ServerConfig;
use crate::credentials::{select_scheme, CredentialFactory};
use crate::directory::{Registration, RegistrationDirectory};
use crate::obs::PeerGrantMetrics;
use crate::peer::{lookup_short_id, set_account, PeerClient, ShortId};
use crate::policy::Authorizer;
use crate::transport::sender::RequestSender;

use super::locks::HostLocks;
use super::saga::ProvisionLog;

/// Runs one authorization from registration lookup to the ACL commit.
///
/// Steps are strictly sequential and never retried. Any remote failure is
/// reported as forbidden; the device-level cause only reaches the logs.
pub struct AuthHandler {
    directory: Arc<dyn RegistrationDirectory>,
    authorizer: Arc<dyn Authorizer>,
    peer: PeerClient,
    credentials: CredentialFactory,
    locks: HostLocks,
    metrics: Arc<PeerGrantMetrics>,
    acl_owner: u16,
    serialize_per_host: bool,
    rollback_on_failure: bool,
}

impl AuthHandler {
    pub fn new(
        cfg: &ServerConfig,
        directory: Arc<dyn RegistrationDirectory>,
        authorizer: Arc<dyn Authorizer>,
        sender: Arc<dyn RequestSender>,
        metrics: Arc<PeerGrantMetrics>,
    ) -> Self {
        let timeout = Duration::from_millis(cfg.auth.request_timeout_ms);
        Self {
            directory,
            authorizer,
            peer: PeerClient::new(sender, timeout, Arc::clone(&metrics)),
            credentials: CredentialFactory::new(cfg.credentials.clone()),
            locks: HostLocks::new(),
            metrics,
            acl_owner: cfg.auth.acl_owner,
            serialize_per_host: cfg.auth.serialize_per_host,
            rollback_on_failure: cfg.auth.rollback_on_failure,
        }
    }

    pub fn metrics(&self) -> &PeerGrantMetrics {
        &self.metrics
    }

    pub async fn auth(&self, request: &AuthRequest) -> AuthResponse {
        let span = tracing::info_span!(
            "auth",
            requester = %request.requester().peer_address(),
            host = %request.host_endpoint(),
            credentials = request.credentials_requested(),
        );

        let in_flight = self.metrics.auth_in_flight.track();
        let res = self.run(request).instrument(span).await;
        drop(in_flight);

        let response = match res {
            Ok(()) => AuthResponse::success(),
            Err(e) => {
                tracing::info!(
                    error = %e,
                    host = %request.host_endpoint(),
                    "authorization refused"
                );
                AuthResponse::from_error(&e)
            }
        };
        self.metrics.auth_outcomes.inc(&[("result", response.kind().as_str())]);
        response
    }

    async fn run(&self, request: &AuthRequest) -> Result<()> {
        let identity = request.requester();
        let requester = self.directory.by_address(&identity.peer_address());
        let host = self.directory.by_endpoint(request.host_endpoint());
        let (Some(requester), Some(host)) = (requester, host) else {
            return Err(PeerGrantError::BadRequest("could not find registrations".into()));
        };

        tracing::info!(
            requester = %requester.endpoint(),
            host = %host.endpoint(),
            grants = request.grants().len(),
            "serving authorization request"
        );

        let requester = self
            .authorizer
            .decide(request, &requester, identity)
            .await
            .ok_or_else(|| PeerGrantError::Forbidden("requester is not authorized".into()))?;

        if let Some(g) = request.grants().iter().find(|g| !host.advertises(&g.path())) {
            return Err(PeerGrantError::Forbidden(format!(
                "{} is not registered on {}",
                g.path(),
                host.endpoint()
            )));
        }

        let _guard = if self.serialize_per_host {
            let mut endpoints = vec![host.endpoint()];
            if request.credentials_requested() {
                endpoints.push(requester.endpoint());
            }
            Some(self.locks.acquire(&endpoints).await)
        } else {
            None
        };

        let mut log = ProvisionLog::new();
        match self.provision_and_commit(request, &requester, &host, &mut log).await {
            Ok(()) => {
                log.commit(&self.peer).await;
                Ok(())
            }
            Err(e) => {
                if self.rollback_on_failure {
                    log.rollback(&self.peer, &self.metrics).await;
                } else if !log.is_empty() {
                    tracing::warn!(steps = log.len(), "partial provisioning left in place");
                }
                Err(e)
            }
        }
    }

    async fn provision_and_commit(
        &self,
        request: &AuthRequest,
        requester: &Registration,
        host: &Registration,
        log: &mut ProvisionLog,
    ) -> Result<()> {
        let short_id = if request.credentials_requested() {
            let scheme = select_scheme(requester, host);
            let creds = self.credentials.issue(scheme);
            tracing::info!(scheme = scheme.as_str(), "credentials requested");

            let account = set_account(&self.peer, host, requester.endpoint(), &creds.host, log)
                .await
                .map_err(|e| remote_failure("host provisioning", e))?;
            if let Some(keys) = &creds.requester {
                set_account(&self.peer, requester, host.endpoint(), keys, log)
                    .await
                    .map_err(|e| remote_failure("requester provisioning", e))?;
            }
            account.short_id
        } else {
            self.existing_short_id(requester, host).await?
        };

        let entries = acl::build_entries(request.grants(), short_id, self.acl_owner);
        let written = acl::commit(&self.peer, host, &entries)
            .await
            .map_err(|e| remote_failure("access control commit", e))?;

        tracing::info!(short_id = short_id.get(), entries = written, "authorization granted");
        Ok(())
    }

    async fn existing_short_id(
        &self,
        requester: &Registration,
        host: &Registration,
    ) -> Result<ShortId> {
        lookup_short_id(&self.peer, host, requester.endpoint())
            .await
            .map_err(|e| remote_failure("short id lookup", e))?
            .ok_or_else(|| {
                PeerGrantError::Forbidden(format!(
                    "{} holds no account for {}",
                    host.endpoint(),
                    requester.endpoint()
                ))
            })
    }
}

/// Collapse a remote error into a forbidden outcome naming only the step.
fn remote_failure(step: &str, e: PeerGrantError) -> PeerGrantError {
    if !e.is_remote() {
        return e;
    }
    tracing::warn!(step, error = %e, "remote step failed");
    PeerGrantError::Forbidden(format!("{step} failed"))
}
