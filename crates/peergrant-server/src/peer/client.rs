use std::sync::Arc;
use std::time::{Duration, Instant};

use peergrant_core::error::{PeerGrantError, ResponseCode, Result};
use peergrant_core::grant::ObjectPath;
use peergrant_core::model::{Object, ObjectInstance, Resource};
use peergrant_core::protocol::downlink::{DownlinkRequest, DownlinkResponse};

use crate::directory::Registration;
use crate::obs::PeerGrantMetrics;
use crate::transport::sender::RequestSender;

/// Grace period on top of the sender's own timeout. The sender is expected
/// to give up first; this deadline only catches one that never returns.
pub const DEADLINE_MARGIN: Duration = Duration::from_millis(500);

/// Timed, metered access to registered devices.
///
/// Every failure-coded response becomes `PeerGrantError::UnexpectedResponse`,
/// so callers only ever see successful responses on the `Ok` path.
#[derive(Clone)]
pub struct PeerClient {
    sender: Arc<dyn RequestSender>,
    timeout: Duration,
    metrics: Arc<PeerGrantMetrics>,
}

impl PeerClient {
    pub fn new(
        sender: Arc<dyn RequestSender>,
        timeout: Duration,
        metrics: Arc<PeerGrantMetrics>,
    ) -> Self {
        Self { sender, timeout, metrics }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Deadline enforced by the broker itself, past the sender's timeout.
    pub fn deadline(&self) -> Duration {
        self.timeout + DEADLINE_MARGIN
    }

    pub async fn call(
        &self,
        target: &Registration,
        request: DownlinkRequest,
    ) -> Result<DownlinkResponse> {
        let op = request.kind();
        let object_id = request.object_id();
        let started = Instant::now();

        let send = self.sender.send(target, request, self.timeout);
        let res = match tokio::time::timeout(self.deadline(), send).await {
            Ok(res) => res,
            Err(_) => Err(PeerGrantError::Timeout(format!(
                "{} gave no answer to {op} on /{object_id} within {:?}",
                target.endpoint(),
                self.deadline()
            ))),
        };
        self.metrics
            .remote_call_duration
            .observe(&[("op", op)], started.elapsed());

        match res {
            Ok(resp) if resp.is_success() => {
                self.metrics.remote_calls.inc(&[("op", op), ("outcome", "ok")]);
                Ok(resp)
            }
            Ok(resp) => {
                self.metrics.remote_calls.inc(&[("op", op), ("outcome", "failure")]);
                tracing::debug!(
                    peer = %target.endpoint(),
                    op,
                    object_id,
                    code = %resp.code(),
                    msg = resp.error_message().unwrap_or(""),
                    "device rejected request"
                );
                Err(PeerGrantError::UnexpectedResponse { op, code: resp.code() })
            }
            Err(e) => {
                let outcome = match e {
                    PeerGrantError::Timeout(_) => "timeout",
                    _ => "error",
                };
                self.metrics.remote_calls.inc(&[("op", op), ("outcome", outcome)]);
                tracing::warn!(
                    peer = %target.endpoint(),
                    op,
                    object_id,
                    error = %e,
                    "remote call failed"
                );
                Err(e)
            }
        }
    }

    /// Read every instance of `object_id`. A device without any instance may
    /// answer 4.04; that is reported as an empty object.
    pub async fn read_object(&self, target: &Registration, object_id: u16) -> Result<Object> {
        match self.call(target, DownlinkRequest::Read { object_id }).await {
            Ok(resp) => resp.into_object().ok_or_else(|| {
                PeerGrantError::Transport(format!("read of /{object_id} returned no content"))
            }),
            Err(PeerGrantError::UnexpectedResponse { code: ResponseCode::NotFound, .. }) => {
                Ok(Object::empty(object_id))
            }
            Err(e) => Err(e),
        }
    }

    /// Create several instances in one call.
    pub async fn create_instances(
        &self,
        target: &Registration,
        object_id: u16,
        instances: Vec<ObjectInstance>,
    ) -> Result<DownlinkResponse> {
        self.call(target, DownlinkRequest::Create { object_id, instances }).await
    }

    /// Create one instance and return its path: the explicit id when one was
    /// given, else the location the device reported.
    pub async fn create_instance(
        &self,
        target: &Registration,
        object_id: u16,
        instance: ObjectInstance,
    ) -> Result<ObjectPath> {
        let explicit = instance.id;
        let resp = self.create_instances(target, object_id, vec![instance]).await?;
        if let Some(id) = explicit {
            return Ok(ObjectPath::instance(object_id, id));
        }
        match resp.created_instance()? {
            Some(path) if path.object_id == object_id => Ok(path),
            Some(path) => Err(PeerGrantError::Transport(format!(
                "create on /{object_id} reported location {path}"
            ))),
            None => Err(PeerGrantError::Transport(format!(
                "create on /{object_id} returned no location"
            ))),
        }
    }

    pub async fn write_update(
        &self,
        target: &Registration,
        object_id: u16,
        instance_id: u16,
        resources: Vec<Resource>,
    ) -> Result<()> {
        self.call(target, DownlinkRequest::WriteUpdate { object_id, instance_id, resources })
            .await
            .map(|_| ())
    }

    pub async fn delete_instance(
        &self,
        target: &Registration,
        object_id: u16,
        instance_id: u16,
    ) -> Result<()> {
        self.call(target, DownlinkRequest::Delete { object_id, instance_id })
            .await
            .map(|_| ())
    }
}
