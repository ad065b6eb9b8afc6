//! Single-read lookups in a device's client and security registries.

use peergrant_core::error::Result;
use peergrant_core::model::{Object, ObjectInstance};
use peergrant_core::protocol::ids::{self, client, security};

use crate::directory::Registration;

use super::{PeerClient, ShortId};

/// Result of scanning a client registry for one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    Found(ShortId),
    /// `highest_seen` covers every valid entry of the same read; `None` for
    /// an empty registry.
    NotFound { highest_seen: Option<ShortId> },
}

impl ScanOutcome {
    pub fn found(self) -> Option<ShortId> {
        match self {
            ScanOutcome::Found(id) => Some(id),
            ScanOutcome::NotFound { .. } => None,
        }
    }

    /// Id to allocate for a new entry. `None` when the endpoint was found or
    /// the id range is exhausted.
    pub fn next_free(self) -> Option<ShortId> {
        match self {
            ScanOutcome::Found(_) => None,
            ScanOutcome::NotFound { highest_seen: None } => Some(ShortId::MIN),
            ScanOutcome::NotFound { highest_seen: Some(id) } => id.next(),
        }
    }
}

/// Look for `endpoint` in a client registry read.
pub fn scan_registry(registry: &Object, endpoint: &str) -> ScanOutcome {
    let mut highest: Option<ShortId> = None;

    for (instance_id, inst) in &registry.instances {
        let short_id = inst
            .value(client::SHORT_ID)
            .and_then(|v| v.as_integer())
            .and_then(ShortId::new);
        let Some(short_id) = short_id else {
            tracing::warn!(instance_id, "client entry without a valid short id, skipped");
            continue;
        };

        if inst.value(client::ENDPOINT).and_then(|v| v.as_str()) == Some(endpoint) {
            return ScanOutcome::Found(short_id);
        }
        highest = highest.max(Some(short_id));
    }

    ScanOutcome::NotFound { highest_seen: highest }
}

/// Instance of the security object bound to `short_id`, if any.
pub fn security_instance_for(
    security_object: &Object,
    short_id: ShortId,
) -> Option<(u16, &ObjectInstance)> {
    let wanted = i64::from(short_id.get());
    security_object
        .instances
        .iter()
        .find(|(_, inst)| {
            inst.value(security::SHORT_ID).and_then(|v| v.as_integer()) == Some(wanted)
        })
        .map(|(id, inst)| (*id, inst))
}

/// Scan `target`'s client registry for `endpoint` in one remote read.
pub async fn find_client(
    peer: &PeerClient,
    target: &Registration,
    endpoint: &str,
) -> Result<ScanOutcome> {
    let registry = peer.read_object(target, ids::CLIENT_OBJECT_ID).await?;
    let outcome = scan_registry(&registry, endpoint);
    tracing::debug!(
        peer = %target.endpoint(),
        endpoint,
        entries = registry.instances.len(),
        ?outcome,
        "client registry scanned"
    );
    Ok(outcome)
}

/// Locate the security instance holding `short_id`'s credentials, with its
/// current content.
pub async fn find_security_instance(
    peer: &PeerClient,
    target: &Registration,
    short_id: ShortId,
) -> Result<Option<(u16, ObjectInstance)>> {
    let object = peer.read_object(target, ids::CLIENT_SECURITY_OBJECT_ID).await?;
    Ok(security_instance_for(&object, short_id).map(|(id, inst)| (id, inst.clone())))
}
