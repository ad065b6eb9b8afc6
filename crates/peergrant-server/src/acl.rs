//! Access control programming on the host device.

use std::collections::BTreeMap;

use peergrant_core::error::Result;
use peergrant_core::grant::{Access, AccessGrant};
use peergrant_core::model::{ObjectInstance, Resource, ResourceValue};
use peergrant_core::protocol::ids::{self, acl};

use crate::directory::Registration;
use crate::peer::{PeerClient, ShortId};

/// One row of the client access control object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessControlEntry {
    /// Local instance id, sequential from 0 in grant order.
    pub entry_id: u16,
    pub object_id: u16,
    /// `None` targets the whole object.
    pub instance_id: Option<u16>,
    pub owner: u16,
    pub acl: BTreeMap<ShortId, Access>,
}

impl AccessControlEntry {
    pub fn to_instance(&self) -> ObjectInstance {
        let acl_values = self
            .acl
            .iter()
            .map(|(id, access)| (id.get(), ResourceValue::Integer(i64::from(access.bits()))))
            .collect();

        let mut resources = vec![
            Resource::integer(acl::OBJECT_ID, i64::from(self.object_id)),
            Resource::multiple(acl::ACL, acl_values),
            Resource::integer(acl::OWNER, i64::from(self.owner)),
        ];
        if let Some(instance_id) = self.instance_id {
            resources.push(Resource::integer(acl::OBJECT_INSTANCE_ID, i64::from(instance_id)));
        }
        ObjectInstance::new(Some(self.entry_id), resources)
    }
}

/// One entry per grant for `short_id`.
///
/// Grants carrying read, write, execute or delete without an instance id are
/// dropped; only create/discover may target a whole object. Dropping every
/// grant is not an error.
pub fn build_entries(
    grants: &[AccessGrant],
    short_id: ShortId,
    owner: u16,
) -> Vec<AccessControlEntry> {
    grants
        .iter()
        .filter(|g| {
            let skip = g.lacks_required_instance();
            if skip {
                tracing::debug!(
                    path = %g.path(),
                    access = %g.access(),
                    "grant needs an instance, skipped"
                );
            }
            !skip
        })
        .zip(0u16..)
        .map(|(g, entry_id)| AccessControlEntry {
            entry_id,
            object_id: g.path().object_id,
            instance_id: g.path().instance_id,
            owner,
            acl: BTreeMap::from([(short_id, g.access())]),
        })
        .collect()
}

/// Write all entries to the host in one create call. An empty set sends
/// nothing and returns 0.
pub async fn commit(
    peer: &PeerClient,
    host: &Registration,
    entries: &[AccessControlEntry],
) -> Result<usize> {
    if entries.is_empty() {
        tracing::info!(host = %host.endpoint(), "no access control entries to write");
        return Ok(0);
    }

    let instances = entries.iter().map(AccessControlEntry::to_instance).collect();
    peer.create_instances(host, ids::CLIENT_ACL_OBJECT_ID, instances).await?;

    tracing::debug!(
        host = %host.endpoint(),
        entries = entries.len(),
        "access control entries written"
    );
    Ok(entries.len())
}
