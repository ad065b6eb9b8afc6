//! Create-or-update of a peer account.
//!
//! An account is a client object entry (endpoint name + short id) plus a
//! client security entry carrying the key material for that short id. OSCORE
//! accounts also get a fresh OSCORE object instance, linked from the security
//! entry.

use peergrant_core::error::{PeerGrantError, Result};
use peergrant_core::model::{ObjectInstance, Resource};
use peergrant_core::protocol::ids::{self, client, oscore, security};

use crate::auth::saga::ProvisionLog;
use crate::credentials::{AccountKeys, OscoreMaterial, PskMaterial};
use crate::directory::Registration;

use super::scan::{find_client, find_security_instance, ScanOutcome};
use super::{PeerClient, ShortId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountOutcome {
    pub short_id: ShortId,
    /// True when the client entry was created by this call.
    pub created: bool,
}

/// Ensure `target` holds an account for `endpoint` with `keys`.
///
/// An existing entry keeps its short id and gets its key material updated in
/// place. Otherwise the next free id is allocated from the same scan and
/// both the client and security entries are created.
pub async fn set_account(
    peer: &PeerClient,
    target: &Registration,
    endpoint: &str,
    keys: &AccountKeys,
    log: &mut ProvisionLog,
) -> Result<AccountOutcome> {
    let scan = find_client(peer, target, endpoint).await?;

    let (short_id, created) = match scan {
        ScanOutcome::Found(id) => (id, false),
        ScanOutcome::NotFound { .. } => {
            let id = scan.next_free().ok_or_else(|| {
                PeerGrantError::Forbidden(format!("no free short id left on {}", target.endpoint()))
            })?;
            let path = peer
                .create_instance(target, ids::CLIENT_OBJECT_ID, client_instance(id, endpoint))
                .await?;
            log.record_created(target, path);
            (id, true)
        }
    };

    tracing::debug!(
        peer = %target.endpoint(),
        endpoint,
        short_id = short_id.get(),
        created,
        scheme = keys.scheme().as_str(),
        "setting peer account"
    );

    let security_update = match keys {
        AccountKeys::Psk(psk) => psk_resources(psk),
        AccountKeys::Oscore(material) => {
            let path = peer
                .create_instance(target, ids::OSCORE_OBJECT_ID, oscore_instance(material))
                .await?;
            log.record_created(target, path);
            let oscore_id = path.instance_id.ok_or_else(|| {
                PeerGrantError::Transport(format!(
                    "OSCORE create on {} named no instance",
                    target.endpoint()
                ))
            })?;
            oscore_link_resources(oscore_id)
        }
    };

    let existing = if created {
        None
    } else {
        find_security_instance(peer, target, short_id).await?
    };

    match existing {
        Some((instance_id, previous)) => {
            let overwritten: Vec<Resource> = security_update
                .iter()
                .filter_map(|r| previous.resource(r.id()).cloned())
                .collect();
            let stale_oscore = previous
                .value(security::OSCORE_SECURITY_MODE)
                .and_then(|v| v.as_object_link())
                .filter(|l| l.object_id == ids::OSCORE_OBJECT_ID);

            peer.write_update(target, ids::CLIENT_SECURITY_OBJECT_ID, instance_id, security_update)
                .await?;
            log.record_overwritten(
                target,
                ids::CLIENT_SECURITY_OBJECT_ID,
                instance_id,
                overwritten,
            );

            if let (Some(link), AccountKeys::Oscore(_)) = (stale_oscore, keys) {
                log.defer_delete(target, link.object_id, link.instance_id);
            }
        }
        None => {
            if !created {
                tracing::warn!(
                    peer = %target.endpoint(),
                    endpoint,
                    short_id = short_id.get(),
                    "client entry has no security entry, recreating it"
                );
            }
            let mut resources = security_update;
            resources.push(Resource::integer(security::SHORT_ID, i64::from(short_id.get())));
            let instance = ObjectInstance::new(None, resources);
            let path = peer
                .create_instance(target, ids::CLIENT_SECURITY_OBJECT_ID, instance)
                .await?;
            log.record_created(target, path);
        }
    }

    Ok(AccountOutcome { short_id, created })
}

/// Short id already allocated to `endpoint` on `target`; creates nothing.
pub async fn lookup_short_id(
    peer: &PeerClient,
    target: &Registration,
    endpoint: &str,
) -> Result<Option<ShortId>> {
    Ok(find_client(peer, target, endpoint).await?.found())
}

pub fn client_instance(short_id: ShortId, endpoint: &str) -> ObjectInstance {
    ObjectInstance::new(
        None,
        [
            Resource::integer(client::SHORT_ID, i64::from(short_id.get())),
            Resource::integer(client::LIFETIME, 0),
            Resource::integer(client::DEFAULT_MIN_PERIOD, 120),
            Resource::integer(client::DEFAULT_MAX_PERIOD, 360),
            Resource::integer(client::DISABLE_TIMEOUT, 120),
            Resource::boolean(client::NOTIFICATION_STORING, false),
            Resource::string(client::BINDING, "U"),
            Resource::string(client::ENDPOINT, endpoint),
        ],
    )
}

pub fn oscore_instance(material: &OscoreMaterial) -> ObjectInstance {
    ObjectInstance::new(
        None,
        [
            Resource::string(oscore::MASTER_SECRET, material.master_secret.as_str()),
            Resource::string(oscore::SENDER_ID, material.sender_id.as_str()),
            Resource::string(oscore::RECIPIENT_ID, material.recipient_id.as_str()),
            Resource::integer(oscore::AEAD_ALGORITHM, oscore::AEAD_AES_CCM_16_64_128),
            Resource::integer(oscore::HMAC_ALGORITHM, oscore::HMAC_SHA256),
            Resource::string(oscore::MASTER_SALT, material.master_salt.as_str()),
        ],
    )
}

fn psk_resources(psk: &PskMaterial) -> Vec<Resource> {
    vec![
        Resource::integer(security::MODE, security::MODE_PSK),
        Resource::opaque(security::PUBLIC_KEY_OR_IDENTITY, psk.identity.as_bytes()),
        Resource::opaque(security::SECRET_KEY, psk.key.as_bytes()),
    ]
}

fn oscore_link_resources(oscore_instance_id: u16) -> Vec<Resource> {
    vec![
        Resource::integer(security::MODE, security::MODE_NOSEC),
        Resource::object_link(
            security::OSCORE_SECURITY_MODE,
            ids::OSCORE_OBJECT_ID,
            oscore_instance_id,
        ),
    ]
}
