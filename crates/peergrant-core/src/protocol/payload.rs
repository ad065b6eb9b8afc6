//! CBOR grant payload (`{ [obj, inst?]: mask, ... }`), panic-free.
//!
//! Entry order is part of the contract: it drives access-control entry
//! numbering on the host, so the map is walked in wire order instead of being
//! collected into a sorted map.

use std::fmt;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_cbor::Value;

use crate::error::{PeerGrantError, Result};
use crate::grant::AccessGrant;

/// Map entries in the order they appear on the wire.
struct OrderedEntries(Vec<(Value, Value)>);

struct OrderedEntriesVisitor;

impl<'de> Visitor<'de> for OrderedEntriesVisitor {
    type Value = OrderedEntries;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of object paths to access masks")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0).min(64));
        while let Some((k, v)) = map.next_entry::<Value, Value>()? {
            entries.push((k, v));
        }
        Ok(OrderedEntries(entries))
    }
}

impl<'de> Deserialize<'de> for OrderedEntries {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(OrderedEntriesVisitor)
    }
}

/// Decode a grant payload. Duplicate paths are rejected.
pub fn decode_grants(buf: &[u8]) -> Result<Vec<AccessGrant>> {
    let OrderedEntries(entries) = serde_cbor::from_slice(buf)
        .map_err(|e| PeerGrantError::BadRequest(format!("invalid grant payload: {e}")))?;

    let mut grants: Vec<AccessGrant> = Vec::with_capacity(entries.len());
    for (id, mask) in &entries {
        let grant = AccessGrant::from_cbor(id, mask)?;
        if grants.iter().any(|g| g.path() == grant.path()) {
            return Err(PeerGrantError::BadRequest(format!(
                "duplicate grant path: {}",
                grant.path()
            )));
        }
        grants.push(grant);
    }

    tracing::trace!(count = grants.len(), "decoded grant payload");
    Ok(grants)
}

struct OrderedGrants<'a>(&'a [AccessGrant]);

impl Serialize for OrderedGrants<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for g in self.0 {
            map.serialize_entry(&g.path().ids(), &g.access().bits())?;
        }
        map.end()
    }
}

/// Encode grants in the given order.
pub fn encode_grants(grants: &[AccessGrant]) -> Result<Vec<u8>> {
    serde_cbor::to_vec(&OrderedGrants(grants))
        .map_err(|e| PeerGrantError::Internal(format!("grant payload encode failed: {e}")))
}
