//! Access grants: an object path plus a permission bitmask.

use std::fmt;
use std::ops::BitOr;

use serde_cbor::Value;

use crate::error::{PeerGrantError, Result};

/// Permission bitmask over the six LwM2M access rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Access(u16);

impl Access {
    pub const NONE: Access = Access(0);
    pub const READ: Access = Access(1 << 0);
    pub const WRITE: Access = Access(1 << 1);
    pub const EXECUTE: Access = Access(1 << 2);
    pub const DELETE: Access = Access(1 << 3);
    pub const CREATE: Access = Access(1 << 4);
    pub const DISCOVER: Access = Access(1 << 5);

    /// Every defined right; higher bits carry no meaning.
    pub const ALL: Access = Access(0b11_1111);

    /// Bits that only make sense against a concrete object instance.
    pub const INSTANCE_SCOPED: Access = Access(0b1111);

    pub const fn from_bits(bits: u16) -> Self {
        Access(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    /// True if every bit of `other` is set.
    pub const fn contains(self, other: Access) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if any bit of `other` is set.
    pub const fn intersects(self, other: Access) -> bool {
        self.0 & other.0 != 0
    }

    /// Read, write, execute and delete require an instance id.
    pub const fn requires_instance(self) -> bool {
        self.intersects(Self::INSTANCE_SCOPED)
    }
}

impl BitOr for Access {
    type Output = Access;

    fn bitor(self, rhs: Access) -> Access {
        Access(self.0 | rhs.0)
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(Access, &str); 6] = [
            (Access::READ, "READ"),
            (Access::WRITE, "WRITE"),
            (Access::EXECUTE, "EXECUTE"),
            (Access::DELETE, "DELETE"),
            (Access::CREATE, "CREATE"),
            (Access::DISCOVER, "DISCOVER"),
        ];
        let set: Vec<&str> = NAMES
            .iter()
            .filter(|(a, _)| self.contains(*a))
            .map(|(_, n)| *n)
            .collect();
        if set.is_empty() {
            write!(f, "NONE")
        } else {
            write!(f, "{}", set.join("|"))
        }
    }
}

/// Object or object-instance path (`/3` or `/3/0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectPath {
    pub object_id: u16,
    pub instance_id: Option<u16>,
}

impl ObjectPath {
    pub fn object(object_id: u16) -> Self {
        Self { object_id, instance_id: None }
    }

    pub fn instance(object_id: u16, instance_id: u16) -> Self {
        Self { object_id, instance_id: Some(instance_id) }
    }

    /// Path ids in wire order.
    pub fn ids(&self) -> Vec<u16> {
        match self.instance_id {
            Some(i) => vec![self.object_id, i],
            None => vec![self.object_id],
        }
    }

    /// Parse a canonical path or a create location (`/21/4`).
    ///
    /// Resource-level paths are rejected: grants and locations never go
    /// deeper than an instance.
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.strip_prefix('/').unwrap_or(s);
        let segments: Vec<&str> = trimmed.split('/').filter(|p| !p.is_empty()).collect();
        let parse_id = |seg: &str| {
            seg.parse::<u16>()
                .map_err(|_| PeerGrantError::BadRequest(format!("invalid path segment: {seg}")))
        };
        match segments.as_slice() {
            [obj] => Ok(Self::object(parse_id(obj)?)),
            [obj, inst] => Ok(Self::instance(parse_id(obj)?, parse_id(inst)?)),
            _ => Err(PeerGrantError::BadRequest(format!("invalid object path: {s}"))),
        }
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.instance_id {
            Some(i) => write!(f, "/{}/{}", self.object_id, i),
            None => write!(f, "/{}", self.object_id),
        }
    }
}

/// One requested permission set over one object or object instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccessGrant {
    path: ObjectPath,
    access: Access,
}

impl AccessGrant {
    pub fn new(path: ObjectPath, access: Access) -> Self {
        Self { path, access }
    }

    /// Build a grant from its decoded CBOR key (`[obj]` or `[obj, inst]`) and
    /// mask value.
    pub fn from_cbor(id: &Value, mask: &Value) -> Result<Self> {
        let Value::Array(values) = id else {
            return Err(PeerGrantError::BadRequest("grant id must be an array".into()));
        };
        if values.len() != 1 && values.len() != 2 {
            return Err(PeerGrantError::BadRequest(format!(
                "grant id must hold 1 or 2 integers, got {}",
                values.len()
            )));
        }

        let mut ids = Vec::with_capacity(2);
        for v in values {
            let Value::Integer(n) = v else {
                return Err(PeerGrantError::BadRequest(
                    "grant id must be an array of integers".into(),
                ));
            };
            let id = u16::try_from(*n)
                .map_err(|_| PeerGrantError::BadRequest(format!("grant id out of range: {n}")))?;
            ids.push(id);
        }

        let Value::Integer(m) = mask else {
            return Err(PeerGrantError::BadRequest("grant mask must be an integer".into()));
        };
        let bits = u16::try_from(*m)
            .ok()
            .filter(|b| b & !Access::ALL.bits() == 0)
            .ok_or_else(|| PeerGrantError::BadRequest(format!("grant mask out of range: {m}")))?;

        let path = match ids.as_slice() {
            [obj] => ObjectPath::object(*obj),
            [obj, inst] => ObjectPath::instance(*obj, *inst),
            _ => return Err(PeerGrantError::Internal("grant id arity".into())),
        };

        Ok(Self::new(path, Access::from_bits(bits)))
    }

    pub fn path(&self) -> ObjectPath {
        self.path
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn has_read(&self) -> bool {
        self.access.contains(Access::READ)
    }

    pub fn has_write(&self) -> bool {
        self.access.contains(Access::WRITE)
    }

    pub fn has_execute(&self) -> bool {
        self.access.contains(Access::EXECUTE)
    }

    pub fn has_delete(&self) -> bool {
        self.access.contains(Access::DELETE)
    }

    pub fn has_create(&self) -> bool {
        self.access.contains(Access::CREATE)
    }

    pub fn has_discover(&self) -> bool {
        self.access.contains(Access::DISCOVER)
    }

    /// A whole-object grant carrying instance-scoped rights cannot become an
    /// access-control entry.
    pub fn lacks_required_instance(&self) -> bool {
        self.path.instance_id.is_none() && self.access.requires_instance()
    }
}
