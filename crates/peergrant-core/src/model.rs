//! Typed LwM2M resource tree used for downlink reads and writes.
//!
//! Only the shapes the broker needs are modelled: single and multiple
//! resources with a handful of value types, grouped into object instances.

use std::collections::BTreeMap;

use crate::grant::ObjectPath;

/// Object link value (`objlnk` type): `object_id:instance_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectLink {
    pub object_id: u16,
    pub instance_id: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceValue {
    Integer(i64),
    Boolean(bool),
    String(String),
    Opaque(Vec<u8>),
    ObjectLink(ObjectLink),
}

impl ResourceValue {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ResourceValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ResourceValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object_link(&self) -> Option<ObjectLink> {
        match self {
            ResourceValue::ObjectLink(l) => Some(*l),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Single { id: u16, value: ResourceValue },
    Multiple { id: u16, values: BTreeMap<u16, ResourceValue> },
}

impl Resource {
    pub fn integer(id: u16, v: i64) -> Self {
        Resource::Single {
            id,
            value: ResourceValue::Integer(v),
        }
    }

    pub fn boolean(id: u16, v: bool) -> Self {
        Resource::Single {
            id,
            value: ResourceValue::Boolean(v),
        }
    }

    pub fn string(id: u16, v: impl Into<String>) -> Self {
        Resource::Single {
            id,
            value: ResourceValue::String(v.into()),
        }
    }

    pub fn opaque(id: u16, v: impl Into<Vec<u8>>) -> Self {
        Resource::Single {
            id,
            value: ResourceValue::Opaque(v.into()),
        }
    }

    pub fn object_link(id: u16, object_id: u16, instance_id: u16) -> Self {
        Resource::Single {
            id,
            value: ResourceValue::ObjectLink(ObjectLink { object_id, instance_id }),
        }
    }

    pub fn multiple(id: u16, values: BTreeMap<u16, ResourceValue>) -> Self {
        Resource::Multiple { id, values }
    }

    pub fn id(&self) -> u16 {
        match self {
            Resource::Single { id, .. } | Resource::Multiple { id, .. } => *id,
        }
    }

    /// Value of a single resource; `None` for multiple resources.
    pub fn value(&self) -> Option<&ResourceValue> {
        match self {
            Resource::Single { value, .. } => Some(value),
            Resource::Multiple { .. } => None,
        }
    }
}

/// One object instance. `id` is `None` when the device should pick it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObjectInstance {
    pub id: Option<u16>,
    pub resources: BTreeMap<u16, Resource>,
}

impl ObjectInstance {
    pub fn new(id: Option<u16>, resources: impl IntoIterator<Item = Resource>) -> Self {
        Self {
            id,
            resources: resources.into_iter().map(|r| (r.id(), r)).collect(),
        }
    }

    pub fn resource(&self, id: u16) -> Option<&Resource> {
        self.resources.get(&id)
    }

    /// Single-valued resource, if present.
    pub fn value(&self, id: u16) -> Option<&ResourceValue> {
        self.resource(id).and_then(Resource::value)
    }
}

/// Object content returned by a read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    pub id: u16,
    pub instances: BTreeMap<u16, ObjectInstance>,
}

impl Object {
    pub fn new(id: u16, instances: impl IntoIterator<Item = (u16, ObjectInstance)>) -> Self {
        Self {
            id,
            instances: instances.into_iter().collect(),
        }
    }

    pub fn empty(id: u16) -> Self {
        Self { id, instances: BTreeMap::new() }
    }

    pub fn instance_path(&self, instance_id: u16) -> ObjectPath {
        ObjectPath::instance(self.id, instance_id)
    }
}
