//! Registration directory boundary.
//!
//! The broker only reads registrations. `InMemoryDirectory` is the reference
//! implementation used by embedders without their own store and by tests.

use std::net::SocketAddr;

use dashmap::DashMap;

use peergrant_core::grant::ObjectPath;
use peergrant_core::protocol::ids::OSCORE_OBJECT_ID;

/// A registered device as seen by the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    endpoint: String,
    address: SocketAddr,
    object_links: Vec<String>,
}

impl Registration {
    pub fn new(endpoint: impl Into<String>, address: SocketAddr) -> Self {
        Self {
            endpoint: endpoint.into(),
            address,
            object_links: Vec::new(),
        }
    }

    /// Advertised links, e.g. `/3/0`, `/21`.
    pub fn with_links<I, S>(mut self, links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.object_links.extend(links.into_iter().map(Into::into));
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    pub fn object_links(&self) -> &[String] {
        &self.object_links
    }

    /// Exact match against the canonical path form.
    pub fn advertises(&self, path: &ObjectPath) -> bool {
        let p = path.to_string();
        self.object_links.iter().any(|l| *l == p)
    }

    /// An object is supported when any advertised link names it.
    pub fn supports_object(&self, object_id: u16) -> bool {
        self.object_links
            .iter()
            .filter_map(|l| ObjectPath::parse(l).ok())
            .any(|p| p.object_id == object_id)
    }

    pub fn supports_oscore(&self) -> bool {
        self.supports_object(OSCORE_OBJECT_ID)
    }
}

/// Lookup of live registrations. Must be safe for concurrent callers.
pub trait RegistrationDirectory: Send + Sync {
    fn by_address(&self, addr: &SocketAddr) -> Option<Registration>;
    fn by_endpoint(&self, endpoint: &str) -> Option<Registration>;
}

/// Registrations keyed by endpoint, with an address index.
#[derive(Default)]
pub struct InMemoryDirectory {
    by_endpoint: DashMap<String, Registration>,
    address_index: DashMap<SocketAddr, String>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self {
            by_endpoint: DashMap::new(),
            address_index: DashMap::new(),
        }
    }

    /// Insert or replace; a re-registration from a new address drops the old
    /// address mapping.
    pub fn register(&self, reg: Registration) {
        if let Some(old) = self.by_endpoint.get(reg.endpoint()) {
            let old_addr = old.address();
            drop(old);
            self.address_index.remove(&old_addr);
        }
        self.address_index.insert(reg.address(), reg.endpoint().to_string());
        self.by_endpoint.insert(reg.endpoint().to_string(), reg);
    }

    pub fn deregister(&self, endpoint: &str) -> Option<Registration> {
        let (_, reg) = self.by_endpoint.remove(endpoint)?;
        self.address_index.remove(&reg.address());
        Some(reg)
    }

    pub fn len(&self) -> usize {
        self.by_endpoint.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_endpoint.is_empty()
    }
}

impl RegistrationDirectory for InMemoryDirectory {
    fn by_address(&self, addr: &SocketAddr) -> Option<Registration> {
        let ep = self.address_index.get(addr)?.value().clone();
        self.by_endpoint(&ep)
    }

    fn by_endpoint(&self, endpoint: &str) -> Option<Registration> {
        self.by_endpoint.get(endpoint).map(|r| r.value().clone())
    }
}
