//! Per-device serialization of provisioning.
//!
//! The registry scan and the following create are a check-then-act sequence
//! on the device. Two authorizations touching the same device run one after
//! the other; unrelated devices proceed in parallel.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Default)]
pub struct HostLocks {
    // TODO: evict entries for deregistered endpoints; the table only grows.
    map: DashMap<String, Arc<Mutex<()>>>,
}

/// Holds every lock taken by one `acquire` call until dropped.
pub struct HostGuard {
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl HostLocks {
    pub fn new() -> Self {
        Self { map: DashMap::new() }
    }

    /// Lock every endpoint in `endpoints`. Locks are taken in sorted order so
    /// two callers with overlapping sets cannot deadlock.
    pub async fn acquire(&self, endpoints: &[&str]) -> HostGuard {
        let mut keys: Vec<&str> = endpoints.to_vec();
        keys.sort_unstable();
        keys.dedup();

        let mut guards = Vec::with_capacity(keys.len());
        for key in keys {
            let lock = self
                .map
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value()
                .clone();
            guards.push(lock.lock_owned().await);
        }
        HostGuard { _guards: guards }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
