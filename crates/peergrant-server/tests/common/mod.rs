#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

//! In-memory device network for integration tests.
//!
//! Every registered endpoint gets an object store that answers reads,
//! creates, updates and deletes the way an LwM2M client would. All requests
//! are recorded, and failures can be injected per endpoint and operation.

use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use peergrant_core::error::{PeerGrantError, ResponseCode, Result};
use peergrant_core::model::{Object, ObjectInstance, Resource};
use peergrant_core::protocol::downlink::{DownlinkRequest, DownlinkResponse};
use peergrant_core::protocol::ids;
use peergrant_server::config::{self, ServerConfig};
use peergrant_server::peer::{account, ShortId};
use peergrant_server::{AppState, InMemoryDirectory, Registration, RequestSender};

type Store = BTreeMap<u16, BTreeMap<u16, ObjectInstance>>;

#[derive(Debug, Clone, Copy)]
enum FaultKind {
    Respond(ResponseCode),
    Timeout,
    /// Never answer, ignoring the timeout handed to the sender.
    Hang,
}

#[derive(Debug, Clone)]
struct Fault {
    endpoint: String,
    op: &'static str,
    object_id: u16,
    kind: FaultKind,
}

#[derive(Default)]
pub struct SimNetwork {
    stores: Mutex<HashMap<String, Store>>,
    sent: Mutex<Vec<(String, DownlinkRequest)>>,
    faults: Mutex<Vec<Fault>>,
    latency: Option<Duration>,
}

impl SimNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request sleeps this long before it is applied, so concurrent
    /// authorizations interleave.
    pub fn with_latency(latency: Duration) -> Self {
        Self { latency: Some(latency), ..Self::default() }
    }

    /// Make `object_id` exist (empty) on `endpoint`.
    pub fn add_object(&self, endpoint: &str, object_id: u16) {
        self.stores
            .lock()
            .unwrap()
            .entry(endpoint.to_string())
            .or_default()
            .entry(object_id)
            .or_default();
    }

    pub fn put_instance(
        &self,
        endpoint: &str,
        object_id: u16,
        instance_id: u16,
        mut inst: ObjectInstance,
    ) {
        inst.id = Some(instance_id);
        self.stores
            .lock()
            .unwrap()
            .entry(endpoint.to_string())
            .or_default()
            .entry(object_id)
            .or_default()
            .insert(instance_id, inst);
    }

    /// Seed a client registry entry naming `peer` with `short_id`.
    pub fn seed_client(&self, endpoint: &str, instance_id: u16, short_id: u16, peer: &str) {
        let sid = ShortId::new(i64::from(short_id)).unwrap();
        self.put_instance(
            endpoint,
            ids::CLIENT_OBJECT_ID,
            instance_id,
            account::client_instance(sid, peer),
        );
    }

    pub fn instances(&self, endpoint: &str, object_id: u16) -> BTreeMap<u16, ObjectInstance> {
        self.stores
            .lock()
            .unwrap()
            .get(endpoint)
            .and_then(|s| s.get(&object_id))
            .cloned()
            .unwrap_or_default()
    }

    /// Make every matching request fail. `code: None` simulates a transport
    /// error instead of a failure response.
    pub fn fail(
        &self,
        endpoint: &str,
        op: &'static str,
        object_id: u16,
        code: Option<ResponseCode>,
    ) {
        let kind = code.map_or(FaultKind::Timeout, FaultKind::Respond);
        self.add_fault(endpoint, op, object_id, kind);
    }

    /// Make every matching request wait forever.
    pub fn hang(&self, endpoint: &str, op: &'static str, object_id: u16) {
        self.add_fault(endpoint, op, object_id, FaultKind::Hang);
    }

    pub fn clear_faults(&self) {
        self.faults.lock().unwrap().clear();
    }

    fn add_fault(&self, endpoint: &str, op: &'static str, object_id: u16, kind: FaultKind) {
        self.faults.lock().unwrap().push(Fault {
            endpoint: endpoint.to_string(),
            op,
            object_id,
            kind,
        });
    }

    pub fn sent(&self) -> Vec<(String, DownlinkRequest)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, endpoint: &str) -> Vec<DownlinkRequest> {
        self.sent()
            .into_iter()
            .filter(|(ep, _)| ep == endpoint)
            .map(|(_, r)| r)
            .collect()
    }

    pub fn mutations(&self) -> usize {
        self.sent().iter().filter(|(_, r)| r.is_mutation()).count()
    }

    fn fault_for(&self, endpoint: &str, req: &DownlinkRequest) -> Option<Fault> {
        self.faults
            .lock()
            .unwrap()
            .iter()
            .find(|f| {
                f.endpoint == endpoint && f.op == req.kind() && f.object_id == req.object_id()
            })
            .cloned()
    }

    fn apply(&self, endpoint: &str, req: DownlinkRequest) -> DownlinkResponse {
        let mut stores = self.stores.lock().unwrap();
        let store = stores.entry(endpoint.to_string()).or_default();

        match req {
            DownlinkRequest::Read { object_id } => match store.get(&object_id) {
                Some(instances) => DownlinkResponse::content(Object::new(
                    object_id,
                    instances.iter().map(|(k, v)| (*k, v.clone())),
                )),
                None => DownlinkResponse::failure(ResponseCode::NotFound, None),
            },
            DownlinkRequest::Create { object_id, instances } => {
                let object = store.entry(object_id).or_default();
                let mut last = None;
                for mut inst in instances {
                    let id = inst
                        .id
                        .unwrap_or_else(|| object.keys().next_back().map_or(0, |k| k + 1));
                    inst.id = Some(id);
                    object.insert(id, inst);
                    last = Some(id);
                }
                DownlinkResponse::created(last.map(|id| format!("/{object_id}/{id}")))
            }
            DownlinkRequest::WriteUpdate { object_id, instance_id, resources } => {
                match store.get_mut(&object_id).and_then(|o| o.get_mut(&instance_id)) {
                    Some(inst) => {
                        for r in resources {
                            inst.resources.insert(r.id(), r);
                        }
                        DownlinkResponse::changed()
                    }
                    None => DownlinkResponse::failure(ResponseCode::NotFound, None),
                }
            }
            DownlinkRequest::Delete { object_id, instance_id } => {
                match store.get_mut(&object_id).and_then(|o| o.remove(&instance_id)) {
                    Some(_) => DownlinkResponse::deleted(),
                    None => DownlinkResponse::failure(ResponseCode::NotFound, None),
                }
            }
        }
    }
}

#[async_trait]
impl RequestSender for SimNetwork {
    async fn send(
        &self,
        target: &Registration,
        request: DownlinkRequest,
        _timeout: Duration,
    ) -> Result<DownlinkResponse> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let endpoint = target.endpoint().to_string();
        self.sent.lock().unwrap().push((endpoint.clone(), request.clone()));

        if let Some(fault) = self.fault_for(&endpoint, &request) {
            return match fault.kind {
                FaultKind::Respond(code) => {
                    Ok(DownlinkResponse::failure(code, Some("injected".into())))
                }
                FaultKind::Timeout => {
                    Err(PeerGrantError::Timeout(format!("{} did not answer", endpoint)))
                }
                FaultKind::Hang => std::future::pending().await,
            };
        }
        Ok(self.apply(&endpoint, request))
    }
}

pub const REQUESTER: &str = "dev-a";
pub const HOST: &str = "dev-b";

pub fn addr(last: u8) -> SocketAddr {
    SocketAddr::from(([10, 0, 0, last], 5683))
}

pub fn requester_addr() -> SocketAddr {
    addr(1)
}

pub struct Fixture {
    pub net: Arc<SimNetwork>,
    pub dir: Arc<InMemoryDirectory>,
    pub state: AppState,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    pub fn from_yaml(yaml: &str) -> Self {
        Self::with_config(config::load_from_str(yaml).unwrap())
    }

    pub fn with_config(cfg: ServerConfig) -> Self {
        Self::build(cfg, SimNetwork::new())
    }

    pub fn build(cfg: ServerConfig, net: SimNetwork) -> Self {
        let net = Arc::new(net);
        let dir = Arc::new(InMemoryDirectory::new());
        dir.register(
            Registration::new(REQUESTER, addr(1)).with_links(["/3/0", "/11001", "/11000"]),
        );
        dir.register(
            Registration::new(HOST, addr(2))
                .with_links(["/3", "/3/0", "/5/1", "/11001", "/11002"]),
        );
        net.add_object(HOST, ids::CLIENT_OBJECT_ID);
        net.add_object(REQUESTER, ids::CLIENT_OBJECT_ID);

        let state = AppState::new(cfg, dir.clone(), net.clone()).unwrap();
        Self { net, dir, state }
    }

    /// Advertise OSCORE on both default devices.
    pub fn enable_oscore(&self) {
        self.dir.register(
            Registration::new(REQUESTER, addr(1))
                .with_links(["/3/0", "/11001", "/11000", "/21"]),
        );
        self.dir.register(
            Registration::new(HOST, addr(2))
                .with_links(["/3", "/3/0", "/5/1", "/11001", "/11002", "/21"]),
        );
    }

    pub fn client_entries(&self, endpoint: &str) -> Vec<(u16, String)> {
        self.net
            .instances(endpoint, ids::CLIENT_OBJECT_ID)
            .values()
            .map(|inst| {
                let sid = inst.value(ids::client::SHORT_ID).and_then(|v| v.as_integer()).unwrap();
                let ep = inst.value(ids::client::ENDPOINT).and_then(|v| v.as_str()).unwrap();
                (sid as u16, ep.to_string())
            })
            .collect()
    }

    pub fn resource(
        &self,
        endpoint: &str,
        object_id: u16,
        instance_id: u16,
        resource: u16,
    ) -> Option<Resource> {
        self.net
            .instances(endpoint, object_id)
            .get(&instance_id)
            .and_then(|i| i.resource(resource).cloned())
    }
}
