#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use std::net::SocketAddr;

use bytes::Bytes;

use peergrant_core::error::ResponseCode;
use peergrant_core::protocol::ids;
use peergrant_core::request::Identity;
use peergrant_server::transport::codec::{
    parse_host, HostTarget, InboundRequest, MessageType, Method,
};
use peergrant_server::AuthResource;

use common::{addr, requester_addr, Fixture, HOST, REQUESTER};

// {[3, 0]: READ|WRITE}
const GRANT_3_0_RW: &str = "a182030003";

fn post(query: &[&str], payload_hex: &str) -> InboundRequest {
    InboundRequest {
        method: Method::Post,
        message_type: MessageType::Confirmable,
        uri_query: query.iter().map(|s| s.to_string()).collect(),
        payload: Bytes::from(hex::decode(payload_hex).unwrap()),
        source: Identity::unsecure(requester_addr()),
    }
}

fn resource(fx: &Fixture) -> AuthResource {
    AuthResource::new(fx.state.clone())
}

#[tokio::test]
async fn get_describes_endpoint() {
    let fx = Fixture::new();
    let mut req = post(&[], "");
    req.method = Method::Get;

    let resp = resource(&fx).handle(req).await;
    assert_eq!(resp.code, ResponseCode::Content);
    assert_eq!(resp.payload.as_deref(), Some(AuthResource::DESCRIPTION));
    assert_eq!(AuthResource::NAME, "ac");
    assert_eq!(AuthResource::RESOURCE_TYPE, "lwm2m.auth");
}

#[tokio::test]
async fn other_methods_not_allowed() {
    let fx = Fixture::new();
    let mut req = post(&["h=coap://dev-b"], GRANT_3_0_RW);
    req.method = Method::Put;

    let resp = resource(&fx).handle(req).await;
    assert_eq!(resp.code, ResponseCode::MethodNotAllowed);
}

#[tokio::test]
async fn post_grants_access() {
    let fx = Fixture::new();
    fx.net.seed_client(HOST, 0, 5, REQUESTER);

    let resp = resource(&fx).handle(post(&["h=coap://dev-b"], GRANT_3_0_RW)).await;
    assert_eq!(resp.code, ResponseCode::Created);
    assert_eq!(resp.payload, None);
    assert_eq!(fx.net.instances(HOST, ids::CLIENT_ACL_OBJECT_ID).len(), 1);
}

#[tokio::test]
async fn post_with_credentials_flag_provisions() {
    let fx = Fixture::new();

    let resp = resource(&fx).handle(post(&["h=coap://dev-b:5683", "c"], GRANT_3_0_RW)).await;
    assert_eq!(resp.code, ResponseCode::Created);
    assert_eq!(fx.client_entries(HOST), vec![(1, REQUESTER.to_string())]);
}

#[tokio::test]
async fn host_by_address_is_resolved() {
    let fx = Fixture::new();
    fx.net.seed_client(HOST, 0, 5, REQUESTER);

    let query = format!("h=coap://{}", addr(2));
    let resp = resource(&fx).handle(post(&[query.as_str()], GRANT_3_0_RW)).await;
    assert_eq!(resp.code, ResponseCode::Created);
}

#[tokio::test]
async fn unregistered_host_address_is_bad_request() {
    let fx = Fixture::new();
    let query = format!("h=coap://{}", addr(42));
    let resp = resource(&fx).handle(post(&[query.as_str()], GRANT_3_0_RW)).await;
    assert_eq!(resp.code, ResponseCode::BadRequest);
    assert!(fx.net.sent().is_empty());
}

#[tokio::test]
async fn non_confirmable_is_bad_request() {
    let fx = Fixture::new();
    let mut req = post(&["h=coap://dev-b"], GRANT_3_0_RW);
    req.message_type = MessageType::NonConfirmable;

    let resp = resource(&fx).handle(req).await;
    assert_eq!(resp.code, ResponseCode::BadRequest);
    assert_eq!(resp.payload.as_deref(), Some("CON CoAP type expected"));
}

#[tokio::test]
async fn missing_host_is_bad_request() {
    let fx = Fixture::new();
    let resp = resource(&fx).handle(post(&["c"], GRANT_3_0_RW)).await;
    assert_eq!(resp.code, ResponseCode::BadRequest);
    assert_eq!(fx.state.metrics().decode_errors.get(&[]), 1);
}

#[tokio::test]
async fn empty_or_malformed_payload_is_bad_request() {
    let fx = Fixture::new();
    let res = resource(&fx);
    let empty = res.handle(post(&["h=coap://dev-b"], "")).await;
    assert_eq!(empty.code, ResponseCode::BadRequest);
    // CBOR array instead of map
    let array = res.handle(post(&["h=coap://dev-b"], "820300")).await;
    assert_eq!(array.code, ResponseCode::BadRequest);
    assert!(fx.net.sent().is_empty());
}

#[tokio::test]
async fn invalid_credentials_flag_is_bad_request() {
    let fx = Fixture::new();
    let resp = resource(&fx).handle(post(&["h=coap://dev-b", "c=maybe"], GRANT_3_0_RW)).await;
    assert_eq!(resp.code, ResponseCode::BadRequest);
}

#[tokio::test]
async fn unrelated_query_params_are_ignored() {
    let fx = Fixture::new();
    fx.net.seed_client(HOST, 0, 5, REQUESTER);

    let resp = resource(&fx)
        .handle(post(&["h=dev-b", "client=x", "ct=40"], GRANT_3_0_RW))
        .await;
    assert_eq!(resp.code, ResponseCode::Created);
    // Neither parameter requested credentials, so only the ACL was written.
    assert!(fx.net.instances(HOST, ids::CLIENT_SECURITY_OBJECT_ID).is_empty());
    assert_eq!(fx.client_entries(HOST), vec![(5, REQUESTER.to_string())]);
    assert_eq!(fx.state.metrics().decode_errors.get(&[]), 0);
}

#[tokio::test]
async fn forbidden_carries_message() {
    let fx = Fixture::new();
    let resp = resource(&fx).handle(post(&["h=coap://dev-b"], GRANT_3_0_RW)).await;
    assert_eq!(resp.code, ResponseCode::Forbidden);
    assert!(resp.payload.unwrap().contains("holds no account"));
}

#[test]
fn host_forms() {
    assert_eq!(parse_host("coap://dev-b").unwrap(), HostTarget::Endpoint("dev-b".into()));
    assert_eq!(parse_host("coaps://dev-b:5684/x").unwrap(), HostTarget::Endpoint("dev-b".into()));
    assert_eq!(parse_host("dev-b").unwrap(), HostTarget::Endpoint("dev-b".into()));

    let v4: SocketAddr = "10.0.0.2:5683".parse().unwrap();
    assert_eq!(parse_host("coap://10.0.0.2:5683").unwrap(), HostTarget::Address(v4));
    let v6: SocketAddr = "[::1]:5683".parse().unwrap();
    assert_eq!(parse_host("coap://[::1]:5683").unwrap(), HostTarget::Address(v6));

    assert!(parse_host("coap://").is_err());
    assert!(parse_host("coap://dev-b:port").is_err());
    assert!(parse_host("coap://[::1]").is_err());
}
