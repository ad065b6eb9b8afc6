//! Decode-once codec for inbound authorization requests.
//!
//! - Query `h=<uri>` => host target (endpoint name or socket address)
//! - Query `c`, `c=1`, `c=true` => credentials requested
//! - Any other query parameter is ignored
//! - Payload => ordered grants (CBOR)

use std::net::SocketAddr;

use bytes::Bytes;

use peergrant_core::{
    error::{PeerGrantError, Result},
    grant::AccessGrant,
    protocol::payload,
    request::Identity,
};

pub const QUERY_PARAM_HOST: &str = "h=";
pub const QUERY_PARAM_CREDENTIALS: &str = "c";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Confirmable,
    NonConfirmable,
    Acknowledgement,
    Reset,
}

/// One request as handed over by the CoAP stack.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    pub message_type: MessageType,
    pub uri_query: Vec<String>,
    pub payload: Bytes,
    pub source: Identity,
}

/// How the `h=` parameter names the host device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostTarget {
    Endpoint(String),
    Address(SocketAddr),
}

#[derive(Debug)]
pub struct DecodedAuth {
    pub host: HostTarget,
    pub credentials_requested: bool,
    pub grants: Vec<AccessGrant>,
}

pub fn decode(req: &InboundRequest) -> Result<DecodedAuth> {
    let mut host = None;
    let mut credentials_requested = false;

    for param in &req.uri_query {
        if let Some(raw) = param.strip_prefix(QUERY_PARAM_HOST) {
            if host.is_some() {
                return Err(PeerGrantError::BadRequest("host given more than once".into()));
            }
            host = Some(parse_host(raw)?);
        } else if let Some(flag) = credentials_flag(param) {
            credentials_requested = match flag {
                None | Some("1") | Some("true") => true,
                Some("0") | Some("false") => false,
                Some(other) => {
                    return Err(PeerGrantError::BadRequest(format!(
                        "invalid credentials flag: c={other}"
                    )))
                }
            };
        }
    }

    let host = host.ok_or_else(|| {
        PeerGrantError::BadRequest("host is mandatory in authorization requests".into())
    })?;

    if req.payload.is_empty() {
        return Err(PeerGrantError::BadRequest("request with no payload".into()));
    }
    let grants = payload::decode_grants(&req.payload)?;

    Ok(DecodedAuth { host, credentials_requested, grants })
}

/// `Some(None)` for a bare `c`, `Some(Some(v))` for `c=v`. Any other
/// parameter, including ones that merely start with `c`, is not the flag.
fn credentials_flag(param: &str) -> Option<Option<&str>> {
    let rest = param.strip_prefix(QUERY_PARAM_CREDENTIALS)?;
    if rest.is_empty() {
        return Some(None);
    }
    rest.strip_prefix('=').map(Some)
}

/// Parse `[scheme://]host[:port][/path]`.
///
/// An IP literal with a port names a device by address; anything else names
/// it by endpoint, with any port ignored.
pub fn parse_host(raw: &str) -> Result<HostTarget> {
    let rest = raw.split_once("://").map_or(raw, |(_, r)| r);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if authority.is_empty() {
        return Err(PeerGrantError::BadRequest(format!("could not parse host: {raw}")));
    }

    if let Ok(addr) = authority.parse::<SocketAddr>() {
        return Ok(HostTarget::Address(addr));
    }
    if authority.starts_with('[') {
        return Err(PeerGrantError::BadRequest(format!("could not parse host: {raw}")));
    }

    let name = match authority.rsplit_once(':') {
        Some((name, port)) => {
            port.parse::<u16>().map_err(|_| {
                PeerGrantError::BadRequest(format!("could not parse host port: {raw}"))
            })?;
            name
        }
        None => authority,
    };
    if name.is_empty() {
        return Err(PeerGrantError::BadRequest(format!("could not parse host: {raw}")));
    }
    Ok(HostTarget::Endpoint(name.to_string()))
}
