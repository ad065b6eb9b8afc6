//! Requests the broker sends to registered devices, and their responses.

use crate::error::{PeerGrantError, ResponseCode, Result};
use crate::grant::ObjectPath;
use crate::model::{Object, ObjectInstance, Resource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownlinkRequest {
    /// Read every instance of an object.
    Read { object_id: u16 },
    /// Create one or more instances of an object in a single call.
    Create { object_id: u16, instances: Vec<ObjectInstance> },
    /// Partial update (write in UPDATE mode) of one instance.
    WriteUpdate { object_id: u16, instance_id: u16, resources: Vec<Resource> },
    Delete { object_id: u16, instance_id: u16 },
}

impl DownlinkRequest {
    /// Operation name used in logs and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            DownlinkRequest::Read { .. } => "read",
            DownlinkRequest::Create { .. } => "create",
            DownlinkRequest::WriteUpdate { .. } => "write",
            DownlinkRequest::Delete { .. } => "delete",
        }
    }

    pub fn object_id(&self) -> u16 {
        match self {
            DownlinkRequest::Read { object_id }
            | DownlinkRequest::Create { object_id, .. }
            | DownlinkRequest::WriteUpdate { object_id, .. }
            | DownlinkRequest::Delete { object_id, .. } => *object_id,
        }
    }

    /// True for requests that change device state.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, DownlinkRequest::Read { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownlinkResponse {
    code: ResponseCode,
    content: Option<Object>,
    location: Option<String>,
    error_message: Option<String>,
}

impl DownlinkResponse {
    pub fn content(object: Object) -> Self {
        Self {
            code: ResponseCode::Content,
            content: Some(object),
            location: None,
            error_message: None,
        }
    }

    pub fn created(location: Option<String>) -> Self {
        Self {
            code: ResponseCode::Created,
            content: None,
            location,
            error_message: None,
        }
    }

    pub fn changed() -> Self {
        Self::with_code(ResponseCode::Changed)
    }

    pub fn deleted() -> Self {
        Self::with_code(ResponseCode::Deleted)
    }

    pub fn failure(code: ResponseCode, message: Option<String>) -> Self {
        Self {
            code,
            content: None,
            location: None,
            error_message: message,
        }
    }

    fn with_code(code: ResponseCode) -> Self {
        Self {
            code,
            content: None,
            location: None,
            error_message: None,
        }
    }

    pub fn code(&self) -> ResponseCode {
        self.code
    }

    pub fn is_success(&self) -> bool {
        self.code.is_success()
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    pub fn object(&self) -> Option<&Object> {
        self.content.as_ref()
    }

    pub fn into_object(self) -> Option<Object> {
        self.content
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Instance path from the `Location-Path` of a create response.
    pub fn created_instance(&self) -> Result<Option<ObjectPath>> {
        let Some(loc) = self.location() else {
            return Ok(None);
        };
        let path = ObjectPath::parse(loc)
            .map_err(|_| PeerGrantError::Transport(format!("invalid create location: {loc}")))?;
        if path.instance_id.is_none() {
            return Err(PeerGrantError::Transport(format!(
                "create location names no instance: {loc}"
            )));
        }
        Ok(Some(path))
    }
}
