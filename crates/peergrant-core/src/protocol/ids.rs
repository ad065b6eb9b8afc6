//! Well-known object and resource identifiers.

/// Client Security object: credentials a device uses for one peer.
pub const CLIENT_SECURITY_OBJECT_ID: u16 = 11000;
/// Client object: one entry per known peer, keyed by short id.
pub const CLIENT_OBJECT_ID: u16 = 11001;
/// Client Access Control object.
pub const CLIENT_ACL_OBJECT_ID: u16 = 11002;
/// OSCORE object.
pub const OSCORE_OBJECT_ID: u16 = 21;

/// Resources of the Client object.
pub mod client {
    pub const SHORT_ID: u16 = 0;
    pub const LIFETIME: u16 = 1;
    pub const DEFAULT_MIN_PERIOD: u16 = 2;
    pub const DEFAULT_MAX_PERIOD: u16 = 3;
    pub const DISABLE: u16 = 4;
    pub const DISABLE_TIMEOUT: u16 = 5;
    pub const NOTIFICATION_STORING: u16 = 6;
    pub const BINDING: u16 = 7;
    pub const ENDPOINT: u16 = 9;
}

/// Resources of the Client Security object.
pub mod security {
    pub const URI: u16 = 0;
    pub const MODE: u16 = 2;
    pub const PUBLIC_KEY_OR_IDENTITY: u16 = 3;
    pub const SERVER_PUBLIC_KEY: u16 = 4;
    pub const SECRET_KEY: u16 = 5;
    pub const SHORT_ID: u16 = 10;
    pub const OSCORE_SECURITY_MODE: u16 = 17;

    pub const MODE_PSK: i64 = 0;
    pub const MODE_RPK: i64 = 1;
    pub const MODE_CERTIFICATE: i64 = 2;
    pub const MODE_NOSEC: i64 = 3;
}

/// Resources of the OSCORE object.
pub mod oscore {
    pub const MASTER_SECRET: u16 = 0;
    pub const SENDER_ID: u16 = 1;
    pub const RECIPIENT_ID: u16 = 2;
    pub const AEAD_ALGORITHM: u16 = 3;
    pub const HMAC_ALGORITHM: u16 = 4;
    pub const MASTER_SALT: u16 = 5;

    /// AES-CCM-16-64-128.
    pub const AEAD_AES_CCM_16_64_128: i64 = 10;
    /// HKDF with SHA-256.
    pub const HMAC_SHA256: i64 = 0;
}

/// Resources of the Client Access Control object.
pub mod acl {
    pub const OBJECT_ID: u16 = 0;
    pub const OBJECT_INSTANCE_ID: u16 = 1;
    pub const ACL: u16 = 2;
    pub const OWNER: u16 = 3;
}
