//! Session headers attached to every REST call and WebSocket upgrade.
//!
//! Two values are required: a per-request anti-forgery (`xrf`) key and the
//! user-identity header `UserDirectory=<dir>; UserId=<user>`.

use std::fmt;

/// Anti-forgery header name. Also mirrored as the `xrfkey` query parameter
/// on REST URLs.
pub const XRF_HEADER: &str = "x-qlik-xrfkey";
/// User-identity header name.
pub const USER_HEADER: &str = "x-qlik-user";
/// Content type sent on every call.
pub const CONTENT_TYPE: &str = "application/json";
/// Length of an anti-forgery key.
pub const XRF_KEY_LEN: usize = 16;

/// Generates a fresh anti-forgery key: a UUID v4 without hyphens,
/// truncated to [`XRF_KEY_LEN`] hex digits.
#[must_use]
pub fn make_xrf_key() -> String {
    uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(XRF_KEY_LEN)
        .collect()
}

/// Directory/user pair the server authenticates calls as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    /// User directory (e.g. `INTERNAL`).
    pub directory: String,
    /// User id within the directory.
    pub user: String,
}

impl UserIdentity {
    /// Creates a new identity.
    #[must_use]
    pub fn new(directory: &str, user: &str) -> Self {
        Self {
            directory: directory.to_string(),
            user: user.to_string(),
        }
    }

    /// Value of the user-identity header.
    #[must_use]
    pub fn header_value(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserDirectory={}; UserId={}", self.directory, self.user)
    }
}

/// Header values for one request. Build a new one per request so the
/// anti-forgery key is never reused.
#[derive(Debug, Clone)]
pub struct SessionHeaders {
    /// Anti-forgery key for this request.
    pub xrf_key: String,
    /// User-identity header value.
    pub user: String,
}

impl SessionHeaders {
    /// Builds headers for `identity` with a freshly generated key.
    #[must_use]
    pub fn new(identity: &UserIdentity) -> Self {
        Self {
            xrf_key: make_xrf_key(),
            user: identity.header_value(),
        }
    }

    /// Name/value pairs in the order they are attached.
    #[must_use]
    pub fn pairs(&self) -> [(&'static str, &str); 3] {
        [
            (XRF_HEADER, self.xrf_key.as_str()),
            (USER_HEADER, self.user.as_str()),
            ("content-type", CONTENT_TYPE),
        ]
    }
}
