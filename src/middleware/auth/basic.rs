//! HTTP Basic Authentication (RFC 7617)

use base64::Engine;

use super::RequestTarget;

/// HTTP Basic credential, carried pre-encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicAuth {
    encoded: String,
}

impl BasicAuth {
    /// Wrap an already base64-encoded `user:pass`
    pub fn new(encoded: impl Into<String>) -> Self {
        Self { encoded: encoded.into() }
    }

    /// Encode `user:pass` the way the `Authorization` header expects
    pub fn encode(username: &str, password: &str) -> String {
        let credentials = format!("{}:{}", username, password);
        base64::engine::general_purpose::STANDARD.encode(credentials.as_bytes())
    }

    /// Apply Basic auth header to request
    pub fn apply(&self, target: &mut RequestTarget) {
        target.set_header("Authorization", format!("Basic {}", self.encoded));
    }
}
