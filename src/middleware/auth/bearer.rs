//! Bearer Token Authentication (RFC 6750)

use super::RequestTarget;

/// Bearer token authentication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerAuth {
    token: String,
}

impl BearerAuth {
    /// Create new Bearer auth with token
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }

    /// Apply Bearer auth header to request
    pub fn apply(&self, target: &mut RequestTarget) {
        target.set_header("Authorization", format!("Bearer {}", self.token));
    }
}
