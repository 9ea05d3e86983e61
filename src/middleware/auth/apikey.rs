//! API Key Authentication via header, query parameter or cookie

use super::RequestTarget;
use crate::openapi::model::KeyLocation;

/// API key authentication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKeyAuth {
    location: KeyLocation,
    name: String,
    key: String,
}

impl ApiKeyAuth {
    /// Create new API Key auth carried at `location` under `name`
    pub fn new(location: KeyLocation, name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            location,
            name: name.into(),
            key: key.into(),
        }
    }

    /// Apply the key to the request
    pub fn apply(&self, target: &mut RequestTarget) {
        match self.location {
            KeyLocation::Header => target.set_header(&self.name, self.key.clone()),
            KeyLocation::Query => {
                let encoded = urlencoding::encode(&self.key);
                target.append_query(&self.name, &encoded);
            }
            KeyLocation::Cookie => {
                let pair = format!("{}={}", self.name, self.key);
                let cookie = match target.headers.get("Cookie") {
                    Some(existing) if !existing.is_empty() => format!("{}; {}", existing, pair),
                    _ => pair,
                };
                target.set_header("Cookie", cookie);
            }
        }
    }
}
