//! Authentication middleware
//!
//! One [`Auth`] variant per wire shape a security scheme can take. Applying
//! never fails; a scheme that cannot carry a credential yields no [`Auth`].

mod apikey;
mod basic;
mod bearer;

pub use apikey::ApiKeyAuth;
pub use basic::BasicAuth;
pub use bearer::BearerAuth;

use indexmap::IndexMap;

use crate::openapi::model::{HttpScheme, KeyLocation, SchemeType, SecurityScheme};

/// Header name → value, in insertion order
pub type Headers = IndexMap<String, String>;

/// The parts of a request authentication may touch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestTarget {
    /// Path including any query string
    pub path: String,
    pub headers: Headers,
}

impl RequestTarget {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), headers: Headers::new() }
    }

    /// Set a header, replacing any existing one with the same name in any case
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        set_header(&mut self.headers, name, value);
    }

    /// Append `name=value` (value already encoded) to the query string
    pub fn append_query(&mut self, name: &str, encoded_value: &str) {
        let separator = if self.path.contains('?') { '&' } else { '?' };
        self.path.push(separator);
        self.path.push_str(name);
        self.path.push('=');
        self.path.push_str(encoded_value);
    }
}

/// Case-insensitive header insert that keeps the original position
pub fn set_header(headers: &mut Headers, name: &str, value: impl Into<String>) {
    let existing = headers
        .keys()
        .find(|k| k.eq_ignore_ascii_case(name))
        .cloned();
    match existing {
        Some(key) => {
            headers.insert(key, value.into());
        }
        None => {
            headers.insert(name.to_string(), value.into());
        }
    }
}

/// Authentication method enum - one variant per wire shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    /// HTTP Basic Authentication (RFC 7617), credential already encoded
    Basic(BasicAuth),
    /// Bearer token authentication (RFC 6750); also used for OAuth2
    Bearer(BearerAuth),
    /// API key in a header, query parameter or cookie
    ApiKey(ApiKeyAuth),
}

impl Auth {
    /// Basic authentication from an already base64-encoded `user:pass`
    pub fn basic(encoded: impl Into<String>) -> Self {
        Auth::Basic(BasicAuth::new(encoded))
    }

    /// Bearer token authentication
    pub fn bearer(token: impl Into<String>) -> Self {
        Auth::Bearer(BearerAuth::new(token))
    }

    /// API key authentication
    pub fn api_key(location: KeyLocation, name: impl Into<String>, key: impl Into<String>) -> Self {
        Auth::ApiKey(ApiKeyAuth::new(location, name, key))
    }

    /// How `credential` travels for `scheme`, or `None` when the scheme is not actionable
    pub fn for_scheme(scheme: &SecurityScheme, credential: &str) -> Option<Self> {
        match (&scheme.scheme_type, &scheme.http_scheme) {
            (SchemeType::Http, Some(HttpScheme::Bearer)) => Some(Auth::bearer(credential)),
            (SchemeType::Http, Some(HttpScheme::Basic)) => Some(Auth::basic(credential)),
            (SchemeType::ApiKey, _) => {
                let location = scheme.location?;
                let name = scheme.param_name.as_deref().filter(|n| !n.is_empty())?;
                Some(Auth::api_key(location, name, credential))
            }
            (SchemeType::OAuth2, _) => Some(Auth::bearer(credential)),
            _ => None,
        }
    }

    /// Apply the credential to the request
    pub fn apply(&self, target: &mut RequestTarget) {
        match self {
            Auth::Basic(auth) => auth.apply(target),
            Auth::Bearer(auth) => auth.apply(target),
            Auth::ApiKey(auth) => auth.apply(target),
        }
    }

    /// Authentication type name for display/debugging
    pub fn type_name(&self) -> &'static str {
        match self {
            Auth::Basic(_) => "basic",
            Auth::Bearer(_) => "bearer",
            Auth::ApiKey(_) => "api-key",
        }
    }
}
