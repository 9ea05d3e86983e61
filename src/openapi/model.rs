//! Normalized catalog types shared by both OpenAPI dialects

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// HTTP methods recognized as operations inside a path item
pub const HTTP_METHODS: [&str; 7] = ["get", "post", "put", "delete", "patch", "head", "options"];

/// Where a non-body parameter travels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Path,
    Query,
    Header,
}

impl ParamLocation {
    /// Parse an OpenAPI `in` value. Body, formData and cookie are not parameters here.
    pub fn parse(location: &str) -> Option<Self> {
        match location {
            "path" => Some(ParamLocation::Path),
            "query" => Some(ParamLocation::Query),
            "header" => Some(ParamLocation::Header),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamLocation::Path => "path",
            ParamLocation::Query => "query",
            ParamLocation::Header => "header",
        }
    }
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameter definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParamLocation,
    pub required: bool,
    #[serde(rename = "type")]
    pub param_type: String,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl Parameter {
    /// Default value rendered the way it would appear on the wire
    pub fn default_as_string(&self) -> Option<String> {
        match self.default.as_ref()? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// A single multipart or url-encoded form field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FormField {
    /// File uploads are never sent as text values
    pub fn is_file(&self) -> bool {
        self.format.as_deref() == Some("binary") || self.field_type == "file"
    }
}

/// Request body in one of its two meaningful forms, chosen by content type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestBody {
    pub content_type: String,
    /// Pretty-printed example, empty unless the content type is JSON-like
    pub example_json: String,
    /// Populated only for multipart and url-encoded content
    pub form_fields: Vec<FormField>,
}

impl RequestBody {
    pub fn is_form(&self) -> bool {
        is_form_content_type(&self.content_type)
    }
}

pub fn is_json_content_type(content_type: &str) -> bool {
    content_type.contains("json")
}

pub fn is_form_content_type(content_type: &str) -> bool {
    content_type.contains("multipart") || content_type.contains("form-urlencoded")
}

/// Example for one declared response status
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseExample {
    pub status_code: u16,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example_json: Option<String>,
}

/// Scheme names that must all be satisfied together, with their scopes
pub type SecurityRequirement = IndexMap<String, Vec<String>>;

/// Security scheme kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SchemeType {
    ApiKey,
    Http,
    #[serde(rename = "oauth2")]
    OAuth2,
    OpenIdConnect,
    Other(String),
}

impl SchemeType {
    pub fn parse(value: &str) -> Self {
        match value {
            "apiKey" => SchemeType::ApiKey,
            "http" => SchemeType::Http,
            "oauth2" => SchemeType::OAuth2,
            "openIdConnect" => SchemeType::OpenIdConnect,
            other => SchemeType::Other(other.to_string()),
        }
    }
}

/// Where an API key travels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyLocation {
    Query,
    Header,
    Cookie,
}

impl KeyLocation {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "query" => Some(KeyLocation::Query),
            "header" => Some(KeyLocation::Header),
            "cookie" => Some(KeyLocation::Cookie),
            _ => None,
        }
    }
}

/// HTTP authentication scheme (RFC 7235 registry name)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpScheme {
    Bearer,
    Basic,
    Other(String),
}

impl HttpScheme {
    /// Scheme names are case-insensitive
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "bearer" => HttpScheme::Bearer,
            "basic" => HttpScheme::Basic,
            _ => HttpScheme::Other(value.to_string()),
        }
    }
}

/// OAuth2 flow details
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthFlow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_url: Option<String>,
    pub scopes: IndexMap<String, String>,
}

/// OAuth2 flows keyed the OpenAPI 3.x way
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthFlows {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implicit: Option<OAuthFlow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<OAuthFlow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_credentials: Option<OAuthFlow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_code: Option<OAuthFlow>,
}

/// Security scheme definition, normalized across dialects
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityScheme {
    #[serde(rename = "type")]
    pub scheme_type: SchemeType,
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<KeyLocation>,
    #[serde(rename = "name", skip_serializing_if = "Option::is_none")]
    pub param_name: Option<String>,
    #[serde(rename = "scheme", skip_serializing_if = "Option::is_none")]
    pub http_scheme: Option<HttpScheme>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bearer_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "flows", skip_serializing_if = "Option::is_none")]
    pub oauth_flows: Option<OAuthFlows>,
}

impl SecurityScheme {
    fn bare(scheme_type: SchemeType) -> Self {
        Self {
            scheme_type,
            location: None,
            param_name: None,
            http_scheme: None,
            bearer_format: None,
            description: None,
            oauth_flows: None,
        }
    }

    /// HTTP bearer token scheme
    pub fn bearer() -> Self {
        Self { http_scheme: Some(HttpScheme::Bearer), ..Self::bare(SchemeType::Http) }
    }

    /// HTTP basic scheme
    pub fn basic() -> Self {
        Self { http_scheme: Some(HttpScheme::Basic), ..Self::bare(SchemeType::Http) }
    }

    /// API key carried in a header, query parameter or cookie
    pub fn api_key(location: KeyLocation, name: impl Into<String>) -> Self {
        Self {
            location: Some(location),
            param_name: Some(name.into()),
            ..Self::bare(SchemeType::ApiKey)
        }
    }

    /// OAuth2 scheme without flow details
    pub fn oauth2() -> Self {
        Self::bare(SchemeType::OAuth2)
    }

    /// OpenID Connect discovery scheme
    pub fn open_id_connect() -> Self {
        Self::bare(SchemeType::OpenIdConnect)
    }

    /// Short human-readable label, e.g. `apiKey (header: X-API-Key)`
    pub fn label(&self) -> String {
        match (&self.scheme_type, &self.http_scheme, &self.location, &self.param_name) {
            (SchemeType::Http, Some(HttpScheme::Bearer), _, _) => "http (bearer)".to_string(),
            (SchemeType::Http, Some(HttpScheme::Basic), _, _) => "http (basic)".to_string(),
            (SchemeType::Http, Some(HttpScheme::Other(s)), _, _) => format!("http ({})", s),
            (SchemeType::ApiKey, _, Some(loc), Some(name)) => {
                let loc = match loc {
                    KeyLocation::Query => "query",
                    KeyLocation::Header => "header",
                    KeyLocation::Cookie => "cookie",
                };
                format!("apiKey ({}: {})", loc, name)
            }
            (SchemeType::ApiKey, ..) => "apiKey".to_string(),
            (SchemeType::Http, None, ..) => "http".to_string(),
            (SchemeType::OAuth2, ..) => "oauth2".to_string(),
            (SchemeType::OpenIdConnect, ..) => "openIdConnect".to_string(),
            (SchemeType::Other(s), ..) => s.clone(),
        }
    }
}

/// One callable operation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub id: String,
    pub path: String,
    pub method: String,
    pub summary: String,
    pub description: String,
    pub tags: Vec<String>,
    pub parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    pub responses: BTreeMap<u16, ResponseExample>,
    pub security: Vec<SecurityRequirement>,
}

impl Endpoint {
    /// Parameters declared at one location, in declaration order
    pub fn parameters_in(&self, location: ParamLocation) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(move |p| p.location == location)
    }

    /// Whether this endpoint declares any security requirement
    pub fn is_secured(&self) -> bool {
        !self.security.is_empty()
    }

    /// Matches on `(method, path)`, the endpoint identity
    pub fn matches(&self, method: &str, path: &str) -> bool {
        self.method.eq_ignore_ascii_case(method) && self.path == path
    }
}

/// Tag metadata used for grouping
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub name: String,
    pub description: String,
}

/// Scheme name to credential value. Values never appear in `Debug` output.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials(HashMap<String, String>);

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, scheme: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.insert(scheme.into(), value.into());
        self
    }

    /// Credential for a scheme, ignoring empty values
    pub fn get(&self, scheme: &str) -> Option<&str> {
        self.0.get(scheme).map(String::as_str).filter(|v| !v.is_empty())
    }

    /// Whether every scheme of a requirement has a non-empty credential
    pub fn satisfies(&self, requirement: &SecurityRequirement) -> bool {
        requirement.keys().all(|name| self.get(name).is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Credentials {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.0.keys().collect();
        names.sort();
        f.debug_map()
            .entries(names.into_iter().map(|k| (k, "[REDACTED]")))
            .finish()
    }
}
