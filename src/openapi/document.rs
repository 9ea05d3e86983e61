//! Loading OpenAPI/Swagger documents from disk or over HTTP

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::dialect::{SpecDialect, V2Dialect, V3Dialect};
use crate::client::USER_AGENT_STRING;
use crate::errors::{Result, SpecdeckError};

/// Maximum spec size (16 MB)
pub const MAX_SPEC_SIZE: u64 = 16 * 1024 * 1024;

/// Relay used when a spec URL cannot be fetched directly
pub const DEFAULT_RELAY_URL: &str = "https://corsproxy.io/?";

/// Which OpenAPI generation a document belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Swagger 2.0
    V2,
    /// OpenAPI 3.x
    V3,
}

impl Dialect {
    /// Detect the dialect from the top-level `swagger` / `openapi` key
    pub fn detect(root: &Value) -> Result<Self> {
        let Value::Object(map) = root else {
            return Err(SpecdeckError::UnparsableDocument(
                "top-level value is not an object".to_string(),
            ));
        };

        if let Some(version) = map.get("openapi") {
            return match version.as_str() {
                Some(v) if v.starts_with('3') => Ok(Dialect::V3),
                _ => Err(SpecdeckError::UnparsableDocument(format!(
                    "unsupported 'openapi' version: {}",
                    version
                ))),
            };
        }

        if let Some(version) = map.get("swagger") {
            return match version.as_str() {
                Some(v) if v.starts_with('2') => Ok(Dialect::V2),
                _ => Err(SpecdeckError::UnparsableDocument(format!(
                    "unsupported 'swagger' version: {}",
                    version
                ))),
            };
        }

        Err(SpecdeckError::UnparsableDocument(
            "missing 'openapi' or 'swagger' field".to_string(),
        ))
    }

    /// Extraction strategy for this dialect
    pub fn strategy(&self) -> &'static dyn SpecDialect {
        match self {
            Dialect::V2 => &V2Dialect,
            Dialect::V3 => &V3Dialect,
        }
    }
}

/// A loaded description document. Immutable; replaced wholesale on reload.
#[derive(Debug, Clone)]
pub struct SpecDocument {
    root: Value,
    dialect: Dialect,
    source_url: Option<String>,
}

impl SpecDocument {
    /// Wrap an already-parsed JSON tree
    pub fn from_value(root: Value) -> Result<Self> {
        let dialect = Dialect::detect(&root)?;
        Ok(Self { root, dialect, source_url: None })
    }

    /// Parse JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(text)?;
        Self::from_value(root)
    }

    /// Remember the URL the document was requested from (used for base URL fallback)
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn source_url(&self) -> Option<&str> {
        self.source_url.as_deref()
    }
}

/// Options for fetching remote documents
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Relay prefix to retry through when a direct fetch fails; `None` disables it
    pub relay_url: Option<String>,
    pub timeout: Duration,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            relay_url: Some(DEFAULT_RELAY_URL.to_string()),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Whether a spec source names a remote document
pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Load a spec from a file path or an http(s) URL
pub async fn load_spec(source: &str, options: &LoaderOptions) -> Result<SpecDocument> {
    if is_remote(source) {
        let text = fetch_remote(source, options).await?;
        Ok(SpecDocument::from_json(&text)?.with_source_url(source))
    } else {
        load_file(Path::new(source))
    }
}

/// Load a spec from a local JSON file
pub fn load_file(path: &Path) -> Result<SpecDocument> {
    let metadata = fs::metadata(path)?;
    if metadata.len() > MAX_SPEC_SIZE {
        return Err(SpecdeckError::TooLarge { size: metadata.len(), max: MAX_SPEC_SIZE });
    }

    let content = fs::read_to_string(path)?;
    debug!(path = %path.display(), bytes = content.len(), "Loaded spec file");
    SpecDocument::from_json(&content)
}

async fn fetch_remote(url: &str, options: &LoaderOptions) -> Result<String> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT_STRING)
        .timeout(options.timeout)
        .build()?;

    info!(url, "Fetching spec");
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            let Some(relay) = options.relay_url.as_deref() else {
                return Err(e.into());
            };
            let relayed = relay_url(relay, url);
            warn!(url, error = %e, relay = %relayed, "Direct fetch failed, retrying via relay");
            client.get(&relayed).send().await?
        }
    };

    let status = response.status();
    if !status.is_success() {
        return Err(SpecdeckError::Fetch { url: url.to_string(), status: status.as_u16() });
    }

    if let Some(len) = response.content_length() {
        if len > MAX_SPEC_SIZE {
            return Err(SpecdeckError::TooLarge { size: len, max: MAX_SPEC_SIZE });
        }
    }

    let body = response.text().await?;
    if body.len() as u64 > MAX_SPEC_SIZE {
        return Err(SpecdeckError::TooLarge { size: body.len() as u64, max: MAX_SPEC_SIZE });
    }
    Ok(body)
}

/// `https://relay/?` + `https://api.example.com/spec.json` → relay URL with the target encoded
pub fn relay_url(relay: &str, target: &str) -> String {
    format!("{}{}", relay, urlencoding::encode(target))
}
