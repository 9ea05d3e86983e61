//! Error types for specdeck

use thiserror::Error;

/// Failure to resolve a `$ref` pointer against the loaded document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("unsupported reference '{reference}': only local '#/...' pointers are resolved")]
    UnsupportedReferenceKind { reference: String },

    #[error("dangling reference '{reference}': segment '{segment}' not found")]
    DanglingReference { reference: String, segment: String },
}

/// Main error type for specdeck
#[derive(Error, Debug)]
pub enum SpecdeckError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Reference error: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("Unparsable document: {0}")]
    UnparsableDocument(String),

    #[error("Failed to fetch OpenAPI spec from {url}: HTTP {status}")]
    Fetch { url: String, status: u16 },

    #[error("Spec too large: {size} bytes (max {max} bytes)")]
    TooLarge { size: u64, max: u64 },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, SpecdeckError>;
