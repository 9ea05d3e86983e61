//! HTTP request sending
//!
//! Sends a [`PreparedRequest`] with reqwest. Failures never escape as errors:
//! they come back as a status-0 response carrying the reason.

use std::time::{Duration, Instant};

use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use tracing::{info, warn};

use crate::errors::{Result, SpecdeckError};
use crate::request::{FormInput, Payload, PreparedRequest};

pub const USER_AGENT_STRING: &str = concat!("specdeck/", env!("CARGO_PKG_VERSION"));

/// Outcome of one call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransportResponse {
    /// HTTP status, or 0 when no response was received
    pub status: u16,
    /// Parsed JSON when the server says so, otherwise the raw text
    pub body: JsonValue,
    pub latency_ms: u64,
}

impl TransportResponse {
    /// Status-0 response describing why the call never completed
    pub fn network_error(details: impl std::fmt::Display) -> Self {
        Self {
            status: 0,
            body: json!({ "error": "Network Error", "details": details.to_string() }),
            latency_ms: 0,
        }
    }

    pub fn is_network_error(&self) -> bool {
        self.status == 0
    }
}

/// Something that can deliver a prepared request
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn send(&self, base_url: &str, request: &PreparedRequest) -> TransportResponse;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT_STRING)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    async fn build(&self, url: &str, request: &PreparedRequest) -> Result<RequestBuilder> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| SpecdeckError::Argument(format!("invalid HTTP method '{}'", request.method)))?;

        let is_multipart = matches!(request.body, Payload::Multipart(_));
        let mut builder = self.client.request(method, url);
        for (name, value) in &request.headers {
            // the multipart boundary is chosen by the form encoder
            if is_multipart && name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()) {
                continue;
            }
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match &request.body {
            Payload::Empty => builder,
            Payload::Json { content_type, body } => builder.header(CONTENT_TYPE, content_type.as_str()).body(body.clone()),
            Payload::UrlEncoded(fields) => builder.form(fields),
            Payload::Multipart(inputs) => builder.multipart(build_form(inputs).await?),
        };
        Ok(builder)
    }
}

async fn build_form(inputs: &[FormInput]) -> Result<Form> {
    let mut form = Form::new();
    for input in inputs {
        form = match input {
            FormInput::Text { name, value } => form.text(name.clone(), value.clone()),
            FormInput::File { name, path } => {
                let contents = tokio::fs::read(path).await?;
                let filename = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "file".to_string());
                let mime = mime_guess::from_path(path).first_or_octet_stream();
                let part = Part::bytes(contents)
                    .file_name(filename)
                    .mime_str(mime.essence_str())?;
                form.part(name.clone(), part)
            }
        };
    }
    Ok(form)
}

impl Transport for HttpTransport {
    async fn send(&self, base_url: &str, request: &PreparedRequest) -> TransportResponse {
        let url = request.url(base_url);
        let builder = match self.build(&url, request).await {
            Ok(builder) => builder,
            Err(e) => {
                warn!(method = %request.method, url = %url, error = %e, "Could not build request");
                return TransportResponse::network_error(e);
            }
        };

        let start = Instant::now();
        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(method = %request.method, url = %url, error = %e, "Request failed");
                return TransportResponse::network_error(e);
            }
        };

        let status = response.status().as_u16();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));

        let body = match response.text().await {
            Ok(text) if is_json => serde_json::from_str(&text).unwrap_or(JsonValue::String(text)),
            Ok(text) => JsonValue::String(text),
            Err(e) => return TransportResponse::network_error(e),
        };
        let latency_ms = start.elapsed().as_millis() as u64;

        info!(method = %request.method, url = %url, status, latency_ms, "Request completed");
        TransportResponse { status, body, latency_ms }
    }
}
