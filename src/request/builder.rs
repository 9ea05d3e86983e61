//! Prepared request: materialized target plus a body matching the endpoint

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Serialize;

use super::materialize::{materialize, MaterializedRequest, ParamValues};
use crate::errors::{Result, SpecdeckError};
use crate::middleware::auth::Headers;
use crate::openapi::model::{Credentials, Endpoint, SecurityScheme};

/// Media type for JSON bodies sent to endpoints that declare none
const JSON_CONTENT_TYPE: &str = "application/json";

/// Caller value for one form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FormInput {
    /// Plain text value
    Text { name: String, value: String },
    /// File read from disk at send time
    File { name: String, path: PathBuf },
}

impl FormInput {
    /// Parse `name=value` or `name@path`, whichever separator comes first
    pub fn parse(spec: &str) -> Result<Self> {
        let split_at = spec
            .find(['=', '@'])
            .filter(|&i| i > 0)
            .ok_or_else(|| SpecdeckError::Argument(format!("invalid form field '{}': expected name=value or name@file", spec)))?;
        let (name, rest) = spec.split_at(split_at);
        let value = &rest[1..];
        Ok(if rest.starts_with('@') {
            FormInput::File { name: name.to_string(), path: PathBuf::from(value) }
        } else {
            FormInput::Text { name: name.to_string(), value: value.to_string() }
        })
    }

    pub fn name(&self) -> &str {
        match self {
            FormInput::Text { name, .. } | FormInput::File { name, .. } => name,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FormInput::Text { value, .. } => value.is_empty(),
            FormInput::File { path, .. } => path.as_os_str().is_empty(),
        }
    }
}

/// Request body variants
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "lowercase")]
pub enum Payload {
    /// No body
    Empty,
    /// JSON text, sent as-is under the endpoint's JSON media type
    Json { content_type: String, body: String },
    /// Form-urlencoded fields
    UrlEncoded(Vec<(String, String)>),
    /// Multipart form data
    Multipart(Vec<FormInput>),
}

impl Payload {
    /// Body for `endpoint`: caller JSON, else the synthesized example; form
    /// endpoints take the supplied form inputs
    pub fn for_endpoint(endpoint: &Endpoint, json_body: Option<String>, form: Vec<FormInput>) -> Result<Self> {
        let Some(body) = endpoint.request_body.as_ref() else {
            return Ok(json_body.map_or(Payload::Empty, |body| Payload::json(JSON_CONTENT_TYPE, body)));
        };

        if body.is_form() {
            if json_body.is_some() {
                return Err(SpecdeckError::Argument(format!(
                    "{} {} expects {}, not a JSON body",
                    endpoint.method.to_uppercase(),
                    endpoint.path,
                    body.content_type
                )));
            }
            let form: Vec<FormInput> = form.into_iter().filter(|f| !f.is_empty()).collect();
            if body.content_type.contains("multipart") {
                return Ok(Payload::Multipart(form));
            }
            return form
                .into_iter()
                .map(|input| match input {
                    FormInput::Text { name, value } => Ok((name, value)),
                    FormInput::File { name, .. } => Err(SpecdeckError::Argument(format!(
                        "field '{}': files cannot be sent as {}",
                        name, body.content_type
                    ))),
                })
                .collect::<Result<Vec<_>>>()
                .map(Payload::UrlEncoded);
        }

        if !form.is_empty() {
            return Err(SpecdeckError::Argument(format!(
                "{} {} does not take form fields",
                endpoint.method.to_uppercase(),
                endpoint.path
            )));
        }

        match json_body {
            Some(json) => Ok(Payload::json(&body.content_type, json)),
            None if !body.example_json.is_empty() => Ok(Payload::json(&body.content_type, body.example_json.clone())),
            None => Ok(Payload::Empty),
        }
    }

    fn json(content_type: &str, body: String) -> Self {
        Payload::Json { content_type: content_type.to_string(), body }
    }
}

/// Everything a transport needs to send one call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreparedRequest {
    pub method: String,
    /// Path including query string, relative to the base URL
    pub path: String,
    pub headers: Headers,
    pub body: Payload,
}

impl PreparedRequest {
    pub fn new(materialized: MaterializedRequest, body: Payload) -> Self {
        Self {
            method: materialized.method,
            path: materialized.path,
            headers: materialized.headers,
            body,
        }
    }

    /// Materialize `endpoint` and attach its body
    pub fn build(
        endpoint: &Endpoint,
        schemes: &IndexMap<String, SecurityScheme>,
        creds: &Credentials,
        values: &ParamValues,
        json_body: Option<String>,
        form: Vec<FormInput>,
    ) -> Result<Self> {
        let body = Payload::for_endpoint(endpoint, json_body, form)?;
        Ok(Self::new(materialize(endpoint, schemes, creds, values), body))
    }

    /// Full URL against `base_url`, trailing slash trimmed
    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::openapi::model::{FormField, RequestBody};

    fn endpoint_with(body: Option<RequestBody>) -> Endpoint {
        Endpoint {
            id: "post-/pets".to_string(),
            path: "/pets".to_string(),
            method: "post".to_string(),
            summary: "Add pet".to_string(),
            description: String::new(),
            tags: vec!["pets".to_string()],
            parameters: Vec::new(),
            request_body: body,
            responses: BTreeMap::new(),
            security: Vec::new(),
        }
    }

    fn form_body(content_type: &str) -> RequestBody {
        RequestBody {
            content_type: content_type.to_string(),
            example_json: String::new(),
            form_fields: vec![FormField {
                name: "name".to_string(),
                field_type: "string".to_string(),
                format: None,
                required: true,
                description: None,
            }],
        }
    }

    #[test]
    fn test_form_input_parse() {
        assert_eq!(
            FormInput::parse("name=Rex").unwrap(),
            FormInput::Text { name: "name".to_string(), value: "Rex".to_string() }
        );
        assert_eq!(
            FormInput::parse("photo@./dog.png").unwrap(),
            FormInput::File { name: "photo".to_string(), path: PathBuf::from("./dog.png") }
        );
        assert_eq!(
            FormInput::parse("note=a@b").unwrap(),
            FormInput::Text { name: "note".to_string(), value: "a@b".to_string() }
        );
        assert!(FormInput::parse("=x").is_err());
        assert!(FormInput::parse("bare").is_err());
    }

    #[test]
    fn test_json_body_defaults_to_example() {
        let ep = endpoint_with(Some(RequestBody {
            content_type: "application/json".to_string(),
            example_json: "{\n  \"name\": \"string\"\n}".to_string(),
            form_fields: Vec::new(),
        }));

        let payload = Payload::for_endpoint(&ep, None, Vec::new()).unwrap();
        assert_eq!(payload, Payload::json("application/json", "{\n  \"name\": \"string\"\n}".to_string()));

        let payload = Payload::for_endpoint(&ep, Some("{}".to_string()), Vec::new()).unwrap();
        assert_eq!(payload, Payload::json("application/json", "{}".to_string()));

        assert!(Payload::for_endpoint(&ep, None, vec![FormInput::parse("a=b").unwrap()]).is_err());
    }

    #[test]
    fn test_json_body_keeps_declared_media_type() {
        let ep = endpoint_with(Some(RequestBody {
            content_type: "application/merge-patch+json".to_string(),
            example_json: "{}".to_string(),
            form_fields: Vec::new(),
        }));
        let payload = Payload::for_endpoint(&ep, Some(r#"{"name":"Rex"}"#.to_string()), Vec::new()).unwrap();
        assert_eq!(
            payload,
            Payload::Json {
                content_type: "application/merge-patch+json".to_string(),
                body: r#"{"name":"Rex"}"#.to_string(),
            }
        );

        let bare = endpoint_with(None);
        let payload = Payload::for_endpoint(&bare, Some("[]".to_string()), Vec::new()).unwrap();
        assert_eq!(payload, Payload::json("application/json", "[]".to_string()));
    }

    #[test]
    fn test_urlencoded_rejects_files() {
        let ep = endpoint_with(Some(form_body("application/x-www-form-urlencoded")));

        let payload = Payload::for_endpoint(&ep, None, vec![FormInput::parse("name=Rex").unwrap()]).unwrap();
        assert_eq!(payload, Payload::UrlEncoded(vec![("name".to_string(), "Rex".to_string())]));

        let err = Payload::for_endpoint(&ep, None, vec![FormInput::parse("name@x.txt").unwrap()]);
        assert!(err.is_err());
    }

    #[test]
    fn test_multipart_keeps_files_and_drops_empty_values() {
        let ep = endpoint_with(Some(form_body("multipart/form-data")));
        let form = vec![FormInput::parse("name=").unwrap(), FormInput::parse("photo@dog.png").unwrap()];

        let payload = Payload::for_endpoint(&ep, None, form).unwrap();
        assert_eq!(
            payload,
            Payload::Multipart(vec![FormInput::File { name: "photo".to_string(), path: PathBuf::from("dog.png") }])
        );
        assert!(Payload::for_endpoint(&ep, Some("{}".to_string()), Vec::new()).is_err());
    }

    #[test]
    fn test_url_trims_trailing_slash() {
        let ep = endpoint_with(None);
        let prepared = PreparedRequest::build(
            &ep,
            &IndexMap::new(),
            &Credentials::new(),
            &ParamValues::new(),
            None,
            Vec::new(),
        )
        .unwrap();
        assert_eq!(prepared.body, Payload::Empty);
        assert_eq!(prepared.url("https://api.example.com/v1/"), "https://api.example.com/v1/pets");
    }
}
