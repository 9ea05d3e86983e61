//! Endpoint extraction and catalog assembly
//!
//! Walks `paths`, normalizes each operation through the document's
//! [`SpecDialect`], and collects the result into a [`Catalog`].

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::dialect::{str_field, OperationContext, SpecDialect};
use super::document::SpecDocument;
use super::model::{
    Endpoint, Parameter, RequestBody, ResponseExample, SecurityRequirement, SecurityScheme, Tag,
    HTTP_METHODS,
};
use super::resolver::Resolver;
use super::synth::Synthesizer;
use crate::errors::Result;

/// Tag given to operations that declare none
pub const DEFAULT_TAG: &str = "Default";

const DEFAULT_RESPONSE_DESCRIPTION: &str = "No description";

/// Status used for `default` and range (`2XX`) response keys
const FALLBACK_STATUS: u16 = 200;

/// Everything a client needs to present and call an API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub title: String,
    pub version: String,
    #[serde(rename = "baseURL")]
    pub base_url: String,
    pub endpoints: Vec<Endpoint>,
    pub tags: Vec<Tag>,
    pub security_schemes: IndexMap<String, SecurityScheme>,
}

impl Catalog {
    /// Build the catalog of a loaded document
    pub fn from_document(doc: &SpecDocument) -> Result<Self> {
        let synth = Synthesizer::new(Resolver::new(doc.root()));
        Self::from_document_with(doc, &synth)
    }

    /// Build the catalog using a caller-supplied synthesizer (fixed timestamps in tests)
    pub fn from_document_with(doc: &SpecDocument, synth: &Synthesizer<'_>) -> Result<Self> {
        let root = doc.root();
        let dialect = doc.dialect().strategy();
        let info = root.get("info");

        let title = info
            .and_then(|i| str_field(i, "title"))
            .unwrap_or("Unknown API")
            .to_string();
        let version = info
            .and_then(|i| str_field(i, "version"))
            .unwrap_or("1.0.0")
            .to_string();

        let endpoints = extract_with(doc, synth)?;
        let tags = collect_tags(root, &endpoints);
        let security_schemes = dialect.security_schemes(synth.resolver())?;
        let base_url = derive_base_url(dialect.declared_base_url(root), doc.source_url());

        debug!(
            dialect = dialect.name(),
            endpoints = endpoints.len(),
            schemes = security_schemes.len(),
            base_url = %base_url,
            "Catalog built"
        );

        Ok(Self { title, version, base_url, endpoints, tags, security_schemes })
    }

    /// Look up an endpoint by its `(method, path)` identity
    pub fn find(&self, method: &str, path: &str) -> Option<&Endpoint> {
        self.endpoints.iter().find(|e| e.matches(method, path))
    }

    /// Endpoints grouped by tag, in catalog tag order. An endpoint with
    /// several tags appears in each group.
    pub fn endpoints_by_tag(&self) -> IndexMap<&str, Vec<&Endpoint>> {
        let mut groups: IndexMap<&str, Vec<&Endpoint>> = self
            .tags
            .iter()
            .map(|t| (t.name.as_str(), Vec::new()))
            .collect();
        for endpoint in &self.endpoints {
            for tag in &endpoint.tags {
                groups.entry(tag.as_str()).or_default().push(endpoint);
            }
        }
        groups.retain(|_, endpoints| !endpoints.is_empty());
        groups
    }
}

/// Extract every endpoint of a document
pub fn extract(doc: &SpecDocument) -> Result<Vec<Endpoint>> {
    let synth = Synthesizer::new(Resolver::new(doc.root()));
    extract_with(doc, &synth)
}

/// Extract every endpoint, synthesizing examples with `synth`
pub fn extract_with(doc: &SpecDocument, synth: &Synthesizer<'_>) -> Result<Vec<Endpoint>> {
    let root = doc.root();
    let dialect = doc.dialect().strategy();
    let resolver = synth.resolver();

    let Some(paths) = root.get("paths").and_then(Value::as_object) else {
        return Ok(Vec::new());
    };

    let global_security = root.get("security");
    let mut endpoints = Vec::new();

    for (path, path_item) in paths {
        let path_item = resolver.resolve_value(path_item)?;
        let Some(item) = path_item.as_object() else {
            debug!(path = %path, "Path item is not an object, skipping");
            continue;
        };

        for (key, operation) in item {
            let method = key.to_ascii_lowercase();
            if !HTTP_METHODS.contains(&method.as_str()) {
                continue;
            }
            if !operation.is_object() {
                debug!(path = %path, method = %method, "Operation is not an object, skipping");
                continue;
            }

            let raw_parameters = merge_parameters(operation, path_item, resolver)?;
            let ctx = OperationContext {
                path,
                method: &method,
                operation,
                raw_parameters,
            };

            endpoints.push(build_endpoint(&ctx, dialect, synth, global_security)?);
        }
    }

    Ok(endpoints)
}

fn build_endpoint(
    ctx: &OperationContext<'_>,
    dialect: &dyn SpecDialect,
    synth: &Synthesizer<'_>,
    global_security: Option<&Value>,
) -> Result<Endpoint> {
    let operation = ctx.operation;
    let parameters = dialect.extract_parameters(ctx, synth.resolver());
    let request_body = dialect
        .extract_request_body(ctx, synth)?
        .map(|body| drop_shadowed_form_fields(body, &parameters, ctx));
    let responses = extract_responses(operation.get("responses"), dialect, synth)?;

    // Operation-level security overrides the document's, even when empty
    let security = parse_security_requirements(operation.get("security").or(global_security));

    let tags: Vec<String> = operation
        .get("tags")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .filter(|tags: &Vec<String>| !tags.is_empty())
        .unwrap_or_else(|| vec![DEFAULT_TAG.to_string()]);

    Ok(Endpoint {
        id: format!("{}-{}", ctx.method, ctx.path),
        path: ctx.path.to_string(),
        method: ctx.method.to_uppercase(),
        summary: str_field(operation, "summary")
            .filter(|s| !s.is_empty())
            .unwrap_or(ctx.path)
            .to_string(),
        description: str_field(operation, "description").unwrap_or("").to_string(),
        tags,
        parameters,
        request_body,
        responses,
        security,
    })
}

/// Operation-level parameters, then path-level ones the operation does not override
fn merge_parameters<'a>(
    operation: &'a Value,
    path_item: &'a Value,
    resolver: Resolver<'a>,
) -> Result<Vec<&'a Value>> {
    let mut merged: Vec<&'a Value> = Vec::new();

    for list in [operation.get("parameters"), path_item.get("parameters")] {
        let Some(entries) = list.and_then(Value::as_array) else {
            continue;
        };
        let seen: Vec<&str> = merged.iter().filter_map(|p| str_field(p, "name")).collect();
        for entry in entries {
            let param = resolver.resolve_value(entry)?;
            match str_field(param, "name") {
                Some(name) if seen.contains(&name) => {
                    debug!(name, "Path-level parameter overridden by operation");
                }
                _ => merged.push(param),
            }
        }
    }

    Ok(merged)
}

/// A field must not appear both as a parameter and as a form field
fn drop_shadowed_form_fields(
    mut body: RequestBody,
    parameters: &[Parameter],
    ctx: &OperationContext<'_>,
) -> RequestBody {
    body.form_fields.retain(|field| {
        let shadowed = parameters.iter().any(|p| p.name == field.name);
        if shadowed {
            debug!(
                path = ctx.path,
                method = ctx.method,
                field = %field.name,
                "Form field shadows a parameter, dropping"
            );
        }
        !shadowed
    });
    body
}

fn extract_responses(
    responses: Option<&Value>,
    dialect: &dyn SpecDialect,
    synth: &Synthesizer<'_>,
) -> Result<BTreeMap<u16, ResponseExample>> {
    let mut out = BTreeMap::new();
    let Some(responses) = responses.and_then(Value::as_object) else {
        return Ok(out);
    };

    let resolver = synth.resolver();
    let mut fallback: Option<ResponseExample> = None;

    for (code, response) in responses {
        let response = resolver.resolve_value(response)?;
        let example_json = dialect
            .extract_response_schema(response)
            .map(|schema| synth.example_json(schema));
        let description = str_field(response, "description")
            .filter(|d| !d.is_empty())
            .unwrap_or(DEFAULT_RESPONSE_DESCRIPTION)
            .to_string();

        match code.trim().parse::<u16>() {
            Ok(status_code) => {
                out.insert(status_code, ResponseExample { status_code, description, example_json });
            }
            Err(_) => {
                if fallback.is_none() {
                    fallback = Some(ResponseExample {
                        status_code: FALLBACK_STATUS,
                        description,
                        example_json,
                    });
                }
            }
        }
    }

    if let Some(example) = fallback {
        out.entry(FALLBACK_STATUS).or_insert(example);
    }

    Ok(out)
}

/// Parse an OR-list of AND-requirements
pub fn parse_security_requirements(security: Option<&Value>) -> Vec<SecurityRequirement> {
    let Some(security) = security.and_then(Value::as_array) else {
        return Vec::new();
    };

    security
        .iter()
        .filter_map(|req| {
            let obj = req.as_object()?;
            Some(
                obj.iter()
                    .map(|(name, scopes)| {
                        let scopes = scopes
                            .as_array()
                            .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
                            .unwrap_or_default();
                        (name.clone(), scopes)
                    })
                    .collect(),
            )
        })
        .collect()
}

/// Declared tags first, then tags used by endpoints but never declared
fn collect_tags(root: &Value, endpoints: &[Endpoint]) -> Vec<Tag> {
    let mut tags: Vec<Tag> = root
        .get("tags")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|t| {
                    Some(Tag {
                        name: str_field(t, "name")?.to_string(),
                        description: str_field(t, "description").unwrap_or("").to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    for endpoint in endpoints {
        for name in &endpoint.tags {
            if !tags.iter().any(|t| &t.name == name) {
                tags.push(Tag { name: name.clone(), description: String::new() });
            }
        }
    }

    tags
}

/// Declared server URL, made absolute against the source URL; otherwise the
/// source URL's origin; otherwise empty
pub fn derive_base_url(declared: Option<String>, source_url: Option<&str>) -> String {
    let source = source_url.and_then(|s| Url::parse(s).ok()).filter(|u| u.scheme().starts_with("http"));

    match (declared, source) {
        (Some(declared), Some(source)) if !declared.starts_with("http") => source
            .join(&declared)
            .map(|u| u.to_string())
            .unwrap_or(declared),
        (Some(declared), _) => declared,
        (None, Some(source)) => source.origin().ascii_serialization(),
        (None, None) => String::new(),
    }
}
