//! Swagger 2.0 / OpenAPI 3.x differences, behind one trait
//!
//! The extractor picks a dialect once per document and never branches on the
//! version again. Everything that reads a version-specific key lives here.

use indexmap::IndexMap;
use serde_json::Value;

use super::model::{
    is_form_content_type, is_json_content_type, FormField, HttpScheme, KeyLocation, OAuthFlow,
    OAuthFlows, ParamLocation, Parameter, RequestBody, SchemeType, SecurityScheme,
};
use super::resolver::Resolver;
use super::synth::Synthesizer;
use crate::errors::Result;

const JSON: &str = "application/json";
const MULTIPART: &str = "multipart/form-data";
const URL_ENCODED: &str = "application/x-www-form-urlencoded";

/// One operation as seen by a dialect
#[derive(Debug)]
pub struct OperationContext<'a> {
    pub path: &'a str,
    pub method: &'a str,
    pub operation: &'a Value,
    /// Operation-level then non-overridden path-level parameters, `$ref`s resolved
    pub raw_parameters: Vec<&'a Value>,
}

impl<'a> OperationContext<'a> {
    /// Raw parameters declared `in` the given location
    pub fn raw_in(&self, location: &'a str) -> impl Iterator<Item = &'a Value> + '_ {
        self.raw_parameters
            .iter()
            .copied()
            .filter(move |p| str_field(p, "in") == Some(location))
    }
}

/// Version-specific extraction
pub trait SpecDialect {
    fn name(&self) -> &'static str;

    /// Path, query and header parameters of an operation
    fn extract_parameters(&self, ctx: &OperationContext<'_>, resolver: Resolver<'_>) -> Vec<Parameter>;

    /// Request body of an operation, if it declares one this crate can build
    fn extract_request_body(
        &self,
        ctx: &OperationContext<'_>,
        synth: &Synthesizer<'_>,
    ) -> Result<Option<RequestBody>>;

    /// JSON schema attached to a (resolved) response object
    fn extract_response_schema<'v>(&self, response: &'v Value) -> Option<&'v Value>;

    /// Security scheme catalog
    fn security_schemes(&self, resolver: Resolver<'_>) -> Result<IndexMap<String, SecurityScheme>>;

    /// Server URL declared by the document itself
    fn declared_base_url(&self, root: &Value) -> Option<String>;
}

/// Swagger 2.0
#[derive(Debug, Clone, Copy, Default)]
pub struct V2Dialect;

/// OpenAPI 3.x
#[derive(Debug, Clone, Copy, Default)]
pub struct V3Dialect;

impl SpecDialect for V2Dialect {
    fn name(&self) -> &'static str {
        "swagger-2.0"
    }

    fn extract_parameters(&self, ctx: &OperationContext<'_>, _resolver: Resolver<'_>) -> Vec<Parameter> {
        // Swagger 2.0 keeps type information inline on the parameter
        ctx.raw_parameters
            .iter()
            .copied()
            .filter_map(|raw| build_parameter(raw, raw))
            .collect()
    }

    fn extract_request_body(
        &self,
        ctx: &OperationContext<'_>,
        synth: &Synthesizer<'_>,
    ) -> Result<Option<RequestBody>> {
        if let Some(body_param) = ctx.raw_in("body").next() {
            let schema = body_param.get("schema").unwrap_or(&Value::Null);
            return Ok(Some(RequestBody {
                content_type: JSON.to_string(),
                example_json: synth.example_json(schema),
                form_fields: Vec::new(),
            }));
        }

        let form_fields: Vec<FormField> = ctx
            .raw_in("formData")
            .filter_map(|raw| {
                Some(FormField {
                    name: str_field(raw, "name")?.to_string(),
                    field_type: str_field(raw, "type").unwrap_or("string").to_string(),
                    format: str_field(raw, "format").map(str::to_string),
                    required: bool_field(raw, "required"),
                    description: str_field(raw, "description").map(str::to_string),
                })
            })
            .collect();

        if form_fields.is_empty() {
            return Ok(None);
        }

        let consumes = ctx
            .operation
            .get("consumes")
            .or_else(|| synth.resolver().root().get("consumes"));

        Ok(Some(RequestBody {
            content_type: form_content_type_v2(consumes).to_string(),
            example_json: String::new(),
            form_fields,
        }))
    }

    fn extract_response_schema<'v>(&self, response: &'v Value) -> Option<&'v Value> {
        response.get("schema")
    }

    fn security_schemes(&self, resolver: Resolver<'_>) -> Result<IndexMap<String, SecurityScheme>> {
        let Some(defs) = resolver.root().get("securityDefinitions").and_then(Value::as_object) else {
            return Ok(IndexMap::new());
        };

        let mut schemes = IndexMap::new();
        for (name, def) in defs {
            let Some(def_type) = str_field(def, "type") else {
                tracing::debug!(scheme = %name, "Security definition without type, skipping");
                continue;
            };

            // Swagger 2.0 `basic` is OpenAPI 3.x `http` + `basic`
            let (scheme_type, http_scheme) = match def_type {
                "basic" => (SchemeType::Http, Some(HttpScheme::Basic)),
                other => (SchemeType::parse(other), None),
            };

            schemes.insert(name.clone(), SecurityScheme {
                scheme_type,
                location: str_field(def, "in").and_then(KeyLocation::parse),
                param_name: str_field(def, "name").map(str::to_string),
                http_scheme,
                bearer_format: None,
                description: str_field(def, "description").map(str::to_string),
                oauth_flows: parse_oauth_flow_v2(def),
            });
        }
        Ok(schemes)
    }

    fn declared_base_url(&self, root: &Value) -> Option<String> {
        let host = str_field(root, "host").filter(|h| !h.is_empty())?;
        let scheme = root
            .get("schemes")
            .and_then(Value::as_array)
            .and_then(|s| s.first())
            .and_then(Value::as_str)
            .unwrap_or("https");
        let base_path = str_field(root, "basePath").unwrap_or("");
        Some(format!("{}://{}{}", scheme, host, base_path))
    }
}

impl SpecDialect for V3Dialect {
    fn name(&self) -> &'static str {
        "openapi-3"
    }

    fn extract_parameters(&self, ctx: &OperationContext<'_>, resolver: Resolver<'_>) -> Vec<Parameter> {
        ctx.raw_parameters
            .iter()
            .copied()
            .filter_map(|raw| {
                // Type information lives in `schema`, which may itself be a $ref
                let schema = raw
                    .get("schema")
                    .and_then(|s| resolver.resolve_value(s).ok())
                    .unwrap_or(raw);
                build_parameter(raw, schema)
            })
            .collect()
    }

    fn extract_request_body(
        &self,
        ctx: &OperationContext<'_>,
        synth: &Synthesizer<'_>,
    ) -> Result<Option<RequestBody>> {
        let Some(request_body) = ctx.operation.get("requestBody") else {
            return Ok(None);
        };
        let resolver = synth.resolver();
        let request_body = resolver.resolve_value(request_body)?;

        let Some(content) = request_body.get("content").and_then(Value::as_object) else {
            return Ok(None);
        };
        let keys: Vec<&str> = content.keys().map(String::as_str).collect();
        let Some(content_type) = select_content_type(&keys) else {
            tracing::debug!(
                path = ctx.path,
                method = ctx.method,
                "No JSON or form content type in requestBody"
            );
            return Ok(None);
        };

        let schema = content
            .get(content_type)
            .and_then(|media| media.get("schema"))
            .unwrap_or(&Value::Null);

        if is_form_content_type(content_type) {
            return Ok(Some(RequestBody {
                content_type: content_type.to_string(),
                example_json: String::new(),
                form_fields: form_fields_from_schema(schema, resolver),
            }));
        }

        Ok(Some(RequestBody {
            content_type: content_type.to_string(),
            example_json: synth.example_json(schema),
            form_fields: Vec::new(),
        }))
    }

    fn extract_response_schema<'v>(&self, response: &'v Value) -> Option<&'v Value> {
        let content = response.get("content")?.as_object()?;
        if let Some(schema) = content.get(JSON).and_then(|m| m.get("schema")) {
            return Some(schema);
        }
        content
            .iter()
            .filter(|(k, _)| is_json_content_type(k))
            .find_map(|(_, media)| media.get("schema"))
    }

    fn security_schemes(&self, resolver: Resolver<'_>) -> Result<IndexMap<String, SecurityScheme>> {
        let Some(defs) = resolver
            .root()
            .get("components")
            .and_then(|c| c.get("securitySchemes"))
            .and_then(Value::as_object)
        else {
            return Ok(IndexMap::new());
        };

        let mut schemes = IndexMap::new();
        for (name, def) in defs {
            let def = resolver.resolve_value(def)?;
            let Some(def_type) = str_field(def, "type") else {
                tracing::debug!(scheme = %name, "Security scheme without type, skipping");
                continue;
            };

            schemes.insert(name.clone(), SecurityScheme {
                scheme_type: SchemeType::parse(def_type),
                location: str_field(def, "in").and_then(KeyLocation::parse),
                param_name: str_field(def, "name").map(str::to_string),
                http_scheme: str_field(def, "scheme").map(HttpScheme::parse),
                bearer_format: str_field(def, "bearerFormat").map(str::to_string),
                description: str_field(def, "description").map(str::to_string),
                oauth_flows: parse_oauth_flows_v3(def.get("flows")),
            });
        }
        Ok(schemes)
    }

    fn declared_base_url(&self, root: &Value) -> Option<String> {
        let server = root.get("servers")?.as_array()?.first()?;
        let url = str_field(server, "url").filter(|u| !u.is_empty())?;
        Some(substitute_server_variables(url, server.get("variables")))
    }
}

/// Pick the request content type: the first JSON-like or form key in document
/// order. When that key is JSON-like, an exact `application/json` wins.
pub fn select_content_type<'k>(keys: &[&'k str]) -> Option<&'k str> {
    let first = keys
        .iter()
        .copied()
        .find(|k| is_json_content_type(k) || is_form_content_type(k))?;

    if is_json_content_type(first) && keys.contains(&JSON) {
        return Some(JSON);
    }
    Some(first)
}

/// Replace `{var}` in a server URL with the variable's default
fn substitute_server_variables(url: &str, variables: Option<&Value>) -> String {
    let Some(vars) = variables.and_then(Value::as_object) else {
        return url.to_string();
    };

    let mut out = url.to_string();
    for (name, var) in vars {
        if let Some(default) = var.get("default") {
            let default = match default {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            out = out.replace(&format!("{{{}}}", name), &default);
        }
    }
    out
}

fn form_content_type_v2(consumes: Option<&Value>) -> &'static str {
    let types: Vec<&str> = consumes
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let url_encoded = types.iter().any(|t| t.contains("form-urlencoded"));
    let multipart = types.iter().any(|t| t.contains("multipart"));
    if url_encoded && !multipart {
        URL_ENCODED
    } else {
        MULTIPART
    }
}

fn form_fields_from_schema(schema: &Value, resolver: Resolver<'_>) -> Vec<FormField> {
    let Ok(schema) = resolver.resolve_value(schema) else {
        return Vec::new();
    };
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };
    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    properties
        .iter()
        .map(|(name, prop)| {
            let prop = resolver.resolve_value(prop).unwrap_or(prop);
            FormField {
                name: name.clone(),
                field_type: str_field(prop, "type").unwrap_or("string").to_string(),
                format: str_field(prop, "format").map(str::to_string),
                required: required.contains(&name.as_str()),
                description: str_field(prop, "description").map(str::to_string),
            }
        })
        .collect()
}

/// Shared parameter construction; `type_source` carries `type`/`enum`/`default`
fn build_parameter(raw: &Value, type_source: &Value) -> Option<Parameter> {
    let location = ParamLocation::parse(str_field(raw, "in")?)?;
    let name = str_field(raw, "name")?.to_string();

    let param_type = str_field(type_source, "type")
        .or_else(|| str_field(raw, "type"))
        .unwrap_or("string")
        .to_string();

    let enum_values = type_source
        .get("enum")
        .or_else(|| raw.get("enum"))
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect()
        });

    let default = type_source
        .get("default")
        .or_else(|| raw.get("default"))
        .cloned();

    Some(Parameter {
        name,
        location,
        // Path parameters are always required
        required: bool_field(raw, "required") || location == ParamLocation::Path,
        param_type,
        enum_values,
        description: str_field(raw, "description").map(str::to_string),
        default,
    })
}

fn parse_oauth_flows_v3(flows: Option<&Value>) -> Option<OAuthFlows> {
    let flows = flows?;
    Some(OAuthFlows {
        implicit: parse_oauth_flow(flows.get("implicit")),
        password: parse_oauth_flow(flows.get("password")),
        client_credentials: parse_oauth_flow(flows.get("clientCredentials")),
        authorization_code: parse_oauth_flow(flows.get("authorizationCode")),
    })
}

/// Swagger 2.0 describes a single flow inline on the definition
fn parse_oauth_flow_v2(def: &Value) -> Option<OAuthFlows> {
    let flow_name = str_field(def, "flow")?;
    let flow = parse_oauth_flow(Some(def));
    let mut flows = OAuthFlows::default();
    match flow_name {
        "implicit" => flows.implicit = flow,
        "password" => flows.password = flow,
        "application" => flows.client_credentials = flow,
        "accessCode" => flows.authorization_code = flow,
        _ => return None,
    }
    Some(flows)
}

fn parse_oauth_flow(flow: Option<&Value>) -> Option<OAuthFlow> {
    let flow = flow?;

    let scopes = flow
        .get("scopes")
        .and_then(Value::as_object)
        .map(|obj| {
            obj.iter()
                .filter_map(|(k, v)| Some((k.clone(), v.as_str()?.to_string())))
                .collect()
        })
        .unwrap_or_default();

    Some(OAuthFlow {
        authorization_url: str_field(flow, "authorizationUrl").map(str::to_string),
        token_url: str_field(flow, "tokenUrl").map(str::to_string),
        refresh_url: str_field(flow, "refreshUrl").map(str::to_string),
        scopes,
    })
}

pub(crate) fn str_field<'v>(value: &'v Value, key: &str) -> Option<&'v str> {
    value.get(key).and_then(Value::as_str)
}

fn bool_field(value: &Value, key: &str) -> bool {
    value.get(key).and_then(Value::as_bool).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_select_content_type_in_document_order() {
        let keys = ["application/vnd.api+json", "multipart/form-data", "application/json"];
        assert_eq!(select_content_type(&keys), Some("application/json"));

        let keys = ["application/vnd.api+json", "multipart/form-data"];
        assert_eq!(select_content_type(&keys), Some("application/vnd.api+json"));

        let keys = ["multipart/form-data", "application/json"];
        assert_eq!(select_content_type(&keys), Some("multipart/form-data"));

        let keys = ["application/xml", "application/x-www-form-urlencoded"];
        assert_eq!(
            select_content_type(&keys),
            Some("application/x-www-form-urlencoded")
        );

        let keys = ["application/xml", "text/plain"];
        assert_eq!(select_content_type(&keys), None);
    }

    #[test]
    fn test_v2_base_url() {
        let doc = json!({"swagger": "2.0", "host": "api.example.com", "basePath": "/v1", "schemes": ["http", "https"]});
        assert_eq!(V2Dialect.declared_base_url(&doc), Some("http://api.example.com/v1".to_string()));

        let doc = json!({"swagger": "2.0", "host": "api.example.com"});
        assert_eq!(V2Dialect.declared_base_url(&doc), Some("https://api.example.com".to_string()));

        let doc = json!({"swagger": "2.0"});
        assert_eq!(V2Dialect.declared_base_url(&doc), None);
    }

    #[test]
    fn test_v3_base_url_with_variables() {
        let doc = json!({
            "openapi": "3.0.0",
            "servers": [{
                "url": "https://{env}.example.com:{port}/api",
                "variables": {"env": {"default": "staging"}, "port": {"default": "8443"}}
            }]
        });
        assert_eq!(
            V3Dialect.declared_base_url(&doc),
            Some("https://staging.example.com:8443/api".to_string())
        );
    }

    #[test]
    fn test_v2_basic_definition_normalized() {
        let doc = json!({
            "swagger": "2.0",
            "securityDefinitions": {
                "basicAuth": {"type": "basic"},
                "key": {"type": "apiKey", "in": "header", "name": "X-Key"},
                "oauth": {
                    "type": "oauth2",
                    "flow": "accessCode",
                    "authorizationUrl": "https://auth.example.com/authorize",
                    "tokenUrl": "https://auth.example.com/token",
                    "scopes": {"read": "Read access"}
                }
            }
        });
        let schemes = V2Dialect.security_schemes(Resolver::new(&doc)).unwrap();

        assert_eq!(schemes["basicAuth"], SecurityScheme::basic());
        assert_eq!(schemes["key"].scheme_type, SchemeType::ApiKey);
        assert_eq!(schemes["key"].location, Some(KeyLocation::Header));
        assert_eq!(schemes["key"].param_name.as_deref(), Some("X-Key"));

        let flows = schemes["oauth"].oauth_flows.as_ref().unwrap();
        let code = flows.authorization_code.as_ref().unwrap();
        assert_eq!(code.token_url.as_deref(), Some("https://auth.example.com/token"));
        assert_eq!(code.scopes["read"], "Read access");
        assert!(flows.implicit.is_none());
    }

    #[test]
    fn test_v2_form_content_type_from_consumes() {
        assert_eq!(form_content_type_v2(None), MULTIPART);
        let urlencoded = json!(["application/x-www-form-urlencoded"]);
        assert_eq!(form_content_type_v2(Some(&urlencoded)), URL_ENCODED);
        let both = json!(["application/x-www-form-urlencoded", "multipart/form-data"]);
        assert_eq!(form_content_type_v2(Some(&both)), MULTIPART);
    }

    #[test]
    fn test_build_parameter_types() {
        let v3 = json!({"name": "limit", "in": "query", "schema": {"type": "integer", "default": 20}});
        let schema = v3.get("schema").unwrap();
        let p = build_parameter(&v3, schema).unwrap();
        assert_eq!(p.param_type, "integer");
        assert_eq!(p.default, Some(json!(20)));
        assert!(!p.required);

        let v2 = json!({"name": "status", "in": "query", "type": "string", "enum": ["a", "b"]});
        let p = build_parameter(&v2, &v2).unwrap();
        assert_eq!(p.enum_values, Some(vec!["a".to_string(), "b".to_string()]));

        let path = json!({"name": "id", "in": "path"});
        let p = build_parameter(&path, &path).unwrap();
        assert!(p.required);
        assert_eq!(p.param_type, "string");

        let body = json!({"name": "payload", "in": "body", "schema": {}});
        assert!(build_parameter(&body, &body).is_none());
        let cookie = json!({"name": "session", "in": "cookie"});
        assert!(build_parameter(&cookie, &cookie).is_none());
    }
}
