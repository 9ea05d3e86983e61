//! Turn an endpoint plus caller inputs into a concrete path and header set
//!
//! Everything here is pure and total: unknown schemes, empty credentials and
//! missing values are skipped, never reported.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;
use tracing::debug;

use crate::middleware::auth::{Auth, Headers, RequestTarget};
use crate::openapi::model::{Credentials, Endpoint, ParamLocation, SecurityRequirement, SecurityScheme};

/// Caller-supplied parameter values keyed by parameter name
pub type ParamValues = IndexMap<String, String>;

/// `{name}` placeholder inside a path template
static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{([^{}/]+)\}").expect("Invalid placeholder regex")
});

/// Method, final path (with query) and headers for one call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaterializedRequest {
    pub method: String,
    pub path: String,
    pub headers: Headers,
}

/// Pick the requirement to apply: the first one fully covered by `creds`,
/// otherwise the first one declared
pub fn select_requirement<'s>(
    security: &'s [SecurityRequirement],
    creds: &Credentials,
) -> Option<&'s SecurityRequirement> {
    security
        .iter()
        .find(|requirement| creds.satisfies(requirement))
        .or_else(|| security.first())
}

/// Apply credentials for the chosen requirement to `base_path`
pub fn apply_security(
    base_path: &str,
    security: &[SecurityRequirement],
    schemes: &IndexMap<String, SecurityScheme>,
    creds: &Credentials,
) -> (String, Headers) {
    let mut target = RequestTarget::new(base_path);
    apply_security_to(&mut target, security, schemes, creds);
    (target.path, target.headers)
}

fn apply_security_to(
    target: &mut RequestTarget,
    security: &[SecurityRequirement],
    schemes: &IndexMap<String, SecurityScheme>,
    creds: &Credentials,
) {
    let Some(requirement) = select_requirement(security, creds) else {
        return;
    };

    for name in requirement.keys() {
        let (Some(scheme), Some(credential)) = (schemes.get(name), creds.get(name)) else {
            debug!(scheme = %name, "no scheme definition or credential, skipping");
            continue;
        };
        match Auth::for_scheme(scheme, credential) {
            Some(auth) => {
                debug!(scheme = %name, auth = auth.type_name(), "applying credential");
                auth.apply(target);
            }
            None => debug!(scheme = %name, kind = %scheme.label(), "scheme carries no credential"),
        }
    }
}

/// Replace `{name}` placeholders with supplied values; unsupplied ones stay literal
pub fn substitute_path(template: &str, values: &ParamValues) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures| {
            match values.get(&caps[1]).filter(|v| !v.is_empty()) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Build the full request for `endpoint`
pub fn materialize(
    endpoint: &Endpoint,
    schemes: &IndexMap<String, SecurityScheme>,
    creds: &Credentials,
    values: &ParamValues,
) -> MaterializedRequest {
    let mut target = RequestTarget::new(substitute_path(&endpoint.path, values));

    // A supplied value, even an empty one, overrides the default
    for param in endpoint.parameters_in(ParamLocation::Query) {
        let value = values
            .get(&param.name)
            .cloned()
            .or_else(|| param.default_as_string());
        match value {
            Some(value) if !value.is_empty() => {
                let name = urlencoding::encode(&param.name);
                let encoded = urlencoding::encode(&value);
                target.append_query(&name, &encoded);
            }
            _ => {}
        }
    }

    for param in endpoint.parameters_in(ParamLocation::Header) {
        if let Some(value) = values.get(&param.name).filter(|v| !v.is_empty()) {
            target.set_header(&param.name, value.clone());
        }
    }

    apply_security_to(&mut target, &endpoint.security, schemes, creds);

    MaterializedRequest {
        method: endpoint.method.to_uppercase(),
        path: target.path,
        headers: target.headers,
    }
}
