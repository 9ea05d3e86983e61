//! Required-input checks run before a request is built

use std::fmt;

use super::builder::FormInput;
use super::materialize::ParamValues;
use crate::openapi::model::Endpoint;

/// A required input the caller did not supply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingField {
    Parameter(String),
    BodyField(String),
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingField::Parameter(name) => write!(f, "Parameter: {}", name),
            MissingField::BodyField(name) => write!(f, "Body Field: {}", name),
        }
    }
}

/// List every required parameter and form field without a non-empty value
pub fn missing_fields(endpoint: &Endpoint, values: &ParamValues, form: &[FormInput]) -> Vec<MissingField> {
    let mut missing: Vec<MissingField> = endpoint
        .parameters
        .iter()
        .filter(|p| p.required)
        .filter(|p| values.get(&p.name).is_none_or(|v| v.is_empty()))
        .map(|p| MissingField::Parameter(p.name.clone()))
        .collect();

    if let Some(body) = endpoint.request_body.as_ref().filter(|b| b.is_form()) {
        missing.extend(
            body.form_fields
                .iter()
                .filter(|f| f.required)
                .filter(|f| !form.iter().any(|input| input.name() == f.name && !input.is_empty()))
                .map(|f| MissingField::BodyField(f.name.clone())),
        );
    }

    missing
}
