//! Local `$ref` pointer resolution
//!
//! Only same-document pointers (`#/components/schemas/User`) are supported.
//! The resolver follows exactly one pointer per call and never tracks what it
//! has visited: how deep a self-referential schema gets expanded is decided by
//! the caller (see [`super::synth`]).

use serde_json::Value;

use crate::errors::ResolutionError;

/// Resolves pointers against an immutable document tree
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    root: &'a Value,
}

impl<'a> Resolver<'a> {
    pub fn new(root: &'a Value) -> Self {
        Self { root }
    }

    /// The document this resolver walks
    pub fn root(&self) -> &'a Value {
        self.root
    }

    /// Resolve a `#/a/b/c` pointer to the fragment it names
    pub fn resolve(&self, reference: &str) -> Result<&'a Value, ResolutionError> {
        let Some(pointer) = reference.strip_prefix("#/") else {
            return Err(ResolutionError::UnsupportedReferenceKind {
                reference: reference.to_string(),
            });
        };

        let mut current = self.root;
        for raw in pointer.split('/') {
            let segment = unescape_segment(raw);
            let next = match current {
                Value::Object(map) => map.get(segment.as_str()),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            };
            current = next.ok_or_else(|| ResolutionError::DanglingReference {
                reference: reference.to_string(),
                segment: segment.clone(),
            })?;
        }

        Ok(current)
    }

    /// Follow `value.$ref` once when present, otherwise hand back `value`
    pub fn resolve_value(&self, value: &'a Value) -> Result<&'a Value, ResolutionError> {
        match ref_of(value) {
            Some(reference) => self.resolve(reference),
            None => Ok(value),
        }
    }
}

/// The `$ref` string of a fragment, if it has one
pub fn ref_of(value: &Value) -> Option<&str> {
    value.get("$ref").and_then(Value::as_str)
}

/// RFC 6901 escapes: `~1` is `/`, `~0` is `~`
fn unescape_segment(segment: &str) -> String {
    if segment.contains('~') {
        segment.replace("~1", "/").replace("~0", "~")
    } else {
        segment.to_string()
    }
}
