//! Example synthesis from schema shape
//!
//! Produces a plausible sample value for a (possibly `$ref`-laden) schema.
//! Never fails: unknown shapes degrade to `{}` and runaway recursion through
//! self-referential schemas stops at [`MAX_DEPTH`] with a placeholder string.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use super::resolver::{ref_of, Resolver};

/// Depth beyond which expansion stops
pub const MAX_DEPTH: usize = 5;

/// Returned in place of a value nested deeper than [`MAX_DEPTH`]
pub const CIRCULAR_PLACEHOLDER: &str = "possible_circular_ref";

/// Example for `format: uuid`
pub const EXAMPLE_UUID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

/// Key used for the sample entry of a free-form map
const ADDITIONAL_PROP_KEY: &str = "additionalProp1";

/// Builds example values for schemas of one document
#[derive(Debug, Clone)]
pub struct Synthesizer<'a> {
    resolver: Resolver<'a>,
    timestamp: String,
}

impl<'a> Synthesizer<'a> {
    /// Synthesizer whose `date-time` examples use the current time, captured once
    pub fn new(resolver: Resolver<'a>) -> Self {
        Self::with_timestamp(resolver, Utc::now())
    }

    /// Synthesizer with a fixed `date-time` example
    pub fn with_timestamp(resolver: Resolver<'a>, at: DateTime<Utc>) -> Self {
        Self {
            resolver,
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn resolver(&self) -> Resolver<'a> {
        self.resolver
    }

    /// Example for a top-level schema
    pub fn example(&self, schema: &Value) -> Value {
        self.synthesize(schema, 0)
    }

    /// Example rendered as 2-space indented JSON
    pub fn example_json(&self, schema: &Value) -> String {
        let value = self.example(schema);
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }

    /// Example for `schema` found `depth` levels below the top-level schema
    pub fn synthesize(&self, schema: &Value, depth: usize) -> Value {
        if depth > MAX_DEPTH {
            return Value::String(CIRCULAR_PLACEHOLDER.to_string());
        }

        let Value::Object(node) = schema else {
            return empty_object();
        };

        if let Some(reference) = ref_of(schema) {
            return match self.resolver.resolve(reference) {
                Ok(target) => self.synthesize(target, depth + 1),
                Err(e) => {
                    tracing::debug!(error = %e, "Unresolvable $ref in schema, using empty example");
                    empty_object()
                }
            };
        }

        if let Some(members) = node.get("allOf").and_then(Value::as_array) {
            let mut combined = Map::new();
            for member in members {
                if let Value::Object(part) = self.synthesize(member, depth + 1) {
                    combined.extend(part);
                }
            }
            return Value::Object(combined);
        }

        if let Some(example) = node.get("example").filter(|v| !v.is_null()) {
            return example.clone();
        }

        let schema_type = node.get("type").and_then(Value::as_str);
        let properties = node.get("properties").and_then(Value::as_object);

        match schema_type {
            Some("object") => self.object_example(node, depth),
            None if properties.is_some() => self.object_example(node, depth),
            Some("array") => match node.get("items") {
                Some(items) => Value::Array(vec![self.synthesize(items, depth + 1)]),
                None => Value::Array(Vec::new()),
            },
            Some("string") => self.string_example(node),
            Some("number") | Some("integer") => Value::from(0),
            Some("boolean") => Value::Bool(true),
            _ => empty_object(),
        }
    }

    fn object_example(&self, node: &Map<String, Value>, depth: usize) -> Value {
        let mut obj = Map::new();

        if let Some(properties) = node.get("properties").and_then(Value::as_object) {
            for (name, prop_schema) in properties {
                obj.insert(name.clone(), self.synthesize(prop_schema, depth + 1));
            }
        } else if let Some(extra) = node.get("additionalProperties").filter(|v| v.is_object()) {
            obj.insert(ADDITIONAL_PROP_KEY.to_string(), self.synthesize(extra, depth + 1));
        }

        Value::Object(obj)
    }

    fn string_example(&self, node: &Map<String, Value>) -> Value {
        match node.get("format").and_then(Value::as_str) {
            Some("date-time") => return Value::String(self.timestamp.clone()),
            Some("uuid") => return Value::String(EXAMPLE_UUID.to_string()),
            _ => {}
        }

        node.get("enum")
            .and_then(Value::as_array)
            .and_then(|values| values.first())
            .cloned()
            .unwrap_or_else(|| Value::String("string".to_string()))
    }
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}
