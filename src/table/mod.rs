//! Table output formatting
//!
//! Renders a catalog as ASCII tables: one endpoint table grouped by tag and
//! one table of security schemes.

use comfy_table::{Attribute, Cell, ContentArrangement, Table};

use crate::openapi::model::Endpoint;
use crate::openapi::Catalog;

/// Endpoint table; an empty `tags` filter keeps every group
pub fn format_endpoints(catalog: &Catalog, tags: &[String]) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        ["Tag", "Method", "Path", "Summary", "Auth"]
            .into_iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
    );

    let mut rows = 0;
    for (tag, endpoints) in catalog.endpoints_by_tag() {
        if !tags.is_empty() && !tags.iter().any(|t| t == tag) {
            continue;
        }
        for (i, endpoint) in endpoints.iter().enumerate() {
            // tag name only on the first row of its group
            let tag_cell = if i == 0 { Cell::new(tag).add_attribute(Attribute::Bold) } else { Cell::new("") };
            table.add_row(vec![
                tag_cell,
                Cell::new(endpoint.method.to_uppercase()),
                Cell::new(&endpoint.path),
                Cell::new(&endpoint.summary),
                Cell::new(auth_summary(endpoint)),
            ]);
            rows += 1;
        }
    }

    if rows == 0 {
        return "(no endpoints)".to_string();
    }
    table.to_string()
}

/// Security scheme table, `None` when the catalog declares no schemes
pub fn format_security_schemes(catalog: &Catalog) -> Option<String> {
    if catalog.security_schemes.is_empty() {
        return None;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        ["Scheme", "Type", "Description"]
            .into_iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
    );
    for (name, scheme) in &catalog.security_schemes {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(scheme.label()),
            Cell::new(scheme.description.as_deref().unwrap_or("")),
        ]);
    }
    Some(table.to_string())
}

/// `a + b | c` for requirements `[{a, b}, {c}]`, `-` when unsecured
fn auth_summary(endpoint: &Endpoint) -> String {
    if !endpoint.is_secured() {
        return "-".to_string();
    }
    endpoint
        .security
        .iter()
        .map(|requirement| {
            if requirement.is_empty() {
                "none".to_string()
            } else {
                requirement.keys().map(String::as_str).collect::<Vec<_>>().join(" + ")
            }
        })
        .collect::<Vec<_>>()
        .join(" | ")
}
