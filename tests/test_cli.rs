//! Integration tests for the specdeck command line

mod common;

use common::fixtures::fixture_arg;
use common::{create_json_file, create_temp_file, specdeck, specdeck_with_env, ExitStatus, MockEnvironment};
use serde_json::json;

const V3: &str = "petstore-v3.json";
const V2: &str = "petstore-v2.json";

// =============================================================================
// list / show
// =============================================================================

#[test]
fn test_list_shows_info_and_endpoints() {
    let response = specdeck(&["list", &fixture_arg(V3)]);

    assert_eq!(response.exit_status, ExitStatus::Success, "{response}");
    assert!(response.contains("Swagger Petstore 1.0.0"));
    assert!(response.contains("Base URL: https://petstore.example.com/v1"));
    assert!(response.contains("/pets/{petId}/photo"));
    assert!(response.contains("/store/orders"));
    assert!(response.contains("apiKey (header: X-API-Key)"));
}

#[test]
fn test_list_filters_by_tag() {
    let response = specdeck(&["list", &fixture_arg(V2), "--tag", "store"]);

    assert_eq!(response.exit_status, ExitStatus::Success, "{response}");
    assert!(response.contains("/store/orders"));
    assert!(!response.contains("/pets/{petId}/photo"));
}

#[test]
fn test_show_prints_endpoint_json() {
    let response = specdeck(&["show", &fixture_arg(V3), "get", "/pets"]);

    assert_eq!(response.exit_status, ExitStatus::Success, "{response}");
    let json = response.json().expect("show prints JSON");
    assert_eq!(json["id"], "get-/pets");
    assert_eq!(json["method"], "GET");
    assert_eq!(json["parameters"][0]["name"], "limit");
    assert_eq!(json["responses"]["200"]["description"], "A list of pets");
}

#[test]
fn test_show_unknown_endpoint_fails() {
    let response = specdeck(&["show", &fixture_arg(V3), "patch", "/pets"]);

    assert_eq!(response.exit_status, ExitStatus::Error);
    assert!(response.stderr.contains("specdeck: error:"), "{response}");
    assert!(response.stderr.contains("PATCH /pets"));
}

#[test]
fn test_unparsable_document_fails() {
    let (_dir, path) = create_json_file(&json!({"info": {"title": "nope"}}));
    let response = specdeck(&["list", path.to_str().unwrap()]);

    assert_eq!(response.exit_status, ExitStatus::Error);
    assert!(response.stderr.contains("Unparsable document"), "{response}");
}

#[test]
fn test_dangling_reference_fails_at_load() {
    let (_dir, path) = create_json_file(&json!({
        "openapi": "3.0.0",
        "info": {"title": "t", "version": "1"},
        "paths": {"/x": {"get": {"parameters": [{"$ref": "#/components/parameters/Missing"}]}}}
    }));
    let response = specdeck(&["list", path.to_str().unwrap()]);

    assert_eq!(response.exit_status, ExitStatus::Error);
    assert!(response.stderr.contains("#/components/parameters/Missing"), "{response}");
}

#[test]
fn test_missing_spec_file_fails() {
    let response = specdeck(&["list", "/definitely/not/here.json"]);
    assert_eq!(response.exit_status, ExitStatus::Error);
    assert!(response.stderr.contains("specdeck: error:"));
}

// =============================================================================
// build
// =============================================================================

#[test]
fn test_build_substitutes_path_and_applies_api_key() {
    let response = specdeck(&[
        "build", &fixture_arg(V3), "get", "/pets/{petId}",
        "-p", "petId=7",
        "-p", "X-Request-Id=req-1",
        "-c", "api_key=k-123",
    ]);

    assert_eq!(response.exit_status, ExitStatus::Success, "{response}");
    assert_eq!(response.first_line(), "GET https://petstore.example.com/v1/pets/7");
    assert_eq!(response.header("X-Request-Id"), Some("req-1"));
    assert_eq!(response.header("X-API-Key"), Some("k-123"));
}

#[test]
fn test_build_query_defaults_and_fallback_requirement() {
    // No credentials: first requirement chosen, nothing applied
    let response = specdeck(&["build", &fixture_arg(V2), "get", "/pets", "-p", "status=sold"]);
    assert_eq!(response.exit_status, ExitStatus::Success, "{response}");
    assert_eq!(response.first_line(), "GET https://petstore.example.com/v1/pets?limit=20&status=sold");
    assert_eq!(response.header("Authorization"), None);

    // Only the second requirement is satisfied
    let response = specdeck(&["build", &fixture_arg(V2), "get", "/pets", "-c", "petstore_auth=tok"]);
    assert_eq!(response.header("Authorization"), Some("Bearer tok"), "{response}");
}

#[test]
fn test_build_json_body_defaults_to_example() {
    let response = specdeck(&["build", &fixture_arg(V3), "post", "/pets"]);

    assert_eq!(response.exit_status, ExitStatus::Success, "{response}");
    assert_eq!(response.header("Content-Type"), Some("application/json"));
    let body: serde_json::Value = serde_json::from_str(response.body().unwrap().trim()).unwrap();
    assert_eq!(body, json!({"name": "string", "tag": "string", "status": "available"}));
}

#[test]
fn test_build_json_body_from_file() {
    let (_dir, path) = create_temp_file("body.json", br#"{"name": "Rex"}"#);
    let response = specdeck(&[
        "build", &fixture_arg(V3), "post", "/pets", "--body-file", path.to_str().unwrap(),
    ]);

    assert_eq!(response.exit_status, ExitStatus::Success, "{response}");
    assert_eq!(response.body().unwrap().trim(), r#"{"name": "Rex"}"#);
}

#[test]
fn test_build_basic_credential_is_encoded() {
    let response = specdeck(&[
        "build", &fixture_arg(V3), "delete", "/pets/{petId}",
        "-p", "petId=3",
        "--basic", "basicAuth=user:pass",
    ]);

    assert_eq!(response.exit_status, ExitStatus::Success, "{response}");
    assert_eq!(response.first_line(), "DELETE https://petstore.example.com/v1/pets/3");
    assert_eq!(response.header("Authorization"), Some("Basic dXNlcjpwYXNz"));
}

#[test]
fn test_build_urlencoded_form() {
    let response = specdeck(&[
        "build", &fixture_arg(V3), "post", "/store/orders",
        "-f", "petId=5",
        "-f", "quantity=2",
    ]);

    assert_eq!(response.exit_status, ExitStatus::Success, "{response}");
    assert_eq!(response.header("Content-Type"), Some("application/x-www-form-urlencoded"));
    assert_eq!(response.body().unwrap().trim(), "petId=5&quantity=2");
}

#[test]
fn test_build_reports_missing_required_inputs() {
    let response = specdeck(&["build", &fixture_arg(V2), "post", "/pets/{petId}/photo"]);

    assert_eq!(response.exit_status, ExitStatus::Error);
    assert!(
        response.stderr.contains("missing required fields: Parameter: petId, Body Field: file"),
        "{response}"
    );
}

#[test]
fn test_build_base_url_override() {
    let response = specdeck(&[
        "build", &fixture_arg(V3), "get", "/health", "--base-url", "http://localhost:8080/",
    ]);
    assert_eq!(response.first_line(), "GET http://localhost:8080/health", "{response}");
}

#[test]
fn test_build_rejects_bad_form_field_syntax() {
    let response = specdeck(&["build", &fixture_arg(V3), "post", "/store/orders", "-f", "novalue"]);
    assert_eq!(response.exit_status, ExitStatus::Error);
}

// =============================================================================
// config
// =============================================================================

#[test]
fn test_config_credentials_and_cli_override() {
    let env = MockEnvironment::new();
    env.write_config(
        r#"
        [defaults]
        base_url = "https://staging.example.com"

        [credentials]
        api_key = "from-config"
        "#,
    );

    let response = specdeck_with_env(
        &["build", &fixture_arg(V3), "get", "/pets/{petId}", "-p", "petId=1"],
        &env,
    );
    assert_eq!(response.exit_status, ExitStatus::Success, "{response}");
    assert_eq!(response.first_line(), "GET https://staging.example.com/pets/1");
    assert_eq!(response.header("X-API-Key"), Some("from-config"));

    let response = specdeck_with_env(
        &["build", &fixture_arg(V3), "get", "/pets/{petId}", "-p", "petId=1", "-c", "api_key=from-cli"],
        &env,
    );
    assert_eq!(response.header("X-API-Key"), Some("from-cli"), "{response}");
}

#[test]
fn test_invalid_config_warns_and_continues() {
    let env = MockEnvironment::new();
    env.write_config("[defaults\nbase_url = ");

    let response = specdeck_with_env(&["list", &fixture_arg(V3)], &env);
    assert_eq!(response.exit_status, ExitStatus::Success, "{response}");
    assert!(response.stderr.contains("Warning: Failed to load config"));
}

#[test]
fn test_infinite_timeout_in_config_is_ignored() {
    let env = MockEnvironment::new();
    env.write_config("[defaults]\ntimeout = inf\n");

    let response = specdeck_with_env(&["list", &fixture_arg(V3)], &env);
    assert_eq!(response.exit_status, ExitStatus::Success, "{response}");
    assert!(response.contains("Swagger Petstore"));
}

#[test]
fn test_debug_flag_enables_logging() {
    let response = specdeck(&["--debug", "list", &fixture_arg(V3)]);
    assert_eq!(response.exit_status, ExitStatus::Success, "{response}");
    assert!(response.stderr.contains("Catalog built"), "{response}");
}

#[test]
fn test_help_exits_successfully() {
    let response = specdeck(&["--help"]);
    assert_eq!(response.exit_status, ExitStatus::Success);
    assert!(response.contains("build"));
    assert!(response.contains("send"));
}
