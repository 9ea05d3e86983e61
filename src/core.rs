use std::time::Duration;

use clap::Parser;
use tracing::{debug, warn};

use crate::cli::{Args, Command, EndpointArgs, ListArgs, RequestArgs, SendArgs};
use crate::client::{HttpTransport, Transport};
use crate::config::{timeout_from_secs, Config};
use crate::errors::{Result, SpecdeckError};
use crate::middleware::auth::BasicAuth;
use crate::openapi::model::{Credentials, Endpoint};
use crate::openapi::{load_spec, Catalog, LoaderOptions};
use crate::request::{missing_fields, FormInput, ParamValues, Payload, PreparedRequest};
use crate::status::ExitStatus;
use crate::table;

/// Main entry point for the CLI.
///
/// Handles argument parsing and configuration loading, then dispatches to
/// the subcommand handler.
pub fn run(args: Vec<String>) -> ExitStatus {
    let parsed = match Args::try_parse_from(&args) {
        Ok(args) => args,
        Err(e) => {
            e.print().ok();
            return if e.kind() == clap::error::ErrorKind::DisplayHelp
                || e.kind() == clap::error::ErrorKind::DisplayVersion {
                ExitStatus::Success
            } else {
                ExitStatus::Error
            };
        }
    };

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Failed to load config: {}", e);
            Config::default()
        }
    };
    debug!(config_dir = %config.config_dir.display(), "Config loaded");

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => return handle_error(e.into()),
    };

    match runtime.block_on(program(parsed, config)) {
        Ok(status) => status,
        Err(e) => handle_error(e),
    }
}

pub async fn program(args: Args, config: Config) -> Result<ExitStatus> {
    let loader = loader_options(&args, &config);

    match args.command {
        Command::List(list) => list_endpoints(&list, &loader).await,
        Command::Show(target) => show_endpoint(&target, &loader).await,
        Command::Build(request) => build_request(&request, &loader, &config).await,
        Command::Send(send) => send_request(&send, &loader, &config).await,
    }
}

fn handle_error(error: SpecdeckError) -> ExitStatus {
    eprintln!("specdeck: error: {}", error);
    ExitStatus::Error
}

/// Relay and timeout for spec loading; `--relay-url ""` disables the relay
fn loader_options(args: &Args, config: &Config) -> LoaderOptions {
    let relay_url = match args.relay_url.as_deref() {
        Some("") => None,
        Some(relay) => Some(relay.to_string()),
        None => config.effective_relay_url(),
    };
    LoaderOptions { relay_url, timeout: config.timeout_duration() }
}

async fn load_catalog(spec: &str, loader: &LoaderOptions) -> Result<Catalog> {
    let doc = load_spec(spec, loader).await?;
    Catalog::from_document(&doc)
}

fn find_endpoint<'c>(catalog: &'c Catalog, target: &EndpointArgs) -> Result<&'c Endpoint> {
    catalog.find(&target.method, &target.path).ok_or_else(|| {
        SpecdeckError::Argument(format!(
            "no endpoint {} {} in '{}' (see `specdeck list`)",
            target.method.to_uppercase(),
            target.path,
            target.spec
        ))
    })
}

async fn list_endpoints(list: &ListArgs, loader: &LoaderOptions) -> Result<ExitStatus> {
    let catalog = load_catalog(&list.spec, loader).await?;

    println!("{} {}", catalog.title, catalog.version);
    if !catalog.base_url.is_empty() {
        println!("Base URL: {}", catalog.base_url);
    }
    println!();
    println!("{}", table::format_endpoints(&catalog, &list.tags));
    if let Some(schemes) = table::format_security_schemes(&catalog) {
        println!();
        println!("{}", schemes);
    }
    Ok(ExitStatus::Success)
}

async fn show_endpoint(target: &EndpointArgs, loader: &LoaderOptions) -> Result<ExitStatus> {
    let catalog = load_catalog(&target.spec, loader).await?;
    let endpoint = find_endpoint(&catalog, target)?;
    println!("{}", serde_json::to_string_pretty(endpoint)?);
    Ok(ExitStatus::Success)
}

/// Config credentials, then `-c` values, then `--basic` pairs encoded
fn collect_credentials(request: &RequestArgs, config: &Config) -> Credentials {
    let mut creds = config.credentials.clone();
    for cred in &request.credentials {
        creds.insert(cred.scheme.clone(), cred.value.as_str());
    }
    for basic in &request.basic {
        creds.insert(basic.scheme.clone(), BasicAuth::encode(&basic.username, basic.password.as_str()));
    }
    creds
}

fn json_body(request: &RequestArgs) -> Result<Option<String>> {
    let body = match (&request.data, &request.body_file) {
        (Some(data), _) => data.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)?,
        (None, None) => return Ok(None),
    };
    if let Err(e) = serde_json::from_str::<serde_json::Value>(&body) {
        warn!(error = %e, "Request body is not valid JSON, sending as-is");
    }
    Ok(Some(body))
}

fn prepare(catalog: &Catalog, request: &RequestArgs, config: &Config) -> Result<PreparedRequest> {
    let endpoint = find_endpoint(catalog, &request.endpoint)?;
    let values: ParamValues = request.params.iter().cloned().collect();

    let missing = missing_fields(endpoint, &values, &request.form);
    if !missing.is_empty() {
        let list: Vec<String> = missing.iter().map(ToString::to_string).collect();
        return Err(SpecdeckError::Argument(format!("missing required fields: {}", list.join(", "))));
    }

    let creds = collect_credentials(request, config);
    debug!(endpoint = %endpoint.id, credentials = ?creds, "Materializing request");
    PreparedRequest::build(
        endpoint,
        &catalog.security_schemes,
        &creds,
        &values,
        json_body(request)?,
        request.form.clone(),
    )
}

/// `--base-url`, then the config override, then the catalog's own
fn base_url(request: &RequestArgs, config: &Config, catalog: &Catalog) -> String {
    request
        .base_url
        .clone()
        .or_else(|| config.base_url.clone())
        .unwrap_or_else(|| catalog.base_url.clone())
}

async fn build_request(request: &RequestArgs, loader: &LoaderOptions, config: &Config) -> Result<ExitStatus> {
    let catalog = load_catalog(&request.endpoint.spec, loader).await?;
    let prepared = prepare(&catalog, request, config)?;
    print!("{}", format_request(&prepared, &base_url(request, config, &catalog)));
    Ok(ExitStatus::Success)
}

async fn send_request(send: &SendArgs, loader: &LoaderOptions, config: &Config) -> Result<ExitStatus> {
    let request = &send.request;
    let catalog = load_catalog(&request.endpoint.spec, loader).await?;
    let prepared = prepare(&catalog, request, config)?;

    let base_url = base_url(request, config, &catalog);
    if base_url.is_empty() {
        return Err(SpecdeckError::Argument(
            "the document declares no server; pass --base-url".to_string(),
        ));
    }

    let transport = HttpTransport::new(send_timeout(send.timeout, config))?;

    let response = tokio::select! {
        response = transport.send(&base_url, &prepared) => response,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\nInterrupted");
            return Ok(ExitStatus::Interrupted);
        }
    };

    if response.is_network_error() {
        eprintln!("Network Error");
    } else {
        eprintln!("HTTP {} ({} ms)", response.status, response.latency_ms);
    }
    match &response.body {
        serde_json::Value::String(text) => println!("{}", text),
        body => println!("{}", serde_json::to_string_pretty(body)?),
    }

    Ok(ExitStatus::from_http_status(response.status, send.check_status))
}

/// `--timeout` when it is a usable duration, otherwise the configured one
fn send_timeout(requested: Option<f64>, config: &Config) -> Duration {
    match requested {
        Some(secs) => timeout_from_secs(secs).unwrap_or_else(|| {
            warn!(timeout = secs, "Ignoring invalid --timeout");
            config.timeout_duration()
        }),
        None => config.timeout_duration(),
    }
}

/// Request line, headers, blank line, body
pub fn format_request(prepared: &PreparedRequest, base_url: &str) -> String {
    let mut out = format!("{} {}\n", prepared.method, prepared.url(base_url));
    for (name, value) in &prepared.headers {
        out.push_str(&format!("{}: {}\n", name, value));
    }
    let body = match &prepared.body {
        Payload::Empty => return out,
        Payload::Json { content_type, body } => {
            out.push_str(&format!("Content-Type: {}\n", content_type));
            body.clone()
        }
        Payload::UrlEncoded(fields) => {
            out.push_str("Content-Type: application/x-www-form-urlencoded\n");
            fields
                .iter()
                .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                .collect::<Vec<_>>()
                .join("&")
        }
        Payload::Multipart(inputs) => {
            out.push_str("Content-Type: multipart/form-data\n");
            inputs
                .iter()
                .map(|input| match input {
                    FormInput::Text { name, value } => format!("{}={}", name, value),
                    FormInput::File { name, path } => format!("{}@{}", name, path.display()),
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
    };
    out.push('\n');
    out.push_str(&body);
    out.push('\n');
    out
}
