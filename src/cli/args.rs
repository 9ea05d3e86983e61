//! Command-line arguments

use std::fmt;
use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

use crate::request::FormInput;

/// A string whose value never shows up in `Debug` or `Display` output
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecretString(pub String);

impl SecretString {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "SecretString(\"\")")
        } else {
            write!(f, "SecretString(\"[REDACTED]\")")
        }
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "")
        } else {
            write!(f, "[REDACTED]")
        }
    }
}

/// `-c scheme=value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialArg {
    pub scheme: String,
    pub value: SecretString,
}

impl std::str::FromStr for CredentialArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (scheme, value) = parse_key_value(s)?;
        Ok(Self { scheme, value: SecretString(value) })
    }
}

/// `--basic scheme=user:pass`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicArg {
    pub scheme: String,
    pub username: String,
    pub password: SecretString,
}

impl std::str::FromStr for BasicArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (scheme, pair) = parse_key_value(s)?;
        let (username, password) = pair
            .split_once(':')
            .ok_or_else(|| format!("expected scheme=user:pass, got '{}'", s))?;
        Ok(Self {
            scheme,
            username: username.to_string(),
            password: SecretString(password.to_string()),
        })
    }
}

/// Split `name=value` at the first `=`; the name must be non-empty
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected name=value, got '{}'", s)),
    }
}

/// specdeck - turn OpenAPI/Swagger documents into ready-to-send HTTP requests
#[derive(Parser, Debug, Clone)]
#[command(name = "specdeck", version, about, long_about = None)]
pub struct Args {
    /// Print debug logs to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// CORS relay prefix used when a remote spec cannot be fetched directly
    #[arg(long, global = true, value_name = "URL")]
    pub relay_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List the endpoints of a spec, grouped by tag
    List(ListArgs),
    /// Show one endpoint as JSON
    Show(EndpointArgs),
    /// Materialize a request without sending it
    Build(RequestArgs),
    /// Materialize and send a request
    Send(SendArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ListArgs {
    /// Spec file path or http(s) URL
    #[arg(value_name = "SPEC")]
    pub spec: String,

    /// Only list endpoints carrying this tag (repeatable)
    #[arg(short = 't', long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct EndpointArgs {
    /// Spec file path or http(s) URL
    #[arg(value_name = "SPEC")]
    pub spec: String,

    /// HTTP method (case-insensitive)
    #[arg(value_name = "METHOD")]
    pub method: String,

    /// Path template exactly as declared, e.g. /pets/{petId}
    #[arg(value_name = "PATH")]
    pub path: String,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RequestArgs {
    #[command(flatten)]
    pub endpoint: EndpointArgs,

    /// Parameter value (repeatable)
    #[arg(short = 'p', long = "param", value_name = "NAME=VALUE", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,

    /// Credential for a security scheme (repeatable)
    #[arg(short = 'c', long = "credential", value_name = "SCHEME=VALUE")]
    pub credentials: Vec<CredentialArg>,

    /// HTTP basic credential, base64-encoded before use (repeatable)
    #[arg(long = "basic", value_name = "SCHEME=USER:PASS")]
    pub basic: Vec<BasicArg>,

    /// JSON request body
    #[arg(short = 'd', long = "data", value_name = "JSON", conflicts_with = "body_file")]
    pub data: Option<String>,

    /// Read the JSON request body from a file
    #[arg(long = "body-file", value_name = "FILE")]
    pub body_file: Option<PathBuf>,

    /// Form field, `name=value` or `name@file` (repeatable)
    #[arg(short = 'f', long = "form", value_name = "FIELD", value_parser = FormInput::parse)]
    pub form: Vec<FormInput>,

    /// Base URL replacing the one declared by the document
    #[arg(long = "base-url", value_name = "URL")]
    pub base_url: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct SendArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<f64>,

    /// Exit with an error status when the response is not 2xx
    #[arg(long = "check-status")]
    pub check_status: bool,
}
