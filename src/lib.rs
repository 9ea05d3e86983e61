//! specdeck library interface
//!
//! Turns Swagger 2.0 and OpenAPI 3.x documents into a catalog of endpoints
//! and materializes them into ready-to-send HTTP requests.
//!
//! # Module Organization
//!
//! - [`openapi`] - Document loading, `$ref` resolution, example synthesis, endpoint extraction
//! - [`request`] - Materializing endpoints into concrete requests
//! - [`middleware`] - Applying security credentials
//! - [`client`] - Sending prepared requests
//! - [`errors`] - Error types (SpecdeckError, Result)
//! - [`status`] - Exit status codes (ExitStatus)
//! - [`core`] - Main execution logic

pub mod cli;
pub mod client;
pub mod config;
pub mod core;
pub mod errors;
pub mod middleware;
pub mod openapi;
pub mod request;
pub mod status;
pub mod table;
