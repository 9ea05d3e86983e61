//! CLI argument parsing

pub mod args;

// Re-exports
pub use args::{Args, BasicArg, Command, CredentialArg, EndpointArgs, ListArgs, RequestArgs, SendArgs};
