//! Request middleware
//!
//! Mutations applied to a request target after it has been materialized.

pub mod auth;

pub use auth::{set_header, Auth, Headers, RequestTarget};
