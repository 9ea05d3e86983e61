//! HTTP client functionality

pub mod http;

pub use http::{HttpTransport, Transport, TransportResponse, USER_AGENT_STRING};
