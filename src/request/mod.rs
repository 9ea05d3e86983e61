//! Request building module
//!
//! Materializes catalog endpoints into concrete requests: path substitution,
//! query and header parameters, security credentials and the request body.

mod builder;
mod materialize;
mod validate;

pub use builder::{FormInput, Payload, PreparedRequest};
pub use materialize::{apply_security, materialize, select_requirement, substitute_path, MaterializedRequest, ParamValues};
pub use validate::{missing_fields, MissingField};
