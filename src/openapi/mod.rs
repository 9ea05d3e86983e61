//! OpenAPI/Swagger ingestion
//!
//! Supports Swagger 2.0 and OpenAPI 3.x JSON documents. The pipeline is
//! [`resolver`] → [`synth`] → [`extractor`], producing a [`Catalog`] of
//! [`Endpoint`]s that [`crate::request`] turns into concrete requests.

pub mod dialect;
pub mod document;
pub mod extractor;
pub mod model;
pub mod resolver;
pub mod synth;

pub use dialect::{SpecDialect, V2Dialect, V3Dialect};
pub use document::{load_file, load_spec, Dialect, LoaderOptions, SpecDocument};
pub use extractor::{extract, extract_with, Catalog};
pub use model::{
    Credentials, Endpoint, FormField, HttpScheme, KeyLocation, ParamLocation, Parameter,
    RequestBody, ResponseExample, SchemeType, SecurityRequirement, SecurityScheme, Tag,
};
pub use resolver::Resolver;
pub use synth::Synthesizer;
