#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod binding;
mod endpoint;
mod error;
mod header;
mod method;

pub use binding::{binding_expression, is_variable_binding};
pub use endpoint::EndpointProperties;
pub use error::{BoxedError, Error, ErrorKind, Result};
pub use header::HeaderRow;
pub use method::{BAD_METHOD_ERROR, Method};

/// Data type tag under which REST endpoints are registered with the host.
pub const ENDPOINT_TYPE_TAG: &str = "rest-sample:RESTEndpoint";

/// Operation id of the response preview helper.
pub const PREVIEW_OPERATION: &str = "rest-sample:RESTPreview";
