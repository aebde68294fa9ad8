#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod client;
mod config;
mod error;
mod request;
mod response;

pub use client::RestClient;
pub use config::{ClientConfig, DEFAULT_MAX_RESPONSE_BYTES, DEFAULT_TIMEOUT_SECS};
pub use error::{Error, IO_ERROR, MALFORMED_ERROR, Result};
pub use request::RestRequest;
pub use response::{RestResponse, STATUS_LINE_HEADER};

/// Tracing target for REST client operations.
pub const TRACING_TARGET: &str = "restile_client";
