#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod executor;
mod host;
mod inputs;
mod registry;
mod request;
mod response;
mod tile;
pub mod tiles;

pub use executor::{DEFAULT_INTERVAL, ExecutorConfig, TileExecutor};
pub use host::LocalHost;
pub use inputs::{ASYNC_PARAMETERS_FAIL, CallInput, EndpointInput, TaskInput};
pub use registry::{EndpointRegistry, RegisteredEndpoint};
pub use request::TileRequest;
pub use response::{HIDDEN_OUTPUT_PREFIX, TileResponse};
pub use tile::Tile;
pub use tiles::{EndpointTile, PreviewTile, TaskTile};
