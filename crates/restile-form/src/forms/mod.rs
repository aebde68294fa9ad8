//! The plugin's form descriptors.

mod config;
mod endpoint;
mod result;

pub use config::{ENDPOINT_FIELD, PREVIEW_FIELD, config_form};
pub use endpoint::endpoint_form;
pub use result::{OUTPUT_FIELD, result_form};
