#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod control;
mod descriptor;
pub mod forms;
mod host;
mod options;
mod row;
mod schema;
mod session;
mod validate;

pub use control::{ControlHandle, Controls};
pub use descriptor::{Field, FormDescriptor, PostRenderHook};
pub use host::{EntitySummary, ErrorDetail, HostBridge, HostContext, HostError};
pub use options::{
    FieldEvent, FieldOptions, OptionSource, RowSetup, SelectOption, ToolbarAction,
    ValueDependency, Widget,
};
pub use row::{OutputRow, RowKind, row_kind};
pub use schema::{FieldSchema, FieldType};
pub use session::{
    ENDPOINT_QUERY_FAILED, ENUM_ERROR, FormSession, PREVIEW_FAILED, PREVIEW_FAILED_DETAIL,
    PREVIEW_UNAVAILABLE, REQUIRED_ERROR, RenderState,
};
pub use validate::{
    DUPLICATE_STATUS_ERROR, HTTP_STATUS_CODES, INVALID_PATH_ERROR, INVALID_STATUS_ERROR,
    ValidationResult, Validator, validate_body, validate_expected_response,
    validate_expected_statuses, validate_path,
};

/// Tracing target for form sessions.
pub const TRACING_TARGET: &str = "restile_form";
