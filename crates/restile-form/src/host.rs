//! Interface to the application hosting the forms.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Entity registered with the host, as offered in select lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySummary {
    pub display_name: String,
    pub reference: String,
}

impl EntitySummary {
    pub fn new(display_name: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            reference: reference.into(),
        }
    }
}

/// One problem reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
}

/// Failure of a host request, carrying the host's error details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{}", self.first_message().unwrap_or("host request failed"))]
pub struct HostError {
    pub errors: Vec<ErrorDetail>,
}

impl HostError {
    /// Creates an error with a single detail.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            errors: vec![ErrorDetail {
                message: message.into(),
            }],
        }
    }

    /// Returns the text of the first reported detail.
    pub fn first_message(&self) -> Option<&str> {
        self.errors.first().map(|detail| detail.message.as_str())
    }
}

impl From<restile_core::Error> for HostError {
    fn from(error: restile_core::Error) -> Self {
        Self::new(error.user_message())
    }
}

/// Asynchronous services the host offers to forms.
#[async_trait]
pub trait HostBridge: Send + Sync {
    /// Lists the entities registered under a data type tag.
    async fn query_entities_by_type(&self, type_tag: &str) -> Result<Vec<EntitySummary>, HostError>;

    /// Runs a named operation with the given inputs and returns its outputs.
    async fn invoke_named_operation(
        &self,
        operation_id: &str,
        inputs: Map<String, Value>,
    ) -> Result<Map<String, Value>, HostError>;

    /// Reports a failure through the host's standard error channel.
    fn report_error(&self, error: &HostError);

    /// Shows a message to the user.
    fn show_user_message(&self, text: &str);
}

/// What the host tells a form about the context it is rendered in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostContext {
    /// Whether the form is shown in view mode.
    pub read_only: bool,
    /// Inputs recorded for a finished task run.
    pub recorded_inputs: Option<Map<String, Value>>,
}

impl HostContext {
    pub fn editable() -> Self {
        Self::default()
    }

    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_recorded_inputs(mut self, inputs: Map<String, Value>) -> Self {
        self.recorded_inputs = Some(inputs);
        self
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Host double recording every interaction.
    #[derive(Default)]
    pub struct RecordingHost {
        pub entities: Option<Vec<EntitySummary>>,
        pub outputs: Option<Map<String, Value>>,
        pub failure: Option<HostError>,
        pub invocations: Mutex<Vec<(String, Map<String, Value>)>>,
        pub reported: Mutex<Vec<HostError>>,
        pub messages: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl HostBridge for RecordingHost {
        async fn query_entities_by_type(
            &self,
            _type_tag: &str,
        ) -> Result<Vec<EntitySummary>, HostError> {
            match (&self.entities, &self.failure) {
                (Some(entities), _) => Ok(entities.clone()),
                (None, Some(failure)) => Err(failure.clone()),
                (None, None) => Ok(Vec::new()),
            }
        }

        async fn invoke_named_operation(
            &self,
            operation_id: &str,
            inputs: Map<String, Value>,
        ) -> Result<Map<String, Value>, HostError> {
            self.invocations
                .lock()
                .unwrap()
                .push((operation_id.to_owned(), inputs));
            match (&self.outputs, &self.failure) {
                (Some(outputs), _) => Ok(outputs.clone()),
                (None, Some(failure)) => Err(failure.clone()),
                (None, None) => Ok(Map::new()),
            }
        }

        fn report_error(&self, error: &HostError) {
            self.reported.lock().unwrap().push(error.clone());
        }

        fn show_user_message(&self, text: &str) {
            self.messages.lock().unwrap().push(text.to_owned());
        }
    }
}
