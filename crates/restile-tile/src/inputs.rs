//! Typed tile inputs.

use std::borrow::Cow;
use std::time::Duration;

use restile_client::RestRequest;
use restile_core::{EndpointProperties, HeaderRow, Method, Result};
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError};

/// Failure message for polling requests missing their parameters.
pub const ASYNC_PARAMETERS_FAIL: &str =
    "Asynchronous request failed because interval, timeout and expected response must be specified";

/// Treats `null` like an absent value.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Inputs of the endpoint validation tile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndpointInput {
    #[serde(default, deserialize_with = "null_as_default")]
    pub endpoint: EndpointProperties,
}

/// A configured REST call, shared by the preview and task tiles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallInput {
    #[serde(default, deserialize_with = "null_as_default")]
    pub endpoint: EndpointProperties,
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub method: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: Vec<HeaderRow>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: String,
}

impl CallInput {
    /// Returns the configured method, GET when none was chosen.
    pub fn method(&self) -> Result<Method> {
        match &self.method {
            Some(name) => Method::parse(name),
            None => Ok(Method::Get),
        }
    }

    /// Builds the REST request; header rows without a name are skipped.
    pub fn to_request(&self) -> Result<RestRequest> {
        let headers = self
            .headers
            .iter()
            .filter(|header| !header.name.trim().is_empty())
            .cloned()
            .collect();

        Ok(RestRequest::from_endpoint(&self.endpoint)?
            .with_path(&self.path)
            .with_method(self.method()?)
            .with_headers(headers)
            .with_body(&self.body))
    }
}

/// Inputs of the REST task tile.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_polling"))]
pub struct TaskInput {
    #[serde(flatten)]
    pub call: CallInput,
    #[serde(default, deserialize_with = "null_as_default")]
    pub expected_statuses: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub expected_response: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub poll: bool,
    /// Seconds between polls.
    #[serde(default, deserialize_with = "null_as_default")]
    pub interval: u64,
    /// Seconds after which polling gives up.
    #[serde(default, deserialize_with = "null_as_default")]
    pub timeout: u64,
}

impl TaskInput {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    /// Returns the expected status codes; empty means any status is accepted.
    pub fn expected_statuses(&self) -> Vec<&str> {
        self.expected_statuses
            .split(',')
            .map(str::trim)
            .filter(|status| !status.is_empty())
            .collect()
    }
}

fn validate_polling(input: &TaskInput) -> std::result::Result<(), ValidationError> {
    let incomplete =
        input.interval == 0 || input.timeout == 0 || input.expected_response.is_empty();
    if input.poll && incomplete {
        let error = ValidationError::new("polling").with_message(Cow::Borrowed(ASYNC_PARAMETERS_FAIL));
        return Err(error);
    }
    Ok(())
}
