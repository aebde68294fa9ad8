//! In-memory registry of REST endpoints.

use std::collections::BTreeMap;

use restile_core::{EndpointProperties, Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An endpoint as registered with the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredEndpoint {
    pub display_name: String,
    #[serde(flatten)]
    pub properties: EndpointProperties,
}

impl RegisteredEndpoint {
    pub fn new(display_name: impl Into<String>, properties: EndpointProperties) -> Self {
        Self {
            display_name: display_name.into(),
            properties,
        }
    }
}

/// Endpoints keyed by their reference.
///
/// Stands in for the host's endpoint storage when tiles run locally.
#[derive(Debug, Clone, Default)]
pub struct EndpointRegistry {
    endpoints: BTreeMap<String, RegisteredEndpoint>,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry from a JSON object of references to endpoints.
    ///
    /// ```json
    /// { "ep-1": { "displayName": "Users API", "url": "https://api.example.com/" } }
    /// ```
    pub fn from_json(value: Value) -> Result<Self> {
        let endpoints: BTreeMap<String, RegisteredEndpoint> = serde_json::from_value(value)
            .map_err(|e| {
                Error::configuration()
                    .with_message("Invalid endpoint registry")
                    .with_source(e)
            })?;
        Ok(Self { endpoints })
    }

    /// Registers an endpoint, returning the one it replaced.
    pub fn insert(
        &mut self,
        reference: impl Into<String>,
        endpoint: RegisteredEndpoint,
    ) -> Option<RegisteredEndpoint> {
        self.endpoints.insert(reference.into(), endpoint)
    }

    pub fn get(&self, reference: &str) -> Result<&RegisteredEndpoint> {
        self.endpoints.get(reference).ok_or_else(|| {
            Error::not_found().with_message(format!("REST Endpoint '{reference}' not found"))
        })
    }

    /// Replaces an `endpoint` input holding a reference with the registered
    /// properties. Inputs already carrying properties are left untouched.
    pub fn resolve_inputs(&self, inputs: &mut Map<String, Value>) -> Result<()> {
        if let Some(Value::String(reference)) = inputs.get("endpoint") {
            let properties = serde_json::to_value(&self.get(reference)?.properties)?;
            inputs.insert("endpoint".to_owned(), properties);
        }
        Ok(())
    }

    pub fn remove(&mut self, reference: &str) -> Option<RegisteredEndpoint> {
        self.endpoints.remove(reference)
    }

    /// Iterates over references and endpoints in reference order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RegisteredEndpoint)> {
        self.endpoints
            .iter()
            .map(|(reference, endpoint)| (reference.as_str(), endpoint))
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
