//! Tile execution requests.

use std::time::Duration;

use restile_core::Result;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Inputs and execution state handed to a tile.
#[derive(Debug, Clone, Default)]
pub struct TileRequest {
    inputs: Map<String, Value>,
    first_execution: bool,
    duration: Duration,
}

impl TileRequest {
    /// Creates a request for the first execution of a tile.
    pub fn new(inputs: Map<String, Value>) -> Self {
        Self {
            inputs,
            first_execution: true,
            duration: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn with_first_execution(mut self, first_execution: bool) -> Self {
        self.first_execution = first_execution;
        self
    }

    /// Sets the time elapsed since the first execution started.
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn inputs(&self) -> &Map<String, Value> {
        &self.inputs
    }

    /// Deserializes the inputs into a typed structure.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(Value::Object(self.inputs.clone()))?)
    }

    pub fn is_first_execution(&self) -> bool {
        self.first_execution
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}
