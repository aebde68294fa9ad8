//! Tile execution responses.

use std::time::Duration;

use serde_json::{Map, Value};

/// Prefix of outputs holding execution state rather than results.
pub const HIDDEN_OUTPUT_PREFIX: &str = "__";

/// Outcome of a tile execution.
///
/// A response is carried across the executions of a polling tile, so hidden
/// outputs and the execution interval persist between calls. Completion has
/// to be deferred again on every execution that wants to be called back.
#[derive(Debug, Clone)]
pub struct TileResponse {
    outputs: Map<String, Value>,
    failure: Option<String>,
    completed: bool,
    execution_interval: Option<Duration>,
    progress_message: Option<String>,
    progress_code: Option<String>,
}

impl Default for TileResponse {
    fn default() -> Self {
        Self {
            outputs: Map::new(),
            failure: None,
            completed: true,
            execution_interval: None,
            progress_message: None,
            progress_code: None,
        }
    }
}

impl TileResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepares the response for the next execution.
    pub(crate) fn begin_execution(&mut self) {
        self.completed = true;
    }

    /// Marks the execution failed; a failed tile is not called again.
    pub fn set_failed(&mut self, message: impl Into<String>) {
        self.failure = Some(message.into());
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    pub fn failure_message(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Sets the delay before the tile is called again.
    pub fn set_execution_interval(&mut self, interval: Duration) {
        self.execution_interval = Some(interval);
    }

    pub fn execution_interval(&self) -> Option<Duration> {
        self.execution_interval
    }

    pub fn set_progress(&mut self, code: impl Into<String>, message: impl Into<String>) {
        self.progress_code = Some(code.into());
        self.progress_message = Some(message.into());
    }

    pub fn progress_code(&self) -> Option<&str> {
        self.progress_code.as_deref()
    }

    pub fn progress_message(&self) -> Option<&str> {
        self.progress_message.as_deref()
    }

    pub fn set_output(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.outputs.insert(name.into(), value.into());
    }

    pub fn output(&self, name: &str) -> Option<&Value> {
        self.outputs.get(name)
    }

    /// Returns all outputs, including hidden execution state.
    pub fn outputs(&self) -> &Map<String, Value> {
        &self.outputs
    }

    /// Returns the outputs meant for users.
    pub fn visible_outputs(&self) -> Map<String, Value> {
        self.outputs
            .iter()
            .filter(|(name, _)| !name.starts_with(HIDDEN_OUTPUT_PREFIX))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn completes_by_default() {
        let response = TileResponse::new();
        assert!(response.is_completed());
        assert!(!response.is_failed());
    }

    #[test]
    fn hides_execution_state() {
        let mut response = TileResponse::new();
        response.set_output("__attempts", 2);
        response.set_output("responseStatus", 200);

        assert_eq!(response.output("__attempts"), Some(&json!(2)));
        let visible = response.visible_outputs();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible["responseStatus"], 200);
    }

    #[test]
    fn completion_is_reset_per_execution() {
        let mut response = TileResponse::new();
        response.set_completed(false);
        response.set_execution_interval(Duration::from_secs(2));

        response.begin_execution();
        assert!(response.is_completed());
        assert_eq!(response.execution_interval(), Some(Duration::from_secs(2)));
    }
}
