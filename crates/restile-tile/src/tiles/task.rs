//! REST task tile with optional asynchronous polling.

use async_trait::async_trait;
use regex::Regex;
use restile_client::{RestClient, RestResponse};
use serde_json::Value;
use validator::Validate;

use crate::inputs::TaskInput;
use crate::{Tile, TileRequest, TileResponse};

const TRACING_TARGET: &str = "restile_tile::task";

/// Hidden output counting the polling attempts.
pub const ATTEMPTS_OUTPUT: &str = "__attempts";

pub const ASYNC_PROGRESS_CODE: &str = "Polling";
pub const ASYNC_PROGRESS_MESSAGE: &str = "Asynchronous request has been polling for";
pub const ASYNC_TIMEOUT_FAIL: &str = "Asynchronous request timed out after";
pub const EXPECTED_RESPONSE_FAIL: &str = "Request failed with unexpected response";

/// Executes a configured REST call and checks the response against the
/// expected statuses and body expression.
///
/// With polling enabled the first execution only schedules the task; every
/// later execution issues the call until the response matches or the
/// timeout elapses.
#[derive(Debug, Clone)]
pub struct TaskTile {
    client: RestClient,
}

impl TaskTile {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }

    async fn call(&self, input: &TaskInput) -> restile_core::Result<RestResponse> {
        let rest_request = input.call.to_request()?;
        self.client.execute(&rest_request).await
    }

    /// Returns whether the response meets the expectations of the task.
    fn is_expected(input: &TaskInput, status: u16, body: &str) -> restile_core::Result<bool> {
        let statuses = input.expected_statuses();
        let status = status.to_string();
        if !statuses.is_empty() && !statuses.contains(&status.as_str()) {
            tracing::info!(
                target: TRACING_TARGET,
                status = %status,
                "Response status was not one of the expected statuses"
            );
            return Ok(false);
        }

        if !input.expected_response.is_empty() {
            let expression = Regex::new(&input.expected_response).map_err(|e| {
                restile_core::Error::invalid_input()
                    .with_message(e.to_string())
                    .with_source(e)
            })?;
            if !expression.is_match(body) {
                tracing::info!(
                    target: TRACING_TARGET,
                    "Response body did not match the expected expression"
                );
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Prepares the first execution of a polling task.
    fn schedule(input: &TaskInput, response: &mut TileResponse) {
        if let Err(errors) = input.validate() {
            let message = restile_core::Error::from(errors).user_message();
            tracing::error!(target: TRACING_TARGET, "{message}");
            response.set_failed(message);
            return;
        }

        response.set_output(ATTEMPTS_OUTPUT, 1);
        response.set_execution_interval(input.interval());
        response.set_completed(false);
        tracing::info!(
            target: TRACING_TARGET,
            interval_secs = input.interval,
            timeout_secs = input.timeout,
            "Starting asynchronous request"
        );
    }

    /// Decides whether a polling task continues after an unexpected response.
    fn poll_again(input: &TaskInput, request: &TileRequest, response: &mut TileResponse) {
        let duration = request.duration().as_secs();
        let attempts = response
            .output(ATTEMPTS_OUTPUT)
            .and_then(Value::as_u64)
            .unwrap_or(1);

        tracing::info!(
            target: TRACING_TARGET,
            attempts,
            duration_secs = duration,
            "Response did not match expectations"
        );

        if duration >= input.timeout {
            let message = format!("{ASYNC_TIMEOUT_FAIL} {duration} sec");
            tracing::error!(target: TRACING_TARGET, "{message}");
            response.set_failed(message);
            return;
        }

        response.set_output(ATTEMPTS_OUTPUT, attempts + 1);
        response.set_progress(
            ASYNC_PROGRESS_CODE,
            format!("{ASYNC_PROGRESS_MESSAGE} {duration} sec"),
        );
        response.set_completed(false);
    }
}

#[async_trait]
impl Tile for TaskTile {
    fn name(&self) -> &'static str {
        "task"
    }

    async fn handle_execute(&self, request: &TileRequest, response: &mut TileResponse) {
        tracing::info!(target: TRACING_TARGET, "Executing REST task");

        let input: TaskInput = match request.parse() {
            Ok(input) => input,
            Err(error) => {
                response.set_failed(error.user_message());
                return;
            }
        };

        if input.poll && request.is_first_execution() {
            Self::schedule(&input, response);
            return;
        }

        let rest_response = match self.call(&input).await {
            Ok(rest_response) => rest_response,
            Err(error) => {
                tracing::info!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Failed to execute REST task"
                );
                response.set_failed(error.user_message());
                return;
            }
        };

        let status = rest_response.status();
        let body = match rest_response.body() {
            Ok(body) => body,
            Err(error) => {
                response.set_failed(error.user_message());
                return;
            }
        };

        response.set_output("responseStatus", status);
        response.set_output(
            "responseHeaders",
            Value::Object(
                rest_response
                    .headers()
                    .iter()
                    .map(|(name, value)| (name.clone(), Value::from(value.as_str())))
                    .collect(),
            ),
        );
        response.set_output("responseBody", body);

        match Self::is_expected(&input, status, body) {
            Ok(true) => {
                tracing::info!(target: TRACING_TARGET, status, "Request completed successfully");
            }
            Ok(false) if input.poll => Self::poll_again(&input, request, response),
            Ok(false) => {
                tracing::error!(target: TRACING_TARGET, "{EXPECTED_RESPONSE_FAIL}");
                response.set_failed(EXPECTED_RESPONSE_FAIL);
            }
            Err(error) => {
                tracing::error!(target: TRACING_TARGET, error = %error, "Invalid expected response");
                response.set_failed(error.user_message());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::Router;
    use axum::routing::{get, post};
    use restile_client::ClientConfig;
    use serde_json::{Map, json};

    use super::*;
    use crate::inputs::ASYNC_PARAMETERS_FAIL;
    use crate::tiles::testing::{pollable, serve};

    fn tile() -> TaskTile {
        TaskTile::new(RestClient::new(ClientConfig::default()).unwrap())
    }

    fn inputs(value: Value) -> Map<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    async fn execute(request: &TileRequest, response: &mut TileResponse) {
        response.begin_execution();
        tile().handle_execute(request, response).await;
    }

    #[tokio::test]
    async fn synchronous_success() {
        let base = serve(Router::new().route(
            "/test",
            post(|body: String| async move { ([("content-type", "text/plain")], body) }),
        ))
        .await;

        let request = TileRequest::new(inputs(json!({
            "endpoint": { "url": base },
            "path": "/test",
            "method": "POST",
            "body": "<response>Success</response>",
            "expectedStatuses": "200",
            "expectedResponse": "Success",
        })));
        let mut response = TileResponse::new();
        execute(&request, &mut response).await;

        assert!(!response.is_failed(), "{:?}", response.failure_message());
        assert!(response.is_completed());
        assert_eq!(response.output("responseStatus"), Some(&json!(200)));
        assert_eq!(
            response.output("responseBody"),
            Some(&json!("<response>Success</response>"))
        );
        assert_eq!(response.output("responseHeaders").unwrap()["Content-Type"], "text/plain");
    }

    #[tokio::test]
    async fn synchronous_unexpected_status() {
        let base = serve(Router::new()).await;

        let request = TileRequest::new(inputs(json!({
            "endpoint": { "url": base },
            "path": "/missing",
            "expectedStatuses": "200,201",
        })));
        let mut response = TileResponse::new();
        execute(&request, &mut response).await;

        assert_eq!(response.failure_message(), Some(EXPECTED_RESPONSE_FAIL));
        assert_eq!(response.output("responseStatus"), Some(&json!(404)));
    }

    #[tokio::test]
    async fn statuses_match_exactly() {
        let base = serve(Router::new().route("/ok", get(|| async { "ok" }))).await;

        let request = TileRequest::new(inputs(json!({
            "endpoint": { "url": base },
            "path": "/ok",
            "expectedStatuses": "1200, 201",
        })));
        let mut response = TileResponse::new();
        execute(&request, &mut response).await;

        assert_eq!(response.failure_message(), Some(EXPECTED_RESPONSE_FAIL));
    }

    #[tokio::test]
    async fn invalid_expression_fails() {
        let base = serve(Router::new().route("/ok", get(|| async { "ok" }))).await;

        let request = TileRequest::new(inputs(json!({
            "endpoint": { "url": base },
            "path": "/ok",
            "expectedResponse": "(unclosed",
        })));
        let mut response = TileResponse::new();
        execute(&request, &mut response).await;

        let message = response.failure_message().unwrap();
        assert!(message.contains("unclosed"), "{message}");
    }

    #[tokio::test]
    async fn polling_requires_parameters() {
        let request = TileRequest::new(inputs(json!({
            "endpoint": { "url": "http://example.com" },
            "poll": true,
            "interval": 1,
            "timeout": 10,
        })));
        let mut response = TileResponse::new();
        execute(&request, &mut response).await;

        assert_eq!(response.failure_message(), Some(ASYNC_PARAMETERS_FAIL));
    }

    #[tokio::test]
    async fn polls_until_expected() {
        let base = serve(pollable("/test", 3)).await;
        let values = inputs(json!({
            "endpoint": { "url": base },
            "path": "/test",
            "expectedStatuses": "200",
            "expectedResponse": "Original",
            "poll": true,
            "interval": 2,
            "timeout": 10,
        }));

        let mut response = TileResponse::new();
        let first = TileRequest::new(values.clone());
        execute(&first, &mut response).await;
        assert!(!response.is_completed());
        assert_eq!(response.execution_interval(), Some(Duration::from_secs(2)));
        assert_eq!(response.output(ATTEMPTS_OUTPUT), Some(&json!(1)));
        assert!(response.output("responseStatus").is_none());

        let later = |secs| {
            TileRequest::new(values.clone())
                .with_first_execution(false)
                .with_duration(Duration::from_secs(secs))
        };

        execute(&later(2), &mut response).await;
        assert!(!response.is_completed());
        assert_eq!(response.output("responseStatus"), Some(&json!(201)));
        assert_eq!(response.output(ATTEMPTS_OUTPUT), Some(&json!(2)));
        assert_eq!(response.progress_code(), Some(ASYNC_PROGRESS_CODE));
        assert_eq!(
            response.progress_message(),
            Some("Asynchronous request has been polling for 2 sec")
        );

        execute(&later(4), &mut response).await;
        assert!(!response.is_completed());
        assert_eq!(response.output("responseStatus"), Some(&json!(206)));
        assert_eq!(response.output(ATTEMPTS_OUTPUT), Some(&json!(3)));

        execute(&later(6), &mut response).await;
        assert!(response.is_completed());
        assert!(!response.is_failed());
        assert_eq!(response.output("responseBody"), Some(&json!("Original content")));
        assert!(!response.visible_outputs().contains_key(ATTEMPTS_OUTPUT));
    }

    #[tokio::test]
    async fn polling_times_out() {
        let base = serve(pollable("/test", usize::MAX)).await;
        let request = TileRequest::new(inputs(json!({
            "endpoint": { "url": base },
            "path": "/test",
            "expectedResponse": "Original",
            "poll": true,
            "interval": 1,
            "timeout": 5,
        })))
        .with_first_execution(false)
        .with_duration(Duration::from_secs(5));

        let mut response = TileResponse::new();
        execute(&request, &mut response).await;

        assert_eq!(
            response.failure_message(),
            Some("Asynchronous request timed out after 5 sec")
        );
    }

    #[tokio::test]
    async fn reports_connection_failures() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let request = TileRequest::new(inputs(json!({ "endpoint": { "url": format!("http://{addr}") } })));
        let mut response = TileResponse::new();
        execute(&request, &mut response).await;

        let message = response.failure_message().unwrap();
        assert!(message.starts_with(restile_client::IO_ERROR), "{message}");
    }
}
