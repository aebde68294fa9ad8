//! Endpoint validation tile.

use async_trait::async_trait;
use restile_client::{RestClient, RestRequest};
use validator::Validate;

use crate::inputs::EndpointInput;
use crate::{Tile, TileRequest, TileResponse};

const TRACING_TARGET: &str = "restile_tile::endpoint";

pub const LOCALHOST_ERROR: &str = "REST Endpoint URL cannot be localhost.";
pub const AUTH_MALFORMED_ERROR: &str = "REST Endpoint username or password is empty.";
pub const UNAUTHORIZED_ERROR: &str =
    "REST Endpoint credentials are invalid. (Credentials are passed using basic auth)";

const LOOPBACK_MARKERS: [&str; 3] = ["localhost", "127.0.0.1", "::1"];

/// Validates the properties of a REST endpoint and checks it is reachable.
///
/// Succeeds without outputs.
#[derive(Debug, Clone)]
pub struct EndpointTile {
    client: RestClient,
}

impl EndpointTile {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }

    /// Returns the message of the first property check that fails.
    fn check(input: &EndpointInput) -> Option<String> {
        let endpoint = &input.endpoint;
        if let Err(errors) = endpoint.validate() {
            return Some(restile_core::Error::from(errors).user_message());
        }
        if LOOPBACK_MARKERS.iter().any(|marker| endpoint.url.contains(marker)) {
            return Some(LOCALHOST_ERROR.to_owned());
        }
        if endpoint.has_partial_credentials() {
            return Some(AUTH_MALFORMED_ERROR.to_owned());
        }
        None
    }
}

#[async_trait]
impl Tile for EndpointTile {
    fn name(&self) -> &'static str {
        "endpoint"
    }

    async fn handle_execute(&self, request: &TileRequest, response: &mut TileResponse) {
        tracing::info!(target: TRACING_TARGET, "Validating REST endpoint");

        let input: EndpointInput = match request.parse() {
            Ok(input) => input,
            Err(error) => {
                response.set_failed(error.user_message());
                return;
            }
        };

        if let Some(message) = Self::check(&input) {
            tracing::error!(target: TRACING_TARGET, "{message}");
            response.set_failed(message);
            return;
        }

        let endpoint = &input.endpoint;
        let outcome = match RestRequest::from_endpoint(endpoint) {
            Ok(rest_request) => self.client.execute(&rest_request).await,
            Err(error) => Err(error),
        };

        match outcome {
            Ok(rest_response) => {
                let status = rest_response.status();
                tracing::info!(target: TRACING_TARGET, status, "Endpoint responded");

                if endpoint.has_credentials() && status == 401 {
                    tracing::error!(target: TRACING_TARGET, "{UNAUTHORIZED_ERROR}");
                    response.set_failed(UNAUTHORIZED_ERROR);
                }
            }
            Err(error) => {
                tracing::info!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Failed to validate REST endpoint"
                );
                response.set_failed(error.user_message());
            }
        }
    }
}
