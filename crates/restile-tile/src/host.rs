//! Local implementation of the form host bridge.

use async_trait::async_trait;
use restile_client::RestClient;
use restile_core::{ENDPOINT_TYPE_TAG, PREVIEW_OPERATION};
use restile_form::{EntitySummary, HostBridge, HostError};
use serde_json::{Map, Value};

use crate::tiles::PreviewTile;
use crate::{EndpointRegistry, TileExecutor};

const TRACING_TARGET: &str = "restile_tile::host";

/// Serves form sessions from an [`EndpointRegistry`] and the plugin tiles.
///
/// Endpoint inputs given as references are resolved against the registry
/// before the preview tile runs.
#[derive(Debug, Clone)]
pub struct LocalHost {
    registry: EndpointRegistry,
    preview: PreviewTile,
    executor: TileExecutor,
}

impl LocalHost {
    pub fn new(registry: EndpointRegistry, client: RestClient) -> Self {
        Self {
            registry,
            preview: PreviewTile::new(client),
            executor: TileExecutor::default(),
        }
    }

    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }
}

#[async_trait]
impl HostBridge for LocalHost {
    async fn query_entities_by_type(&self, type_tag: &str) -> Result<Vec<EntitySummary>, HostError> {
        if type_tag != ENDPOINT_TYPE_TAG {
            tracing::debug!(target: TRACING_TARGET, type_tag, "No entities of requested type");
            return Ok(Vec::new());
        }

        Ok(self
            .registry
            .iter()
            .map(|(reference, endpoint)| EntitySummary::new(&endpoint.display_name, reference))
            .collect())
    }

    async fn invoke_named_operation(
        &self,
        operation_id: &str,
        mut inputs: Map<String, Value>,
    ) -> Result<Map<String, Value>, HostError> {
        if operation_id != PREVIEW_OPERATION {
            return Err(HostError::new(format!("Unknown operation '{operation_id}'")));
        }

        self.registry.resolve_inputs(&mut inputs)?;
        let response = self.executor.run_once(&self.preview, inputs).await;

        match response.failure_message() {
            Some(message) => Err(HostError::new(message)),
            None => Ok(response.visible_outputs()),
        }
    }

    fn report_error(&self, error: &HostError) {
        tracing::error!(target: TRACING_TARGET, error = %error, "Form reported an error");
    }

    fn show_user_message(&self, text: &str) {
        tracing::warn!(target: TRACING_TARGET, message = text, "Message for the user");
    }
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::routing::get;
    use restile_client::ClientConfig;
    use restile_core::EndpointProperties;
    use restile_form::forms::{PREVIEW_FIELD, config_form};
    use restile_form::{FormSession, HostContext, PREVIEW_FAILED_DETAIL};
    use serde_json::json;

    use super::*;
    use crate::RegisteredEndpoint;
    use crate::tiles::testing::serve;

    fn host(url: &str) -> LocalHost {
        let mut registry = EndpointRegistry::new();
        registry.insert(
            "ep-1",
            RegisteredEndpoint::new("Local API", EndpointProperties::new(url)),
        );
        LocalHost::new(registry, RestClient::new(ClientConfig::default()).unwrap())
    }

    #[tokio::test]
    async fn lists_registered_endpoints() {
        let host = host("http://example.com/");

        let entities = host.query_entities_by_type(ENDPOINT_TYPE_TAG).await.unwrap();
        assert_eq!(entities, [EntitySummary::new("Local API", "ep-1")]);

        let entities = host.query_entities_by_type("other:Type").await.unwrap();
        assert!(entities.is_empty());
    }

    #[tokio::test]
    async fn previews_through_the_config_form() {
        let base = serve(Router::new().route("/users", get(|| async { "[]" }))).await;
        let host = host(&base);

        let mut session = FormSession::render(config_form(), HostContext::editable()).unwrap();
        session.finish_render();
        session.load_options(&host).await;
        session.set_value("input.endpoint", json!("ep-1")).unwrap();
        session.set_value("input.path", json!("/users")).unwrap();
        session.set_value("input.method", json!("GET")).unwrap();

        let preview = session.click_preview(&host).await.unwrap();
        assert!(preview.starts_with("Response status: 200"), "{preview}");
        assert!(preview.ends_with("Response body:\n[]"));
        assert_eq!(
            session.controls().get(PREVIEW_FIELD).unwrap().display.as_deref(),
            Some(preview.as_str())
        );
    }

    #[tokio::test]
    async fn preview_failures_become_host_errors() {
        let host = host("http://example.com/");

        let inputs = json!({ "endpoint": "ep-1", "method": "REQUEST" });
        let error = host
            .invoke_named_operation(PREVIEW_OPERATION, inputs.as_object().unwrap().clone())
            .await
            .unwrap_err();
        assert_eq!(error.first_message(), Some(restile_core::BAD_METHOD_ERROR));

        let inputs = json!({ "endpoint": "ep-9" });
        let error = host
            .invoke_named_operation(PREVIEW_OPERATION, inputs.as_object().unwrap().clone())
            .await
            .unwrap_err();
        assert_eq!(error.first_message(), Some("REST Endpoint 'ep-9' not found"));

        let error = host
            .invoke_named_operation("other:Operation", Map::new())
            .await
            .unwrap_err();
        assert!(error.to_string().contains("other:Operation"));
    }

    #[tokio::test]
    async fn failed_preview_is_shown_in_the_form() {
        let host = host("http://example.com/");

        let mut session = FormSession::render(config_form(), HostContext::editable()).unwrap();
        session.finish_render();
        session.set_value("input.endpoint", json!("ep-9")).unwrap();
        session.set_value("input.path", json!("/users")).unwrap();
        session.set_value("input.method", json!("GET")).unwrap();

        let preview = session.click_preview(&host).await.unwrap();
        assert_eq!(
            preview,
            format!("{PREVIEW_FAILED_DETAIL}REST Endpoint 'ep-9' not found")
        );
    }
}
