//! Response preview helper tile.

use async_trait::async_trait;
use restile_client::{RestClient, RestResponse};

use crate::inputs::CallInput;
use crate::{Tile, TileRequest, TileResponse};

const TRACING_TARGET: &str = "restile_tile::preview";

/// Output holding the rendered preview.
pub const PREVIEW_OUTPUT: &str = "responsePreview";

/// Executes a configured call and summarizes the response for the config form.
#[derive(Debug, Clone)]
pub struct PreviewTile {
    client: RestClient,
}

impl PreviewTile {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }

    async fn preview(&self, request: &TileRequest) -> restile_core::Result<String> {
        let input: CallInput = request.parse()?;
        let rest_request = input.to_request()?;
        let rest_response = self.client.execute(&rest_request).await?;
        render_preview(&rest_response)
    }
}

/// Renders the status, headers and body of a response as plain text.
pub fn render_preview(response: &RestResponse) -> restile_core::Result<String> {
    let mut preview = format!("Response status: {}\n", response.status());

    preview.push_str("\nResponse headers:\n");
    for (name, value) in response.headers() {
        preview.push_str(&format!("{name}: {value}\n"));
    }

    preview.push_str("\nResponse body:\n");
    preview.push_str(response.body()?);
    Ok(preview)
}

#[async_trait]
impl Tile for PreviewTile {
    fn name(&self) -> &'static str {
        "preview"
    }

    async fn handle_execute(&self, request: &TileRequest, response: &mut TileResponse) {
        tracing::info!(target: TRACING_TARGET, "Getting REST preview");

        match self.preview(request).await {
            Ok(preview) => response.set_output(PREVIEW_OUTPUT, preview),
            Err(error) => {
                tracing::info!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Failed to get REST preview"
                );
                response.set_failed(error.user_message());
            }
        }
    }
}
