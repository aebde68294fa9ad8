//! Tile contract.

use async_trait::async_trait;

use crate::{TileRequest, TileResponse};

/// Unit of plugin backend work invoked by the host.
///
/// Tiles report failures on the response instead of returning errors. A tile
/// that wants to be called again leaves the response not completed.
#[async_trait]
pub trait Tile: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Executes the tile once.
    async fn handle_execute(&self, request: &TileRequest, response: &mut TileResponse);
}
