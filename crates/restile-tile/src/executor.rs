//! Repeat-until-complete tile execution.

use std::time::{Duration, Instant};

use restile_core::{Error, Result};
use serde_json::{Map, Value};

use crate::{Tile, TileRequest, TileResponse};

const TRACING_TARGET: &str = "restile_tile::executor";

/// Delay used when a tile defers completion without an execution interval.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Configuration of the [`TileExecutor`].
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Delay between executions of tiles that set no interval.
    pub default_interval: Duration,
    /// Upper bound on the total execution time; unbounded when `None`.
    pub max_duration: Option<Duration>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            default_interval: DEFAULT_INTERVAL,
            max_duration: None,
        }
    }
}

impl ExecutorConfig {
    #[must_use]
    pub fn with_default_interval(mut self, interval: Duration) -> Self {
        self.default_interval = interval;
        self
    }

    #[must_use]
    pub fn with_max_duration(mut self, max_duration: Duration) -> Self {
        self.max_duration = Some(max_duration);
        self
    }
}

/// Drives tiles the way the host does.
///
/// A tile that leaves its response not completed is called again after its
/// execution interval with the same response, so hidden outputs survive
/// between calls.
#[derive(Debug, Clone, Default)]
pub struct TileExecutor {
    config: ExecutorConfig,
}

impl TileExecutor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Executes the tile a single time.
    pub async fn run_once(&self, tile: &dyn Tile, inputs: Map<String, Value>) -> TileResponse {
        let request = TileRequest::new(inputs);
        let mut response = TileResponse::new();
        response.begin_execution();
        tile.handle_execute(&request, &mut response).await;
        response
    }

    /// Executes the tile until it completes or fails.
    ///
    /// Fails with a timeout error when the configured maximum duration elapses
    /// before the tile is done.
    pub async fn run_to_completion(
        &self,
        tile: &dyn Tile,
        inputs: Map<String, Value>,
    ) -> Result<TileResponse> {
        let started = Instant::now();
        let mut response = TileResponse::new();
        let mut executions: u32 = 0;

        loop {
            let request = TileRequest::new(inputs.clone())
                .with_first_execution(executions == 0)
                .with_duration(started.elapsed());

            response.begin_execution();
            tile.handle_execute(&request, &mut response).await;
            executions += 1;

            if response.is_failed() || response.is_completed() {
                tracing::debug!(
                    target: TRACING_TARGET,
                    tile = tile.name(),
                    executions,
                    failed = response.is_failed(),
                    "Tile execution finished"
                );
                return Ok(response);
            }

            let interval = response
                .execution_interval()
                .unwrap_or(self.config.default_interval);

            if let Some(max_duration) = self.config.max_duration
                && started.elapsed() + interval > max_duration
            {
                tracing::error!(
                    target: TRACING_TARGET,
                    tile = tile.name(),
                    executions,
                    max_duration_secs = max_duration.as_secs(),
                    "Tile did not complete in time"
                );
                return Err(Error::timeout().with_message(format!(
                    "Tile '{}' did not complete within {} sec",
                    tile.name(),
                    max_duration.as_secs()
                )));
            }

            tracing::debug!(
                target: TRACING_TARGET,
                tile = tile.name(),
                executions,
                interval_ms = interval.as_millis(),
                progress = response.progress_message(),
                "Tile deferred completion"
            );
            tokio::time::sleep(interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use restile_core::ErrorKind;
    use serde_json::json;

    use super::*;

    /// Defers completion until it was executed `rounds` times.
    struct CountdownTile {
        rounds: u32,
        calls: AtomicU32,
    }

    impl CountdownTile {
        fn new(rounds: u32) -> Self {
            Self {
                rounds,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl Tile for CountdownTile {
        fn name(&self) -> &'static str {
            "countdown"
        }

        async fn handle_execute(&self, request: &TileRequest, response: &mut TileResponse) {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            assert_eq!(request.is_first_execution(), call == 1);

            let seen = response.output("__calls").and_then(Value::as_u64).unwrap_or(0);
            response.set_output("__calls", seen + 1);

            if call < self.rounds {
                response.set_execution_interval(Duration::from_millis(10));
                response.set_completed(false);
            } else {
                response.set_output("result", "done");
            }
        }
    }

    #[tokio::test]
    async fn runs_once() {
        let tile = CountdownTile::new(3);
        let response = TileExecutor::default().run_once(&tile, Map::new()).await;

        assert!(!response.is_completed());
        assert_eq!(tile.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn repeats_until_completed() {
        let tile = CountdownTile::new(3);
        let response = TileExecutor::default()
            .run_to_completion(&tile, Map::new())
            .await
            .unwrap();

        assert!(response.is_completed());
        assert_eq!(response.output("__calls"), Some(&json!(3)));
        assert_eq!(response.visible_outputs()["result"], "done");
    }

    #[tokio::test]
    async fn enforces_max_duration() {
        let tile = CountdownTile::new(u32::MAX);
        let config = ExecutorConfig::default().with_max_duration(Duration::from_millis(50));
        let error = TileExecutor::new(config)
            .run_to_completion(&tile, Map::new())
            .await
            .unwrap_err();

        assert_eq!(error.kind, ErrorKind::Timeout);
        assert!(tile.calls.load(Ordering::SeqCst) >= 2);
    }
}
