//! The plugin's tiles.

mod endpoint;
mod preview;
mod task;

pub use endpoint::{AUTH_MALFORMED_ERROR, EndpointTile, LOCALHOST_ERROR, UNAUTHORIZED_ERROR};
pub use preview::{PREVIEW_OUTPUT, PreviewTile, render_preview};
pub use task::{
    ASYNC_PROGRESS_CODE, ASYNC_PROGRESS_MESSAGE, ASYNC_TIMEOUT_FAIL, ATTEMPTS_OUTPUT,
    EXPECTED_RESPONSE_FAIL, TaskTile,
};

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::get;

    /// Serves the router on an ephemeral local port and returns its base URL.
    pub async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        format!("http://{addr}")
    }

    /// Route answering 201 first, 206 until `ready_after` calls, then 200.
    pub fn pollable(path: &str, ready_after: usize) -> Router {
        let calls = Arc::new(AtomicUsize::new(0));
        Router::new().route(
            path,
            get(move || {
                let calls = calls.clone();
                async move {
                    let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
                    if attempt == 1 {
                        (StatusCode::CREATED, "Body is created")
                    } else if attempt < ready_after {
                        (StatusCode::PARTIAL_CONTENT, "Body is in progress")
                    } else {
                        (StatusCode::OK, "Original content")
                    }
                }
            }),
        )
    }
}
