//! Reqwest-based REST client.

use std::sync::Arc;

use reqwest::Client;
use restile_core::Method;

use crate::error::Error;
use crate::{ClientConfig, RestRequest, RestResponse, TRACING_TARGET};

/// Inner client that holds the HTTP client and configuration.
struct RestClientInner {
    http: Client,
    config: ClientConfig,
}

/// Reqwest-based client executing [`RestRequest`]s.
///
/// Cloning is cheap; clones share the same connection pool.
///
/// # Examples
///
/// ```rust,ignore
/// use restile_client::{ClientConfig, RestClient, RestRequest};
///
/// let client = RestClient::new(ClientConfig::default())?;
/// let request = RestRequest::new("https://example.com/")?.with_path("/rest-api/users");
/// let response = client.execute(&request).await?;
/// println!("{}", response.status());
/// ```
#[derive(Clone)]
pub struct RestClient {
    inner: Arc<RestClientInner>,
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl RestClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: ClientConfig) -> restile_core::Result<Self> {
        let timeout = config.effective_timeout();
        let user_agent = config.effective_user_agent();

        tracing::debug!(
            target: TRACING_TARGET,
            timeout_ms = timeout.as_millis(),
            accept_invalid_certs = config.accept_invalid_certs,
            "Creating REST client"
        );

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(&user_agent)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| {
                restile_core::Error::configuration()
                    .with_message("Failed to create HTTP client")
                    .with_source(e)
            })?;

        let inner = RestClientInner { http, config };
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Executes the request and reads its response.
    pub async fn execute(&self, request: &RestRequest) -> restile_core::Result<RestResponse> {
        let url = request.url()?;
        let method = request.method();

        tracing::info!(
            target: TRACING_TARGET,
            method = %method,
            url = %url,
            "Making REST request"
        );

        let mut http_request = self.inner.http.request(http_method(method), url);

        for header in request.headers() {
            http_request = http_request.header(&header.name, &header.value);
        }

        if let Some((username, password)) = request.basic_auth() {
            tracing::debug!(
                target: TRACING_TARGET,
                "Adding basic authentication header from endpoint credentials"
            );
            http_request = http_request.basic_auth(username, Some(password));
        }

        if method.has_body() {
            http_request = http_request.body(request.body().to_owned());
        }

        let http_response = http_request.send().await.map_err(|e| {
            tracing::error!(target: TRACING_TARGET, error = %e, "REST request failed");
            Error::from(e)
        })?;

        let response =
            RestResponse::read(http_response, self.inner.config.max_response_bytes).await?;

        tracing::debug!(
            target: TRACING_TARGET,
            status = response.status(),
            content_length = response.content_length(),
            "REST request completed"
        );

        Ok(response)
    }
}

fn http_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Head => reqwest::Method::HEAD,
        Method::Options => reqwest::Method::OPTIONS,
        Method::Delete => reqwest::Method::DELETE,
        Method::Trace => reqwest::Method::TRACE,
    }
}
