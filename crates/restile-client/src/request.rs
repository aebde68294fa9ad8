//! REST request description.

use restile_core::{EndpointProperties, HeaderRow, Method};
use url::Url;

use crate::error::Error;

/// A REST call against a registered endpoint.
///
/// The effective URL is the endpoint URL with the relative path resolved
/// against it, so `/api` replaces the endpoint's path while `api` is appended
/// to its last segment's directory.
#[derive(Debug, Clone)]
pub struct RestRequest {
    endpoint_url: Url,
    username: String,
    password: String,
    path: String,
    body: String,
    method: Method,
    headers: Vec<HeaderRow>,
}

impl RestRequest {
    /// Creates a GET request against the given endpoint URL.
    pub fn new(endpoint_url: &str) -> restile_core::Result<Self> {
        let endpoint_url = Url::parse(endpoint_url).map_err(Error::from)?;
        Ok(Self {
            endpoint_url,
            username: String::new(),
            password: String::new(),
            path: String::new(),
            body: String::new(),
            method: Method::Get,
            headers: Vec::new(),
        })
    }

    /// Creates a GET request from endpoint properties, including credentials.
    pub fn from_endpoint(endpoint: &EndpointProperties) -> restile_core::Result<Self> {
        Ok(Self::new(&endpoint.url)?.with_credentials(&endpoint.username, &endpoint.password))
    }

    /// Sets the basic authentication credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Sets the path relative to the endpoint URL.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Sets the request body; only sent for methods that carry one.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets the request method.
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the request method from its upper-case name.
    pub fn with_method_name(self, method: &str) -> restile_core::Result<Self> {
        Ok(self.with_method(Method::parse(method)?))
    }

    /// Sets the request headers.
    #[must_use]
    pub fn with_headers(mut self, headers: Vec<HeaderRow>) -> Self {
        self.headers = headers;
        self
    }

    /// Resolves the path against the endpoint URL.
    pub fn url(&self) -> restile_core::Result<Url> {
        if self.path.is_empty() {
            return Ok(self.endpoint_url.clone());
        }

        Ok(self.endpoint_url.join(&self.path).map_err(Error::from)?)
    }

    /// Returns the request method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Returns the request body.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns the user supplied headers.
    pub fn headers(&self) -> &[HeaderRow] {
        &self.headers
    }

    /// Returns the basic authentication credentials to send, if any.
    ///
    /// Credentials are only used when both are set and no `Authorization`
    /// header was supplied explicitly.
    pub fn basic_auth(&self) -> Option<(&str, &str)> {
        let has_authorization = self.headers.iter().any(|h| h.is_named("Authorization"));
        if has_authorization || self.username.is_empty() || self.password.is_empty() {
            return None;
        }

        Some((&self.username, &self.password))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_endpoint() {
        let error = RestRequest::new("www.aabbcc").unwrap_err();
        assert!(error.user_message().starts_with("URL is malformed."));

        assert!(RestRequest::new("").is_err());
    }

    #[test]
    fn resolves_paths() {
        let request = RestRequest::new("http://example.com/base/").unwrap();
        assert_eq!(request.url().unwrap().as_str(), "http://example.com/base/");

        let request = request.with_path("/rest-api/users?page=2");
        assert_eq!(
            request.url().unwrap().as_str(),
            "http://example.com/rest-api/users?page=2"
        );

        let request = request.with_path("users");
        assert_eq!(request.url().unwrap().as_str(), "http://example.com/base/users");
    }

    #[test]
    fn unsupported_method_name() {
        let request = RestRequest::new("http://example.com").unwrap();
        let error = request.with_method_name("REQUEST").unwrap_err();
        assert_eq!(error.user_message(), "Method is not supported.");
    }

    #[test]
    fn basic_auth_requires_both_credentials() {
        let request = RestRequest::new("http://example.com").unwrap();
        assert!(request.basic_auth().is_none());

        let request = request.with_credentials("user", "");
        assert!(request.basic_auth().is_none());

        let request = request.with_credentials("user", "secret");
        assert_eq!(request.basic_auth(), Some(("user", "secret")));
    }

    #[test]
    fn explicit_authorization_header_wins() {
        let request = RestRequest::new("http://example.com")
            .unwrap()
            .with_credentials("user", "secret")
            .with_headers(vec![HeaderRow::new("authorization", "Bearer token")]);

        assert!(request.basic_auth().is_none());
    }
}
