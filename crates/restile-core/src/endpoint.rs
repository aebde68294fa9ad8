//! REST endpoint connection properties.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Connection information of a registered REST endpoint.
///
/// Credentials are optional; when both are present they are sent using basic
/// authentication unless the request sets its own `Authorization` header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct EndpointProperties {
    /// Base URL of the endpoint, e.g. `https://host:8443/`.
    #[validate(length(min = 1, message = "REST Endpoint must contain URL."))]
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl EndpointProperties {
    /// Creates endpoint properties without credentials.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
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

    /// Returns whether both username and password are set.
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }

    /// Returns whether exactly one of username and password is set.
    pub fn has_partial_credentials(&self) -> bool {
        self.username.is_empty() != self.password.is_empty()
    }
}
