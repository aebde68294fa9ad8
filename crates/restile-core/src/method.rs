//! HTTP methods supported by REST tasks.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

use crate::{Error, Result};

/// Message reported when a method name is not one of [`Method`]'s variants.
pub const BAD_METHOD_ERROR: &str = "Method is not supported.";

/// HTTP method of a configured REST call.
///
/// Variant order matches the order offered by the method selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumIter, EnumString, IntoStaticStr)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Head,
    Options,
    Delete,
    Trace,
}

impl Method {
    /// Returns whether requests with this method carry a body.
    #[must_use]
    pub const fn has_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }

    /// Parses an exact upper-case method name.
    pub fn parse(name: &str) -> Result<Self> {
        Self::from_str(name).map_err(|_| Error::invalid_input().with_message(BAD_METHOD_ERROR))
    }

    /// Returns the method names in selector order.
    pub fn names() -> Vec<&'static str> {
        use strum::IntoEnumIterator;
        Self::iter().map(Into::into).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_upper_case_names() {
        assert_eq!(Method::parse("GET").unwrap(), Method::Get);
        assert_eq!(Method::parse("OPTIONS").unwrap(), Method::Options);
    }

    #[test]
    fn rejects_unknown_method() {
        let error = Method::parse("REQUEST").unwrap_err();
        assert_eq!(error.message.as_deref(), Some(BAD_METHOD_ERROR));

        assert!(Method::parse("get").is_err());
    }

    #[test]
    fn only_post_and_put_have_bodies() {
        let with_body: Vec<_> = Method::names()
            .into_iter()
            .filter(|name| Method::parse(name).unwrap().has_body())
            .collect();
        assert_eq!(with_body, vec!["POST", "PUT"]);
    }

    #[test]
    fn names_follow_selector_order() {
        assert_eq!(
            Method::names(),
            vec!["GET", "POST", "PUT", "HEAD", "OPTIONS", "DELETE", "TRACE"]
        );
    }
}
