//! REST response handling.

use std::collections::BTreeMap;

use reqwest::header::{CONTENT_LENGTH, HeaderMap};

use crate::TRACING_TARGET;
use crate::error::Error;

/// Header key under which the response status line is reported.
pub const STATUS_LINE_HEADER: &str = "Status-Line";

const MB: f64 = 1_048_576.0;

/// Response of an executed REST call.
#[derive(Debug, Clone)]
pub struct RestResponse {
    status: u16,
    headers: BTreeMap<String, String>,
    body: Option<String>,
    content_length: u64,
    max_response_bytes: u64,
}

impl RestResponse {
    /// Reads a reqwest response, skipping bodies above `max_response_bytes`.
    pub(crate) async fn read(
        response: reqwest::Response,
        max_response_bytes: u64,
    ) -> restile_core::Result<Self> {
        let status = response.status();
        let status_line = format!(
            "{:?} {} {}",
            response.version(),
            status.as_u16(),
            status.canonical_reason().unwrap_or_default()
        );

        let mut headers = collect_headers(response.headers());
        headers.insert(STATUS_LINE_HEADER.to_owned(), status_line.trim_end().to_owned());

        let declared_length = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(0);

        let mut this = Self {
            status: status.as_u16(),
            headers,
            body: None,
            content_length: declared_length,
            max_response_bytes,
        };

        if declared_length > max_response_bytes {
            tracing::warn!(
                target: TRACING_TARGET,
                content_length = declared_length,
                max_response_bytes,
                "Skipping response body because it exceeds the size limit"
            );
            return Ok(this);
        }

        let bytes = response.bytes().await.map_err(Error::from)?;
        let length = bytes.len() as u64;
        if length > max_response_bytes {
            tracing::warn!(
                target: TRACING_TARGET,
                content_length = length,
                max_response_bytes,
                "Discarding response body because it exceeds the size limit"
            );
            this.content_length = length;
            return Ok(this);
        }

        this.body = Some(String::from_utf8_lossy(&bytes).into_owned());
        Ok(this)
    }

    /// Returns the HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns the response headers, including the [`STATUS_LINE_HEADER`] entry.
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Returns the declared or observed body length in bytes.
    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    /// Returns the response body.
    ///
    /// Fails when the body was skipped for exceeding the size limit.
    pub fn body(&self) -> restile_core::Result<&str> {
        match &self.body {
            Some(body) => Ok(body),
            None => {
                let message = format!(
                    "Unable to read response body as it exceeds {}MB, actual size: {:.2}MB",
                    self.max_response_bytes as f64 / MB,
                    self.content_length as f64 / MB
                );
                tracing::error!(target: TRACING_TARGET, "{message}");
                Err(restile_core::Error::too_large().with_message(message))
            }
        }
    }
}

/// Collects headers into a map keyed by canonical (`Title-Case`) names.
///
/// Repeated headers are joined with `", "`.
fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut collected: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        collected
            .entry(canonical_header_name(name.as_str()))
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert_with(|| value.into_owned());
    }
    collected
}

fn canonical_header_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;

    use super::*;

    #[test]
    fn canonical_names() {
        assert_eq!(canonical_header_name("content-type"), "Content-Type");
        assert_eq!(canonical_header_name("x-request-id"), "X-Request-Id");
        assert_eq!(canonical_header_name("etag"), "Etag");
    }

    #[test]
    fn repeated_headers_are_joined() {
        let mut headers = HeaderMap::new();
        headers.append("set-cookie", HeaderValue::from_static("a=1"));
        headers.append("set-cookie", HeaderValue::from_static("b=2"));
        headers.insert("content-type", HeaderValue::from_static("text/xml"));

        let collected = collect_headers(&headers);
        assert_eq!(collected["Set-Cookie"], "a=1, b=2");
        assert_eq!(collected["Content-Type"], "text/xml");
    }

    #[test]
    fn skipped_body_reports_size() {
        let response = RestResponse {
            status: 200,
            headers: BTreeMap::new(),
            body: None,
            content_length: 5 * 1_048_576,
            max_response_bytes: 4 * 1_048_576,
        };

        let error = response.body().unwrap_err();
        assert_eq!(
            error.user_message(),
            "Unable to read response body as it exceeds 4MB, actual size: 5.00MB"
        );
    }
}
