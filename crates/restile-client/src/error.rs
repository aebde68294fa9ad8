//! Error types for REST client operations.

use thiserror::Error;

/// Prefix of messages for malformed endpoint URLs or paths.
pub const MALFORMED_ERROR: &str = "URL is malformed.";

/// Prefix of messages for transport failures.
pub const IO_ERROR: &str = "Unable to read from/write to connection: ";

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for client operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The endpoint URL or the joined path could not be parsed.
    #[error("{} {}", MALFORMED_ERROR, .0)]
    Url(#[from] url::ParseError),
    /// HTTP request failed.
    #[error("{}{}", IO_ERROR, .0)]
    Reqwest(#[from] reqwest::Error),
}

impl From<Error> for restile_core::Error {
    fn from(err: Error) -> Self {
        let message = err.to_string();
        match err {
            Error::Url(e) => restile_core::Error::invalid_input()
                .with_message(message)
                .with_source(e),
            Error::Reqwest(e) if e.is_timeout() => restile_core::Error::timeout()
                .with_message(message)
                .with_source(e),
            Error::Reqwest(e) => restile_core::Error::network_error()
                .with_message(message)
                .with_source(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use restile_core::ErrorKind;

    use super::*;

    #[test]
    fn url_errors_keep_malformed_prefix() {
        let parse_error = url::Url::parse("www.example").unwrap_err();
        let error = restile_core::Error::from(Error::from(parse_error));

        assert_eq!(error.kind, ErrorKind::InvalidInput);
        assert!(error.user_message().starts_with(MALFORMED_ERROR));
    }
}
