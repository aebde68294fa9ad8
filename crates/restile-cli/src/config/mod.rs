//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── client: ClientConfig   # HTTP timeout, user agent, body size limit
//! └── command: Command       # forms | validate | endpoint | preview | run
//! ```
//!
//! Client options can be provided via CLI arguments or environment variables.

mod command;

use std::process;

use anyhow::{Context, anyhow};
use clap::Parser;
pub use command::{Command, FormKind};
use restile_client::ClientConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "restile")]
#[command(about = "Local host for the REST task forms and tiles")]
#[command(version)]
pub struct Cli {
    /// REST client configuration.
    #[clap(flatten)]
    pub client: ClientConfig,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        validate_client(&self.client).context("invalid client configuration")?;
        self.command.validate()
    }

    /// Logs configuration at debug level.
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            features = ?enabled_features(),
            "Build information"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            command = self.command.name(),
            http_timeout_secs = self.client.effective_timeout().as_secs(),
            max_response_bytes = self.client.max_response_bytes,
            accept_invalid_certs = self.client.accept_invalid_certs,
            "REST client configuration"
        );
    }
}

fn validate_client(config: &ClientConfig) -> anyhow::Result<()> {
    if config.max_response_bytes == 0 {
        return Err(anyhow!("max response bytes must be greater than zero"));
    }
    if config.accept_invalid_certs {
        tracing::warn!(
            target: TRACING_TARGET_CONFIG,
            "TLS certificate verification is disabled"
        );
    }
    Ok(())
}

/// Returns a list of enabled compile-time features.
fn enabled_features() -> Vec<&'static str> {
    [cfg!(feature = "dotenv").then_some("dotenv")]
        .into_iter()
        .flatten()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_client_flags() {
        let cli = Cli::try_parse_from([
            "restile",
            "--http-timeout",
            "5",
            "--max-response-bytes",
            "1024",
            "validate",
            "path",
            "/users",
        ])
        .unwrap();

        assert_eq!(cli.client.http_timeout, 5);
        assert_eq!(cli.client.max_response_bytes, 1024);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn rejects_empty_body_limit() {
        let cli = Cli::try_parse_from([
            "restile",
            "--max-response-bytes",
            "0",
            "forms",
            "config",
        ])
        .unwrap();

        assert!(cli.validate().is_err());
    }
}
