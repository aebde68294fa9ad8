#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod commands;
mod config;

use std::process;

use anyhow::Context;

use crate::config::Cli;

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "restile_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "restile_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "restile_cli::config";
pub const TRACING_TARGET_COMMAND: &str = "restile_cli::command";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %format_args!("{error:#}"),
            "command failed"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    Cli::init_tracing();
    cli.log();
    cli.validate().context("invalid configuration")?;

    let name = cli.command.name();
    let output = commands::execute(cli.command, cli.client)
        .await
        .with_context(|| format!("{name} failed"))?;

    println!("{output}");
    Ok(())
}
