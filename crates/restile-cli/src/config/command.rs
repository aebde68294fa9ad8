//! Subcommands.

use std::path::PathBuf;

use anyhow::anyhow;
use clap::{Subcommand, ValueEnum};

/// Form descriptors the CLI can print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormKind {
    /// Input and output configuration of the REST task.
    Config,
    /// Connection properties of a REST endpoint.
    Endpoint,
    /// Read-only view of a finished task run.
    Result,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print a form descriptor as JSON.
    Forms {
        #[arg(value_enum)]
        kind: FormKind,

        /// Render the form in view mode.
        #[arg(long)]
        read_only: bool,

        /// JSON file with the inputs recorded for a task run (result form).
        #[arg(long)]
        recorded: Option<PathBuf>,
    },

    /// Run the validator of a config form field and print the result.
    Validate {
        /// Field name in the input section (e.g. `path`) or a dotted path.
        field: String,

        /// Value to validate.
        value: String,
    },

    /// Validate a REST endpoint by calling it.
    Endpoint {
        #[arg(long, env = "RESTILE_ENDPOINT_URL")]
        url: String,

        #[arg(long, env = "RESTILE_ENDPOINT_USERNAME", default_value = "")]
        username: String,

        #[arg(long, env = "RESTILE_ENDPOINT_PASSWORD", default_value = "", hide_env_values = true)]
        password: String,
    },

    /// Fill the config form from a file and click its preview field.
    Preview {
        /// JSON file with the form data, e.g. `{"input": {"path": "/users"}}`.
        #[arg(long)]
        values: PathBuf,

        /// JSON file with the registered endpoints.
        #[arg(long)]
        endpoints: PathBuf,
    },

    /// Run the REST task until it completes and print its outputs.
    Run {
        /// JSON file with the task inputs.
        #[arg(long)]
        input: PathBuf,

        /// JSON file with registered endpoints used to resolve references.
        #[arg(long)]
        endpoints: Option<PathBuf>,

        /// Give up after this many seconds; unbounded when unset.
        #[arg(long)]
        max_duration: Option<u64>,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Forms { .. } => "forms",
            Self::Validate { .. } => "validate",
            Self::Endpoint { .. } => "endpoint",
            Self::Preview { .. } => "preview",
            Self::Run { .. } => "run",
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        match self {
            Self::Forms {
                kind,
                recorded: Some(_),
                ..
            } if *kind != FormKind::Result => Err(anyhow!(
                "recorded inputs are only shown by the result form"
            )),
            Self::Run {
                max_duration: Some(0),
                ..
            } => Err(anyhow!("max duration must be greater than zero")),
            _ => Ok(()),
        }
    }
}
