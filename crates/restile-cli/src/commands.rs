//! Subcommand implementations.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, anyhow, bail};
use restile_client::{ClientConfig, RestClient};
use restile_core::EndpointProperties;
use restile_form::forms::{config_form, endpoint_form, result_form};
use restile_form::{FormDescriptor, FormSession, HostContext, ValidationResult};
use restile_tile::{
    EndpointRegistry, EndpointTile, ExecutorConfig, LocalHost, TaskTile, TileExecutor,
};
use serde_json::{Map, Value};

use crate::TRACING_TARGET_COMMAND;
use crate::config::{Command, FormKind};

/// Runs the command and returns the text to print.
pub async fn execute(command: Command, client: ClientConfig) -> anyhow::Result<String> {
    match command {
        Command::Forms {
            kind,
            read_only,
            recorded,
        } => forms(kind, read_only, recorded.as_deref()),
        Command::Validate { field, value } => validate(&field, &value),
        Command::Endpoint {
            url,
            username,
            password,
        } => {
            let endpoint = EndpointProperties::new(url).with_credentials(username, password);
            validate_endpoint(endpoint, client).await
        }
        Command::Preview { values, endpoints } => {
            let values = read_object(&values)?;
            let registry = read_registry(&endpoints)?;
            preview(values, registry, client).await
        }
        Command::Run {
            input,
            endpoints,
            max_duration,
        } => {
            let mut inputs = read_object(&input)?;
            if let Some(endpoints) = endpoints {
                read_registry(&endpoints)?
                    .resolve_inputs(&mut inputs)
                    .context("failed to resolve the endpoint")?;
            }
            run(inputs, client, max_duration.map(Duration::from_secs)).await
        }
    }
}

fn forms(kind: FormKind, read_only: bool, recorded: Option<&Path>) -> anyhow::Result<String> {
    let mut context = if read_only {
        HostContext::read_only()
    } else {
        HostContext::editable()
    };
    if let Some(recorded) = recorded {
        context = context.with_recorded_inputs(read_object(recorded)?);
    }

    let descriptor: FormDescriptor = match kind {
        FormKind::Config => config_form(),
        FormKind::Endpoint => endpoint_form(),
        FormKind::Result => result_form(&context),
    };
    descriptor.check().context("form descriptor is inconsistent")?;

    Ok(serde_json::to_string_pretty(&descriptor.to_json())?)
}

fn validate(field: &str, value: &str) -> anyhow::Result<String> {
    let path = if field.contains('.') {
        field.to_owned()
    } else {
        format!("input.{field}")
    };

    let descriptor = config_form();
    let field = descriptor
        .field(&path)
        .ok_or_else(|| anyhow!("unknown field '{path}'"))?;

    let result = match field.options.and_then(|options| options.validator) {
        Some(validator) => validator.run(&Value::from(value), &Map::new()),
        None => ValidationResult::valid(),
    };

    tracing::debug!(
        target: TRACING_TARGET_COMMAND,
        field = %path,
        valid = result.is_valid(),
        "Field validated"
    );
    Ok(serde_json::to_string_pretty(&result)?)
}

async fn validate_endpoint(
    endpoint: EndpointProperties,
    client: ClientConfig,
) -> anyhow::Result<String> {
    let tile = EndpointTile::new(RestClient::new(client)?);
    let mut inputs = Map::new();
    inputs.insert("endpoint".to_owned(), serde_json::to_value(&endpoint)?);

    let response = TileExecutor::default().run_once(&tile, inputs).await;
    if let Some(message) = response.failure_message() {
        bail!("{message}");
    }
    Ok(format!("REST Endpoint '{}' is valid.", endpoint.url))
}

async fn preview(
    values: Map<String, Value>,
    registry: EndpointRegistry,
    client: ClientConfig,
) -> anyhow::Result<String> {
    let host = LocalHost::new(registry, RestClient::new(client)?);

    let mut session = FormSession::render(config_form(), HostContext::editable())?;
    session.finish_render();
    session.load_options(&host).await;

    for (section, fields) in &values {
        let Some(fields) = fields.as_object() else {
            bail!("section '{section}' must be an object");
        };
        for (name, value) in fields {
            let path = format!("{section}.{name}");
            session
                .set_value(&path, value.clone())
                .with_context(|| format!("failed to set '{path}'"))?;
        }
    }

    let errors = session.validate();
    if !errors.is_empty() {
        let details = errors
            .iter()
            .map(|(path, result)| {
                let message = result.message.as_deref().unwrap_or_default();
                format!("{path}: {message}")
            })
            .collect::<Vec<_>>()
            .join("\n");
        bail!("form is invalid\n{details}");
    }

    Ok(session.click_preview(&host).await?)
}

async fn run(
    inputs: Map<String, Value>,
    client: ClientConfig,
    max_duration: Option<Duration>,
) -> anyhow::Result<String> {
    let tile = TaskTile::new(RestClient::new(client)?);
    let mut config = ExecutorConfig::default();
    if let Some(max_duration) = max_duration {
        config = config.with_max_duration(max_duration);
    }

    let response = TileExecutor::new(config)
        .run_to_completion(&tile, inputs)
        .await?;
    if let Some(message) = response.failure_message() {
        bail!("{message}");
    }
    Ok(serde_json::to_string_pretty(&response.visible_outputs())?)
}

fn read_object(path: &Path) -> anyhow::Result<Map<String, Value>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    match value {
        Value::Object(object) => Ok(object),
        _ => bail!("{} must contain a JSON object", path.display()),
    }
}

fn read_registry(path: &Path) -> anyhow::Result<EndpointRegistry> {
    let object = read_object(path)?;
    EndpointRegistry::from_json(Value::Object(object))
        .with_context(|| format!("invalid endpoints in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prints_forms() {
        let json = forms(FormKind::Endpoint, false, None).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert!(value["schema"]["properties"]["url"].is_object());
    }

    #[test]
    fn validates_fields() {
        let json = validate("expectedStatuses", "200,200").unwrap();
        let result: ValidationResult = serde_json::from_str(&json).unwrap();
        assert!(!result.is_valid());
        assert_eq!(result.message.as_deref(), Some("Duplicate status: 200"));

        let json = validate("path", "${input.path}").unwrap();
        let result: ValidationResult = serde_json::from_str(&json).unwrap();
        assert!(result.is_valid());

        assert!(validate("missing", "x").is_err());
    }
}
