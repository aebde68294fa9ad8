//! Rendered form instances.

use std::collections::BTreeMap;

use restile_core::{Error, PREVIEW_OPERATION, Result, is_variable_binding};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display};

use crate::TRACING_TARGET;
use crate::control::Controls;
use crate::descriptor::FormDescriptor;
use crate::host::{HostBridge, HostContext};
use crate::options::{FieldEvent, OptionSource, RowSetup, SelectOption, ToolbarAction, Widget};
use crate::row::OutputRow;
use crate::schema::{FieldSchema, FieldType};
use crate::validate::ValidationResult;

/// Shown instead of a preview when the path or body is a variable binding.
pub const PREVIEW_UNAVAILABLE: &str = "Preview not available for input with variable binding.";

/// Shown to the user when the preview operation fails.
pub const PREVIEW_FAILED: &str = "Failed to get response preview";

/// Written into the preview field, followed by the host's error detail.
pub const PREVIEW_FAILED_DETAIL: &str = "Failed to get response preview with the error below.\n";

/// Shown to the user when endpoint choices cannot be fetched.
pub const ENDPOINT_QUERY_FAILED: &str = "Failed to retrieve REST Endpoint.";

/// Message for required fields without a value.
pub const REQUIRED_ERROR: &str = "This field is not optional.";

/// Message for values outside a field's allowed list.
pub const ENUM_ERROR: &str = "This field value is not one of the allowed values.";

/// Render lifecycle of a form instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display)]
#[strum(serialize_all = "snake_case")]
pub enum RenderState {
    Rendering,
    Rendered,
}

/// One rendered instance of a form descriptor.
///
/// The session owns the form's values and control handles. Validation and
/// visibility are evaluated against the current snapshot of values.
#[derive(Debug, Clone)]
pub struct FormSession {
    descriptor: FormDescriptor,
    context: HostContext,
    state: RenderState,
    controls: Controls,
    values: Map<String, Value>,
}

impl FormSession {
    /// Starts rendering a descriptor with its initial data and defaults.
    pub fn render(descriptor: FormDescriptor, context: HostContext) -> Result<Self> {
        descriptor.check()?;

        let mut values = match &descriptor.data {
            Some(Value::Object(data)) => data.clone(),
            Some(_) => {
                return Err(Error::invalid_input().with_message("Form data must be an object"));
            }
            None => Map::new(),
        };
        apply_defaults(&descriptor.schema, &mut values);

        let controls = Controls::new(descriptor.field_paths());

        tracing::debug!(
            target: TRACING_TARGET,
            read_only = context.read_only,
            fields = descriptor.field_paths().len(),
            "Rendering form"
        );

        Ok(Self {
            descriptor,
            context,
            state: RenderState::Rendering,
            controls,
            values,
        })
    }

    /// Completes rendering, running the post-render hook.
    ///
    /// Returns `false` when the form had already been rendered; the hook runs
    /// at most once per session.
    pub fn finish_render(&mut self) -> bool {
        if self.state == RenderState::Rendered {
            return false;
        }

        if let Some(hook) = self.descriptor.post_render {
            hook(&mut self.controls, &self.context);
        }
        self.state = RenderState::Rendered;

        tracing::debug!(target: TRACING_TARGET, "Form rendered");
        true
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    pub fn descriptor(&self) -> &FormDescriptor {
        &self.descriptor
    }

    pub fn context(&self) -> &HostContext {
        &self.context
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    /// Returns the form data.
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Returns the value at a dotted path.
    pub fn value(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.values.get(segments.next()?)?;
        for segment in segments {
            current = current.get(segment)?;
        }
        Some(current)
    }

    /// Records a user edit of the field at `path`.
    pub fn set_value(&mut self, path: &str, value: Value) -> Result<()> {
        let Some(field) = self.descriptor.field(path) else {
            return Err(Error::not_found().with_message(format!("Unknown field '{path}'")));
        };
        if !field.is_bound() || self.is_readonly(path) {
            return Err(Error::invalid_input().with_message(format!("Field '{path}' is read-only")));
        }

        let (parent, name) = split_path(path);
        let mut target = &mut self.values;
        if let Some(parent) = parent {
            for segment in parent.split('.') {
                let entry = target
                    .entry(segment.to_owned())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !entry.is_object() {
                    *entry = Value::Object(Map::new());
                }
                let Some(nested) = entry.as_object_mut() else {
                    let message = format!("Section '{segment}' is not an object");
                    return Err(Error::invalid_input().with_message(message));
                };
                target = nested;
            }
        }

        tracing::trace!(target: TRACING_TARGET, field = path, "Field value changed");
        target.insert(name.to_owned(), value);
        Ok(())
    }

    /// Performs a toolbar action on the array field at `path`.
    ///
    /// `Add` appends an empty row built from the item schema, `RemoveLast`
    /// drops the last row and leaves an empty list alone.
    pub fn toolbar_action(&mut self, path: &str, action: ToolbarAction) -> Result<()> {
        let Some(field) = self.descriptor.field(path) else {
            return Err(Error::not_found().with_message(format!("Unknown field '{path}'")));
        };
        if !field.options.is_some_and(|options| options.toolbar.contains(&action)) {
            let message = format!("Field '{path}' does not offer '{action}'");
            return Err(Error::invalid_input().with_message(message));
        }
        if self.is_readonly(path) {
            return Err(Error::invalid_input().with_message(format!("Field '{path}' is read-only")));
        }

        let mut rows = self
            .value(path)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        match action {
            ToolbarAction::Add => rows.push(empty_row(field.schema.items.as_deref())),
            ToolbarAction::RemoveLast => {
                if rows.pop().is_none() {
                    return Ok(());
                }
            }
        }

        tracing::trace!(target: TRACING_TARGET, field = path, action = %action, "Toolbar action");
        self.set_value(path, Value::Array(rows))
    }

    /// Returns whether the field or one of its sections is read-only.
    ///
    /// Every field is read-only while the form is shown in view mode.
    pub fn is_readonly(&self, path: &str) -> bool {
        if self.context.read_only || self.descriptor.options.readonly {
            return true;
        }
        prefixes(path).any(|prefix| {
            self.descriptor
                .field(prefix)
                .is_some_and(|field| field.is_readonly())
        })
    }

    /// Returns whether the field is currently shown.
    ///
    /// A field is shown when its control was not hidden, its section is
    /// shown, every sibling it depends on is shown and holds a value, and
    /// every value dependency is met.
    pub fn is_visible(&self, path: &str) -> bool {
        self.visible_with(path, &mut Vec::new())
    }

    fn visible_with(&self, path: &str, visiting: &mut Vec<String>) -> bool {
        if visiting.iter().any(|p| p == path) || self.controls.is_hidden(path) {
            return false;
        }
        let Some(field) = self.descriptor.field(path) else {
            return false;
        };

        let (parent, _) = split_path(path);
        if let Some(parent) = parent
            && !self.visible_with(parent, visiting)
        {
            return false;
        }

        let siblings = match parent {
            Some(parent) => self.value(parent).and_then(Value::as_object),
            None => Some(&self.values),
        };
        let sibling_path = |name: &str| match parent {
            Some(parent) => format!("{parent}.{name}"),
            None => name.to_owned(),
        };

        visiting.push(path.to_owned());
        let present = field.schema.dependencies.iter().all(|name| {
            siblings.and_then(|s| s.get(name)).is_some_and(has_value)
                && self.visible_with(&sibling_path(name), visiting)
        });
        let matched = present
            && field.options.is_none_or(|options| {
                options.dependencies.iter().all(|dependency| {
                    siblings.is_some_and(|s| dependency.is_met(s))
                        && self.visible_with(&sibling_path(&dependency.field), visiting)
                })
            });
        visiting.pop();

        matched
    }

    /// Returns whether the field must hold a value.
    pub fn is_required(&self, path: &str) -> bool {
        self.descriptor
            .field(path)
            .is_some_and(|field| field.schema.required)
            && self.is_visible(path)
    }

    /// Validates one field against the current values.
    ///
    /// Returns `None` for fields that are not validated: unknown, hidden,
    /// read-only or unbound ones.
    pub fn validate_field(&self, path: &str) -> Option<ValidationResult> {
        let field = self.descriptor.field(path)?;
        if !field.is_bound() || self.is_readonly(path) || !self.is_visible(path) {
            return None;
        }

        let value = self.value(path).unwrap_or(&Value::Null);
        if !has_value(value) {
            if field.schema.required {
                return Some(ValidationResult::invalid(REQUIRED_ERROR));
            }
        } else if !is_allowed(field.schema, value) {
            return Some(ValidationResult::invalid(ENUM_ERROR));
        } else if field.schema.field_type == Some(FieldType::Integer) {
            let Some(number) = integer_value(value) else {
                return Some(ValidationResult::invalid("Value must be an integer."));
            };
            if let Some(minimum) = field.schema.minimum
                && number < minimum
            {
                return Some(ValidationResult::invalid(format!(
                    "The minimum value for this field is {minimum}."
                )));
            }
        }

        let result = match field.options.and_then(|options| options.validator) {
            Some(validator) => {
                let empty = Map::new();
                let (parent, _) = split_path(path);
                let siblings = match parent {
                    Some(parent) => self.value(parent).and_then(Value::as_object),
                    None => Some(&self.values),
                };
                validator.run(value, siblings.unwrap_or(&empty))
            }
            None => ValidationResult::valid(),
        };
        Some(result)
    }

    /// Validates every shown field, keyed by path.
    pub fn validate(&self) -> BTreeMap<String, ValidationResult> {
        self.descriptor
            .field_paths()
            .into_iter()
            .filter_map(|path| {
                let result = self.validate_field(&path)?;
                Some((path, result))
            })
            .collect()
    }

    /// Returns whether every shown field is valid.
    pub fn is_valid(&self) -> bool {
        self.validate().values().all(ValidationResult::is_valid)
    }

    /// Fetches the choices of every select backed by host entities.
    ///
    /// Failures are reported to the host and leave the choices unset.
    pub async fn load_options<H>(&mut self, host: &H)
    where
        H: HostBridge + ?Sized,
    {
        let sources: Vec<(String, String)> = self
            .descriptor
            .field_paths()
            .into_iter()
            .filter_map(|path| {
                let field = self.descriptor.field(&path)?;
                match field.options?.option_source.as_ref()? {
                    OptionSource::EntitiesOfType(type_tag) => Some((path, type_tag.clone())),
                }
            })
            .collect();

        for (path, type_tag) in sources {
            match host.query_entities_by_type(&type_tag).await {
                Ok(entities) => {
                    tracing::debug!(
                        target: TRACING_TARGET,
                        field = %path,
                        count = entities.len(),
                        "Loaded select options"
                    );
                    let choices = entities
                        .into_iter()
                        .map(|entity| SelectOption {
                            text: entity.display_name,
                            value: entity.reference,
                        })
                        .collect();
                    if let Some(handle) = self.controls.get_mut(&path) {
                        handle.choices = Some(choices);
                    }
                }
                Err(error) => {
                    tracing::error!(
                        target: TRACING_TARGET,
                        field = %path,
                        error = %error,
                        "Failed to load select options"
                    );
                    host.report_error(&error);
                    host.show_user_message(ENDPOINT_QUERY_FAILED);
                }
            }
        }
    }

    /// Handles a click on the preview field and returns the text it shows.
    ///
    /// Inputs holding a variable binding are never sent to the host.
    pub async fn click_preview<H>(&mut self, host: &H) -> Result<String>
    where
        H: HostBridge + ?Sized,
    {
        if self.state != RenderState::Rendered {
            return Err(Error::invalid_input().with_message("Form is still rendering"));
        }

        let Some(path) = self.descriptor.field_paths().into_iter().find(|path| {
            self.descriptor
                .field(path)
                .and_then(|field| field.options)
                .is_some_and(|options| options.events.contains(&FieldEvent::PreviewOnClick))
        }) else {
            return Err(Error::not_found().with_message("Form has no preview field"));
        };
        if !self.is_visible(&path) {
            return Err(Error::invalid_input().with_message("Preview field is hidden"));
        }

        let (section, _) = split_path(&path);
        let inputs = section
            .and_then(|section| self.value(section))
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        let text_of = |name: &str| inputs.get(name).and_then(Value::as_str).unwrap_or_default();
        let shown = if is_variable_binding(text_of("path")) || is_variable_binding(text_of("body")) {
            tracing::debug!(target: TRACING_TARGET, "Preview skipped for variable binding");
            PREVIEW_UNAVAILABLE.to_owned()
        } else {
            let request: Map<String, Value> = ["endpoint", "path", "headers", "method", "body"]
                .into_iter()
                .map(|name| {
                    let value = inputs.get(name).cloned().unwrap_or(Value::Null);
                    (name.to_owned(), value)
                })
                .collect();

            tracing::info!(
                target: TRACING_TARGET,
                operation = PREVIEW_OPERATION,
                "Requesting response preview"
            );
            match host.invoke_named_operation(PREVIEW_OPERATION, request).await {
                Ok(outputs) => match outputs.get("responsePreview") {
                    Some(Value::String(preview)) => preview.clone(),
                    Some(Value::Null) | None => String::new(),
                    Some(other) => other.to_string(),
                },
                Err(error) => {
                    tracing::error!(target: TRACING_TARGET, error = %error, "Preview failed");
                    host.report_error(&error);
                    host.show_user_message(PREVIEW_FAILED);
                    format!(
                        "{PREVIEW_FAILED_DETAIL}{}",
                        error.first_message().unwrap_or_default()
                    )
                }
            }
        };

        if let Some(handle) = self.controls.get_mut(&path) {
            handle.display = Some(shown.clone());
        }
        Ok(shown)
    }

    /// Chooses the value widget of every row in an output table.
    pub fn row_widgets(&self, path: &str) -> Vec<(String, Widget)> {
        let by_name = self
            .descriptor
            .field(path)
            .and_then(|field| field.options)
            .and_then(|options| options.items.as_deref())
            .and_then(|items| items.row_setup)
            .is_some_and(|setup| setup == RowSetup::ByOutputName);
        if !by_name {
            return Vec::new();
        }

        self.value(path)
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|row| serde_json::from_value::<OutputRow>(row.clone()).ok())
            .map(|row| {
                let widget = row.kind().widget();
                (row.name, widget)
            })
            .collect()
    }
}

fn apply_defaults(schema: &FieldSchema, values: &mut Map<String, Value>) {
    for (name, child) in &schema.properties {
        if child.is_object() {
            let entry = values
                .entry(name.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(nested) = entry {
                apply_defaults(child, nested);
            }
        } else if let Some(default) = &child.default {
            values.entry(name.clone()).or_insert_with(|| default.clone());
        }
    }
}

/// Splits `a.b.c` into `(Some("a.b"), "c")`.
fn split_path(path: &str) -> (Option<&str>, &str) {
    match path.rsplit_once('.') {
        Some((parent, name)) => (Some(parent), name),
        None => (None, path),
    }
}

/// Yields `a`, `a.b`, `a.b.c` for `a.b.c`.
fn prefixes(path: &str) -> impl Iterator<Item = &str> {
    path.match_indices('.')
        .map(move |(index, _)| &path[..index])
        .chain(std::iter::once(path))
}

/// Builds a new array row: item properties take their default or an empty string.
fn empty_row(items: Option<&FieldSchema>) -> Value {
    match items {
        Some(items) if items.is_object() => Value::Object(
            items
                .properties
                .iter()
                .map(|(name, schema)| {
                    let value = schema.default.clone().unwrap_or_else(|| Value::from(""));
                    (name.clone(), value)
                })
                .collect(),
        ),
        Some(items) => items.default.clone().unwrap_or_else(|| Value::from("")),
        None => Value::from(""),
    }
}

/// Checks a value against the schema's allowed list, if it has one.
fn is_allowed(schema: &FieldSchema, value: &Value) -> bool {
    schema.enumeration.is_empty()
        || value
            .as_str()
            .is_some_and(|text| schema.enumeration.iter().any(|allowed| allowed == text))
}

fn has_value(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

fn integer_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
