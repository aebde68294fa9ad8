//! Presentation options of a form.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use strum::{AsRefStr, Display, EnumString};

use crate::validate::Validator;

/// Input widget used to render a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum Widget {
    Text,
    Textarea,
    Password,
    Url,
    Number,
    Checkbox,
    Select,
    Table,
    Editor,
    Token,
    Hidden,
    /// Read-only label.
    Display,
    /// The task's output parameter table.
    OutputTable,
    /// One row of a table whose cell widgets are chosen per row.
    DynamicRow,
}

/// Where a select widget gets its choices from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionSource {
    /// Entities of the given type, fetched from the host when rendered.
    EntitiesOfType(String),
}

/// One choice of a select widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub text: String,
    pub value: String,
}

/// Shows a field only while a sibling holds one of the allowed values.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueDependency {
    pub field: String,
    pub allowed: Vec<Value>,
}

impl ValueDependency {
    pub fn new(field: impl Into<String>, allowed: impl IntoIterator<Item = Value>) -> Self {
        Self {
            field: field.into(),
            allowed: allowed.into_iter().collect(),
        }
    }

    /// Returns whether the sibling values satisfy this dependency.
    pub fn is_met(&self, siblings: &Map<String, Value>) -> bool {
        siblings
            .get(&self.field)
            .is_some_and(|value| self.allowed.contains(value))
    }
}

/// Toolbar action of a repeatable table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display)]
#[strum(serialize_all = "camelCase")]
pub enum ToolbarAction {
    Add,
    RemoveLast,
}

/// Interaction wired to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display)]
#[strum(serialize_all = "camelCase")]
pub enum FieldEvent {
    /// Clicking the field fetches a response preview into it.
    PreviewOnClick,
}

/// Chooses the cell widget of a table row from the row's own values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display)]
#[strum(serialize_all = "camelCase")]
pub enum RowSetup {
    /// Multi-line text for response headers and body, single-line otherwise.
    ByOutputName,
}

/// Presentation options of one field, mirroring its schema node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldOptions {
    pub widget: Option<Widget>,
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub help: Option<String>,
    pub readonly: bool,
    /// Whether the field's value is part of the form data.
    pub bound: bool,
    pub validator: Option<Validator>,
    pub dependencies: Vec<ValueDependency>,
    pub option_source: Option<OptionSource>,
    pub events: Vec<FieldEvent>,
    pub toolbar: Vec<ToolbarAction>,
    pub row_setup: Option<RowSetup>,
    /// Suggestions offered while typing into a token widget.
    pub suggestions: Vec<String>,
    /// Widget settings passed through to the renderer untouched.
    pub extra: Map<String, Value>,
    pub fields: Vec<(String, FieldOptions)>,
    pub items: Option<Box<FieldOptions>>,
}

impl FieldOptions {
    /// Creates bound options rendered with the given widget.
    pub fn new(widget: Widget) -> Self {
        Self {
            widget: Some(widget),
            bound: true,
            ..Default::default()
        }
    }

    /// Creates bound options leaving the widget to the renderer.
    pub fn plain() -> Self {
        Self {
            bound: true,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    #[must_use]
    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    /// Keeps the field's value out of the form data.
    #[must_use]
    pub fn unbound(mut self) -> Self {
        self.bound = false;
        self
    }

    #[must_use]
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    #[must_use]
    pub fn depends_on(mut self, dependency: ValueDependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    #[must_use]
    pub fn with_option_source(mut self, source: OptionSource) -> Self {
        self.option_source = Some(source);
        self
    }

    #[must_use]
    pub fn on(mut self, event: FieldEvent) -> Self {
        self.events.push(event);
        self
    }

    #[must_use]
    pub fn with_toolbar(mut self, actions: impl IntoIterator<Item = ToolbarAction>) -> Self {
        self.toolbar = actions.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_row_setup(mut self, setup: RowSetup) -> Self {
        self.row_setup = Some(setup);
        self
    }

    #[must_use]
    pub fn with_suggestions<I, S>(mut self, suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suggestions = suggestions.into_iter().map(Into::into).collect();
        self
    }

    /// Sets a renderer specific setting.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Appends options for a child field.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, options: FieldOptions) -> Self {
        self.fields.push((name.into(), options));
        self
    }

    /// Sets the options applied to every array element.
    #[must_use]
    pub fn with_items(mut self, items: FieldOptions) -> Self {
        self.items = Some(Box::new(items));
        self
    }

    /// Looks up a direct child's options by name.
    pub fn field(&self, name: &str) -> Option<&FieldOptions> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, options)| options)
    }

    /// Serialises the options in the host renderer's format.
    pub fn to_json(&self) -> Value {
        let mut node = Map::new();
        if let Some(widget) = self.widget {
            node.insert("type".into(), json!(widget.as_ref()));
        }
        if let Some(label) = &self.label {
            node.insert("label".into(), json!(label));
        }
        if let Some(placeholder) = &self.placeholder {
            node.insert("placeholder".into(), json!(placeholder));
        }
        if let Some(help) = &self.help {
            node.insert("helper".into(), json!(help));
        }
        if self.readonly {
            node.insert("readonly".into(), json!(true));
        }
        if !self.bound {
            node.insert("propertyBinding".into(), json!(false));
        }
        if let Some(validator) = self.validator {
            node.insert("validator".into(), json!(validator.as_ref()));
        }
        if !self.dependencies.is_empty() {
            let dependencies: Map<String, Value> = self
                .dependencies
                .iter()
                .map(|dependency| {
                    let allowed = match dependency.allowed.as_slice() {
                        [single] => single.clone(),
                        many => Value::Array(many.to_vec()),
                    };
                    (dependency.field.clone(), allowed)
                })
                .collect();
            node.insert("dependencies".into(), Value::Object(dependencies));
        }
        if let Some(OptionSource::EntitiesOfType(type_tag)) = &self.option_source {
            node.insert("dataSource".into(), json!({ "entitiesOfType": type_tag }));
        }
        if !self.events.is_empty() {
            let events: Vec<&str> = self.events.iter().map(AsRef::as_ref).collect();
            node.insert("events".into(), json!(events));
        }
        if !self.toolbar.is_empty() {
            let actions: Vec<Value> = self
                .toolbar
                .iter()
                .map(|action| json!({ "action": action.as_ref() }))
                .collect();
            node.insert("toolbar".into(), json!({ "actions": actions }));
        }
        if let Some(setup) = self.row_setup {
            node.insert("rowSetup".into(), json!(setup.as_ref()));
        }
        if !self.suggestions.is_empty() {
            node.insert("tokenfield".into(), json!({ "autocomplete": { "source": self.suggestions } }));
        }
        for (key, value) in &self.extra {
            node.insert(key.clone(), value.clone());
        }
        if !self.fields.is_empty() {
            let fields: Map<String, Value> = self
                .fields
                .iter()
                .map(|(name, options)| (name.clone(), options.to_json()))
                .collect();
            node.insert("fields".into(), Value::Object(fields));
        }
        if let Some(items) = &self.items {
            node.insert("items".into(), items.to_json());
        }
        Value::Object(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widget_names() {
        assert_eq!(Widget::OutputTable.as_ref(), "output-table");
        assert_eq!(Widget::Textarea.to_string(), "textarea");
        assert_eq!("dynamic-row".parse::<Widget>().unwrap(), Widget::DynamicRow);
    }

    #[test]
    fn value_dependencies() {
        let dependency = ValueDependency::new("poll", [json!(true)]);
        let mut siblings = Map::new();
        assert!(!dependency.is_met(&siblings));

        siblings.insert("poll".into(), json!(false));
        assert!(!dependency.is_met(&siblings));

        siblings.insert("poll".into(), json!(true));
        assert!(dependency.is_met(&siblings));
    }

    #[test]
    fn serialises_options() {
        let options = FieldOptions::plain()
            .with_field(
                "preview",
                FieldOptions::new(Widget::Textarea)
                    .readonly()
                    .unbound()
                    .on(FieldEvent::PreviewOnClick),
            )
            .with_field(
                "interval",
                FieldOptions::new(Widget::Number)
                    .depends_on(ValueDependency::new("poll", [json!(true)])),
            )
            .with_field(
                "headers",
                FieldOptions::new(Widget::Table)
                    .with_toolbar([ToolbarAction::Add, ToolbarAction::RemoveLast]),
            );

        let json = options.to_json();
        let preview = &json["fields"]["preview"];
        assert_eq!(preview["readonly"], true);
        assert_eq!(preview["propertyBinding"], false);
        assert_eq!(preview["events"], json!(["previewOnClick"]));
        assert_eq!(json["fields"]["interval"]["dependencies"], json!({ "poll": true }));
        assert_eq!(
            json["fields"]["headers"]["toolbar"]["actions"],
            json!([{ "action": "add" }, { "action": "removeLast" }])
        );
        assert!(json.get("propertyBinding").is_none());
    }
}
