//! Form descriptors.

use restile_core::{Error, Result};
use serde_json::{Map, Value};

use crate::control::Controls;
use crate::host::HostContext;
use crate::options::FieldOptions;
use crate::schema::{FieldSchema, FieldType};

/// Hook run once after the host finished rendering a form.
pub type PostRenderHook = fn(&mut Controls, &HostContext);

/// Schema and options of a form, plus optional initial data.
#[derive(Debug, Clone)]
pub struct FormDescriptor {
    pub schema: FieldSchema,
    pub options: FieldOptions,
    pub data: Option<Value>,
    pub post_render: Option<PostRenderHook>,
}

/// Schema node of a field together with its options, if any.
#[derive(Debug, Clone, Copy)]
pub struct Field<'a> {
    pub schema: &'a FieldSchema,
    pub options: Option<&'a FieldOptions>,
}

impl Field<'_> {
    pub fn is_readonly(&self) -> bool {
        self.options.is_some_and(|options| options.readonly)
    }

    pub fn is_bound(&self) -> bool {
        self.options.is_none_or(|options| options.bound)
    }
}

impl FormDescriptor {
    pub fn new(schema: FieldSchema, options: FieldOptions) -> Self {
        Self {
            schema,
            options,
            data: None,
            post_render: None,
        }
    }

    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    #[must_use]
    pub fn with_post_render(mut self, hook: PostRenderHook) -> Self {
        self.post_render = Some(hook);
        self
    }

    /// Serialises the descriptor as a `{schema, options, data}` document.
    pub fn to_json(&self) -> Value {
        let mut document = Map::new();
        document.insert("schema".into(), self.schema.to_json());
        document.insert("options".into(), self.options.to_json());
        if let Some(data) = &self.data {
            document.insert("data".into(), data.clone());
        }
        Value::Object(document)
    }

    /// Resolves a dotted path such as `input.path` to its field.
    pub fn field(&self, path: &str) -> Option<Field<'_>> {
        let mut schema = &self.schema;
        let mut options = Some(&self.options);
        for name in path.split('.') {
            schema = schema.property(name)?;
            options = options.and_then(|options| options.field(name));
        }
        Some(Field { schema, options })
    }

    /// Lists the dotted paths of all object properties, parents first.
    pub fn field_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        collect_paths(&self.schema, "", &mut paths);
        paths
    }

    /// Checks the descriptor's internal consistency.
    ///
    /// Dependencies may only name siblings, option entries must match schema
    /// properties, defaults must be allowed values and minimums only apply to
    /// integers.
    pub fn check(&self) -> Result<()> {
        check_node(&self.schema, Some(&self.options), "")
    }
}

fn collect_paths(schema: &FieldSchema, prefix: &str, paths: &mut Vec<String>) {
    for (name, child) in &schema.properties {
        let path = join_path(prefix, name);
        paths.push(path.clone());
        collect_paths(child, &path, paths);
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_owned()
    } else {
        format!("{prefix}.{name}")
    }
}

fn invalid(message: String) -> Result<()> {
    Err(Error::invalid_input().with_message(message))
}

fn check_node(schema: &FieldSchema, options: Option<&FieldOptions>, path: &str) -> Result<()> {
    if schema.minimum.is_some() && schema.field_type != Some(FieldType::Integer) {
        return invalid(format!("Field '{path}' has a minimum but is not an integer"));
    }
    if let Some(default) = &schema.default
        && !schema.enumeration.is_empty()
        && !default
            .as_str()
            .is_some_and(|value| schema.enumeration.iter().any(|allowed| allowed == value))
    {
        return invalid(format!("Default of field '{path}' is not an allowed value"));
    }

    if let Some(options) = options {
        for (name, _) in &options.fields {
            if schema.property(name).is_none() {
                return invalid(format!(
                    "Options name unknown field '{}'",
                    join_path(path, name)
                ));
            }
        }
    }

    for (name, child) in &schema.properties {
        let child_path = join_path(path, name);
        let child_options = options.and_then(|options| options.field(name));

        let schema_dependencies = child.dependencies.iter();
        let value_dependencies = child_options
            .into_iter()
            .flat_map(|options| options.dependencies.iter().map(|d| &d.field));
        for dependency in schema_dependencies.chain(value_dependencies) {
            if dependency == name || schema.property(dependency).is_none() {
                return invalid(format!(
                    "Field '{child_path}' depends on '{dependency}', which is not a sibling"
                ));
            }
        }

        check_node(child, child_options, &child_path)?;
    }

    if let Some(items) = &schema.items {
        let item_options = options.and_then(|options| options.items.as_deref());
        check_node(items, item_options, &join_path(path, "items"))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use restile_core::ErrorKind;
    use serde_json::json;

    use super::*;
    use crate::options::{ValueDependency, Widget};

    fn descriptor() -> FormDescriptor {
        let schema = FieldSchema::object("Form").with_property(
            "input",
            FieldSchema::object("Input")
                .with_property("poll", FieldSchema::boolean("Poll"))
                .with_property(
                    "interval",
                    FieldSchema::integer("Interval")
                        .with_minimum(1)
                        .depends_on(["poll"]),
                ),
        );
        let options = FieldOptions::plain().with_field(
            "input",
            FieldOptions::plain().with_field(
                "interval",
                FieldOptions::new(Widget::Number)
                    .depends_on(ValueDependency::new("poll", [json!(true)])),
            ),
        );
        FormDescriptor::new(schema, options)
    }

    #[test]
    fn resolves_fields() {
        let descriptor = descriptor();
        let field = descriptor.field("input.interval").unwrap();
        assert_eq!(field.schema.minimum, Some(1));
        assert_eq!(field.options.unwrap().widget, Some(Widget::Number));

        let field = descriptor.field("input.poll").unwrap();
        assert!(field.options.is_none());
        assert!(field.is_bound());
        assert!(descriptor.field("input.missing").is_none());
    }

    #[test]
    fn lists_paths() {
        assert_eq!(
            descriptor().field_paths(),
            ["input", "input.poll", "input.interval"]
        );
    }

    #[test]
    fn accepts_consistent_descriptors() {
        descriptor().check().unwrap();
    }

    #[test]
    fn rejects_non_sibling_dependencies() {
        let mut descriptor = descriptor();
        descriptor.schema.properties[0].1.properties[1].1.dependencies = vec!["timeout".into()];

        let error = descriptor.check().unwrap_err();
        assert_eq!(error.kind, ErrorKind::InvalidInput);
        assert!(error.user_message().contains("not a sibling"));
    }

    #[test]
    fn rejects_unknown_option_fields() {
        let mut descriptor = descriptor();
        descriptor.options = descriptor
            .options
            .with_field("output", FieldOptions::new(Widget::OutputTable));

        assert!(descriptor.check().is_err());
    }

    #[test]
    fn document_layout() {
        let json = descriptor().with_data(json!({ "input": {} })).to_json();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["schema", "options", "data"]);
    }
}
