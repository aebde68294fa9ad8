//! Data schema of a form.

use serde_json::{Map, Value, json};
use strum::{AsRefStr, Display};

/// Data type of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display)]
#[strum(serialize_all = "snake_case")]
pub enum FieldType {
    String,
    Integer,
    Boolean,
    Object,
    Array,
}

/// One node of the data schema.
///
/// Object nodes keep their properties in declaration order, which is also the
/// order in which the host renders them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSchema {
    pub title: Option<String>,
    pub help_link: Option<String>,
    pub field_type: Option<FieldType>,
    pub required: bool,
    pub default: Option<Value>,
    pub enumeration: Vec<String>,
    pub minimum: Option<i64>,
    /// Sibling fields that must hold a value for this field to be shown.
    pub dependencies: Vec<String>,
    pub properties: Vec<(String, FieldSchema)>,
    pub items: Option<Box<FieldSchema>>,
}

impl FieldSchema {
    /// Creates a node of the given type.
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type: Some(field_type),
            ..Default::default()
        }
    }

    /// Creates an untyped node, rendered as plain text by the host.
    pub fn untyped(title: impl Into<String>) -> Self {
        Self::default().with_title(title)
    }

    pub fn string(title: impl Into<String>) -> Self {
        Self::new(FieldType::String).with_title(title)
    }

    pub fn integer(title: impl Into<String>) -> Self {
        Self::new(FieldType::Integer).with_title(title)
    }

    pub fn boolean(title: impl Into<String>) -> Self {
        Self::new(FieldType::Boolean).with_title(title)
    }

    pub fn object(title: impl Into<String>) -> Self {
        Self::new(FieldType::Object).with_title(title)
    }

    /// Creates an array node whose elements follow `items`.
    pub fn array(title: impl Into<String>, items: FieldSchema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::new(FieldType::Array).with_title(title)
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Attaches a help page link shown next to the title.
    #[must_use]
    pub fn with_help_link(mut self, link: impl Into<String>) -> Self {
        self.help_link = Some(link.into());
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    #[must_use]
    pub fn with_enum<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enumeration = values.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_minimum(mut self, minimum: i64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    /// Shows this field only while every named sibling holds a value.
    #[must_use]
    pub fn depends_on<I, S>(mut self, siblings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = siblings.into_iter().map(Into::into).collect();
        self
    }

    /// Appends a property to an object node.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, schema: FieldSchema) -> Self {
        self.properties.push((name.into(), schema));
        self
    }

    /// Looks up a direct property by name.
    pub fn property(&self, name: &str) -> Option<&FieldSchema> {
        self.properties
            .iter()
            .find(|(property, _)| property == name)
            .map(|(_, schema)| schema)
    }

    pub fn is_object(&self) -> bool {
        self.field_type == Some(FieldType::Object)
    }

    /// Serialises the node in the host renderer's schema format.
    pub fn to_json(&self) -> Value {
        let mut node = Map::new();
        if let Some(title) = &self.title {
            node.insert("title".into(), json!(title));
        }
        if let Some(link) = &self.help_link {
            node.insert("helpLink".into(), json!(link));
        }
        if let Some(field_type) = self.field_type {
            node.insert("type".into(), json!(field_type.as_ref()));
        }
        if self.required {
            node.insert("required".into(), json!(true));
        }
        if let Some(default) = &self.default {
            node.insert("default".into(), default.clone());
        }
        if !self.enumeration.is_empty() {
            node.insert("enum".into(), json!(self.enumeration));
        }
        if let Some(minimum) = self.minimum {
            node.insert("minimum".into(), json!(minimum));
        }
        if !self.dependencies.is_empty() {
            node.insert("dependencies".into(), json!(self.dependencies));
        }
        if !self.properties.is_empty() {
            let properties: Map<String, Value> = self
                .properties
                .iter()
                .map(|(name, schema)| (name.clone(), schema.to_json()))
                .collect();
            node.insert("properties".into(), Value::Object(properties));
        }
        if let Some(items) = &self.items {
            node.insert("items".into(), items.to_json());
        }
        Value::Object(node)
    }
}
