//! Read-only result form of a finished task run.

use restile_core::Method;
use serde_json::{Value, json};

use crate::descriptor::FormDescriptor;
use crate::host::HostContext;
use crate::options::{FieldOptions, RowSetup, ValueDependency, Widget};
use crate::schema::{FieldSchema, FieldType};

/// Path of the output parameter table.
pub const OUTPUT_FIELD: &str = "output";

/// Builds the result form, pre-filled with the recorded endpoint's name.
pub fn result_form(context: &HostContext) -> FormDescriptor {
    let schema = FieldSchema::new(FieldType::Object)
        .with_property(OUTPUT_FIELD, output_schema())
        .with_property("input", input_schema());

    let options = FieldOptions::plain()
        .readonly()
        .with_field(OUTPUT_FIELD, output_options())
        .with_field("input", input_options());

    let endpoint = context
        .recorded_inputs
        .as_ref()
        .and_then(|inputs| inputs.get("endpoint"))
        .and_then(|endpoint| endpoint.get("displayName"))
        .cloned()
        .unwrap_or(Value::Null);

    FormDescriptor::new(schema, options).with_data(json!({ "input": { "endpoint": endpoint } }))
}

fn output_schema() -> FieldSchema {
    let row = FieldSchema::object("Output Parameter")
        .with_property("name", FieldSchema::string("Name"))
        .with_property("type", FieldSchema::string("Type"))
        .with_property("value", FieldSchema::untyped("Value"));

    FieldSchema::array("Output Parameters", row)
}

fn output_options() -> FieldOptions {
    let row = FieldOptions::new(Widget::DynamicRow)
        .with_row_setup(RowSetup::ByOutputName)
        .with_field("name", FieldOptions::new(Widget::Display))
        .with_field("type", FieldOptions::new(Widget::Hidden))
        .with_field("value", FieldOptions::plain());

    FieldOptions::new(Widget::OutputTable).with_items(row)
}

fn input_schema() -> FieldSchema {
    let header = FieldSchema::object("Header")
        .with_property("name", FieldSchema::string("Key"))
        .with_property("value", FieldSchema::string("Value"));

    FieldSchema::object("Input Parameters")
        .with_property("endpoint", FieldSchema::untyped("Endpoint"))
        .with_property("path", FieldSchema::untyped("Relative URL"))
        .with_property(
            "method",
            FieldSchema::untyped("Method").with_enum(Method::names()),
        )
        .with_property("headers", FieldSchema::array("Headers", header))
        .with_property("body", FieldSchema::string("Body").depends_on(["method"]))
        .with_property("expectedStatuses", FieldSchema::string("Expected Status Codes"))
        .with_property("expectedResponse", FieldSchema::string("Expected Response body"))
        .with_property("poll", FieldSchema::boolean("Poll"))
        .with_property("interval", FieldSchema::integer("Interval"))
        .with_property("timeout", FieldSchema::integer("Timeout"))
}

fn input_options() -> FieldOptions {
    FieldOptions::plain()
        .with_field("endpoint", FieldOptions::new(Widget::Text))
        .with_field("path", FieldOptions::new(Widget::Text))
        .with_field("method", FieldOptions::new(Widget::Text))
        .with_field("headers", FieldOptions::new(Widget::Table))
        .with_field(
            "body",
            FieldOptions::new(Widget::Editor).depends_on(ValueDependency::new(
                "method",
                [json!("POST"), json!("PUT")],
            )),
        )
        .with_field("expectedStatuses", FieldOptions::new(Widget::Token))
        .with_field("expectedResponse", FieldOptions::new(Widget::Text))
        .with_field(
            "poll",
            FieldOptions::new(Widget::Checkbox)
                .with_extra("rightLabel", json!("Repeat until the expected response body is received.")),
        )
        .with_field("interval", FieldOptions::new(Widget::Number))
        .with_field("timeout", FieldOptions::new(Widget::Number))
}
