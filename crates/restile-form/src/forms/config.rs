//! Task configuration form.

use restile_core::{ENDPOINT_TYPE_TAG, Method};
use serde_json::json;

use crate::control::Controls;
use crate::descriptor::FormDescriptor;
use crate::host::HostContext;
use crate::options::{
    FieldEvent, FieldOptions, OptionSource, ToolbarAction, ValueDependency, Widget,
};
use crate::schema::{FieldSchema, FieldType};
use crate::validate::{HTTP_STATUS_CODES, Validator};

/// Path of the response preview field.
pub const PREVIEW_FIELD: &str = "input.preview";

/// Path of the endpoint selector.
pub const ENDPOINT_FIELD: &str = "input.endpoint";

/// Builds the configuration form with its input and output sections.
pub fn config_form() -> FormDescriptor {
    let schema = FieldSchema::new(FieldType::Object)
        .with_property("input", input_schema())
        .with_property("output", FieldSchema::object("Output Parameters"));

    let options = FieldOptions::plain()
        .with_field("input", input_options())
        .with_field(
            "output",
            FieldOptions::new(Widget::OutputTable).with_extra("appendStatus", json!(true)),
        );

    FormDescriptor::new(schema, options).with_post_render(hide_preview_in_view_mode)
}

/// Hides the preview field when the form is shown in view mode.
fn hide_preview_in_view_mode(controls: &mut Controls, context: &HostContext) {
    if context.read_only {
        controls.hide(PREVIEW_FIELD);
    }
}

fn input_schema() -> FieldSchema {
    let header = FieldSchema::object("Header")
        .with_property("name", FieldSchema::string("Key"))
        .with_property("value", FieldSchema::string("Value"));

    FieldSchema::object("Input Parameters")
        .with_help_link("help.html")
        .with_property("endpoint", FieldSchema::untyped("Endpoint").required())
        .with_property(
            "method",
            FieldSchema::untyped("Method")
                .required()
                .depends_on(["endpoint"])
                .with_default(json!(Method::Get.as_ref()))
                .with_enum(Method::names()),
        )
        .with_property(
            "path",
            FieldSchema::untyped("Relative Path")
                .required()
                .depends_on(["endpoint"]),
        )
        .with_property(
            "headers",
            FieldSchema::array("Headers", header).depends_on(["endpoint"]),
        )
        .with_property("body", FieldSchema::string("Body").depends_on(["method"]))
        .with_property(
            "expectedStatuses",
            FieldSchema::string("Expected Status Codes").depends_on(["endpoint"]),
        )
        .with_property(
            "expectedResponse",
            FieldSchema::string("Expected Response Body").depends_on(["endpoint"]),
        )
        .with_property(
            "poll",
            FieldSchema::boolean("Poll").depends_on(["expectedResponse"]),
        )
        .with_property(
            "interval",
            FieldSchema::integer("Interval")
                .required()
                .with_minimum(1)
                .depends_on(["poll"]),
        )
        .with_property(
            "timeout",
            FieldSchema::integer("Timeout")
                .required()
                .with_minimum(1)
                .depends_on(["poll"]),
        )
        .with_property(
            "preview",
            FieldSchema::string("Preview").depends_on(["method", "path"]),
        )
}

fn input_options() -> FieldOptions {
    let with_body = ValueDependency::new("method", [json!("POST"), json!("PUT")]);
    let polling = ValueDependency::new("poll", [json!(true)]);

    FieldOptions::plain()
        .with_field(
            "endpoint",
            FieldOptions::new(Widget::Select)
                .with_option_source(OptionSource::EntitiesOfType(ENDPOINT_TYPE_TAG.to_owned()))
                .with_extra("noneLabel", json!("-- Select Endpoint --"))
                .with_extra("removeDefaultNone", json!(false)),
        )
        .with_field(
            "method",
            FieldOptions::new(Widget::Select)
                .with_extra("removeDefaultNone", json!(true))
                .with_extra("sort", json!(false)),
        )
        .with_field(
            "path",
            FieldOptions::plain()
                .with_placeholder("eg: /rest-api/resource")
                .with_validator(Validator::RelativePath),
        )
        .with_field(
            "headers",
            FieldOptions::new(Widget::Table)
                .with_toolbar([ToolbarAction::Add, ToolbarAction::RemoveLast])
                .with_extra("showActionsColumn", json!(false))
                .with_items(
                    FieldOptions::plain()
                        .with_field("name", FieldOptions::plain().with_placeholder("Key"))
                        .with_field("value", FieldOptions::plain().with_placeholder("Value")),
                ),
        )
        .with_field(
            "body",
            FieldOptions::new(Widget::Editor)
                .with_validator(Validator::RequestBody)
                .depends_on(with_body)
                .with_extra("aceMode", json!("ace/mode/plain_text"))
                .with_extra("size", json!(50)),
        )
        .with_field(
            "expectedStatuses",
            FieldOptions::new(Widget::Token)
                .with_placeholder("Leave blank to accept all status codes")
                .with_suggestions(HTTP_STATUS_CODES.iter().copied())
                .with_validator(Validator::ExpectedStatuses),
        )
        .with_field(
            "expectedResponse",
            FieldOptions::plain()
                .with_placeholder("Regular Expression eg: ^[a-z0-9_-]{3,16}$")
                .with_validator(Validator::ExpectedResponse),
        )
        .with_field(
            "poll",
            FieldOptions::new(Widget::Checkbox)
                .with_extra("rightLabel", json!("Repeat until the expected response body is received.")),
        )
        .with_field(
            "interval",
            FieldOptions::new(Widget::Number).depends_on(polling.clone()),
        )
        .with_field("timeout", FieldOptions::new(Widget::Number).depends_on(polling))
        .with_field(
            "preview",
            FieldOptions::new(Widget::Textarea)
                .with_placeholder("Click for preview")
                .readonly()
                .unbound()
                .on(FieldEvent::PreviewOnClick),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_consistent() {
        config_form().check().unwrap();
    }

    #[test]
    fn input_field_order() {
        let form = config_form();
        let input = form.schema.property("input").unwrap();
        let names: Vec<&str> = input.properties.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(
            names,
            [
                "endpoint",
                "method",
                "path",
                "headers",
                "body",
                "expectedStatuses",
                "expectedResponse",
                "poll",
                "interval",
                "timeout",
                "preview",
            ]
        );
    }

    #[test]
    fn method_defaults_to_get() {
        let form = config_form();
        let method = form.field("input.method").unwrap();
        assert_eq!(method.schema.default, Some(json!("GET")));
        assert_eq!(
            method.schema.enumeration,
            ["GET", "POST", "PUT", "HEAD", "OPTIONS", "DELETE", "TRACE"]
        );
    }

    #[test]
    fn preview_is_unbound_and_readonly() {
        let form = config_form();
        let preview = form.field(PREVIEW_FIELD).unwrap();
        assert!(preview.is_readonly());
        assert!(!preview.is_bound());
        assert_eq!(
            preview.options.unwrap().events,
            [FieldEvent::PreviewOnClick]
        );
    }

    #[test]
    fn post_render_hides_preview_only_in_view_mode() {
        let form = config_form();
        let hook = form.post_render.unwrap();

        let mut controls = Controls::new(form.field_paths());
        hook(&mut controls, &HostContext::editable());
        assert!(!controls.is_hidden(PREVIEW_FIELD));

        hook(&mut controls, &HostContext::read_only());
        assert!(controls.is_hidden(PREVIEW_FIELD));
    }

    #[test]
    fn document_shape() {
        let json = config_form().to_json();
        assert_eq!(json["schema"]["properties"]["input"]["helpLink"], "help.html");
        assert_eq!(
            json["options"]["fields"]["input"]["fields"]["endpoint"]["dataSource"]["entitiesOfType"],
            ENDPOINT_TYPE_TAG
        );
        assert_eq!(
            json["options"]["fields"]["input"]["fields"]["body"]["dependencies"]["method"],
            json!(["POST", "PUT"])
        );
        assert_eq!(json["options"]["fields"]["output"]["type"], "output-table");
        assert!(json.get("data").is_none());
    }
}
