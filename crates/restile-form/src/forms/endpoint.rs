//! Endpoint credential form.

use serde_json::json;

use crate::descriptor::FormDescriptor;
use crate::options::{FieldOptions, Widget};
use crate::schema::FieldSchema;

/// Builds the form describing a REST endpoint's connection properties.
pub fn endpoint_form() -> FormDescriptor {
    let schema = FieldSchema::object("Endpoint Properties")
        .with_property("url", FieldSchema::untyped("Url").required())
        .with_property("username", FieldSchema::untyped("Username"))
        .with_property("password", FieldSchema::untyped("Password"));

    let options = FieldOptions::plain()
        .with_field(
            "url",
            FieldOptions::new(Widget::Url)
                .with_placeholder("eg: protocol://host:port/")
                .with_extra("allowIntranet", json!(true)),
        )
        .with_field("username", FieldOptions::plain().with_placeholder("username"))
        .with_field(
            "password",
            FieldOptions::new(Widget::Password).with_placeholder("password"),
        );

    FormDescriptor::new(schema, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_url_is_required() {
        let form = endpoint_form();
        form.check().unwrap();

        assert!(form.field("url").unwrap().schema.required);
        assert!(!form.field("username").unwrap().schema.required);
        assert!(!form.field("password").unwrap().schema.required);
        assert!(form.post_render.is_none());
    }

    #[test]
    fn password_is_masked() {
        let json = endpoint_form().to_json();
        assert_eq!(json["options"]["fields"]["password"]["type"], "password");
        assert_eq!(json["options"]["fields"]["url"]["allowIntranet"], true);
    }
}
