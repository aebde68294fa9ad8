//! Field validators.
//!
//! Validators are pure functions of the field value and the values of its
//! siblings. They never fail; problems are reported through the returned
//! [`ValidationResult`].

use std::sync::LazyLock;

use regex::Regex;
use restile_core::is_variable_binding;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display};

/// Message for paths that are not relative references.
pub const INVALID_PATH_ERROR: &str = "Invalid relative URL";

/// Message for malformed expected status lists.
pub const INVALID_STATUS_ERROR: &str = "Invalid http status code";

/// Prefix of the message listing repeated expected statuses.
pub const DUPLICATE_STATUS_ERROR: &str = "Duplicate status: ";

/// Outcome of validating one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub status: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            status: true,
            message: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            status: false,
            message: Some(message.into()),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.status
    }
}

/// Named validator attached to a field's options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display)]
#[strum(serialize_all = "camelCase")]
pub enum Validator {
    RelativePath,
    RequestBody,
    ExpectedStatuses,
    ExpectedResponse,
}

impl Validator {
    /// Runs the validator against a field value.
    pub fn run(&self, value: &Value, _siblings: &Map<String, Value>) -> ValidationResult {
        let text = value_text(value);
        match self {
            Self::RelativePath => validate_path(&text),
            Self::RequestBody => validate_body(&text),
            Self::ExpectedStatuses => validate_expected_statuses(&text),
            Self::ExpectedResponse => validate_expected_response(&text),
        }
    }
}

/// Renders a field value as the text a validator checks.
///
/// Arrays, as produced by token inputs, are joined with commas.
fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(value_text)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

static RELATIVE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&relative_reference_pattern()).expect("relative reference pattern is valid")
});

/// Builds the RFC 3986 `relative-ref` grammar as a regular expression.
fn relative_reference_pattern() -> String {
    // Unreserved and sub-delimiter characters; the leading `-` is literal.
    let chars = r"-A-Za-z0-9._~!$&'()*+,;=";
    let pct = "%[0-9A-Fa-f]{2}";
    let pchar = format!("(?:[{chars}:@]|{pct})");
    let segment = format!("{pchar}*");
    let segment_nz = format!("{pchar}+");
    let segment_nz_nc = format!("(?:[{chars}@]|{pct})+");

    let h16 = "[0-9A-Fa-f]{1,4}";
    let dec_octet = "(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)";
    let ipv4 = format!(r"(?:{dec_octet}\.){{3}}{dec_octet}");
    let ls32 = format!("(?:{h16}:{h16}|{ipv4})");
    let ipv6 = [
        format!("(?:{h16}:){{6}}{ls32}"),
        format!("::(?:{h16}:){{5}}{ls32}"),
        format!("(?:{h16})?::(?:{h16}:){{4}}{ls32}"),
        format!("(?:(?:{h16}:){{0,1}}{h16})?::(?:{h16}:){{3}}{ls32}"),
        format!("(?:(?:{h16}:){{0,2}}{h16})?::(?:{h16}:){{2}}{ls32}"),
        format!("(?:(?:{h16}:){{0,3}}{h16})?::{h16}:{ls32}"),
        format!("(?:(?:{h16}:){{0,4}}{h16})?::{ls32}"),
        format!("(?:(?:{h16}:){{0,5}}{h16})?::{h16}"),
        format!("(?:(?:{h16}:){{0,6}}{h16})?::"),
    ]
    .join("|");
    let ipvfuture = format!(r"[Vv][0-9A-Fa-f]+\.[{chars}:]+");
    let ip_literal = format!(r"\[(?:{ipv6}|{ipvfuture})\]");

    let userinfo = format!("(?:[{chars}:]|{pct})*");
    let reg_name = format!("(?:[{chars}]|{pct})*");
    let host = format!("(?:{ip_literal}|{ipv4}|{reg_name})");
    let authority = format!("(?:{userinfo}@)?{host}(?::[0-9]*)?");

    let path_abempty = format!("(?:/{segment})*");
    let path_absolute = format!("/(?:{segment_nz}(?:/{segment})*)?");
    let path_noscheme = format!("{segment_nz_nc}(?:/{segment})*");
    let relative_part = format!("(?://{authority}{path_abempty}|{path_absolute}|{path_noscheme}|)");

    let query = format!(r"(?:\?(?:[{chars}:@/?]|{pct})*)?");
    let fragment = format!("(?:#(?:[{chars}:@/?]|{pct})*)?");

    format!("^{relative_part}{query}{fragment}$")
}

static STATUS_LIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([1-5][0-9][0-9](,\s?[1-5][0-9][0-9])*)?$").expect("status list pattern is valid")
});

static STATUS_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s?").expect("status separator pattern is valid"));

/// Accepts RFC 3986 relative references and variable bindings.
pub fn validate_path(value: &str) -> ValidationResult {
    if is_variable_binding(value) || RELATIVE_REFERENCE.is_match(value) {
        ValidationResult::valid()
    } else {
        ValidationResult::invalid(INVALID_PATH_ERROR)
    }
}

/// Accepts any request body.
///
/// Bodies are sent verbatim and their shape is defined by the endpoint.
pub fn validate_body(_value: &str) -> ValidationResult {
    ValidationResult::valid()
}

/// Accepts an empty value or a comma separated list of distinct status codes.
///
/// Repeated codes are listed once each, in order of first appearance rather
/// than numeric order, so the message follows what the user typed.
pub fn validate_expected_statuses(value: &str) -> ValidationResult {
    if value.is_empty() {
        return ValidationResult::valid();
    }
    if !STATUS_LIST.is_match(value) {
        return ValidationResult::invalid(INVALID_STATUS_ERROR);
    }

    let mut seen: Vec<&str> = Vec::new();
    let mut duplicates: Vec<&str> = Vec::new();
    for status in STATUS_SEPARATOR.split(value) {
        if !seen.contains(&status) {
            seen.push(status);
        } else if !duplicates.contains(&status) {
            duplicates.push(status);
        }
    }

    if duplicates.is_empty() {
        ValidationResult::valid()
    } else {
        ValidationResult::invalid(format!("{DUPLICATE_STATUS_ERROR}{}", duplicates.join(", ")))
    }
}

/// Accepts any value that compiles as a regular expression.
///
/// The compiler's error text is reported verbatim.
pub fn validate_expected_response(value: &str) -> ValidationResult {
    match Regex::new(value) {
        Ok(_) => ValidationResult::valid(),
        Err(e) => ValidationResult::invalid(e.to_string()),
    }
}

/// Status codes suggested while typing expected statuses.
pub const HTTP_STATUS_CODES: &[&str] = &[
    "100", "101", "102", "200", "201", "202", "203", "204", "205", "206", "207", "208", "226",
    "300", "301", "302", "303", "304", "305", "306", "307", "308", "400", "401", "402", "403",
    "404", "405", "406", "407", "408", "409", "410", "411", "412", "413", "414", "415", "416",
    "417", "418", "421", "422", "423", "424", "426", "428", "429", "431", "451", "500", "501",
    "502", "503", "504", "505", "506", "507", "508", "510", "511",
];
