//! Variable binding detection.
//!
//! A variable binding is a `${...}` placeholder whose value is resolved by the
//! host when the task executes, so it cannot be checked while configuring.

use std::sync::LazyLock;

use regex::Regex;

static VARIABLE_BINDING: LazyLock<Regex> = LazyLock::new(|| {
    // Only the start is anchored; trailing text after the closing brace is allowed.
    Regex::new(r"^\$\{(.*)\}").expect("variable binding pattern is valid")
});

/// Returns whether `value` is a `${...}` variable binding.
pub fn is_variable_binding(value: &str) -> bool {
    VARIABLE_BINDING.is_match(value)
}

/// Returns the expression inside a variable binding, if `value` is one.
pub fn binding_expression(value: &str) -> Option<&str> {
    VARIABLE_BINDING
        .captures(value)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}
