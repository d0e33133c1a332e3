//! Field-presence and email-format checks applied to submitted forms.
//!
//! Validation is intentionally loose: a field is "present" when it is a
//! non-empty string, and an email only has to look like `local@domain.tld`.

use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)]
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex is valid"));

/// Returns true if `email` matches `local@domain.tld`.
///
/// Each part is one or more characters that are neither whitespace nor `@`.
/// This accepts plenty of addresses RFC 5322 would reject.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Returns true if the field was supplied and is not the empty string.
pub fn is_present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

/// Names of the fields in `fields` that are absent or empty, in input order.
pub fn missing_fields<'a>(fields: &[(&'a str, Option<&str>)]) -> Vec<&'a str> {
    fields
        .iter()
        .filter(|(_, value)| !is_present(*value))
        .map(|(name, _)| *name)
        .collect()
}
